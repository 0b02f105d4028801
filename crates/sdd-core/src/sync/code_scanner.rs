use crate::config::SyncConfig;
use crate::error::Result;
use crate::paths;
use crate::sync::annotation::spec_annotation_ids;
use crate::sync::types::{CodeReference, ReferenceKind};
use crate::sync::walk::{collect_files, FileFilter};
use std::path::{Path, PathBuf};

/// Finds `@spec REQ-xxx` annotations in source files.
///
/// Test files are excluded by default; [`crate::sync::test_scanner::TestScanner`]
/// owns them so a reference is never counted twice.
pub struct CodeScanner {
    root: PathBuf,
    src_dir: PathBuf,
    filter: FileFilter,
}

impl CodeScanner {
    /// `src_dir` is resolved against `root` when relative.
    pub fn new(
        root: impl Into<PathBuf>,
        src_dir: impl AsRef<Path>,
        include: &[String],
        exclude: &[String],
    ) -> Result<Self> {
        let root = root.into();
        let src_dir = root.join(src_dir.as_ref());
        Ok(Self {
            filter: FileFilter::new(include, exclude)?,
            root,
            src_dir,
        })
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &SyncConfig) -> Result<Self> {
        Self::new(root, &config.src_dir, &config.include, &config.exclude)
    }

    pub fn src_dir(&self) -> &Path {
        &self.src_dir
    }

    /// Scan every matching file, in path order.
    pub fn scan(&self) -> Vec<CodeReference> {
        let files = collect_files(&self.src_dir, &self.filter);
        tracing::debug!(dir = %self.src_dir.display(), files = files.len(), "scanning source files");
        let refs: Vec<CodeReference> = files.iter().flat_map(|f| self.scan_file(f)).collect();
        tracing::info!(references = refs.len(), "code scan complete");
        refs
    }

    /// Scan one file. Unreadable files yield nothing.
    pub fn scan_file(&self, path: &Path) -> Vec<CodeReference> {
        let Some(content) = crate::io::read_text_lossy(path) else {
            return Vec::new();
        };
        let file = paths::display_relative(&self.root, path);
        scan_code_text(&file, &content)
    }
}

/// Annotation references in `content`, attributed to `file`.
pub fn scan_code_text(file: &str, content: &str) -> Vec<CodeReference> {
    let mut refs = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let ids = spec_annotation_ids(line);
        if ids.is_empty() {
            continue;
        }
        let context = line.trim();
        for req_id in ids {
            refs.push(CodeReference {
                req_id,
                file: file.to_string(),
                line: idx + 1,
                kind: ReferenceKind::Code,
                context: Some(context.to_string()),
            });
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn one_reference_per_id() {
        let text = "import x from 'y';\n\n// @spec REQ-001, req-002\nexport function login() {}\n";
        let refs = scan_code_text("src/auth.ts", text);
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].req_id, "REQ-001");
        assert_eq!(refs[1].req_id, "REQ-002");
        assert!(refs.iter().all(|r| r.line == 3 && r.kind == ReferenceKind::Code));
        assert_eq!(refs[0].context.as_deref(), Some("// @spec REQ-001, req-002"));
    }

    #[test]
    fn scan_uses_root_relative_paths() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/file.ts", "// @spec REQ-099\n");
        write(dir.path(), "src/api/user.py", "x = 1\n# @spec: REQ-002\n");
        write(dir.path(), "src/login.test.ts", "// @spec REQ-001\n");
        write(dir.path(), "src/node_modules/dep/index.js", "// @spec REQ-003\n");
        write(dir.path(), "src/notes.md", "@spec REQ-004\n");

        let scanner =
            CodeScanner::from_config(dir.path(), &SyncConfig::default()).unwrap();
        let refs = scanner.scan();
        let found: Vec<_> = refs
            .iter()
            .map(|r| (r.file.as_str(), r.line, r.req_id.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![("src/api/user.py", 2, "REQ-002"), ("src/file.ts", 1, "REQ-099")]
        );
    }

    #[test]
    fn missing_src_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let scanner = CodeScanner::new(
            dir.path(),
            "does-not-exist",
            &["**/*".to_string()],
            &[],
        )
        .unwrap();
        assert!(scanner.scan().is_empty());
    }

    #[test]
    fn unreadable_file_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        let scanner = CodeScanner::from_config(dir.path(), &SyncConfig::default()).unwrap();
        assert!(scanner.scan_file(&dir.path().join("src/gone.ts")).is_empty());
    }

    #[test]
    fn custom_include_and_exclude() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "lib/a.rs", "// @spec REQ-1\n");
        write(dir.path(), "lib/gen/b.rs", "// @spec REQ-2\n");
        let scanner = CodeScanner::new(
            dir.path(),
            "lib",
            &["**/*.rs".to_string()],
            &["gen/**".to_string()],
        )
        .unwrap();
        let refs = scanner.scan();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].file, "lib/a.rs");
    }
}
