use crate::config::SyncConfig;
use crate::error::Result;
use crate::paths;
use crate::sync::annotation::{dedup_ids, spec_annotation_ids, test_description_ids};
use crate::sync::types::{CodeReference, ReferenceKind};
use crate::sync::walk::{collect_files, FileFilter};
use std::path::{Path, PathBuf};

const TEST_EXCLUDES: &[&str] = &["**/node_modules/**", "**/.git/**", "**/coverage/**"];

/// Finds requirement mentions in test files: `@spec` comments and `REQ-xxx`
/// tokens inside `it(...)` / `test(...)` / `describe(...)` descriptions.
pub struct TestScanner {
    root: PathBuf,
    test_dirs: Vec<PathBuf>,
    filter: FileFilter,
}

impl TestScanner {
    pub fn new<P: AsRef<Path>>(
        root: impl Into<PathBuf>,
        test_dirs: &[P],
        include: &[String],
    ) -> Result<Self> {
        let root = root.into();
        let test_dirs = test_dirs.iter().map(|d| root.join(d.as_ref())).collect();
        let exclude: Vec<String> = TEST_EXCLUDES.iter().map(|s| s.to_string()).collect();
        Ok(Self {
            filter: FileFilter::new(include, &exclude)?,
            root,
            test_dirs,
        })
    }

    pub fn from_config(root: impl Into<PathBuf>, config: &SyncConfig) -> Result<Self> {
        Self::new(root, config.test_dirs.as_slice(), &config.test_include)
    }

    /// Scan every test directory in order. A file reachable from two test
    /// dirs is scanned once.
    pub fn scan(&self) -> Vec<CodeReference> {
        let mut files: Vec<PathBuf> = Vec::new();
        for dir in &self.test_dirs {
            for file in collect_files(dir, &self.filter) {
                if !files.contains(&file) {
                    files.push(file);
                }
            }
        }
        tracing::debug!(files = files.len(), "scanning test files");
        let refs: Vec<CodeReference> = files.iter().flat_map(|f| self.scan_file(f)).collect();
        tracing::info!(references = refs.len(), "test scan complete");
        refs
    }

    pub fn scan_file(&self, path: &Path) -> Vec<CodeReference> {
        let Some(content) = crate::io::read_text_lossy(path) else {
            return Vec::new();
        };
        let file = paths::display_relative(&self.root, path);
        scan_test_text(&file, &content)
    }
}

/// Test references in `content`. Annotation ids come first, then ids from
/// test descriptions; each distinct id on a line is reported once.
pub fn scan_test_text(file: &str, content: &str) -> Vec<CodeReference> {
    let mut refs = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let mut ids = spec_annotation_ids(line);
        ids.extend(test_description_ids(line));
        if ids.is_empty() {
            continue;
        }
        let context = line.trim();
        for req_id in dedup_ids(ids) {
            refs.push(CodeReference {
                req_id,
                file: file.to_string(),
                line: idx + 1,
                kind: ReferenceKind::Test,
                context: Some(context.to_string()),
            });
        }
    }
    refs
}
