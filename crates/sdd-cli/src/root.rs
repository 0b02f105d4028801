use std::path::{Path, PathBuf};

/// Resolve the project root directory.
///
/// Priority:
/// 1. `--root` flag / `SDD_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.sdd/`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_upward(&cwd, sdd_core::paths::SDD_DIR)
        .or_else(|| find_upward(&cwd, ".git"))
        .unwrap_or(cwd)
}

/// The closest ancestor of `start` (inclusive) containing a `marker` directory.
fn find_upward(start: &Path, marker: &str) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn finds_sdd_dir_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".sdd")).unwrap();
        let subdir = dir.path().join("src/deep");
        std::fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_upward(&subdir, ".sdd").as_deref(), Some(dir.path()));
    }

    #[test]
    fn missing_marker_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(find_upward(dir.path(), ".definitely-not-here").is_none());
    }
}
