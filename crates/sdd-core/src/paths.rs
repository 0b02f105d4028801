use crate::error::{Result, SddError};
use std::path::{Component, Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const SDD_DIR: &str = ".sdd";
pub const SPECS_DIR: &str = ".sdd/specs";
pub const CONFIG_FILE: &str = ".sdd/config.yaml";
pub const SPEC_FILE: &str = "spec.md";

pub const DEFAULT_SRC_DIR: &str = "src";
pub const DEFAULT_TEST_DIR: &str = "tests";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn sdd_dir(root: &Path) -> PathBuf {
    root.join(SDD_DIR)
}

pub fn specs_dir(root: &Path) -> PathBuf {
    root.join(SPECS_DIR)
}

pub fn spec_dir(root: &Path, spec_id: &str) -> PathBuf {
    specs_dir(root).join(spec_id)
}

pub fn spec_path(root: &Path, spec_id: &str) -> PathBuf {
    spec_dir(root, spec_id).join(SPEC_FILE)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Render `path` relative to `root` with forward slashes.
///
/// Paths outside `root` are returned as-is (still slash-normalized).
pub fn display_relative(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// ---------------------------------------------------------------------------
// Spec id validation
// ---------------------------------------------------------------------------

/// Spec ids are directory paths under `.sdd/specs`, so they must stay inside it.
pub fn validate_spec_id(spec_id: &str) -> Result<()> {
    let path = Path::new(spec_id);
    let escapes = spec_id.is_empty()
        || spec_id.contains('\\')
        || spec_id.contains('\0')
        || path
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
    if escapes {
        return Err(SddError::InvalidSpecId(spec_id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
