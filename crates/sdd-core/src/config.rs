use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SyncConfig
// ---------------------------------------------------------------------------

/// Defaults for `sdd sync`, overridable per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Source directory, relative to the project root.
    #[serde(default = "default_src_dir")]
    pub src_dir: String,
    /// Globs (relative to `src_dir`) a source file must match to be scanned.
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    /// Globs (relative to `src_dir`) that remove a file from the scan.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    /// Test directories, relative to the project root.
    #[serde(default = "default_test_dirs")]
    pub test_dirs: Vec<String>,
    /// Globs (relative to each test dir) a test file must match.
    #[serde(default = "default_test_include")]
    pub test_include: Vec<String>,
    /// Minimum sync rate for `--ci` runs.
    #[serde(default = "default_threshold")]
    pub threshold: u32,
}

pub const SOURCE_EXTENSIONS: &str =
    "ts,tsx,js,jsx,mjs,cjs,py,rs,go,java,kt,rb,cs,swift,c,cc,cpp,h,hpp,php,scala,vue,svelte";

fn default_src_dir() -> String {
    paths::DEFAULT_SRC_DIR.to_string()
}

fn default_include() -> Vec<String> {
    vec![format!("**/*.{{{SOURCE_EXTENSIONS}}}")]
}

fn default_exclude() -> Vec<String> {
    [
        "**/node_modules/**",
        "**/vendor/**",
        "**/dist/**",
        "**/build/**",
        "**/target/**",
        "**/.git/**",
        "**/coverage/**",
        "**/__tests__/**",
        "**/*.test.*",
        "**/*.spec.*",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_test_dirs() -> Vec<String> {
    vec![paths::DEFAULT_TEST_DIR.to_string()]
}

fn default_test_include() -> Vec<String> {
    ["**/*.test.*", "**/*.spec.*", "**/*_test.*", "**/test_*.*"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_threshold() -> u32 {
    100
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            src_dir: default_src_dir(),
            include: default_include(),
            exclude: default_exclude(),
            test_dirs: default_test_dirs(),
            test_include: default_test_include(),
            threshold: default_threshold(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectConfig>,
    #[serde(default)]
    pub sync: SyncConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            project: None,
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Load `.sdd/config.yaml`, falling back to defaults when it is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let sync = &self.sync;

        if sync.threshold > 100 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "sync.threshold={} is out of range (0-100)",
                    sync.threshold
                ),
            });
        }

        if sync.include.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "sync.include is empty; no source files will be scanned".to_string(),
            });
        }

        if sync.test_dirs.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "sync.test_dirs is empty; test references will not be collected"
                    .to_string(),
            });
        }

        let lists = [
            ("include", &sync.include),
            ("exclude", &sync.exclude),
            ("test_include", &sync.test_include),
        ];
        for (key, patterns) in lists {
            for pattern in patterns {
                if let Err(e) = globset::Glob::new(pattern) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!("sync.{key}: invalid glob '{pattern}': {e}"),
                    });
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
