use thiserror::Error;

#[derive(Debug, Error)]
pub enum SddError {
    #[error("spec not found: {0}")]
    SpecNotFound(String),

    #[error("invalid spec id '{0}': must be a relative path without '..'")]
    InvalidSpecId(String),

    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SddError>;
