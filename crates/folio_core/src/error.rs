use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt storage file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceError {
    #[error("invalid preference `{key}`: {reason}")]
    InvalidDefinition { key: String, reason: String },

    #[error("`{value}` is not an allowed value for `{key}` (allowed: {})", .allowed.join(", "))]
    NotAllowed {
        key: String,
        value: String,
        allowed: Vec<String>,
    },
}
