use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("catalog `{locale}`: yaml parse error: {source}")]
    Yaml {
        locale: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("catalog `{locale}`: {msg}")]
    Catalog { locale: String, msg: String },

    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
