//! Config error types.

use std::path::PathBuf;

/// Errors produced while reading or parsing key files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported key file format: .{0}")]
    UnsupportedFormat(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no key file found")]
    NotFound,

    #[error("watcher error: {0}")]
    Watch(#[from] notify_debouncer_full::notify::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for strongbox_vault::CryptoError {
    fn from(err: ConfigError) -> Self {
        Self::key_source(err.to_string())
    }
}
