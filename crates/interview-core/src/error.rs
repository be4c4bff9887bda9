//! Error types for configuration loading.

use std::path::PathBuf;

use interview_models::ModelsError;
use thiserror::Error;

/// Errors that can occur while loading configuration or catalogs.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid YAML for its schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Topic catalog is inconsistent.
    #[error("invalid topic catalog: {0}")]
    Catalog(#[from] ModelsError),

    /// A setting is out of range.
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
