//! Error types for the models crate.

use thiserror::Error;

/// Errors raised while building or loading a topic registry.
#[derive(Error, Debug)]
pub enum ModelsError {
    /// The same topic key was declared twice.
    #[error("duplicate topic key: {0}")]
    DuplicateTopic(String),

    /// A topic has no requirement groups, or a group has no phrases.
    #[error("topic {key} has an empty requirement group")]
    EmptyRequirementGroup {
        /// Key of the offending topic.
        key: String,
    },

    /// A topic key or label was blank.
    #[error("invalid topic definition: {0}")]
    InvalidTopic(String),

    /// The catalog document could not be parsed.
    #[error("failed to parse topic catalog: {0}")]
    CatalogParse(#[from] serde_yaml::Error),
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelsError>;
