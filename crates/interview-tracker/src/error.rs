//! Error types for tracker operations.

use thiserror::Error;

/// Errors returned by the strict tracker APIs.
///
/// Turn processing itself never fails: malformed model output and rejected
/// claims are logged and absorbed. These errors only come from operations
/// that name a topic or question explicitly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// Topic key is not declared in the registry.
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    /// Question id is not in the ledger.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),
}

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
