//! Error types for the engine crate.

use interview_persistence::PersistenceError;
use interview_tracker::TrackerError;
use thiserror::Error;

/// Errors reported by a conversational model backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The HTTP request did not complete.
    #[error("request failed: {0}")]
    Request(String),

    /// The API answered with an error status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The reply had no text.
    #[error("empty response")]
    EmptyResponse,

    /// The reply could not be decoded.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),
}

/// Errors that can occur in engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// No live session with this id.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The model did not answer in time. Nothing was changed.
    #[error("the interviewer did not respond within {secs}s; please try again")]
    ModelTimeout { secs: u64 },

    /// The model call failed. Nothing was changed.
    #[error("the interviewer is unavailable ({0}); please try again")]
    ModelUnavailable(#[source] ModelError),

    /// Snapshot store failure.
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Tracker rejected an explicit operation.
    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    /// Whether retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ModelTimeout { .. } | Self::ModelUnavailable(_))
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
