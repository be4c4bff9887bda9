//! Error types for persistence operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during persistence operations.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to read from file system.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to file system.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize or parse JSON.
    #[error("failed to serialize: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to create directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Item not found.
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// Session id that cannot name a snapshot file.
    #[error("invalid session id {0:?}: ids may not contain path separators or '..'")]
    InvalidSessionId(String),

    /// Snapshot carries a version this build cannot read.
    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(String),

    /// Neither the snapshot nor any backup could be read.
    #[error("session {id} could not be restored: snapshot and {backups} backup(s) are unreadable; start a new session")]
    Unrecoverable { id: String, backups: usize },
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
