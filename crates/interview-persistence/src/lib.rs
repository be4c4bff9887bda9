//! Persistence layer for interview sessions.
//!
//! Each session is one versioned JSON snapshot written atomically (temp file
//! then rename). The previous snapshot is kept as a timestamped backup, and
//! restore falls back to the newest readable backup when the primary is
//! corrupt.
//!
//! # Example
//!
//! ```no_run
//! use interview_models::{builtin_registry, UserInfo};
//! use interview_persistence::SnapshotStore;
//! use interview_tracker::SessionState;
//!
//! let registry = builtin_registry();
//! let store = SnapshotStore::new("/home/user/.interview/sessions");
//!
//! let mut state = SessionState::new(UserInfo::new("Victor", "ABC"), &registry);
//! store.save(&mut state).unwrap();
//!
//! let restored = store.restore(&state.id, &registry).unwrap();
//! println!("{}", restored.directive.render());
//! ```

pub mod atomic;
pub mod error;
pub mod format;
pub mod resume;
pub mod store;

pub use error::{PersistenceError, Result};
pub use format::{SnapshotFormat, SNAPSHOT_FORMAT_VERSION};
pub use resume::build_resume_directive;
pub use store::{
    RestoreSource, RestoredSession, SessionListing, SnapshotHandle, SnapshotStore,
    DEFAULT_MAX_BACKUPS,
};
