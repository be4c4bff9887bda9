//! Session snapshot store.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use interview_models::{ResumeDirective, SessionId, TopicRegistry, UserInfo};
use interview_tracker::SessionState;
use tracing::{info, warn};

use crate::atomic::{atomic_write, copy_file, ensure_dir, read_json_value};
use crate::error::{PersistenceError, Result};
use crate::format::{decode_snapshot, encode_snapshot, SnapshotFormat};
use crate::resume::build_resume_directive;

/// Backups kept per session unless configured otherwise.
pub const DEFAULT_MAX_BACKUPS: usize = 5;

/// Reference to a saved snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHandle {
    /// Session the snapshot belongs to.
    pub session_id: SessionId,
    /// Primary snapshot file.
    pub path: PathBuf,
    /// Save timestamp written into the snapshot.
    pub saved_at: DateTime<Utc>,
}

/// Where a restored session was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreSource {
    /// The primary snapshot.
    Primary,
    /// A backup, after the primary failed.
    Backup(PathBuf),
}

/// A session rebuilt from disk.
#[derive(Debug, Clone)]
pub struct RestoredSession {
    /// Restored tracker state.
    pub state: SessionState,
    /// Context block for the next model request.
    pub directive: ResumeDirective,
    /// Which file was used.
    pub source: RestoreSource,
    /// Layout of that file.
    pub format: SnapshotFormat,
}

/// Short description of a saved session for listings.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionListing {
    pub id: SessionId,
    pub user: UserInfo,
    pub saved_at: Option<DateTime<Utc>>,
    pub finished: bool,
    pub questions: usize,
    pub answered: usize,
}

/// Persists session snapshots as JSON files.
///
/// ```text
/// sessions_dir/
/// ├── sess-abc.json
/// └── backups/
///     └── sess-abc/
///         ├── sess-abc-20240301T101530.123456789Z.json
///         └── sess-abc-20240301T102012.004180233Z.json
/// ```
///
/// Assumes one writer per session id.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    sessions_dir: PathBuf,
    max_backups: usize,
}

impl SnapshotStore {
    /// Create a store that keeps snapshots in `sessions_dir`.
    pub fn new(sessions_dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: sessions_dir.into(),
            max_backups: DEFAULT_MAX_BACKUPS,
        }
    }

    /// Keep at most `max_backups` backups per session.
    pub fn with_max_backups(mut self, max_backups: usize) -> Self {
        self.max_backups = max_backups;
        self
    }

    /// Snapshot directory.
    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    fn session_path(&self, id: &SessionId) -> Result<PathBuf> {
        check_session_id(id)?;
        Ok(self.sessions_dir.join(format!("{}.json", id)))
    }

    fn backups_dir(&self, id: &SessionId) -> Result<PathBuf> {
        check_session_id(id)?;
        Ok(self.sessions_dir.join("backups").join(id.as_str()))
    }

    /// Whether a primary snapshot exists for `id`.
    pub fn exists(&self, id: &SessionId) -> bool {
        self.session_path(id).is_ok_and(|path| path.exists())
    }

    /// Save a session.
    ///
    /// Stamps a strictly increasing save time on `state`, copies any existing
    /// snapshot to a timestamped backup, then atomically replaces it.
    pub fn save(&self, state: &mut SessionState) -> Result<SnapshotHandle> {
        let path = self.session_path(&state.id)?;
        ensure_dir(&self.sessions_dir)?;

        let saved_at = state.stamp_saved(Utc::now());
        if path.exists() {
            let backup = self.backups_dir(&state.id)?.join(format!(
                "{}-{}.json",
                state.id,
                saved_at.format("%Y%m%dT%H%M%S%.9fZ")
            ));
            copy_file(&path, &backup)?;
        }

        let bytes = encode_snapshot(state)?;
        atomic_write(&path, &bytes)?;
        self.prune_backups(&state.id);

        info!(
            session_id = %state.id,
            path = %path.display(),
            questions = state.ledger.len(),
            "Saved session snapshot"
        );

        Ok(SnapshotHandle {
            session_id: state.id.clone(),
            path,
            saved_at,
        })
    }

    /// Restore a session, falling back to the newest readable backup.
    pub fn restore(&self, id: &SessionId, registry: &TopicRegistry) -> Result<RestoredSession> {
        let primary = self.session_path(id)?;
        let backups = self.list_backups(id)?;
        if !primary.exists() && backups.is_empty() {
            return Err(PersistenceError::NotFound {
                kind: "session".to_string(),
                id: id.to_string(),
            });
        }

        let candidates = std::iter::once((primary, RestoreSource::Primary)).chain(
            backups
                .iter()
                .rev()
                .map(|p| (p.clone(), RestoreSource::Backup(p.clone()))),
        );

        for (path, source) in candidates {
            if !path.exists() {
                continue;
            }
            match self.read_snapshot(&path, id, registry) {
                Ok((state, format)) => {
                    if source != RestoreSource::Primary {
                        warn!(session_id = %id, backup = %path.display(), "Restored session from backup");
                    } else {
                        info!(session_id = %id, "Restored session snapshot");
                    }
                    let directive = build_resume_directive(&state, registry);
                    return Ok(RestoredSession {
                        state,
                        directive,
                        source,
                        format,
                    });
                }
                Err(e) => {
                    warn!(session_id = %id, path = %path.display(), error = %e, "Unreadable snapshot");
                }
            }
        }

        Err(PersistenceError::Unrecoverable {
            id: id.to_string(),
            backups: backups.len(),
        })
    }

    fn read_snapshot(
        &self,
        path: &Path,
        id: &SessionId,
        registry: &TopicRegistry,
    ) -> Result<(SessionState, SnapshotFormat)> {
        let value = read_json_value(path)?;
        decode_snapshot(value, id, registry)
    }

    /// Backup files for a session, oldest first.
    pub fn list_backups(&self, id: &SessionId) -> Result<Vec<PathBuf>> {
        let mut paths = json_files(&self.backups_dir(id)?)?;
        paths.sort();
        Ok(paths)
    }

    /// Ids of every session with a primary snapshot, sorted.
    pub fn list_session_ids(&self) -> Result<Vec<SessionId>> {
        let mut ids: Vec<SessionId> = json_files(&self.sessions_dir)?
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()))
            .map(SessionId::from)
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Summaries of every readable session. Unreadable snapshots are skipped.
    pub fn list_sessions(&self, registry: &TopicRegistry) -> Result<Vec<SessionListing>> {
        let mut listings = Vec::new();
        for id in self.list_session_ids()? {
            let snapshot = self
                .session_path(&id)
                .and_then(|path| self.read_snapshot(&path, &id, registry));
            match snapshot {
                Ok((state, _)) => listings.push(SessionListing {
                    id,
                    user: state.user,
                    saved_at: state.saved_at,
                    finished: state.explicitly_finished,
                    questions: state.ledger.len(),
                    answered: state.ledger.answered_count(),
                }),
                Err(e) => warn!(session_id = %id, error = %e, "Skipping unreadable session"),
            }
        }
        Ok(listings)
    }

    fn prune_backups(&self, id: &SessionId) {
        let backups = match self.list_backups(id) {
            Ok(b) => b,
            Err(e) => {
                warn!(session_id = %id, error = %e, "Could not list backups for pruning");
                return;
            }
        };
        let excess = backups.len().saturating_sub(self.max_backups);
        for old in backups.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&old) {
                warn!(path = %old.display(), error = %e, "Failed to prune backup");
            }
        }
    }
}

/// Session ids become file names, so they must stay inside the sessions dir.
fn check_session_id(id: &SessionId) -> Result<()> {
    let raw = id.as_str();
    let invalid = raw.trim().is_empty()
        || raw.contains(['/', '\\', '\0'])
        || raw.contains("..");
    if invalid {
        return Err(PersistenceError::InvalidSessionId(raw.to_string()));
    }
    Ok(())
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|source| PersistenceError::ReadError {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PersistenceError::ReadError {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    Ok(paths)
}
