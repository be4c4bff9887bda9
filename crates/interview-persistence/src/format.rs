//! Versioned snapshot documents.
//!
//! Current snapshots (`"version": 2`) wrap the full session state:
//! ```json
//! { "version": 2, "session": { "id": "sess-...", "user": {...}, "ledger": {...}, ... } }
//! ```
//! Legacy snapshots carry no numeric version (absent, `1`, or the string
//! `"2.0"`) and keep user info, topic flags and chat history at the top
//! level without a question ledger.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use interview_models::{MessageRole, SessionId, TopicKey, TopicRegistry, TranscriptMessage, UserInfo};
use interview_tracker::SessionState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{PersistenceError, Result};

/// Version written by this build.
pub const SNAPSHOT_FORMAT_VERSION: u64 = 2;

/// Which layout a snapshot was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// Versioned layout with a question ledger.
    Current,
    /// Older layout without a ledger.
    Legacy,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u64,
    session: &'a SessionState,
}

#[derive(Deserialize)]
struct SnapshotDocument {
    session: SessionState,
}

#[derive(Deserialize)]
struct LegacySnapshot {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    user_info: UserInfo,
    #[serde(default)]
    topic_areas_covered: BTreeMap<TopicKey, bool>,
    #[serde(default, alias = "visible_messages")]
    chat_history: Vec<LegacyMessage>,
    #[serde(default)]
    summary_requested: bool,
    #[serde(default)]
    explicitly_finished: bool,
    #[serde(default)]
    saved_timestamp: Option<String>,
}

#[derive(Deserialize)]
struct LegacyMessage {
    role: String,
    #[serde(default)]
    content: String,
}

/// Serialize a session as a current-version snapshot.
pub fn encode_snapshot(state: &SessionState) -> Result<Vec<u8>> {
    let doc = SnapshotRef {
        version: SNAPSHOT_FORMAT_VERSION,
        session: state,
    };
    Ok(serde_json::to_vec_pretty(&doc)?)
}

/// Decode a snapshot of any supported version.
///
/// `fallback_id` names the session when a legacy snapshot does not. The
/// coverage map is reconciled with `registry` either way.
pub fn decode_snapshot(
    value: Value,
    fallback_id: &SessionId,
    registry: &TopicRegistry,
) -> Result<(SessionState, SnapshotFormat)> {
    let format = match value.get("version") {
        Some(Value::Number(n)) if n.as_u64() == Some(SNAPSHOT_FORMAT_VERSION) => {
            SnapshotFormat::Current
        }
        None | Some(Value::Null) => SnapshotFormat::Legacy,
        Some(Value::Number(n)) if n.as_u64() == Some(1) => SnapshotFormat::Legacy,
        Some(Value::String(s)) if s == "2.0" || s == "1" => SnapshotFormat::Legacy,
        Some(other) => return Err(PersistenceError::UnsupportedVersion(other.to_string())),
    };
    debug!(?format, "Decoding snapshot");

    let mut state = match format {
        SnapshotFormat::Current => serde_json::from_value::<SnapshotDocument>(value)?.session,
        SnapshotFormat::Legacy => {
            let legacy: LegacySnapshot = serde_json::from_value(value)?;
            from_legacy(legacy, fallback_id, registry)
        }
    };
    state.coverage.reconcile(registry);
    Ok((state, format))
}

fn from_legacy(legacy: LegacySnapshot, fallback_id: &SessionId, registry: &TopicRegistry) -> SessionState {
    let id = legacy
        .session_id
        .filter(|s| !s.trim().is_empty())
        .map(SessionId::from)
        .unwrap_or_else(|| fallback_id.clone());

    let mut state = SessionState::with_id(id, legacy.user_info, registry);
    state.coverage.apply(&legacy.topic_areas_covered);
    state.transcript = legacy
        .chat_history
        .into_iter()
        .filter_map(|m| {
            let role = match m.role.as_str() {
                "user" => MessageRole::User,
                "assistant" => MessageRole::Assistant,
                _ => return None,
            };
            Some(TranscriptMessage::new(role, m.content))
        })
        .collect();
    state.summary_requested = legacy.summary_requested;
    state.explicitly_finished = legacy.explicitly_finished;
    state.saved_at = legacy.saved_timestamp.as_deref().and_then(parse_timestamp);
    state
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|t| t.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_models::{builtin_registry, AnswerQuality, QuestionUpdate};
    use serde_json::json;

    #[test]
    fn test_current_snapshot_roundtrip() {
        let registry = builtin_registry();
        let mut state = SessionState::new(UserInfo::new("Victor", "ABC"), &registry);
        state
            .ledger
            .record(&QuestionUpdate::new("q1").answered(AnswerQuality::Partial, "Supervisor"));
        state.push_user("Supervisor");

        let bytes = encode_snapshot(&state).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["version"], 2);

        let (back, format) = decode_snapshot(value, &state.id, &registry).unwrap();
        assert_eq!(format, SnapshotFormat::Current);
        assert_eq!(back, state);
    }

    #[test]
    fn test_legacy_snapshot_restores_without_ledger() {
        let registry = builtin_registry();
        let value = json!({
            "user_info": {"name": "Dana", "company": "Gridco"},
            "topic_areas_covered": {"basic_info": true, "retired_topic": true},
            "chat_history": [
                {"role": "system", "content": "You are an interviewer."},
                {"role": "assistant", "content": "Hello Dana"},
                {"role": "user", "content": "Hi"}
            ],
            "summary_requested": true,
            "saved_timestamp": "2024-03-01T10:15:30.123456",
            "version": "2.0"
        });

        let (state, format) = decode_snapshot(value, &SessionId::from("sess-legacy"), &registry).unwrap();
        assert_eq!(format, SnapshotFormat::Legacy);
        assert_eq!(state.id.as_str(), "sess-legacy");
        assert_eq!(state.user.name, "Dana");
        assert!(state.ledger.is_empty());
        assert_eq!(state.coverage.len(), 9);
        assert_eq!(state.coverage.covered_count(), 1);
        assert_eq!(state.transcript.len(), 2);
        assert!(state.summary_requested);
        assert_eq!(
            state.saved_at.unwrap().format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-03-01 10:15:30"
        );
    }

    #[test]
    fn test_unsupported_version() {
        let registry = builtin_registry();
        let err = decode_snapshot(json!({"version": 7}), &SessionId::new(), &registry).unwrap_err();
        assert!(matches!(err, PersistenceError::UnsupportedVersion(v) if v == "7"));
    }

    #[test]
    fn test_current_version_with_bad_body_is_error() {
        let registry = builtin_registry();
        let err = decode_snapshot(json!({"version": 2, "session": {"id": 5}}), &SessionId::new(), &registry)
            .unwrap_err();
        assert!(matches!(err, PersistenceError::SerializeError(_)));
    }
}
