//! Per-session tracker state: the unit of persistence and resume.

use chrono::{DateTime, Duration, Utc};
use interview_models::{MessageRole, SessionId, TopicRegistry, TranscriptMessage, UserInfo};
use serde::{Deserialize, Serialize};

use crate::coverage::TopicCoverageMap;
use crate::ledger::QuestionLedger;
use crate::text::transcript_text;

/// Everything tracked for one interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Session identifier.
    pub id: SessionId,

    /// Interviewee identity.
    pub user: UserInfo,

    /// Questions asked so far.
    #[serde(default)]
    pub ledger: QuestionLedger,

    /// Validated topic coverage.
    #[serde(default)]
    pub coverage: TopicCoverageMap,

    /// User-visible transcript.
    #[serde(default)]
    pub transcript: Vec<TranscriptMessage>,

    /// The user asked for the summary.
    #[serde(default)]
    pub summary_requested: bool,

    /// The interview was explicitly finished.
    #[serde(default)]
    pub explicitly_finished: bool,

    /// When the session was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last save time; strictly increasing across saves.
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,

    /// Model's last valid progress estimate (0-100).
    #[serde(default)]
    pub model_progress: Option<f64>,

    /// Model's last list of missing critical information.
    #[serde(default)]
    pub missing_critical_info: Vec<String>,
}

impl SessionState {
    /// New session with every registry topic uncovered.
    pub fn new(user: UserInfo, registry: &TopicRegistry) -> Self {
        Self::with_id(SessionId::new(), user, registry)
    }

    /// New session with an explicit id.
    pub fn with_id(id: SessionId, user: UserInfo, registry: &TopicRegistry) -> Self {
        Self {
            id,
            user,
            ledger: QuestionLedger::new(),
            coverage: TopicCoverageMap::new(registry),
            transcript: Vec::new(),
            summary_requested: false,
            explicitly_finished: false,
            created_at: Utc::now(),
            saved_at: None,
            model_progress: None,
            missing_critical_info: Vec::new(),
        }
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.transcript.push(TranscriptMessage::user(content));
    }

    /// Append an assistant message.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.transcript.push(TranscriptMessage::assistant(content));
    }

    /// Text of the latest assistant message, or empty.
    pub fn last_assistant_text(&self) -> &str {
        self.transcript
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    /// Lowercased, tag-free transcript text used for keyword evidence.
    pub fn evidence_text(&self) -> String {
        transcript_text(&self.transcript)
    }

    /// The last `n` transcript messages.
    pub fn recent_transcript(&self, n: usize) -> &[TranscriptMessage] {
        let start = self.transcript.len().saturating_sub(n);
        &self.transcript[start..]
    }

    /// Whether the interview has been finished.
    pub fn is_finished(&self) -> bool {
        self.explicitly_finished
    }

    /// Set the save timestamp, forcing it past the previous one.
    pub fn stamp_saved(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let stamp = match self.saved_at {
            Some(prev) if now <= prev => prev + Duration::milliseconds(1),
            _ => now,
        };
        self.saved_at = Some(stamp);
        stamp
    }
}
