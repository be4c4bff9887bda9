//! Interview engine: drives sessions through model turns.
//!
//! The engine owns the live sessions, the conversational model and the
//! snapshot store. Each user turn is classified, sent to the model with the
//! pending directives, and the reply is applied through the tracker. A model
//! failure or timeout leaves the session exactly as it was.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use interview_core::InterviewConfig;
use interview_models::{
    Directive, QaPair, ResumeDirective, SessionId, TopicKey, TopicRegistry, UserInfo,
};
use interview_persistence::{
    RestoreSource, SessionListing, SnapshotFormat, SnapshotHandle, SnapshotStore,
};
use interview_tracker::{
    ConversationTracker, LoopDetector, ProgressSnapshot, Readiness, SessionState, Thresholds,
};
use tracing::{debug, info, warn};

use crate::classifier::{classify, MessageKind};
use crate::error::{EngineError, Result};
use crate::model::{ConversationModel, ModelRequest};
use crate::prompts::{build_instructions, DEFAULT_INSTRUCTIONS};

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Tracker thresholds.
    pub thresholds: Thresholds,
    /// Upper bound on one model call.
    pub turn_timeout: Duration,
    /// Transcript messages sent with each request.
    pub transcript_window: usize,
    /// Base interviewer instructions.
    pub instructions: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&InterviewConfig::default())
    }
}

impl EngineSettings {
    /// Settings from a loaded `interview.yaml`.
    pub fn from_config(config: &InterviewConfig) -> Self {
        Self {
            thresholds: config.thresholds,
            turn_timeout: config.turn_timeout(),
            transcript_window: config.transcript_window,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}

/// Result of one user turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// How the user message was classified.
    pub kind: MessageKind,
    /// Text to show the user, notices included.
    pub display_text: String,
    /// Topics newly covered this turn.
    pub newly_covered: Vec<TopicKey>,
    /// Whether the model was called.
    pub model_called: bool,
    /// Directives queued for the next request.
    pub queued_directives: usize,
    /// Progress after the turn.
    pub progress: ProgressSnapshot,
    /// Readiness after the turn.
    pub readiness: Readiness,
}

/// Result of an explicit finish request.
#[derive(Debug, Clone)]
pub struct FinishOutcome {
    /// Whether the interview is now finished.
    pub finished: bool,
    /// The readiness verdict that decided it.
    pub readiness: Readiness,
}

/// Result of resuming a saved session.
#[derive(Debug, Clone)]
pub struct ResumeOutcome {
    /// Resumed session.
    pub session_id: SessionId,
    /// Context queued for the next request.
    pub directive: ResumeDirective,
    /// Snapshot file that was used.
    pub source: RestoreSource,
    /// Layout of that snapshot.
    pub format: SnapshotFormat,
}

struct SessionSlot {
    state: SessionState,
    detector: LoopDetector,
    pending: Vec<Directive>,
}

impl SessionSlot {
    fn new(state: SessionState) -> Self {
        Self {
            state,
            detector: LoopDetector::new(),
            pending: Vec::new(),
        }
    }
}

/// Runs interview sessions against a conversational model.
pub struct InterviewEngine {
    tracker: ConversationTracker,
    model: Arc<dyn ConversationModel>,
    store: SnapshotStore,
    settings: EngineSettings,
    sessions: HashMap<SessionId, SessionSlot>,
}

impl InterviewEngine {
    /// Create an engine.
    pub fn new(
        registry: Arc<TopicRegistry>,
        model: Arc<dyn ConversationModel>,
        store: SnapshotStore,
        settings: EngineSettings,
    ) -> Self {
        Self {
            tracker: ConversationTracker::new(registry, settings.thresholds),
            model,
            store,
            settings,
            sessions: HashMap::new(),
        }
    }

    /// The topic registry.
    pub fn registry(&self) -> &TopicRegistry {
        self.tracker.registry()
    }

    /// The snapshot store.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Start a new session for `user`.
    pub fn start_session(&mut self, user: UserInfo) -> SessionId {
        let state = SessionState::new(user, self.tracker.registry());
        let id = state.id.clone();
        info!(session_id = %id, model = self.model.name(), "Starting interview session");
        self.sessions.insert(id.clone(), SessionSlot::new(state));
        id
    }

    /// Ids of the sessions held in memory.
    pub fn live_sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Read-only view of a live session.
    pub fn session(&self, id: &SessionId) -> Result<&SessionState> {
        Ok(&self.slot(id)?.state)
    }

    /// Directives queued for the session's next model request.
    pub fn pending_directives(&self, id: &SessionId) -> Result<&[Directive]> {
        Ok(&self.slot(id)?.pending)
    }

    /// Process one user message.
    ///
    /// A summary request is answered locally once the interview is ready;
    /// otherwise the message goes to the model. On model failure or timeout
    /// nothing is recorded and the pending directives are kept.
    pub async fn submit_user_turn(&mut self, id: &SessionId, text: &str) -> Result<TurnOutcome> {
        let slot = self.slot(id)?;
        let kind = classify(text, slot.state.last_assistant_text());
        let wants_summary = matches!(kind, MessageKind::SummaryRequest | MessageKind::Frustration);
        debug!(session_id = %id, ?kind, "Classified user message");

        if wants_summary {
            let readiness = self.tracker.readiness(&slot.state);
            if readiness.ready {
                return self.reply_with_summary(id, text, kind);
            }
            info!(session_id = %id, missing = readiness.missing_topics.len(), "Summary requested before interview is complete");
        }

        let mut directives = slot.pending.clone();
        let current_question = slot
            .state
            .ledger
            .current_record()
            .map(|r| r.text.clone())
            .filter(|t| !t.trim().is_empty());
        match kind {
            MessageKind::ExampleRequest => directives.push(Directive::ProvideExample {
                question: current_question,
            }),
            MessageKind::HelpRequest => directives.push(Directive::Clarify {
                question: current_question,
            }),
            MessageKind::SummaryRequest | MessageKind::Frustration => {
                let labels = slot.state.coverage.missing_labels(self.tracker.registry());
                let nudge = Directive::MissingTopics { labels };
                if !directives.contains(&nudge) {
                    directives.push(nudge);
                }
            }
            MessageKind::Regular => {}
        }

        let request = ModelRequest {
            instructions: build_instructions(
                &self.settings.instructions,
                &slot.state.user,
                self.tracker.registry(),
            ),
            transcript: slot
                .state
                .recent_transcript(self.settings.transcript_window)
                .to_vec(),
            directives,
            user_message: text.to_string(),
        };

        let raw = match tokio::time::timeout(self.settings.turn_timeout, self.model.complete(&request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(session_id = %id, model = self.model.name(), error = %e, "Model call failed");
                return Err(EngineError::ModelUnavailable(e));
            }
            Err(_) => {
                warn!(session_id = %id, model = self.model.name(), "Model call timed out");
                return Err(EngineError::ModelTimeout {
                    secs: self.settings.turn_timeout.as_secs(),
                });
            }
        };

        let slot = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| EngineError::SessionNotFound(id.to_string()))?;
        let report = self
            .tracker
            .process_turn(&mut slot.state, &mut slot.detector, text, &raw);
        if wants_summary {
            slot.state.summary_requested = true;
        }
        slot.pending = report.directives.clone();

        let mut display_text = report.display_text;
        for notice in &report.notices {
            if !display_text.is_empty() {
                display_text.push_str("\n\n");
            }
            display_text.push_str(notice);
        }

        Ok(TurnOutcome {
            kind,
            display_text,
            newly_covered: report.newly_covered,
            model_called: true,
            queued_directives: slot.pending.len(),
            progress: report.progress,
            readiness: report.readiness,
        })
    }

    fn reply_with_summary(&mut self, id: &SessionId, text: &str, kind: MessageKind) -> Result<TurnOutcome> {
        let slot = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| EngineError::SessionNotFound(id.to_string()))?;
        let summary = render_summary(&slot.state);
        slot.state.summary_requested = true;
        slot.state.push_user(text);
        slot.state.push_assistant(summary.clone());
        info!(session_id = %id, answered = slot.state.ledger.answered_count(), "Summary provided");

        Ok(TurnOutcome {
            kind,
            display_text: summary,
            newly_covered: Vec::new(),
            model_called: false,
            queued_directives: slot.pending.len(),
            progress: self.tracker.progress(&slot.state, &slot.detector),
            readiness: self.tracker.readiness(&slot.state),
        })
    }

    /// Current progress for a session.
    pub fn progress(&self, id: &SessionId) -> Result<ProgressSnapshot> {
        let slot = self.slot(id)?;
        Ok(self.tracker.progress(&slot.state, &slot.detector))
    }

    /// Current readiness for a session.
    pub fn readiness(&self, id: &SessionId) -> Result<Readiness> {
        Ok(self.tracker.readiness(&self.slot(id)?.state))
    }

    /// Try to end the interview.
    ///
    /// Succeeds only when readiness allows it; otherwise a missing-topic
    /// nudge is queued for the next request.
    pub fn finish(&mut self, id: &SessionId) -> Result<FinishOutcome> {
        let slot = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| EngineError::SessionNotFound(id.to_string()))?;
        let readiness = self.tracker.readiness(&slot.state);
        if readiness.ready {
            slot.state.explicitly_finished = true;
            info!(session_id = %id, reason = ?readiness.reason, "Interview finished");
        } else {
            let nudge = Directive::MissingTopics {
                labels: readiness.missing_topics.clone(),
            };
            if !slot.pending.contains(&nudge) {
                slot.pending.push(nudge);
            }
            info!(session_id = %id, "Finish refused, topics still missing");
        }
        Ok(FinishOutcome {
            finished: readiness.ready,
            readiness,
        })
    }

    /// Save a live session to the snapshot store.
    pub fn save(&mut self, id: &SessionId) -> Result<SnapshotHandle> {
        let slot = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| EngineError::SessionNotFound(id.to_string()))?;
        Ok(self.store.save(&mut slot.state)?)
    }

    /// Load a saved session and queue its resume context.
    ///
    /// Replaces any live copy of the same session.
    pub fn resume(&mut self, id: &SessionId) -> Result<ResumeOutcome> {
        let restored = self.store.restore(id, self.tracker.registry())?;
        let mut slot = SessionSlot::new(restored.state);
        slot.pending.push(Directive::Resume(restored.directive.clone()));
        slot.pending.extend(self.tracker.nudges(&slot.state));

        let session_id = slot.state.id.clone();
        info!(
            session_id = %session_id,
            source = ?restored.source,
            format = ?restored.format,
            "Resumed interview session"
        );
        self.sessions.insert(session_id.clone(), slot);

        Ok(ResumeOutcome {
            session_id,
            directive: restored.directive,
            source: restored.source,
            format: restored.format,
        })
    }

    /// Drop a live session from memory, returning its state.
    pub fn close(&mut self, id: &SessionId) -> Result<SessionState> {
        self.sessions
            .remove(id)
            .map(|slot| slot.state)
            .ok_or_else(|| EngineError::SessionNotFound(id.to_string()))
    }

    /// Answered questions as (question, answer) pairs.
    pub fn export(&self, id: &SessionId) -> Result<Vec<QaPair>> {
        Ok(self.slot(id)?.state.ledger.qa_pairs())
    }

    /// Reset coverage for one topic, or every topic when `key` is `None`.
    pub fn reset_coverage(&mut self, id: &SessionId, key: Option<&TopicKey>) -> Result<()> {
        let slot = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| EngineError::SessionNotFound(id.to_string()))?;
        self.tracker.reset_coverage(&mut slot.state, key)?;
        Ok(())
    }

    /// Ledger dump for debugging.
    pub fn debug_status(&self, id: &SessionId) -> Result<String> {
        Ok(self.slot(id)?.state.ledger.debug_status())
    }

    /// Saved sessions in the store.
    pub fn list_saved(&self) -> Result<Vec<SessionListing>> {
        Ok(self.store.list_sessions(self.tracker.registry())?)
    }

    fn slot(&self, id: &SessionId) -> Result<&SessionSlot> {
        self.sessions
            .get(id)
            .ok_or_else(|| EngineError::SessionNotFound(id.to_string()))
    }
}

fn render_summary(state: &SessionState) -> String {
    let pairs = state.ledger.qa_pairs();
    let mut out = format!(
        "Thank you, {}. We've covered all the topic areas. Here is a summary of your answers:\n",
        state.user.display_name()
    );
    if pairs.is_empty() {
        out.push_str("\nNo individual answers were recorded.");
    }
    for (i, pair) in pairs.iter().enumerate() {
        out.push_str(&format!("\n{}. {}\n   {}", i + 1, pair.question, pair.answer));
    }
    out
}

#[cfg(test)]
mod tests;
