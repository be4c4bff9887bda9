//! Per-turn processing: parse, validate, record, detect loops, evaluate.

use std::collections::BTreeMap;
use std::sync::Arc;

use interview_models::{Directive, TopicKey, TopicRegistry};
use tracing::{debug, info, warn};

use crate::coverage::TopicCoverageMap;
use crate::error::Result;
use crate::ledger::RecordOutcome;
use crate::loop_detector::{force_progression, LoopDetector, LoopState};
use crate::parser::{parse_model_output, CompletionStatus};
use crate::progress::ProgressSnapshot;
use crate::readiness::{evaluate, Readiness};
use crate::session::SessionState;
use crate::thresholds::Thresholds;
use crate::validator::{CoverageValidator, MAX_CRITICAL_PER_NUDGE};

/// Everything that came out of one processed turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Model reply with structured blocks stripped.
    pub display_text: String,
    /// Directives to attach to the next model request.
    pub directives: Vec<Directive>,
    /// Short notices to show the user alongside the reply.
    pub notices: Vec<String>,
    /// Topics that became covered this turn.
    pub newly_covered: Vec<TopicKey>,
    /// Topics whose `true` claim was rejected this turn.
    pub rejected_claims: Vec<TopicKey>,
    /// What happened to each question update, in reply order.
    pub record_outcomes: Vec<RecordOutcome>,
    /// Loop detector state after this turn.
    pub loop_state: LoopState,
    /// Structured blocks that were malformed and dropped.
    pub discarded_blocks: Vec<String>,
    /// Readiness after this turn.
    pub readiness: Readiness,
    /// Progress after this turn.
    pub progress: ProgressSnapshot,
}

/// Applies model turns to session state.
///
/// Holds only the shared registry and thresholds; all mutable state is
/// passed in explicitly so sessions stay isolated.
#[derive(Debug, Clone)]
pub struct ConversationTracker {
    registry: Arc<TopicRegistry>,
    thresholds: Thresholds,
}

impl ConversationTracker {
    /// Create a tracker.
    pub fn new(registry: Arc<TopicRegistry>, thresholds: Thresholds) -> Self {
        Self {
            registry,
            thresholds,
        }
    }

    /// The shared topic registry.
    pub fn registry(&self) -> &Arc<TopicRegistry> {
        &self.registry
    }

    /// Active thresholds.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Apply one completed exchange to the session.
    ///
    /// `raw_output` is the model reply for `user_text`. The user message and
    /// the stripped reply are appended to the transcript, coverage claims are
    /// validated against the ledger as it stood before this turn, and the
    /// question updates are then recorded in reply order.
    pub fn process_turn(
        &self,
        state: &mut SessionState,
        detector: &mut LoopDetector,
        user_text: &str,
        raw_output: &str,
    ) -> TurnReport {
        let prior_assistant = state.last_assistant_text().to_string();
        let parsed = parse_model_output(raw_output);

        state.push_user(user_text);
        if !parsed.display_text.is_empty() {
            state.push_assistant(parsed.display_text.clone());
        }

        let evidence = state.evidence_text();
        let claimed = parsed.claimed_coverage();
        let validator = CoverageValidator::new(&self.registry, &self.thresholds);
        let validated = validator.validate(&claimed, &evidence, &state.ledger, &state.coverage);
        let rejected_claims = rejected(&claimed, &validated, &state.coverage);
        let newly_covered = state.coverage.apply(&validated);

        let record_outcomes: Vec<RecordOutcome> = parsed
            .question_updates
            .iter()
            .map(|update| state.ledger.record(update))
            .collect();

        if let Some(status) = &parsed.completion_status {
            self.absorb_status(state, status);
        }

        let mut directives = Vec::new();
        let mut notices = Vec::new();

        let loop_state = detector.observe(user_text, &prior_assistant);
        if let LoopState::LoopSuspected(kind) = loop_state {
            let directive = force_progression(&mut state.ledger, &state.coverage, &self.registry);
            info!(session_id = %state.id, ?kind, ?directive, "Forcing progression");
            detector.mark_forced();
            notices.extend(directive.user_notice());
            directives.push(directive);
        }

        directives.extend(self.nudges_for(state, &evidence));

        let readiness = self.readiness(state);
        let progress = self.progress(state, detector);
        debug!(
            session_id = %state.id,
            percentage = progress.percentage,
            ready = readiness.ready,
            "Turn processed"
        );

        TurnReport {
            display_text: parsed.display_text,
            directives,
            notices,
            newly_covered,
            rejected_claims,
            record_outcomes,
            loop_state: detector.state(),
            discarded_blocks: parsed.discarded,
            readiness,
            progress,
        }
    }

    /// Missing-topic and critical-question nudges for the current state.
    pub fn nudges(&self, state: &SessionState) -> Vec<Directive> {
        self.nudges_for(state, &state.evidence_text())
    }

    fn nudges_for(&self, state: &SessionState, evidence: &str) -> Vec<Directive> {
        let mut directives = Vec::new();

        let missing = state.coverage.missing_labels(&self.registry);
        let far_enough = state.coverage.ratio() >= self.thresholds.nudge_topic_ratio
            || state.ledger.answered_ratio() >= self.thresholds.nudge_answer_ratio;
        if far_enough && !missing.is_empty() {
            directives.push(Directive::MissingTopics { labels: missing });
        }

        let validator = CoverageValidator::new(&self.registry, &self.thresholds);
        for topic in self.registry.iter() {
            if !state.coverage.is_covered(&topic.key) || topic.critical_questions.is_empty() {
                continue;
            }
            let mut questions = validator.missing_critical_questions(topic, evidence);
            if questions.is_empty() {
                continue;
            }
            questions.truncate(MAX_CRITICAL_PER_NUDGE);
            directives.push(Directive::CriticalQuestions {
                topic: topic.label.clone(),
                questions,
            });
        }

        directives
    }

    /// Readiness for the current state.
    pub fn readiness(&self, state: &SessionState) -> Readiness {
        evaluate(&state.coverage, &state.ledger, &self.registry, &self.thresholds)
    }

    /// Progress snapshot for the current state.
    pub fn progress(&self, state: &SessionState, detector: &LoopDetector) -> ProgressSnapshot {
        ProgressSnapshot::compute(
            &state.coverage,
            &state.ledger,
            &self.registry,
            &self.thresholds,
            detector.detections(),
            state.model_progress,
        )
    }

    /// Explicitly reset coverage for one topic, or all topics when `key` is `None`.
    pub fn reset_coverage(&self, state: &mut SessionState, key: Option<&TopicKey>) -> Result<()> {
        match key {
            Some(key) => state.coverage.reset_topic(key),
            None => {
                state.coverage.reset_all();
                Ok(())
            }
        }
    }

    fn absorb_status(&self, state: &mut SessionState, status: &CompletionStatus) {
        match status.overall_progress {
            Some(p) if (0.0..=100.0).contains(&p) => state.model_progress = Some(p),
            Some(p) => warn!(session_id = %state.id, progress = p, "Ignoring out-of-range model progress"),
            None => {}
        }
        state.missing_critical_info = status.missing_critical_info.clone();
        if status.current_topic_complete {
            debug!(session_id = %state.id, "Model reports current topic complete");
        }
    }
}

fn rejected(
    claimed: &BTreeMap<TopicKey, bool>,
    validated: &BTreeMap<TopicKey, bool>,
    current: &TopicCoverageMap,
) -> Vec<TopicKey> {
    claimed
        .iter()
        .filter(|&(k, &claim)| claim && !current.is_covered(k) && validated.get(k) == Some(&false))
        .map(|(k, _)| k.clone())
        .collect()
}

#[cfg(test)]
mod tests;
