//! Repetition detection and forced progression.

use std::collections::VecDeque;

use interview_models::{Directive, TopicKey, TopicRegistry};
use serde::Serialize;
use tracing::{debug, info};

use crate::coverage::TopicCoverageMap;
use crate::ledger::QuestionLedger;
use crate::text::{is_normalized_example_request, normalize};

/// Exchanges kept in the loop window.
pub const LOOP_WINDOW_CAPACITY: usize = 8;

/// Trailing exchanges that must match to suspect a loop.
pub const LOOP_TRIGGER_LENGTH: usize = 3;

/// Characters of the prior assistant message compared per exchange.
pub const ASSISTANT_PREFIX_CHARS: usize = 200;

/// Topics asked about first when no unanswered question is left.
pub const PRIORITY_TOPICS: [&str; 3] = ["contact_process", "list_management", "insufficient_staffing"];

/// One (user, prior assistant) exchange, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: String,
    pub assistant: String,
}

impl Exchange {
    /// Normalize a raw exchange.
    pub fn new(user: &str, prior_assistant: &str) -> Self {
        let prefix: String = prior_assistant.chars().take(ASSISTANT_PREFIX_CHARS).collect();
        Self {
            user: normalize(user),
            assistant: normalize(&prefix),
        }
    }

    fn is_example_request(&self) -> bool {
        is_normalized_example_request(&self.user)
    }
}

/// Bounded ring buffer of recent exchanges.
#[derive(Debug, Clone, Default)]
pub struct LoopWindow {
    entries: VecDeque<Exchange>,
}

impl LoopWindow {
    /// Push an exchange, evicting the oldest past capacity.
    pub fn push(&mut self, exchange: Exchange) {
        if self.entries.len() == LOOP_WINDOW_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(exchange);
    }

    /// Number of buffered exchanges.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every buffered exchange.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Classify the trailing exchanges.
    pub fn detect(&self) -> Option<LoopKind> {
        if self.entries.len() < LOOP_TRIGGER_LENGTH {
            return None;
        }
        let tail: Vec<&Exchange> = self
            .entries
            .iter()
            .skip(self.entries.len() - LOOP_TRIGGER_LENGTH)
            .collect();

        if tail.windows(2).all(|pair| pair[0] == pair[1]) {
            return Some(LoopKind::IdenticalExchanges);
        }
        if tail.iter().all(|e| e.is_example_request()) {
            return Some(LoopKind::ExampleRequests);
        }
        None
    }
}

/// What kind of repetition was seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    /// The same exchange repeated.
    IdenticalExchanges,
    /// The user kept asking for examples.
    ExampleRequests,
}

/// Detector state, recomputed on every observed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// No repetition.
    Active,
    /// The trailing window repeats.
    LoopSuspected(LoopKind),
    /// A progression directive was issued for the current loop.
    ForcedAdvance,
}

/// Per-session loop detector. Transient; never persisted.
#[derive(Debug, Clone)]
pub struct LoopDetector {
    window: LoopWindow,
    state: LoopState,
    detections: usize,
}

impl Default for LoopDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopDetector {
    /// Create a detector with an empty window.
    pub fn new() -> Self {
        Self {
            window: LoopWindow::default(),
            state: LoopState::Active,
            detections: 0,
        }
    }

    /// Push a user turn and recompute the state.
    pub fn observe(&mut self, user_text: &str, prior_assistant: &str) -> LoopState {
        self.window.push(Exchange::new(user_text, prior_assistant));
        self.state = match self.window.detect() {
            Some(kind) => {
                self.detections += 1;
                info!(?kind, detections = self.detections, "Conversation loop detected");
                LoopState::LoopSuspected(kind)
            }
            None => LoopState::Active,
        };
        self.state
    }

    /// Record that the forcer acted on the current loop.
    pub fn mark_forced(&mut self) {
        if matches!(self.state, LoopState::LoopSuspected(_)) {
            self.state = LoopState::ForcedAdvance;
        }
    }

    /// Current state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of turns on which a loop was detected.
    pub fn detections(&self) -> usize {
        self.detections
    }

    /// Buffered exchanges.
    pub fn window(&self) -> &LoopWindow {
        &self.window
    }
}

/// Pick the directive that breaks a loop.
///
/// Advances the ledger's current question to the next unanswered one. With
/// none left, asks about the highest-priority missing topic, then wraps up.
pub fn force_progression(
    ledger: &mut QuestionLedger,
    coverage: &TopicCoverageMap,
    registry: &TopicRegistry,
) -> Directive {
    if let Some(next) = ledger.advance_to_next_unanswered() {
        debug!(question_id = %next.id, "Forcing advance to next unanswered question");
        return Directive::ForcedAdvance {
            question_id: next.id.clone(),
            question_text: next.text.clone(),
        };
    }

    match priority_missing_topic(coverage, registry) {
        Some(key) => {
            debug!(topic = %key, "Forcing focus on missing topic");
            Directive::TopicFocus {
                topic: registry.label(key).to_string(),
            }
        }
        None => Directive::WrapUp,
    }
}

fn priority_missing_topic<'a>(
    coverage: &TopicCoverageMap,
    registry: &'a TopicRegistry,
) -> Option<&'a TopicKey> {
    PRIORITY_TOPICS
        .iter()
        .filter_map(|k| registry.get_str(k).map(|t| &t.key))
        .find(|k| !coverage.is_covered(k))
        .or_else(|| coverage.missing_keys(registry).into_iter().next())
}
