//! Coverage validation against transcript evidence.
//!
//! The model's "topic covered" claims are checked against the registry's
//! requirement groups before they reach the coverage map. A group is
//! evidenced when any one of its synonym phrases appears in the lowercased
//! transcript.

use std::collections::BTreeMap;

use interview_models::{Topic, TopicKey, TopicRegistry};
use tracing::{debug, info};

use crate::coverage::TopicCoverageMap;
use crate::ledger::QuestionLedger;
use crate::text::contains_phrase;
use crate::thresholds::Thresholds;

/// At most this many critical questions are nudged per topic.
pub const MAX_CRITICAL_PER_NUDGE: usize = 2;

/// Critical questions ignore words of this length or shorter.
const SIGNIFICANT_WORD_LEN: usize = 3;

/// Accepts or rejects coverage claims.
#[derive(Debug, Clone, Copy)]
pub struct CoverageValidator<'a> {
    registry: &'a TopicRegistry,
    thresholds: &'a Thresholds,
}

impl<'a> CoverageValidator<'a> {
    /// Create a validator over a registry.
    pub fn new(registry: &'a TopicRegistry, thresholds: &'a Thresholds) -> Self {
        Self {
            registry,
            thresholds,
        }
    }

    /// Fraction of a topic's requirement groups evidenced in `transcript`.
    ///
    /// `transcript` must already be lowercased (see [`crate::text::transcript_text`]).
    pub fn group_ratio(&self, topic: &Topic, transcript: &str) -> f64 {
        if topic.requirement_groups.is_empty() {
            return 0.0;
        }
        let satisfied = topic
            .requirement_groups
            .iter()
            .filter(|group| group.iter().any(|p| contains_phrase(transcript, p)))
            .count();
        satisfied as f64 / topic.requirement_groups.len() as f64
    }

    /// Validate claimed coverage.
    ///
    /// `false` claims pass through. A `true` claim is accepted when enough
    /// requirement groups are evidenced, or when the ledger is non-empty and
    /// enough of its questions are answered. A rejected claim keeps the
    /// topic's current flag. Claims for unknown topics are dropped.
    pub fn validate(
        &self,
        claimed: &BTreeMap<TopicKey, bool>,
        transcript: &str,
        ledger: &QuestionLedger,
        current: &TopicCoverageMap,
    ) -> BTreeMap<TopicKey, bool> {
        let ledger_escape =
            !ledger.is_empty() && ledger.answered_ratio() >= self.thresholds.ledger_escape_ratio;

        let mut validated = BTreeMap::new();
        for (key, &claim) in claimed {
            let Some(topic) = self.registry.get(key) else {
                debug!(topic = %key, "Dropping claim for unknown topic");
                continue;
            };

            if !claim || current.is_covered(key) {
                validated.insert(key.clone(), claim);
                continue;
            }

            let ratio = self.group_ratio(topic, transcript);
            if ratio >= self.thresholds.coverage_group_ratio || ledger_escape {
                validated.insert(key.clone(), true);
            } else {
                info!(
                    topic = %key,
                    group_ratio = ratio,
                    answered_ratio = ledger.answered_ratio(),
                    "Rejected coverage claim without transcript evidence"
                );
                validated.insert(key.clone(), current.is_covered(key));
            }
        }
        validated
    }

    /// Critical questions of `topic` that do not yet appear in the transcript.
    ///
    /// A question counts as asked when at least the critical word ratio of
    /// its significant words (longer than three characters) appear.
    pub fn missing_critical_questions(&self, topic: &Topic, transcript: &str) -> Vec<String> {
        topic
            .critical_questions
            .iter()
            .filter(|q| !self.critical_question_asked(q, transcript))
            .cloned()
            .collect()
    }

    fn critical_question_asked(&self, question: &str, transcript: &str) -> bool {
        let words: Vec<String> = question
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|w| w.chars().count() > SIGNIFICANT_WORD_LEN)
            .collect();
        if words.is_empty() {
            return contains_phrase(transcript, question);
        }
        let found = words.iter().filter(|w| transcript.contains(w.as_str())).count();
        found as f64 / words.len() as f64 >= self.thresholds.critical_word_ratio
    }
}
