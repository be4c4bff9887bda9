//! Tuning thresholds for coverage and readiness decisions.
//!
//! The values are heuristics carried over from production tuning. They are
//! kept as named constants and grouped in [`Thresholds`] so configuration
//! can override any of them.

use serde::{Deserialize, Serialize};

/// Fraction of a topic's requirement groups that must be evidenced in the transcript.
pub const COVERAGE_GROUP_RATIO: f64 = 0.6;

/// Answered-question ratio above which coverage claims are accepted without keyword evidence.
pub const LEDGER_ESCAPE_RATIO: f64 = 0.5;

/// Topic ratio required by the blended readiness rule.
pub const BLENDED_TOPIC_RATIO: f64 = 0.8;

/// Answered ratio required by the blended readiness rule.
pub const BLENDED_ANSWER_RATIO: f64 = 0.6;

/// Answered ratio that alone makes the interview ready.
pub const QUESTION_ONLY_RATIO: f64 = 0.8;

/// Topic ratio at which missing topics start being nudged.
pub const NUDGE_TOPIC_RATIO: f64 = 0.7;

/// Answered ratio at which missing topics start being nudged.
pub const NUDGE_ANSWER_RATIO: f64 = 0.6;

/// Share of a critical question's significant words that must appear for it to count as asked.
pub const CRITICAL_WORD_RATIO: f64 = 0.4;

/// Weight of the topic ratio in the progress percentage (the rest is answered ratio).
pub const TOPIC_PROGRESS_WEIGHT: f64 = 0.7;

/// Overridable set of tracker thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub coverage_group_ratio: f64,
    pub ledger_escape_ratio: f64,
    pub blended_topic_ratio: f64,
    pub blended_answer_ratio: f64,
    pub question_only_ratio: f64,
    pub nudge_topic_ratio: f64,
    pub nudge_answer_ratio: f64,
    pub critical_word_ratio: f64,
    pub topic_progress_weight: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            coverage_group_ratio: COVERAGE_GROUP_RATIO,
            ledger_escape_ratio: LEDGER_ESCAPE_RATIO,
            blended_topic_ratio: BLENDED_TOPIC_RATIO,
            blended_answer_ratio: BLENDED_ANSWER_RATIO,
            question_only_ratio: QUESTION_ONLY_RATIO,
            nudge_topic_ratio: NUDGE_TOPIC_RATIO,
            nudge_answer_ratio: NUDGE_ANSWER_RATIO,
            critical_word_ratio: CRITICAL_WORD_RATIO,
            topic_progress_weight: TOPIC_PROGRESS_WEIGHT,
        }
    }
}
