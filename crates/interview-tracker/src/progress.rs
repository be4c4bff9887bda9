//! Derived progress snapshot.

use interview_models::{QuestionId, TopicRegistry};
use serde::Serialize;

use crate::coverage::TopicCoverageMap;
use crate::ledger::QuestionLedger;
use crate::thresholds::Thresholds;

/// Read-only view of interview progress, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Blend of topic ratio and answered ratio (0-100).
    pub percentage: f64,
    /// Covered topics / all topics.
    pub topic_ratio: f64,
    /// Answered question count.
    pub answered: usize,
    /// Known question count.
    pub total: usize,
    /// Mean answer-quality weight as a percentage (0-100).
    pub quality_weighted_percentage: f64,
    /// Covered topic labels in registry order.
    pub covered_topics: Vec<String>,
    /// Missing topic labels in registry order.
    pub missing_topics: Vec<String>,
    /// Turns on which a conversation loop was detected.
    pub repetition_windows: usize,
    /// Current question pointer.
    pub current_question: Option<QuestionId>,
    /// Model's own last progress estimate, if valid.
    pub model_reported_progress: Option<f64>,
}

impl ProgressSnapshot {
    /// Compute a snapshot.
    pub fn compute(
        coverage: &TopicCoverageMap,
        ledger: &QuestionLedger,
        registry: &TopicRegistry,
        thresholds: &Thresholds,
        repetition_windows: usize,
        model_reported_progress: Option<f64>,
    ) -> Self {
        let topic_ratio = coverage.ratio();
        let weight = thresholds.topic_progress_weight.clamp(0.0, 1.0);
        let blended = topic_ratio * weight + ledger.answered_ratio() * (1.0 - weight);

        Self {
            percentage: round1(blended * 100.0),
            topic_ratio,
            answered: ledger.answered_count(),
            total: ledger.len(),
            quality_weighted_percentage: round1(ledger.quality_score() * 100.0),
            covered_topics: coverage.covered_labels(registry),
            missing_topics: coverage.missing_labels(registry),
            repetition_windows,
            current_question: ledger.current_question().cloned(),
            model_reported_progress,
        }
    }

    /// One-line summary for status displays.
    pub fn summary_line(&self) -> String {
        format!(
            "{:.0}% complete, {}/{} questions answered, {}/{} topics covered",
            self.percentage,
            self.answered,
            self.total,
            self.covered_topics.len(),
            self.covered_topics.len() + self.missing_topics.len()
        )
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
