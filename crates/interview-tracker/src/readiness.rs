//! Completion-readiness evaluation.

use interview_models::TopicRegistry;
use serde::{Deserialize, Serialize};

use crate::coverage::TopicCoverageMap;
use crate::ledger::QuestionLedger;
use crate::thresholds::Thresholds;

/// Missing topics named in a not-ready message.
const MESSAGE_TOPIC_LIMIT: usize = 3;

/// Which rule decided readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessReason {
    /// Every topic is covered.
    FullCoverage,
    /// Most topics covered and most questions answered.
    BlendedThreshold,
    /// Nearly every question answered.
    QuestionThreshold,
    /// Not ready.
    InsufficientCoverage,
}

/// Verdict on whether the interview may end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readiness {
    /// Whether the interview may end.
    pub ready: bool,
    /// Rule that matched.
    pub reason: ReadinessReason,
    /// Human-readable justification.
    pub message: String,
    /// Every missing topic label, in registry order.
    pub missing_topics: Vec<String>,
}

/// Evaluate readiness. The first matching rule wins.
pub fn evaluate(
    coverage: &TopicCoverageMap,
    ledger: &QuestionLedger,
    registry: &TopicRegistry,
    thresholds: &Thresholds,
) -> Readiness {
    let topic_ratio = coverage.ratio();
    let answered_ratio = ledger.answered_ratio();
    let missing_topics = coverage.missing_labels(registry);

    let (ready, reason, message) = if coverage.all_covered() {
        (
            true,
            ReadinessReason::FullCoverage,
            "All topic areas have been covered.".to_string(),
        )
    } else if topic_ratio >= thresholds.blended_topic_ratio
        && answered_ratio >= thresholds.blended_answer_ratio
    {
        (
            true,
            ReadinessReason::BlendedThreshold,
            format!(
                "Most topic areas are covered ({:.0}%) and {:.0}% of questions are answered.",
                topic_ratio * 100.0,
                answered_ratio * 100.0
            ),
        )
    } else if answered_ratio >= thresholds.question_only_ratio {
        (
            true,
            ReadinessReason::QuestionThreshold,
            format!("{:.0}% of questions are answered.", answered_ratio * 100.0),
        )
    } else {
        let named: Vec<&str> = missing_topics
            .iter()
            .take(MESSAGE_TOPIC_LIMIT)
            .map(String::as_str)
            .collect();
        (
            false,
            ReadinessReason::InsufficientCoverage,
            format!(
                "We still need information about: {}. Please continue answering the questions.",
                named.join(", ")
            ),
        )
    };

    Readiness {
        ready,
        reason,
        message,
        missing_topics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_models::{builtin_registry, AnswerQuality, QuestionUpdate, TopicKey};
    use std::collections::BTreeMap;

    fn ledger(answered: usize, total: usize) -> QuestionLedger {
        let mut ledger = QuestionLedger::new();
        for i in 0..total {
            let update = QuestionUpdate::new(format!("q{i}"));
            let update = if i < answered {
                update.answered(AnswerQuality::Complete, "yes")
            } else {
                update
            };
            ledger.record(&update);
        }
        ledger
    }

    fn covered(registry: &TopicRegistry, keys: &[&str]) -> TopicCoverageMap {
        let mut map = TopicCoverageMap::new(registry);
        let claims: BTreeMap<TopicKey, bool> =
            keys.iter().map(|k| (TopicKey::from(*k), true)).collect();
        map.apply(&claims);
        map
    }

    #[test]
    fn test_full_coverage() {
        let registry = builtin_registry();
        let keys: Vec<&str> = registry.keys().map(|k| k.as_str()).collect();
        let coverage = covered(&registry, &keys);
        let r = evaluate(&coverage, &ledger(20, 20), &registry, &Thresholds::default());
        assert!(r.ready);
        assert_eq!(r.reason, ReadinessReason::FullCoverage);
        assert!(r.missing_topics.is_empty());
    }

    #[test]
    fn test_insufficient_lists_missing_in_registry_order() {
        let registry = builtin_registry();
        let coverage = covered(
            &registry,
            &["basic_info", "staffing_details", "contact_process", "list_management", "insufficient_staffing"],
        );
        // 11 of 20 answered = 0.55
        let r = evaluate(&coverage, &ledger(11, 20), &registry, &Thresholds::default());
        assert!(!r.ready);
        assert_eq!(r.reason, ReadinessReason::InsufficientCoverage);
        assert_eq!(
            r.missing_topics,
            vec!["Calling Logistics", "List Changes", "Tiebreakers", "Additional Rules"]
        );
        assert!(r.message.contains("Calling Logistics, List Changes, Tiebreakers."));
        assert!(!r.message.contains("Additional Rules"));
    }

    #[test]
    fn test_blended_threshold() {
        let registry = builtin_registry();
        let keys: Vec<&str> = registry.keys().take(8).map(|k| k.as_str()).collect();
        let coverage = covered(&registry, &keys);
        let r = evaluate(&coverage, &ledger(6, 10), &registry, &Thresholds::default());
        assert!(r.ready);
        assert_eq!(r.reason, ReadinessReason::BlendedThreshold);
        assert_eq!(r.missing_topics, vec!["Additional Rules"]);
    }

    #[test]
    fn test_question_threshold() {
        let registry = builtin_registry();
        let coverage = TopicCoverageMap::new(&registry);
        let r = evaluate(&coverage, &ledger(8, 10), &registry, &Thresholds::default());
        assert!(r.ready);
        assert_eq!(r.reason, ReadinessReason::QuestionThreshold);
    }

    #[test]
    fn test_monotonic_in_answered_ratio() {
        let registry = builtin_registry();
        let coverage = covered(&registry, &["basic_info", "tiebreakers"]);
        let thresholds = Thresholds::default();
        let mut was_ready = false;
        for answered in 0..=20 {
            let r = evaluate(&coverage, &ledger(answered, 20), &registry, &thresholds);
            assert!(!was_ready || r.ready, "readiness regressed at {answered}/20");
            was_ready = r.ready;
        }
        assert!(was_ready);
    }
}
