//! Tests for turn processing.

use std::collections::BTreeMap;

use interview_models::{builtin_registry, AnswerQuality, QuestionUpdate, UserInfo};

use super::*;

const EXAMPLE_REPLY: &str = "*Example: We call the on-call supervisor first.*";

fn setup() -> (ConversationTracker, SessionState, LoopDetector) {
    let registry = Arc::new(builtin_registry());
    let state = SessionState::new(UserInfo::new("Victor", "ABC"), &registry);
    let tracker = ConversationTracker::new(registry, Thresholds::default());
    (tracker, state, LoopDetector::new())
}

fn cover(state: &mut SessionState, keys: &[&str]) {
    let claims: BTreeMap<TopicKey, bool> =
        keys.iter().map(|k| (TopicKey::from(*k), true)).collect();
    state.coverage.apply(&claims);
}

#[test]
fn test_turn_records_question_and_accepts_evidenced_claim() {
    let (tracker, mut state, mut detector) = setup();
    let raw = r#"Thank you, Victor. What type of callout situation do you handle most?

QUESTION_TRACKING: {"question_id": "basic_info_callout_type_001", "question_asked": "What type of callout situation do you handle most?", "topic": "basic_info", "answer_received": false}
COMPLETION_STATUS: {"overall_progress": 10, "topic_coverage": {"basic_info": true}}"#;

    let report = tracker.process_turn(
        &mut state,
        &mut detector,
        "My name is Victor and my company is ABC",
        raw,
    );

    assert_eq!(
        report.display_text,
        "Thank you, Victor. What type of callout situation do you handle most?"
    );
    assert_eq!(report.record_outcomes, vec![RecordOutcome::Inserted]);
    assert_eq!(report.newly_covered, vec![TopicKey::from("basic_info")]);
    assert!(report.rejected_claims.is_empty());
    assert_eq!(state.transcript.len(), 2);
    assert_eq!(
        state.ledger.current_question().unwrap().as_str(),
        "basic_info_callout_type_001"
    );
    assert_eq!(state.model_progress, Some(10.0));
    assert_eq!(report.progress.covered_topics, vec!["Basic Information"]);
    assert!(!report.readiness.ready);
}

#[test]
fn test_claim_validated_against_ledger_before_update() {
    let (tracker, mut state, mut detector) = setup();
    let raw = r#"Thanks. How is the roster sorted?
QUESTION_TRACKING: {"question_id": "q1", "answer_received": true, "answer_quality": "complete", "user_response": "We have a roster"}
TOPIC_UPDATE: {"contact_process": true}"#;

    let report = tracker.process_turn(&mut state, &mut detector, "We have a roster.", raw);

    assert_eq!(report.rejected_claims, vec![TopicKey::from("contact_process")]);
    assert!(report.newly_covered.is_empty());
    assert!(!state.coverage.is_covered(&TopicKey::from("contact_process")));
    // The answer itself is still recorded.
    assert_eq!(state.ledger.answered_count(), 1);
}

#[test]
fn test_regression_claim_is_ignored() {
    let (tracker, mut state, mut detector) = setup();
    cover(&mut state, &["tiebreakers"]);

    let report = tracker.process_turn(
        &mut state,
        &mut detector,
        "Actually never mind",
        "Okay.\nTOPIC_UPDATE: {\"tiebreakers\": false}",
    );

    assert!(report.newly_covered.is_empty());
    assert!(report.rejected_claims.is_empty());
    assert!(state.coverage.is_covered(&TopicKey::from("tiebreakers")));
}

#[test]
fn test_loop_forces_progression_on_third_turn() {
    let (tracker, mut state, mut detector) = setup();
    state.push_assistant(EXAMPLE_REPLY);

    let first = tracker.process_turn(&mut state, &mut detector, "show example", EXAMPLE_REPLY);
    let second = tracker.process_turn(&mut state, &mut detector, "show example", EXAMPLE_REPLY);
    assert_eq!(first.loop_state, LoopState::Active);
    assert_eq!(second.loop_state, LoopState::Active);
    assert!(second.directives.is_empty());
    assert!(second.notices.is_empty());

    let third = tracker.process_turn(&mut state, &mut detector, "show example", EXAMPLE_REPLY);
    assert_eq!(third.loop_state, LoopState::ForcedAdvance);
    assert_eq!(
        third.directives,
        vec![Directive::TopicFocus {
            topic: "Contact Process".into()
        }]
    );
    assert_eq!(third.notices.len(), 1);
    assert_eq!(third.progress.repetition_windows, 1);
}

#[test]
fn test_loop_advances_to_next_unanswered_question() {
    let (tracker, mut state, mut detector) = setup();
    state.ledger.record(&QuestionUpdate::new("q1").asked("Who do you call first?"));
    state.ledger.record(&QuestionUpdate::new("q2").asked("How many devices do employees have?"));
    state.ledger.set_current(&"q1".into()).unwrap();
    state.push_assistant(EXAMPLE_REPLY);

    for _ in 0..2 {
        tracker.process_turn(&mut state, &mut detector, "example", EXAMPLE_REPLY);
    }
    let report = tracker.process_turn(&mut state, &mut detector, "example", EXAMPLE_REPLY);

    assert_eq!(
        report.directives[0],
        Directive::ForcedAdvance {
            question_id: "q2".into(),
            question_text: "How many devices do employees have?".into(),
        }
    );
    assert!(report.notices[0].ends_with("How many devices do employees have?"));
    assert_eq!(state.ledger.current_question().unwrap().as_str(), "q2");
}

#[test]
fn test_malformed_block_never_mutates_ledger() {
    let (tracker, mut state, mut detector) = setup();
    let raw = "Who do you call first?\nQUESTION_TRACKING: {\"question_id\": \"q1\", \"topic\": {";

    let report = tracker.process_turn(&mut state, &mut detector, "Hello", raw);

    assert_eq!(report.display_text, "Who do you call first?");
    assert!(report.record_outcomes.is_empty());
    assert_eq!(report.discarded_blocks, vec!["QUESTION_TRACKING"]);
    assert!(state.ledger.is_empty());
    assert_eq!(state.transcript.len(), 2);
}

#[test]
fn test_out_of_range_model_progress_ignored() {
    let (tracker, mut state, mut detector) = setup();
    tracker.process_turn(
        &mut state,
        &mut detector,
        "hi",
        "Hello.\nCOMPLETION_STATUS: {\"overall_progress\": 150, \"missing_critical_info\": [\"callout_type\"]}",
    );
    assert_eq!(state.model_progress, None);
    assert_eq!(state.missing_critical_info, vec!["callout_type"]);

    tracker.process_turn(
        &mut state,
        &mut detector,
        "ok",
        "Next.\nCOMPLETION_STATUS: {\"overall_progress\": 45}",
    );
    assert_eq!(state.model_progress, Some(45.0));
}

#[test]
fn test_missing_topic_nudge_once_most_questions_answered() {
    let (tracker, mut state, mut detector) = setup();
    state.ledger.record(&QuestionUpdate::new("q1").answered(AnswerQuality::Complete, "a"));
    state.ledger.record(&QuestionUpdate::new("q2").answered(AnswerQuality::Partial, "b"));
    state.ledger.record(&QuestionUpdate::new("q3"));

    let report = tracker.process_turn(&mut state, &mut detector, "ok", "Noted.");

    match &report.directives[0] {
        Directive::MissingTopics { labels } => {
            assert_eq!(labels.len(), 9);
            assert_eq!(labels[0], "Basic Information");
        }
        other => panic!("expected missing topics nudge, got {other:?}"),
    }
}

#[test]
fn test_critical_question_nudge_limited_per_topic() {
    let (tracker, mut state, mut detector) = setup();
    cover(&mut state, &["contact_process"]);

    let report = tracker.process_turn(&mut state, &mut detector, "ok", "Noted.");

    assert_eq!(
        report.directives,
        vec![Directive::CriticalQuestions {
            topic: "Contact Process".into(),
            questions: vec![
                "who do you call first".into(),
                "why do you call this person first".into(),
            ],
        }]
    );
    assert_eq!(tracker.nudges(&state), report.directives);
}

#[test]
fn test_reset_coverage() {
    let (tracker, mut state, _) = setup();
    cover(&mut state, &["tiebreakers", "list_changes"]);

    tracker
        .reset_coverage(&mut state, Some(&TopicKey::from("tiebreakers")))
        .unwrap();
    assert_eq!(state.coverage.covered_count(), 1);
    assert!(tracker
        .reset_coverage(&mut state, Some(&TopicKey::from("weather")))
        .is_err());

    tracker.reset_coverage(&mut state, None).unwrap();
    assert_eq!(state.coverage.covered_count(), 0);
}

#[test]
fn test_answer_and_next_question_in_one_reply_both_recorded() {
    let (tracker, mut state, mut detector) = setup();
    state
        .ledger
        .record(&QuestionUpdate::new("q1").asked("Who do you call first?"));
    let raw = r#"Got it, the foreman goes first. How many devices does each employee carry?
QUESTION_TRACKING: {"question_id": "q1", "answer_received": true, "answer_quality": "complete", "user_response": "The foreman"}
QUESTION_TRACKING: {"question_id": "q2", "question_asked": "How many devices does each employee carry?", "topic": "contact_process"}"#;

    let report = tracker.process_turn(&mut state, &mut detector, "The foreman", raw);

    assert_eq!(
        report.record_outcomes,
        vec![RecordOutcome::Updated, RecordOutcome::Inserted]
    );
    assert!(report.discarded_blocks.is_empty());
    assert_eq!(state.ledger.len(), 2);
    assert_eq!(state.ledger.answered_count(), 1);
    assert_eq!(state.ledger.current_question().unwrap().as_str(), "q2");
}
