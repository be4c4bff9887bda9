//! Tests for the interview engine.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use interview_models::builtin_registry;
use tempfile::TempDir;

use super::*;
use crate::error::ModelError;

/// Model that replays scripted replies and records every request.
struct ScriptedModel {
    replies: Mutex<VecDeque<std::result::Result<String, ModelError>>>,
    requests: Mutex<Vec<ModelRequest>>,
    delay: Option<Duration>,
}

impl ScriptedModel {
    fn new(replies: Vec<std::result::Result<String, ModelError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    fn replying(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::replying(&["Too late."])
        }
    }

    fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ModelRequest) -> std::result::Result<String, ModelError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Please go on.".to_string()))
    }
}

fn engine_with(model: Arc<ScriptedModel>, dir: &TempDir) -> InterviewEngine {
    let settings = EngineSettings {
        turn_timeout: Duration::from_secs(5),
        ..EngineSettings::default()
    };
    InterviewEngine::new(
        Arc::new(builtin_registry()),
        model,
        SnapshotStore::new(dir.path().join("sessions")),
        settings,
    )
}

fn cover_all(engine: &mut InterviewEngine, id: &SessionId) {
    let keys: Vec<TopicKey> = engine.registry().keys().cloned().collect();
    let claims: BTreeMap<TopicKey, bool> = keys.into_iter().map(|k| (k, true)).collect();
    let slot = engine.sessions.get_mut(id).unwrap();
    slot.state.coverage.apply(&claims);
}

#[tokio::test]
async fn test_turn_applies_model_reply() {
    let dir = TempDir::new().unwrap();
    let model = Arc::new(ScriptedModel::replying(&[r#"Thanks, Victor. What type of callout do you handle most?
QUESTION_TRACKING: {"question_id": "basic_info_001", "question_asked": "What type of callout do you handle most?", "topic": "basic_info"}
COMPLETION_STATUS: {"overall_progress": 10, "topic_coverage": {"basic_info": true}}"#]));
    let mut engine = engine_with(model.clone(), &dir);
    let id = engine.start_session(UserInfo::new("Victor", "ABC"));

    let outcome = engine
        .submit_user_turn(&id, "My name is Victor and my company is ABC")
        .await
        .unwrap();

    assert!(outcome.model_called);
    assert_eq!(outcome.kind, MessageKind::Regular);
    assert_eq!(
        outcome.display_text,
        "Thanks, Victor. What type of callout do you handle most?"
    );
    assert_eq!(outcome.newly_covered, vec![TopicKey::from("basic_info")]);
    assert_eq!(outcome.progress.covered_topics, vec!["Basic Information"]);

    let state = engine.session(&id).unwrap();
    assert_eq!(state.transcript.len(), 2);
    assert_eq!(state.ledger.len(), 1);

    let requests = model.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].instructions.contains("Victor from ABC"));
    assert!(requests[0].transcript.is_empty());
    assert!(requests[0].directives.is_empty());
}

#[tokio::test]
async fn test_model_failure_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let model = Arc::new(ScriptedModel::new(vec![
        Err(ModelError::Api {
            status: 502,
            body: "bad gateway".into(),
        }),
        Ok("Who do you call first?".into()),
    ]));
    let mut engine = engine_with(model, &dir);
    let id = engine.start_session(UserInfo::new("Victor", "ABC"));

    let err = engine.submit_user_turn(&id, "Hello").await.unwrap_err();
    assert!(matches!(err, EngineError::ModelUnavailable(_)));
    assert!(err.is_retryable());
    assert!(engine.session(&id).unwrap().transcript.is_empty());

    let outcome = engine.submit_user_turn(&id, "Hello").await.unwrap();
    assert_eq!(outcome.display_text, "Who do you call first?");
    assert_eq!(engine.session(&id).unwrap().transcript.len(), 2);
}

#[tokio::test]
async fn test_timeout_keeps_pending_directives() {
    let dir = TempDir::new().unwrap();
    let model = Arc::new(ScriptedModel::slow(Duration::from_secs(10)));
    let mut engine = InterviewEngine::new(
        Arc::new(builtin_registry()),
        model,
        SnapshotStore::new(dir.path()),
        EngineSettings {
            turn_timeout: Duration::from_millis(50),
            ..EngineSettings::default()
        },
    );
    let id = engine.start_session(UserInfo::new("Victor", "ABC"));
    let refused = engine.finish(&id).unwrap();
    assert!(!refused.finished);
    let before = engine.pending_directives(&id).unwrap().to_vec();
    assert_eq!(before.len(), 1);

    let err = engine.submit_user_turn(&id, "Hello").await.unwrap_err();

    assert!(matches!(err, EngineError::ModelTimeout { .. }));
    assert!(engine.session(&id).unwrap().transcript.is_empty());
    assert_eq!(engine.pending_directives(&id).unwrap(), before.as_slice());
}

#[tokio::test]
async fn test_example_request_attaches_current_question() {
    let dir = TempDir::new().unwrap();
    let model = Arc::new(ScriptedModel::replying(&[
        "Who do you call first?\nQUESTION_TRACKING: {\"question_id\": \"cp_001\", \"question_asked\": \"Who do you call first?\", \"topic\": \"contact_process\"}",
        "Example: We call the on-call supervisor first. Who do you call first?",
    ]));
    let mut engine = engine_with(model.clone(), &dir);
    let id = engine.start_session(UserInfo::new("Victor", "ABC"));

    engine.submit_user_turn(&id, "Ready").await.unwrap();
    let outcome = engine.submit_user_turn(&id, "Show example").await.unwrap();

    assert_eq!(outcome.kind, MessageKind::ExampleRequest);
    let requests = model.requests();
    assert_eq!(
        requests[1].directives,
        vec![Directive::ProvideExample {
            question: Some("Who do you call first?".into())
        }]
    );
    // Directives never reach the transcript.
    let state = engine.session(&id).unwrap();
    assert!(state
        .transcript
        .iter()
        .all(|m| !m.content.contains("The user asked for an example")));
}

#[tokio::test]
async fn test_summary_before_ready_goes_to_model_with_nudge() {
    let dir = TempDir::new().unwrap();
    let model = Arc::new(ScriptedModel::replying(&["We still need a few details. Who do you call first?"]));
    let mut engine = engine_with(model.clone(), &dir);
    let id = engine.start_session(UserInfo::new("Victor", "ABC"));

    let outcome = engine.submit_user_turn(&id, "summary").await.unwrap();

    assert_eq!(outcome.kind, MessageKind::SummaryRequest);
    assert!(outcome.model_called);
    assert!(!outcome.readiness.ready);
    match &model.requests()[0].directives[0] {
        Directive::MissingTopics { labels } => assert_eq!(labels.len(), 9),
        other => panic!("expected missing topics, got {other:?}"),
    }
    assert!(engine.session(&id).unwrap().summary_requested);
}

#[tokio::test]
async fn test_summary_when_ready_is_answered_locally() {
    let dir = TempDir::new().unwrap();
    let model = Arc::new(ScriptedModel::replying(&[
        "Noted.\nQUESTION_TRACKING: {\"question_id\": \"cp_001\", \"question_asked\": \"Who do you call first?\", \"answer_received\": true, \"answer_quality\": \"complete\", \"user_response\": \"The foreman\"}",
    ]));
    let mut engine = engine_with(model.clone(), &dir);
    let id = engine.start_session(UserInfo::new("Victor", "ABC"));
    engine.submit_user_turn(&id, "The foreman").await.unwrap();
    cover_all(&mut engine, &id);

    let outcome = engine.submit_user_turn(&id, "download summary").await.unwrap();

    assert!(!outcome.model_called);
    assert_eq!(model.requests().len(), 1);
    assert!(outcome.display_text.contains("1. Who do you call first?"));
    assert!(outcome.display_text.contains("The foreman"));
    let state = engine.session(&id).unwrap();
    assert!(state.summary_requested);
    assert_eq!(state.transcript.len(), 4);
}

#[tokio::test]
async fn test_queued_directives_reach_next_request() {
    let dir = TempDir::new().unwrap();
    let model = Arc::new(ScriptedModel::replying(&[
        "Great, thanks for explaining who you call.\nTOPIC_UPDATE: {\"contact_process\": true}",
        "Why do you call this person first?",
    ]));
    let mut engine = engine_with(model.clone(), &dir);
    let id = engine.start_session(UserInfo::new("Victor", "ABC"));

    let first = engine
        .submit_user_turn(&id, "We call the first person on the phone list, then their cell device")
        .await
        .unwrap();
    assert_eq!(first.newly_covered, vec![TopicKey::from("contact_process")]);
    assert_eq!(first.queued_directives, 1);

    engine.submit_user_turn(&id, "ok").await.unwrap();
    let requests = model.requests();
    assert!(matches!(
        &requests[1].directives[0],
        Directive::CriticalQuestions { topic, .. } if topic == "Contact Process"
    ));
}

#[tokio::test]
async fn test_finish_requires_readiness() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_with(Arc::new(ScriptedModel::replying(&[])), &dir);
    let id = engine.start_session(UserInfo::new("Victor", "ABC"));

    let refused = engine.finish(&id).unwrap();
    assert!(!refused.finished);
    assert!(refused.readiness.message.starts_with("We still need information about"));
    assert!(!engine.session(&id).unwrap().explicitly_finished);
    // Refusing twice does not queue the nudge twice.
    engine.finish(&id).unwrap();
    assert_eq!(engine.pending_directives(&id).unwrap().len(), 1);

    cover_all(&mut engine, &id);
    let done = engine.finish(&id).unwrap();
    assert!(done.finished);
    assert!(engine.session(&id).unwrap().is_finished());
}

#[tokio::test]
async fn test_save_then_resume_queues_context() {
    let dir = TempDir::new().unwrap();
    let model = Arc::new(ScriptedModel::replying(&[
        "Who do you call first?\nQUESTION_TRACKING: {\"question_id\": \"cp_001\", \"question_asked\": \"Who do you call first?\", \"topic\": \"contact_process\"}",
    ]));
    let mut engine = engine_with(model, &dir);
    let id = engine.start_session(UserInfo::new("Victor", "ABC"));
    engine.submit_user_turn(&id, "Hi").await.unwrap();
    engine.save(&id).unwrap();

    let resumed_model = Arc::new(ScriptedModel::replying(&["Welcome back, Victor. Who do you call first?"]));
    let mut resumed = engine_with(resumed_model.clone(), &dir);
    let outcome = resumed.resume(&id).unwrap();

    assert_eq!(outcome.session_id, id);
    assert_eq!(outcome.source, RestoreSource::Primary);
    assert_eq!(outcome.directive.current_question.as_ref().unwrap().as_str(), "cp_001");
    assert!(matches!(
        resumed.pending_directives(&id).unwrap()[0],
        Directive::Resume(_)
    ));

    resumed.submit_user_turn(&id, "I'm back").await.unwrap();
    let request = &resumed_model.requests()[0];
    assert!(matches!(request.directives[0], Directive::Resume(_)));
    assert_eq!(request.transcript.len(), 2);
    assert!(!resumed
        .pending_directives(&id)
        .unwrap()
        .iter()
        .any(|d| matches!(d, Directive::Resume(_))));
}

#[tokio::test]
async fn test_unknown_session() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_with(Arc::new(ScriptedModel::replying(&[])), &dir);
    let id = SessionId::from("sess-missing");

    assert!(matches!(
        engine.submit_user_turn(&id, "hi").await,
        Err(EngineError::SessionNotFound(_))
    ));
    assert!(matches!(engine.resume(&id), Err(EngineError::Persistence(_))));
    assert!(matches!(engine.close(&id), Err(EngineError::SessionNotFound(_))));
}
