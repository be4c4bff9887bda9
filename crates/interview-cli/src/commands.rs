//! Command handlers for CLI subcommands.

use std::sync::Arc;

use interview_core::{config_dir, load_registry, sessions_dir, InterviewConfig};
use interview_models::{QaPair, SessionId, TopicRegistry};
use interview_persistence::{SessionListing, SnapshotStore};
use interview_tracker::{ConversationTracker, LoopDetector, SessionState};
use tracing::info;

use crate::cli::{Commands, OutputFormat};
use crate::output::{list_table, render_list};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Settings, catalog and store shared by every command.
pub struct AppContext {
    pub config: InterviewConfig,
    pub registry: Arc<TopicRegistry>,
    pub store: SnapshotStore,
}

impl AppContext {
    /// Load settings and the topic catalog from the state directory.
    pub fn load() -> Result<Self> {
        let config = InterviewConfig::load_default()?;
        let registry = Arc::new(load_registry(&config, &config_dir())?);
        let store = SnapshotStore::new(sessions_dir()).with_max_backups(config.max_backups);
        info!(
            sessions = %store.sessions_dir().display(),
            topics = registry.len(),
            "Loaded configuration"
        );
        Ok(Self {
            config,
            registry,
            store,
        })
    }

    fn restore(&self, session: &str) -> Result<SessionState> {
        Ok(self
            .store
            .restore(&SessionId::from(session), &self.registry)?
            .state)
    }
}

/// Execute a non-interactive CLI command.
pub fn execute(command: Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::List { format } => {
            let listings = ctx.store.list_sessions(&ctx.registry)?;
            println!("{}", render_sessions(&listings, format)?);
        }
        Commands::Status { session } => {
            let state = ctx.restore(&session)?;
            let tracker = ConversationTracker::new(ctx.registry.clone(), ctx.config.thresholds);
            println!("{}", render_status(&state, &tracker));
        }
        Commands::Export { session, format } => {
            let state = ctx.restore(&session)?;
            println!("{}", render_pairs(&state.ledger.qa_pairs(), format)?);
        }
        Commands::Topics => println!("{}", render_topics(&ctx.registry)),
        Commands::Start { .. } | Commands::Resume { .. } => {
            // Interactive commands are handled in main
        }
    }
    Ok(())
}

/// Saved sessions as a table or JSON.
pub fn render_sessions(listings: &[SessionListing], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = listings
                .iter()
                .map(|l| {
                    serde_json::json!({
                        "id": l.id.as_str(),
                        "name": l.user.name,
                        "company": l.user.company,
                        "saved_at": l.saved_at.map(|t| t.to_rfc3339()),
                        "finished": l.finished,
                        "questions": l.questions,
                        "answered": l.answered,
                    })
                })
                .collect();
            Ok(serde_json::to_string_pretty(&rows)?)
        }
        OutputFormat::Table => {
            let mut table = list_table(&["id", "name", "company", "saved", "answered", "finished"]);
            for l in listings {
                table.add_row(vec![
                    l.id.to_string(),
                    l.user.display_name().to_string(),
                    l.user.display_company().to_string(),
                    l.saved_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    format!("{}/{}", l.answered, l.questions),
                    if l.finished { "yes" } else { "no" }.to_string(),
                ]);
            }
            Ok(render_list("session", table, listings.len()))
        }
    }
}

/// Question/answer pairs as a table or JSON.
pub fn render_pairs(pairs: &[QaPair], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(pairs)?),
        OutputFormat::Table => {
            let mut table = list_table(&["#", "question", "answer"]);
            for (i, pair) in pairs.iter().enumerate() {
                table.add_row(vec![(i + 1).to_string(), pair.question.clone(), pair.answer.clone()]);
            }
            Ok(render_list("answer", table, pairs.len()))
        }
    }
}

/// The topic catalog as a table.
pub fn render_topics(registry: &TopicRegistry) -> String {
    let mut table = list_table(&["key", "label", "groups", "critical"]);
    for topic in registry.iter() {
        table.add_row(vec![
            topic.key.to_string(),
            topic.label.clone(),
            topic.requirement_groups.len().to_string(),
            topic.critical_questions.len().to_string(),
        ]);
    }
    render_list("topic", table, registry.len())
}

/// Progress, coverage and readiness for one session.
pub fn render_status(state: &SessionState, tracker: &ConversationTracker) -> String {
    let progress = tracker.progress(state, &LoopDetector::new());
    let readiness = tracker.readiness(state);
    let mut lines = vec![
        format!(
            "Session {} - {} ({})",
            state.id,
            state.user.display_name(),
            state.user.display_company()
        ),
        format!("Progress: {}", progress.summary_line()),
        format!("Covered: {}", join_or_dash(&progress.covered_topics)),
        format!("Missing: {}", join_or_dash(&progress.missing_topics)),
    ];
    if let Some(current) = &progress.current_question {
        lines.push(format!("Current question: {}", current));
    }
    lines.push(if readiness.ready {
        format!("Ready to finish: {}", readiness.message)
    } else {
        readiness.message
    });
    if state.is_finished() {
        lines.push("Interview finished.".to_string());
    }
    lines.join("\n")
}

fn join_or_dash(labels: &[String]) -> String {
    if labels.is_empty() {
        "-".to_string()
    } else {
        labels.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_models::{builtin_registry, AnswerQuality, QuestionUpdate, UserInfo};
    use interview_tracker::Thresholds;
    use tempfile::tempdir;

    fn sample_state(registry: &TopicRegistry) -> SessionState {
        let mut state = SessionState::new(UserInfo::new("Victor", "ABC"), registry);
        state.ledger.record(
            &QuestionUpdate::new("cp_001")
                .asked("Who do you call first?")
                .answered(AnswerQuality::Complete, "The on-call foreman"),
        );
        state
    }

    #[test]
    fn test_render_pairs_json_and_table() {
        let registry = builtin_registry();
        let pairs = sample_state(&registry).ledger.qa_pairs();

        let json = render_pairs(&pairs, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["question"], "Who do you call first?");
        assert_eq!(value[0]["answer"], "The on-call foreman");

        let table = render_pairs(&pairs, OutputFormat::Table).unwrap();
        assert!(table.starts_with("1 answer:"));
        assert!(table.contains("The on-call foreman"));
    }

    #[test]
    fn test_render_sessions_from_store() {
        let dir = tempdir().unwrap();
        let registry = builtin_registry();
        let store = SnapshotStore::new(dir.path());
        let mut state = sample_state(&registry);
        store.save(&mut state).unwrap();

        let listings = store.list_sessions(&registry).unwrap();
        let out = render_sessions(&listings, OutputFormat::Table).unwrap();
        assert!(out.starts_with("1 session:"));
        assert!(out.contains(state.id.as_str()));
        assert!(out.contains("1/1"));

        let json = render_sessions(&listings, OutputFormat::Json).unwrap();
        assert!(json.contains("\"finished\": false"));
    }

    #[test]
    fn test_render_status_reports_missing_topics() {
        let registry = Arc::new(builtin_registry());
        let tracker = ConversationTracker::new(registry.clone(), Thresholds::default());
        let state = SessionState::new(UserInfo::new("Victor", "ABC"), &registry);

        let out = render_status(&state, &tracker);
        assert!(out.contains("Victor (ABC)"));
        assert!(out.contains("Covered: -"));
        assert!(out.contains("We still need information about: Basic Information"));
    }

    #[test]
    fn test_render_topics() {
        let out = render_topics(&builtin_registry());
        assert!(out.starts_with("9 topics:"));
        assert!(out.contains("contact_process"));
    }
}
