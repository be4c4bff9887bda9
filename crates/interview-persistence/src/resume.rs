//! Resume directive synthesis.

use interview_models::{ResumeDirective, TopicRegistry};
use interview_tracker::SessionState;

/// Build the context block that re-seeds the model after a restore.
pub fn build_resume_directive(state: &SessionState, registry: &TopicRegistry) -> ResumeDirective {
    let current = state.ledger.current_record();
    ResumeDirective {
        user: state.user.clone(),
        current_question: state.ledger.current_question().cloned(),
        current_question_text: current
            .map(|r| r.text.clone())
            .filter(|t| !t.is_empty()),
        last_saved: state.saved_at,
        covered_topics: state.coverage.covered_labels(registry),
        missing_topics: state.coverage.missing_labels(registry),
    }
}
