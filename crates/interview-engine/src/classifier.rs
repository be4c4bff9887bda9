//! Classification of special user messages.
//!
//! Short control phrases ("show example", "help", "summary") are matched
//! exactly after trimming and lowercasing, so ordinary answers that merely
//! contain those words are left alone.

use std::collections::HashSet;
use std::sync::LazyLock;

use interview_tracker::is_example_request;

static HELP_REQUESTS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "?",
        "help",
        "i need help",
        "what do you mean",
        "what do you mean?",
        "i don't understand",
    ]
    .into_iter()
    .collect()
});

static SUMMARY_REQUESTS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "summary",
        "download",
        "download summary",
        "get summary",
        "show summary",
        "provide summary",
        "i'm done",
        "we're done",
    ]
    .into_iter()
    .collect()
});

/// Affirmations that count as a summary request right after a summary offer.
const AFFIRMATIONS: &[&str] = &["yes", "yes please", "sure", "ok", "okay"];

const FRUSTRATION_PHRASES: &[&str] = &[
    "already answered",
    "already responded",
    "i already told you",
    "not helpful",
    "going in circles",
];

/// What kind of message the user sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Asked for an example answer.
    ExampleRequest,
    /// Asked for clarification.
    HelpRequest,
    /// Asked for the summary or to end the interview.
    SummaryRequest,
    /// Complained about repetition.
    Frustration,
    /// An ordinary answer.
    Regular,
}

/// Classify `text`; `last_assistant` is the previous interviewer message.
pub fn classify(text: &str, last_assistant: &str) -> MessageKind {
    let lowered = text.trim().to_lowercase();
    let key = lowered.trim_end_matches(['.', '!']);

    if is_example_request(&lowered) {
        MessageKind::ExampleRequest
    } else if HELP_REQUESTS.contains(key) {
        MessageKind::HelpRequest
    } else if SUMMARY_REQUESTS.contains(key)
        || (AFFIRMATIONS.contains(&key) && last_assistant.to_lowercase().contains("summary"))
    {
        MessageKind::SummaryRequest
    } else if FRUSTRATION_PHRASES.iter().any(|p| lowered.contains(p)) {
        MessageKind::Frustration
    } else {
        MessageKind::Regular
    }
}
