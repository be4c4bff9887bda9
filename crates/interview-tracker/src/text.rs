//! Text normalization and phrase matching shared by the validator, the loop
//! detector and message classification.

use std::borrow::Cow;
use std::sync::LazyLock;

use interview_models::TranscriptMessage;
use regex::Regex;

static HTML_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid HTML tag regex"));

/// Remove HTML tags, keeping their inner text.
pub fn strip_html(text: &str) -> Cow<'_, str> {
    HTML_TAG_REGEX.replace_all(text, "")
}

/// Lowercase, drop punctuation and collapse whitespace.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Example requests, in normalized form.
pub const EXAMPLE_PHRASES: [&str; 7] = [
    "example",
    "show example",
    "show me an example",
    "give me an example",
    "example answer",
    "can you show me an example",
    "can you give me an example",
];

/// Whether a user message asks for an example answer.
pub fn is_example_request(text: &str) -> bool {
    is_normalized_example_request(&normalize(text))
}

pub(crate) fn is_normalized_example_request(normalized: &str) -> bool {
    EXAMPLE_PHRASES.contains(&normalized)
}

/// Lowercased, tag-free text of the whole transcript, one message per line.
pub fn transcript_text(messages: &[TranscriptMessage]) -> String {
    messages
        .iter()
        .map(|m| strip_html(&m.content).to_lowercase())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Case-insensitive substring test against already-lowercased text.
///
/// Blank phrases never match.
pub fn contains_phrase(lowered: &str, phrase: &str) -> bool {
    let phrase = phrase.trim().to_lowercase();
    !phrase.is_empty() && lowered.contains(&phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<b>Who</b> do you <i>call</i>?"), "Who do you call?");
        assert_eq!(strip_html("no tags"), "no tags");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Show   EXAMPLE! "), "show example");
        assert_eq!(normalize("*Example: the supervisor...*"), "example the supervisor");
    }

    #[test]
    fn test_transcript_text_lowercases_and_strips() {
        let text = transcript_text(&[
            TranscriptMessage::assistant("<p>Who do you <b>Call</b> first?</p>"),
            TranscriptMessage::user("The Supervisor"),
        ]);
        assert_eq!(text, "who do you call first?\nthe supervisor");
    }

    #[test]
    fn test_contains_phrase() {
        assert!(contains_phrase("we call the supervisor", "Call"));
        assert!(contains_phrase("how many people", "how many"));
        assert!(!contains_phrase("anything", "  "));
        assert!(!contains_phrase("roster", "list"));
    }
}
