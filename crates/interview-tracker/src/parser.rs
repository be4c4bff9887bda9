//! Parser for structured update blocks embedded in model output.
//!
//! The model's reply is free text that may contain marker lines such as:
//! ```text
//! What type of callouts do you handle?
//!
//! QUESTION_TRACKING: {"question_id": "basic_info_callout_type_001", "answer_received": false}
//! COMPLETION_STATUS: {"overall_progress": 10, "topic_coverage": {"basic_info": false}}
//! ```
//!
//! Markers count only at the start of a line (leading whitespace allowed);
//! a marker named mid-sentence is ordinary prose. Each marker is followed by
//! exactly one JSON object. The object is located
//! by bracket-depth counting that skips braces inside string literals, so
//! nested objects, quoted braces and trailing prose all survive. Blocks that
//! cannot be parsed are discarded and stripped from the display text.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use interview_models::{QuestionUpdate, TopicKey};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

/// Marker for question update blocks.
pub const QUESTION_TRACKING_MARKER: &str = "QUESTION_TRACKING:";

/// Marker for completion status blocks.
pub const COMPLETION_STATUS_MARKER: &str = "COMPLETION_STATUS:";

/// Marker for bare topic coverage maps.
pub const TOPIC_UPDATE_MARKER: &str = "TOPIC_UPDATE:";

const MARKERS: [&str; 3] = [
    QUESTION_TRACKING_MARKER,
    COMPLETION_STATUS_MARKER,
    TOPIC_UPDATE_MARKER,
];

/// Three or more line breaks left behind after stripping blocks.
static BLANK_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("Invalid blank-run regex"));

/// Completion status block reported by the model (`COMPLETION_STATUS:`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompletionStatus {
    /// Model's own progress estimate (0-100).
    pub overall_progress: Option<f64>,
    /// Topic coverage claims.
    pub topic_coverage: BTreeMap<TopicKey, bool>,
    /// Information the model believes is still missing.
    pub missing_critical_info: Vec<String>,
    /// Whether the model considers the current topic finished.
    pub current_topic_complete: bool,
}

/// Result of parsing one model reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResponse {
    /// Reply text with every structured block removed.
    pub display_text: String,
    /// Valid question updates in the order they appear in the reply.
    pub question_updates: Vec<QuestionUpdate>,
    /// Completion status, if a valid block was present.
    pub completion_status: Option<CompletionStatus>,
    /// Bare topic update map, if a valid block was present.
    pub topic_update: Option<BTreeMap<TopicKey, bool>>,
    /// Markers whose blocks were malformed and discarded.
    pub discarded: Vec<String>,
}

impl ParsedResponse {
    /// Whether any structured update was recovered.
    pub fn has_updates(&self) -> bool {
        !self.question_updates.is_empty()
            || self.completion_status.is_some()
            || self.topic_update.is_some()
    }

    /// Merged topic coverage claims; the bare topic update wins on conflicts.
    pub fn claimed_coverage(&self) -> BTreeMap<TopicKey, bool> {
        let mut claims = self
            .completion_status
            .as_ref()
            .map(|s| s.topic_coverage.clone())
            .unwrap_or_default();
        if let Some(update) = &self.topic_update {
            claims.extend(update.iter().map(|(k, v)| (k.clone(), *v)));
        }
        claims
    }

    fn absorb(&mut self, marker: &'static str, json: &str) {
        let outcome = match marker {
            QUESTION_TRACKING_MARKER => serde_json::from_str::<QuestionUpdate>(json)
                .map(|u| self.question_updates.push(u)),
            COMPLETION_STATUS_MARKER => serde_json::from_str::<CompletionStatus>(json)
                .map(|s| self.completion_status = Some(s)),
            _ => serde_json::from_str::<BTreeMap<TopicKey, bool>>(json)
                .map(|m| self.topic_update = Some(m)),
        };
        if let Err(e) = outcome {
            warn!(marker, error = %e, "Discarding structured block with invalid JSON");
            self.discarded.push(marker_name(marker));
        }
    }
}

/// Locate the JSON object starting at byte `start`, which must be `{`.
///
/// Returns the object text including both braces, or `None` when the braces
/// never balance.
pub fn extract_json_object(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.get(start) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse a model reply into display text and structured updates.
///
/// Never fails: malformed blocks are logged, recorded in
/// [`ParsedResponse::discarded`], and stripped from the display text.
pub fn parse_model_output(raw: &str) -> ParsedResponse {
    let mut parsed = ParsedResponse::default();
    let mut spans: Vec<(usize, usize)> = Vec::new();

    for (pos, marker) in marker_positions(raw) {
        let after = pos + marker.len();
        let rest = &raw[after..];
        let json_start = after + (rest.len() - rest.trim_start().len());

        match extract_json_object(raw, json_start) {
            Some(json) => {
                spans.push((pos, json_start + json.len()));
                parsed.absorb(marker, json);
            }
            None => {
                // Unbalanced or missing object: drop the rest of the marker line.
                let end = rest.find('\n').map(|i| after + i).unwrap_or(raw.len());
                spans.push((pos, end));
                warn!(marker, "Discarding structured block without a balanced JSON object");
                parsed.discarded.push(marker_name(marker));
            }
        }
    }

    parsed.display_text = strip_spans(raw, spans);
    debug!(
        has_updates = parsed.has_updates(),
        discarded = parsed.discarded.len(),
        "Parsed model output"
    );
    parsed
}

/// Line-leading marker occurrences in text order.
fn marker_positions(raw: &str) -> Vec<(usize, &'static str)> {
    let mut found: Vec<(usize, &'static str)> = MARKERS
        .iter()
        .flat_map(|&marker| raw.match_indices(marker).map(move |(pos, _)| (pos, marker)))
        .filter(|&(pos, _)| starts_line(raw, pos))
        .collect();
    found.sort_unstable_by_key(|&(pos, _)| pos);
    found
}

fn starts_line(raw: &str, pos: usize) -> bool {
    raw[..pos]
        .rsplit('\n')
        .next()
        .map_or(true, |line| line.trim().is_empty())
}

fn marker_name(marker: &str) -> String {
    marker.trim_end_matches(':').to_string()
}

fn strip_spans(raw: &str, mut spans: Vec<(usize, usize)>) -> String {
    spans.sort_unstable();
    let mut out = String::with_capacity(raw.len());
    let mut cursor = 0;
    for (start, end) in spans {
        if start > cursor {
            out.push_str(&raw[cursor..start]);
        }
        cursor = cursor.max(end);
    }
    if cursor < raw.len() {
        out.push_str(&raw[cursor..]);
    }
    BLANK_RUN_REGEX.replace_all(&out, "\n\n").trim().to_string()
}
