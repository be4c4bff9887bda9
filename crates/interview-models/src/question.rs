//! Question records and the updates the conversational model reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::{QuestionId, TopicKey};

/// Topic key used when the model does not say which topic a question belongs to.
pub const UNKNOWN_TOPIC: &str = "unknown";

/// How well a question was answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerQuality {
    /// No answer yet.
    #[default]
    None,
    /// An answer was given but could not be interpreted.
    Unclear,
    /// Part of the question was answered.
    Partial,
    /// The question was fully answered.
    Complete,
}

impl AnswerQuality {
    /// Parse a quality label leniently; anything unrecognized is `None`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "complete" => Self::Complete,
            "partial" => Self::Partial,
            "unclear" => Self::Unclear,
            _ => Self::None,
        }
    }

    /// Weight used for quality-weighted progress.
    pub fn weight(self) -> f64 {
        match self {
            Self::Complete => 1.0,
            Self::Partial => 0.7,
            Self::Unclear => 0.3,
            Self::None => 0.0,
        }
    }
}

impl<'de> Deserialize<'de> for AnswerQuality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Self::parse(&s)).unwrap_or_default())
    }
}

impl std::fmt::Display for AnswerQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Unclear => write!(f, "unclear"),
            Self::Partial => write!(f, "partial"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Question update block reported by the model (`QUESTION_TRACKING:`).
///
/// Every field is optional on the wire so a sloppy block still parses; a
/// missing `question_id` is rejected later by the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionUpdate {
    /// Identifier of the question being asked or answered.
    pub question_id: Option<QuestionId>,

    /// Question text as posed.
    #[serde(alias = "question_text")]
    pub question_asked: Option<String>,

    /// Owning topic key.
    pub topic: Option<TopicKey>,

    /// Whether the user has answered.
    pub answer_received: bool,

    /// Quality of the answer.
    pub answer_quality: AnswerQuality,

    /// Whether the model intends to follow up.
    pub follow_up_needed: bool,

    /// Raw user response text.
    pub user_response: Option<String>,

    /// Model's suggestion for what to ask next.
    pub next_question_suggestion: Option<String>,
}

impl QuestionUpdate {
    /// Update for a question with the given id.
    pub fn new(id: impl Into<QuestionId>) -> Self {
        Self {
            question_id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Set the question text.
    pub fn asked(mut self, text: impl Into<String>) -> Self {
        self.question_asked = Some(text.into());
        self
    }

    /// Set the owning topic.
    pub fn topic(mut self, topic: impl Into<TopicKey>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Mark as answered with the given quality and response.
    pub fn answered(mut self, quality: AnswerQuality, response: impl Into<String>) -> Self {
        self.answer_received = true;
        self.answer_quality = quality;
        self.user_response = Some(response.into());
        self
    }

    /// The id, if present and not blank.
    pub fn id(&self) -> Option<&QuestionId> {
        self.question_id
            .as_ref()
            .filter(|id| !id.as_str().trim().is_empty())
    }
}

/// One entry of the question ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Question identifier.
    pub id: QuestionId,

    /// Question text as posed.
    #[serde(default)]
    pub text: String,

    /// Owning topic key.
    pub topic: TopicKey,

    /// Whether an answer was received.
    #[serde(default)]
    pub answer_received: bool,

    /// Quality of the received answer.
    #[serde(default)]
    pub answer_quality: AnswerQuality,

    /// Whether the model flagged a follow-up.
    #[serde(default)]
    pub follow_up_needed: bool,

    /// Raw user response text.
    #[serde(default)]
    pub user_response: String,

    /// When the question was first recorded.
    pub created_at: DateTime<Utc>,

    /// When the question was last updated.
    pub updated_at: DateTime<Utc>,
}

impl QuestionRecord {
    /// Create a record from the first update seen for `id`.
    pub fn from_update(id: QuestionId, update: &QuestionUpdate, now: DateTime<Utc>) -> Self {
        let mut record = Self {
            id,
            text: String::new(),
            topic: TopicKey::from(UNKNOWN_TOPIC),
            answer_received: false,
            answer_quality: AnswerQuality::None,
            follow_up_needed: false,
            user_response: String::new(),
            created_at: now,
            updated_at: now,
        };
        record.apply(update, now);
        record
    }

    /// Overwrite the mutable fields from an update.
    ///
    /// Blank text fields in the update do not erase previously recorded text.
    pub fn apply(&mut self, update: &QuestionUpdate, now: DateTime<Utc>) {
        if let Some(text) = non_blank(update.question_asked.as_deref()) {
            self.text = text.to_string();
        }
        if let Some(topic) = update
            .topic
            .as_ref()
            .filter(|t| !t.as_str().trim().is_empty())
        {
            self.topic = topic.clone();
        }
        if let Some(response) = non_blank(update.user_response.as_deref()) {
            self.user_response = response.to_string();
        }
        self.answer_received = update.answer_received;
        self.answer_quality = update.answer_quality;
        self.follow_up_needed = update.follow_up_needed;
        self.updated_at = now;
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// A (question, answer) row for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    /// Question text.
    pub question: String,
    /// Answer text.
    pub answer: String,
}
