//! Transcript message and user identity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Instruction text for the model.
    System,
    /// The interviewee.
    User,
    /// The interviewer (conversational model).
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in the user-visible transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    /// Role of the sender.
    pub role: MessageRole,

    /// Text content, with structured blocks already stripped.
    pub content: String,

    /// When the message was added.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl TranscriptMessage {
    /// Create a message with the current timestamp.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Identity of the interviewee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Person's name.
    #[serde(default)]
    pub name: String,
    /// Company name.
    #[serde(default)]
    pub company: String,
}

impl UserInfo {
    /// Create user info.
    pub fn new(name: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
        }
    }

    /// Name, or "unknown" when blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "unknown"
        } else {
            &self.name
        }
    }

    /// Company, or "unknown company" when blank.
    pub fn display_company(&self) -> &str {
        if self.company.trim().is_empty() {
            "unknown company"
        } else {
            &self.company
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&MessageRole::Assistant).unwrap(), "\"assistant\"");
        let role: MessageRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, MessageRole::User);
    }

    #[test]
    fn test_message_without_timestamp_deserializes() {
        let msg: TranscriptMessage =
            serde_json::from_str(r#"{"role": "assistant", "content": "Hello"}"#).unwrap();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn test_user_info_display_fallbacks() {
        let info = UserInfo::default();
        assert_eq!(info.display_name(), "unknown");
        assert_eq!(info.display_company(), "unknown company");
        let info = UserInfo::new("Victor", "Acme Power");
        assert_eq!(info.display_name(), "Victor");
    }
}
