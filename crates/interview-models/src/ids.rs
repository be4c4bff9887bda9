//! Type-safe identifier wrappers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Shared string-newtype plumbing for identifiers and keys.
macro_rules! string_newtype {
    ($name:ident) => {
        impl $name {
            /// Creates the value from an existing string.
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Returns the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Identifier of one interview session (`sess-<uuid>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a new random session ID.
    pub fn new() -> Self {
        Self(format!("sess-{}", Uuid::new_v4()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

string_newtype!(SessionId);

/// Question token chosen by the conversational model (e.g. `basic_info_company_001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

string_newtype!(QuestionId);

/// Stable key of a topic in the registry (e.g. `contact_process`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicKey(String);

string_newtype!(TopicKey);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_prefix() {
        let id = SessionId::new();
        assert!(id.as_str().starts_with("sess-"));
        assert_ne!(id, SessionId::new());
    }

    #[test]
    fn test_keys_are_transparent_in_json() {
        let key = TopicKey::from("contact_process");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"contact_process\"");

        let id: QuestionId = serde_json::from_str("\"basic_info_001\"").unwrap();
        assert_eq!(id.as_str(), "basic_info_001");
        assert_eq!(id.to_string(), "basic_info_001");
    }
}
