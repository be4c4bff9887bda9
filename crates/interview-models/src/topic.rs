//! Topic definitions and the immutable topic registry.
//!
//! A topic is a named cluster of questionnaire subject matter. Coverage of a
//! topic is evidenced by keyword phrases grouped into *requirement groups*:
//! a group counts as satisfied when any one of its synonym phrases appears
//! in the conversation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ModelsError, Result};
use crate::ids::TopicKey;

/// A single questionnaire topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Stable key (e.g. `contact_process`).
    pub key: TopicKey,

    /// Human-readable label (e.g. "Contact Process").
    pub label: String,

    /// Alternative keyword sets; each inner list is one group of synonyms.
    #[serde(default)]
    pub requirement_groups: Vec<Vec<String>>,

    /// Phrases that must each appear once the topic is marked covered.
    #[serde(default)]
    pub critical_questions: Vec<String>,
}

impl Topic {
    /// Create a topic with no requirement groups.
    pub fn new(key: impl Into<TopicKey>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            requirement_groups: Vec::new(),
            critical_questions: Vec::new(),
        }
    }

    /// Add a requirement group of synonym phrases.
    pub fn with_group(mut self, phrases: &[&str]) -> Self {
        self.requirement_groups
            .push(phrases.iter().map(|p| p.to_string()).collect());
        self
    }

    /// Add a critical sub-question.
    pub fn with_critical_question(mut self, question: impl Into<String>) -> Self {
        self.critical_questions.push(question.into());
        self
    }

    fn check(&self) -> Result<()> {
        if self.key.as_str().trim().is_empty() {
            return Err(ModelsError::InvalidTopic("topic key is empty".into()));
        }
        if self.label.trim().is_empty() {
            return Err(ModelsError::InvalidTopic(format!(
                "topic {} has an empty label",
                self.key
            )));
        }
        let empty_group = self.requirement_groups.is_empty()
            || self
                .requirement_groups
                .iter()
                .any(|g| g.iter().all(|p| p.trim().is_empty()));
        if empty_group {
            return Err(ModelsError::EmptyRequirementGroup {
                key: self.key.to_string(),
            });
        }
        Ok(())
    }
}

/// On-disk shape of a topic catalog.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    topics: Vec<Topic>,
}

/// Ordered, immutable catalog of topics.
///
/// Declaration order is significant: missing-topic listings and fallback
/// topic selection follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRegistry {
    topics: Vec<Topic>,
}

impl TopicRegistry {
    /// Build a registry, rejecting duplicate keys and empty requirement groups.
    pub fn new(topics: Vec<Topic>) -> Result<Self> {
        let mut seen = HashSet::new();
        for topic in &topics {
            topic.check()?;
            if !seen.insert(topic.key.clone()) {
                return Err(ModelsError::DuplicateTopic(topic.key.to_string()));
            }
        }
        Ok(Self { topics })
    }

    /// Parse a YAML catalog of the form `topics: [{key, label, requirement_groups, critical_questions}]`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let doc: CatalogDocument = serde_yaml::from_str(yaml)?;
        Self::new(doc.topics)
    }

    /// Look up a topic by key.
    pub fn get(&self, key: &TopicKey) -> Option<&Topic> {
        self.topics.iter().find(|t| &t.key == key)
    }

    /// Look up a topic by its key string.
    pub fn get_str(&self, key: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.key.as_str() == key)
    }

    /// Whether the registry declares this key.
    pub fn contains(&self, key: &TopicKey) -> bool {
        self.get(key).is_some()
    }

    /// Label for a key, falling back to the key itself.
    pub fn label<'a>(&'a self, key: &'a TopicKey) -> &'a str {
        self.get(key).map(|t| t.label.as_str()).unwrap_or(key.as_str())
    }

    /// Topics in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    /// Topic keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &TopicKey> {
        self.topics.iter().map(|t| &t.key)
    }

    /// Number of topics.
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}
