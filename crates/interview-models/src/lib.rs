//! Core data models for the guided interview tracker.
//!
//! This crate provides the leaf types shared by every other interview
//! crate: identifiers, the immutable topic registry, question records and
//! the updates the conversational model reports about them, transcript
//! messages, and the typed directives attached to outbound model requests.

pub mod catalog;
pub mod directive;
pub mod error;
pub mod ids;
pub mod message;
pub mod question;
pub mod topic;

// Re-export main types
pub use catalog::{builtin_registry, builtin_topics};
pub use directive::{Directive, ResumeDirective};
pub use error::{ModelsError, Result};
pub use ids::{QuestionId, SessionId, TopicKey};
pub use message::{MessageRole, TranscriptMessage, UserInfo};
pub use question::{AnswerQuality, QaPair, QuestionRecord, QuestionUpdate};
pub use topic::{Topic, TopicRegistry};
