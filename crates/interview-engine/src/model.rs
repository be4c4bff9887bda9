//! Conversational model abstraction.

use async_trait::async_trait;
use interview_models::{Directive, MessageRole, TranscriptMessage};

use crate::error::ModelError;

/// One outbound request to the conversational model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// Static interview instructions.
    pub instructions: String,
    /// Trailing transcript window.
    pub transcript: Vec<TranscriptMessage>,
    /// Steering directives for this turn.
    pub directives: Vec<Directive>,
    /// The new user message.
    pub user_message: String,
}

impl ModelRequest {
    /// Flatten into role-tagged messages.
    ///
    /// Order: instructions, transcript window, one system message per
    /// directive, then the new user message.
    pub fn messages(&self) -> Vec<(MessageRole, String)> {
        let mut out = Vec::with_capacity(self.transcript.len() + self.directives.len() + 2);
        out.push((MessageRole::System, self.instructions.clone()));
        out.extend(self.transcript.iter().map(|m| (m.role, m.content.clone())));
        out.extend(
            self.directives
                .iter()
                .map(|d| (MessageRole::System, d.render())),
        );
        out.push((MessageRole::User, self.user_message.clone()));
        out
    }
}

/// A backend that produces the interviewer's next reply.
#[async_trait]
pub trait ConversationModel: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Produce the raw reply text, structured blocks included.
    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_order() {
        let request = ModelRequest {
            instructions: "You are an interviewer.".into(),
            transcript: vec![
                TranscriptMessage::assistant("Who do you call first?"),
                TranscriptMessage::user("The supervisor"),
            ],
            directives: vec![Directive::WrapUp],
            user_message: "Anything else?".into(),
        };
        let messages = request.messages();
        let roles: Vec<MessageRole> = messages.iter().map(|(r, _)| *r).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::System,
                MessageRole::User
            ]
        );
        assert!(messages[3].1.contains("offer to prepare the summary"));
        assert_eq!(messages[4].1, "Anything else?");
    }
}
