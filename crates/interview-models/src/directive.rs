//! Typed steering directives attached to outbound model requests.
//!
//! Directives are never stored in the user-visible transcript. They are
//! rendered as system-level instruction blocks appended to the next request
//! sent to the conversational model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::QuestionId;
use crate::message::UserInfo;

/// Context block that re-seeds the model after a session is restored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeDirective {
    /// Interviewee identity.
    pub user: UserInfo,
    /// Question the interview was on when saved.
    pub current_question: Option<QuestionId>,
    /// Text of that question, if known.
    pub current_question_text: Option<String>,
    /// When the snapshot was saved.
    pub last_saved: Option<DateTime<Utc>>,
    /// Labels of topics already covered, in registry order.
    pub covered_topics: Vec<String>,
    /// Labels of topics not yet covered, in registry order.
    pub missing_topics: Vec<String>,
}

impl ResumeDirective {
    /// Render the instruction block sent to the model.
    pub fn render(&self) -> String {
        let saved = self
            .last_saved
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "a previous session".to_string());
        let current = match (&self.current_question, &self.current_question_text) {
            (Some(id), Some(text)) if !text.is_empty() => format!("{} ({})", id, text),
            (Some(id), _) => id.to_string(),
            (None, _) => "none recorded".to_string(),
        };

        format!(
            "IMPORTANT: This conversation is being resumed from a session saved at {saved}.\n\
             The user's name is {name} and they work for {company}.\n\
             Briefly acknowledge the break, then continue from where the interview left off. \
             Do not repeat questions that were already answered.\n\
             Current question: {current}\n\
             Topic areas already covered: {covered}\n\
             Topic areas still needed: {missing}",
            name = self.user.display_name(),
            company = self.user.display_company(),
            covered = join_or_none(&self.covered_topics),
            missing = join_or_none(&self.missing_topics),
        )
    }
}

/// A steering instruction for the next model turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    /// Session was restored from a snapshot.
    Resume(ResumeDirective),

    /// Topics that still need questions before the interview can end.
    MissingTopics {
        /// Missing topic labels in registry order.
        labels: Vec<String>,
    },

    /// Critical sub-questions not yet asked for a covered topic.
    CriticalQuestions {
        /// Label of the topic.
        topic: String,
        /// Questions still to ask.
        questions: Vec<String>,
    },

    /// The conversation looped; move on to a specific unanswered question.
    ForcedAdvance {
        /// Question to move to.
        question_id: QuestionId,
        /// Its text, if known.
        question_text: String,
    },

    /// The conversation looped and no unanswered question is known; ask about a topic.
    TopicFocus {
        /// Topic label to ask about.
        topic: String,
    },

    /// Every topic is covered; wrap up and offer the summary.
    WrapUp,

    /// The user asked for an example answer.
    ProvideExample {
        /// The question the example should illustrate.
        question: Option<String>,
    },

    /// The user asked for clarification.
    Clarify {
        /// The question to clarify.
        question: Option<String>,
    },
}

impl Directive {
    /// Render the instruction block sent to the model.
    pub fn render(&self) -> String {
        match self {
            Self::Resume(resume) => resume.render(),
            Self::MissingTopics { labels } => format!(
                "IMPORTANT: The following topics have not been fully covered yet: {}. \
                 Before concluding the questionnaire, ask specific questions about these topics.",
                labels.join(", ")
            ),
            Self::CriticalQuestions { topic, questions } => format!(
                "CRITICAL: For the {} topic, you must still ask about: {}. \
                 Ask these specific questions before considering this topic complete.",
                topic,
                questions.join("; ")
            ),
            Self::ForcedAdvance {
                question_id,
                question_text,
            } => format!(
                "The conversation is repeating itself. Stop the current line of questioning \
                 and move on to question {}: {}",
                question_id, question_text
            ),
            Self::TopicFocus { topic } => format!(
                "The conversation is repeating itself. Move on and ask about {}.",
                topic
            ),
            Self::WrapUp => "All topic areas appear to be covered. Thank the user and offer \
                             to prepare the summary."
                .to_string(),
            Self::ProvideExample { question } => format!(
                "The user asked for an example. Give one short, specific example answer \
                 formatted as 'Example: ...', then repeat the question{}. \
                 Do not move on to the next question yet.",
                quoted(question)
            ),
            Self::Clarify { question } => format!(
                "The user asked for clarification. Briefly explain what is being asked{}, \
                 then wait for their answer.",
                quoted(question)
            ),
        }
    }

    /// Short user-visible notice for directives that change the interview flow.
    pub fn user_notice(&self) -> Option<String> {
        match self {
            Self::ForcedAdvance { question_text, .. } if !question_text.is_empty() => Some(format!(
                "I notice we may be repeating ourselves. Let's move forward with the next question:\n\n{}",
                question_text
            )),
            Self::ForcedAdvance { .. } => {
                Some("I notice we may be repeating ourselves. Let's move forward.".to_string())
            }
            Self::TopicFocus { topic } => Some(format!(
                "We still need to cover some important areas. Let me ask you about {}.",
                topic
            )),
            Self::WrapUp => Some(
                "It looks like we've covered all the essential topics. I can prepare your summary."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

fn join_or_none(labels: &[String]) -> String {
    if labels.is_empty() {
        "none".to_string()
    } else {
        labels.join(", ")
    }
}

fn quoted(question: &Option<String>) -> String {
    match question {
        Some(q) if !q.trim().is_empty() => format!(": \"{}\"", q.trim()),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_render_lists_topics() {
        let resume = ResumeDirective {
            user: UserInfo::new("Victor", "Acme Power"),
            current_question: Some(QuestionId::from("contact_process_001")),
            current_question_text: Some("Who do you call first?".into()),
            last_saved: None,
            covered_topics: vec!["Basic Information".into()],
            missing_topics: vec!["Tiebreakers".into(), "List Changes".into()],
        };
        let text = resume.render();
        assert!(text.contains("Victor"));
        assert!(text.contains("Acme Power"));
        assert!(text.contains("contact_process_001 (Who do you call first?)"));
        assert!(text.contains("already covered: Basic Information"));
        assert!(text.contains("still needed: Tiebreakers, List Changes"));
    }

    #[test]
    fn test_directive_serializes_with_kind_tag() {
        let d = Directive::TopicFocus {
            topic: "Contact Process".into(),
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "topic_focus");
        let back: Directive = serde_json::from_value(json).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_user_notice_only_for_flow_changes() {
        assert!(Directive::WrapUp.user_notice().is_some());
        assert!(Directive::MissingTopics { labels: vec![] }.user_notice().is_none());
        let advance = Directive::ForcedAdvance {
            question_id: QuestionId::from("q2"),
            question_text: "How many devices?".into(),
        };
        assert!(advance.user_notice().unwrap().ends_with("How many devices?"));
    }
}
