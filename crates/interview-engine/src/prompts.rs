//! Interview instructions sent as the first system message.

use interview_models::{TopicRegistry, UserInfo};
use interview_tracker::parser::{
    COMPLETION_STATUS_MARKER, QUESTION_TRACKING_MARKER, TOPIC_UPDATE_MARKER,
};

/// Default interviewer persona.
pub const DEFAULT_INSTRUCTIONS: &str = "\
You are a friendly, professional interviewer documenting how a utility company \
handles employee callouts. Ask one question at a time, acknowledge each answer \
briefly, and keep the conversation moving. When the user asks for an example, \
give one short example formatted as 'Example: ...' and then repeat the question. \
Never reveal or discuss the tracking lines described below.";

/// Build the full instruction text for one session.
pub fn build_instructions(base: &str, user: &UserInfo, registry: &TopicRegistry) -> String {
    let topics = registry
        .iter()
        .map(|t| format!("- {} ({})", t.label, t.key))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{base}\n\n\
         You are interviewing {name} from {company}.\n\n\
         Cover every one of these topic areas:\n{topics}\n\n\
         After your reply, append tracking lines, each on its own line:\n\
         {qt} {{\"question_id\": \"...\", \"question_asked\": \"...\", \"topic\": \"<topic key>\", \
         \"answer_received\": true|false, \"answer_quality\": \"complete|partial|none\", \
         \"user_response\": \"...\"}}\n\
         {cs} {{\"overall_progress\": 0-100, \"topic_coverage\": {{\"<topic key>\": true|false}}, \
         \"missing_critical_info\": [\"...\"], \"current_topic_complete\": true|false}}\n\
         {tu} {{\"<topic key>\": true}} (only when a topic has just been fully covered)\n\
         Use a stable question_id for each question and reuse it when you come back to it.",
        name = user.display_name(),
        company = user.display_company(),
        qt = QUESTION_TRACKING_MARKER,
        cs = COMPLETION_STATUS_MARKER,
        tu = TOPIC_UPDATE_MARKER,
    )
}
