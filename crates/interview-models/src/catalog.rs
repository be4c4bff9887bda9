//! Built-in topic catalog for utility callout interviews.
//!
//! Used when no catalog file is configured.

use crate::topic::{Topic, TopicRegistry};

/// The default nine-topic callout questionnaire catalog.
pub fn builtin_topics() -> Vec<Topic> {
    vec![
        Topic::new("basic_info", "Basic Information")
            .with_group(&["name", "company"])
            .with_group(&["callout", "situation", "type", "outage", "emergency"]),
        Topic::new("staffing_details", "Staffing Details")
            .with_group(&["employee", "staff", "people", "person"])
            .with_group(&["number", "how many", "required", "need"]),
        Topic::new("contact_process", "Contact Process")
            .with_group(&["call", "contact", "reach", "phone"])
            .with_group(&["first", "who", "initially"])
            .with_group(&["device", "phone", "cell", "mobile"])
            .with_critical_question("who do you call first")
            .with_critical_question("why do you call this person first")
            .with_critical_question("how many devices do employees have")
            .with_critical_question("which device is called first and why"),
        Topic::new("list_management", "List Management")
            .with_group(&["list", "group", "roster"])
            .with_group(&["order", "sequence", "how", "method"])
            .with_group(&["based on", "organized", "sorted"])
            .with_critical_question("are lists based on attributes other than job classification")
            .with_critical_question("how exactly do you call the list")
            .with_critical_question("do you skip around on lists based on qualifications or status")
            .with_critical_question("are there pauses between calls"),
        Topic::new("insufficient_staffing", "Insufficient Staffing")
            .with_group(&["not enough", "insufficient", "short", "can't get"])
            .with_group(&["different list", "whole list", "again", "other"])
            .with_critical_question("do you offer positions to people not normally called")
            .with_critical_question("do you consider or call the whole list again")
            .with_critical_question("do you always follow these procedures the same way")
            .with_critical_question("are there situations where you handle this differently"),
        Topic::new("calling_logistics", "Calling Logistics")
            .with_group(&["simultaneous", "same time", "together", "all at once"])
            .with_group(&["call again", "second pass", "retry"]),
        Topic::new("list_changes", "List Changes")
            .with_group(&["change", "update", "modify", "alter"])
            .with_group(&["over time", "when", "how often"]),
        Topic::new("tiebreakers", "Tiebreakers")
            .with_group(&["tie", "equal", "same"])
            .with_group(&["overtime", "seniority", "hours", "experience"]),
        Topic::new("additional_rules", "Additional Rules")
            .with_group(&["rule", "policy", "regulation"])
            .with_group(&["email", "text", "message", "notification"])
            .with_group(&["shift", "work", "schedule", "excuse"])
            .with_critical_question(
                "are there rules that excuse declined callouts near shifts or vacations",
            ),
    ]
}

/// Registry built from [`builtin_topics`].
pub fn builtin_registry() -> TopicRegistry {
    TopicRegistry::new(builtin_topics()).expect("Invalid built-in topic catalog")
}
