//! Conversation progress tracking for guided interviews.
//!
//! The tracker decides, from free-form dialogue, which topics and questions
//! have actually been answered:
//!
//! - [`parser`] pulls structured update blocks out of model replies
//! - [`ledger`] keeps every question the model has asked
//! - [`validator`] checks coverage claims against transcript evidence
//! - [`readiness`] decides whether the interview may end
//! - [`loop_detector`] spots repetition and forces progression
//!
//! [`ConversationTracker::process_turn`] ties them together for one turn.

pub mod coverage;
pub mod error;
pub mod ledger;
pub mod loop_detector;
pub mod parser;
pub mod progress;
pub mod readiness;
pub mod session;
pub mod text;
pub mod thresholds;
pub mod tracker;
pub mod validator;

pub use coverage::TopicCoverageMap;
pub use error::{Result, TrackerError};
pub use ledger::{QuestionLedger, RecordOutcome};
pub use loop_detector::{force_progression, LoopDetector, LoopKind, LoopState, LoopWindow};
pub use parser::{parse_model_output, CompletionStatus, ParsedResponse};
pub use progress::ProgressSnapshot;
pub use readiness::{evaluate, Readiness, ReadinessReason};
pub use session::SessionState;
pub use text::is_example_request;
pub use thresholds::Thresholds;
pub use tracker::{ConversationTracker, TurnReport};
pub use validator::CoverageValidator;
