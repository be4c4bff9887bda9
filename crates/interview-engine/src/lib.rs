//! Interview Engine - runs guided interviews against a conversational model.
//!
//! - **model**: The [`ConversationModel`] trait and request shape
//! - **client**: OpenRouter-backed model
//! - **classifier**: Detection of example, help and summary requests
//! - **prompts**: Interviewer instructions
//! - **engine**: Session lifecycle, turn handling, save and resume
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use interview_core::ModelConfig;
//! use interview_engine::{EngineSettings, InterviewEngine, OpenRouterClient};
//! use interview_models::{builtin_registry, UserInfo};
//! use interview_persistence::SnapshotStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let model = Arc::new(OpenRouterClient::from_env(ModelConfig::default())?);
//! let mut engine = InterviewEngine::new(
//!     Arc::new(builtin_registry()),
//!     model,
//!     SnapshotStore::new("/home/user/.interview/sessions"),
//!     EngineSettings::default(),
//! );
//!
//! let id = engine.start_session(UserInfo::new("Victor", "ABC Power"));
//! let outcome = engine.submit_user_turn(&id, "Hi, ready to start").await?;
//! println!("{}", outcome.display_text);
//! engine.save(&id)?;
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod client;
pub mod engine;
pub mod error;
pub mod model;
pub mod prompts;

pub use classifier::{classify, MessageKind};
pub use client::OpenRouterClient;
pub use engine::{EngineSettings, FinishOutcome, InterviewEngine, ResumeOutcome, TurnOutcome};
pub use error::{EngineError, ModelError, Result};
pub use model::{ConversationModel, ModelRequest};
pub use prompts::{build_instructions, DEFAULT_INSTRUCTIONS};
