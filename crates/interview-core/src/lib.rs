//! Interview Core - shared configuration for the interview tools.
//!
//! - **config**: State directory layout and environment loading
//! - **settings**: `interview.yaml` settings (model, timeouts, thresholds)
//! - **catalog**: Topic catalog loading with a built-in fallback

pub mod catalog;
pub mod config;
pub mod error;
pub mod settings;

pub use catalog::{load_catalog, load_registry};
pub use config::{
    config_dir, config_file, ensure_all_dirs, env_file, load_env, logs_dir, sessions_dir,
    state_dir,
};
pub use error::{ConfigError, Result};
pub use settings::{InterviewConfig, ModelConfig, API_KEY_ENV};
