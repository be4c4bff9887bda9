//! Interview settings loaded from `interview.yaml`.
//!
//! ```yaml
//! model:
//!   model: anthropic/claude-sonnet-4
//!   max_tokens: 1024
//!   temperature: 0.3
//! turn_timeout_secs: 45
//! transcript_window: 20
//! max_backups: 5
//! topic_catalog: ~/.interview/config/topics.yaml
//! thresholds:
//!   coverage_group_ratio: 0.6
//! ```
//!
//! Every key is optional; a missing file yields the defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use interview_tracker::Thresholds;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Environment variable holding the OpenRouter key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

fn default_model() -> String {
    "anthropic/claude-sonnet-4".into()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.3
}

fn default_api_key_env() -> String {
    API_KEY_ENV.into()
}

fn default_turn_timeout_secs() -> u64 {
    45
}

fn default_transcript_window() -> usize {
    20
}

fn default_max_backups() -> usize {
    5
}

/// Conversational model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier (e.g., "anthropic/claude-sonnet-4").
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature (0.0 to 2.0).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Environment variable that holds the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Top-level interview settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewConfig {
    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Upper bound on one model call, in seconds.
    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,

    /// Transcript messages sent with each model request.
    #[serde(default = "default_transcript_window")]
    pub transcript_window: usize,

    /// Backups kept per session.
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,

    /// Path to a YAML topic catalog; the built-in catalog when absent.
    #[serde(default)]
    pub topic_catalog: Option<String>,

    /// Tracker threshold overrides.
    #[serde(default)]
    pub thresholds: Thresholds,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            turn_timeout_secs: default_turn_timeout_secs(),
            transcript_window: default_transcript_window(),
            max_backups: default_max_backups(),
            topic_catalog: None,
            thresholds: Thresholds::default(),
        }
    }
}

impl InterviewConfig {
    /// Load settings from `path`; a missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Load from the default location (`<config>/interview.yaml`).
    pub fn load_default() -> Result<Self> {
        Self::load(&crate::config::config_file())
    }

    /// Parse and validate YAML settings.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.turn_timeout_secs == 0 {
            return Err(ConfigError::Invalid("turn_timeout_secs must be positive".into()));
        }
        if self.transcript_window == 0 {
            return Err(ConfigError::Invalid("transcript_window must be positive".into()));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::Invalid("model.temperature must be within 0.0-2.0".into()));
        }
        let t = &self.thresholds;
        let ratios = [
            ("coverage_group_ratio", t.coverage_group_ratio),
            ("ledger_escape_ratio", t.ledger_escape_ratio),
            ("blended_topic_ratio", t.blended_topic_ratio),
            ("blended_answer_ratio", t.blended_answer_ratio),
            ("question_only_ratio", t.question_only_ratio),
            ("nudge_topic_ratio", t.nudge_topic_ratio),
            ("nudge_answer_ratio", t.nudge_answer_ratio),
            ("critical_word_ratio", t.critical_word_ratio),
            ("topic_progress_weight", t.topic_progress_weight),
        ];
        if let Some((name, value)) = ratios.iter().find(|(_, v)| !(0.0..=1.0).contains(v)) {
            return Err(ConfigError::Invalid(format!(
                "thresholds.{} must be within 0.0-1.0, got {}",
                name, value
            )));
        }
        Ok(())
    }

    /// Model call timeout.
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }

    /// Topic catalog path with `~` and env vars expanded; relative paths resolve against `base`.
    pub fn catalog_path(&self, base: &Path) -> Option<PathBuf> {
        let raw = self.topic_catalog.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        let expanded = shellexpand::full(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        let path = PathBuf::from(expanded);
        Some(if path.is_absolute() { path } else { base.join(path) })
    }
}
