//! Shared configuration paths for the interview tools.
//!
//! # Storage Structure
//!
//! All application data is stored under `~/.interview/`:
//!
//! ```text
//! ~/.interview/
//! ├── .env.local    # Secrets (OPENROUTER_API_KEY)
//! ├── sessions/     # Session snapshots and backups
//! ├── config/       # interview.yaml, topic catalogs
//! └── logs/         # Application logs
//! ```
//!
//! # Environment Variables
//!
//! - `INTERVIEW_STATE_DIR`: Override the base state directory
//! - `INTERVIEW_SESSIONS_DIR`: Override the sessions directory
//! - `INTERVIEW_CONFIG_DIR`: Override the config directory
//! - `INTERVIEW_LOG_DIR`: Override the log directory

use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::debug;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "INTERVIEW_STATE_DIR";

/// Environment variable for custom sessions directory.
pub const SESSIONS_DIR_ENV: &str = "INTERVIEW_SESSIONS_DIR";

/// Environment variable for custom config directory.
pub const CONFIG_DIR_ENV: &str = "INTERVIEW_CONFIG_DIR";

/// Environment variable for custom log directory.
pub const LOG_DIR_ENV: &str = "INTERVIEW_LOG_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".interview";

const SESSIONS_SUBDIR: &str = "sessions";
const CONFIG_SUBDIR: &str = "config";
const LOGS_SUBDIR: &str = "logs";

/// Name of the settings file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "interview.yaml";

/// Name of the secrets file.
pub const ENV_FILE_NAME: &str = ".env.local";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the state directory.
///
/// Determined by:
/// 1. `INTERVIEW_STATE_DIR` environment variable if set
/// 2. `~/.interview` if a home directory is available
/// 3. `.interview` in the current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

fn dir_from_env(var: &str, subdir: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join(subdir))
}

/// Get the sessions directory (`INTERVIEW_SESSIONS_DIR` or `<state>/sessions`).
pub fn sessions_dir() -> PathBuf {
    dir_from_env(SESSIONS_DIR_ENV, SESSIONS_SUBDIR)
}

/// Get the config directory (`INTERVIEW_CONFIG_DIR` or `<state>/config`).
pub fn config_dir() -> PathBuf {
    dir_from_env(CONFIG_DIR_ENV, CONFIG_SUBDIR)
}

/// Get the logs directory (`INTERVIEW_LOG_DIR` or `<state>/logs`).
pub fn logs_dir() -> PathBuf {
    dir_from_env(LOG_DIR_ENV, LOGS_SUBDIR)
}

/// Get the settings file path.
pub fn config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Get the `.env.local` path in the state directory.
pub fn env_file() -> PathBuf {
    state_dir().join(ENV_FILE_NAME)
}

/// Load `.env.local` from the working directory, then from the state directory.
///
/// Variables already set are never overridden.
pub fn load_env() {
    let candidates = [PathBuf::from(ENV_FILE_NAME), env_file()];
    for path in candidates.iter().filter(|p| p.exists()) {
        match dotenvy::from_path(path) {
            Ok(()) => debug!(path = %path.display(), "Loaded environment file"),
            Err(e) => debug!(path = %path.display(), error = %e, "Skipping environment file"),
        }
    }
}

/// Ensure the state directory and its subdirectories exist.
///
/// # Errors
/// Returns an error if any directory cannot be created.
pub fn ensure_all_dirs() -> std::io::Result<()> {
    std::fs::create_dir_all(sessions_dir())?;
    std::fs::create_dir_all(config_dir())?;
    std::fs::create_dir_all(logs_dir())?;
    Ok(())
}
