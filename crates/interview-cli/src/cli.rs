//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Interview - guided callout-process interviews
#[derive(Parser, Debug)]
#[command(name = "interview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to state directory
    #[arg(short, long, env = "INTERVIEW_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a new interview
    Start {
        /// Interviewee name
        #[arg(short, long)]
        name: Option<String>,

        /// Company name
        #[arg(short, long)]
        company: Option<String>,
    },

    /// Resume a saved interview
    Resume {
        /// Session ID
        #[arg(required = true)]
        session: String,
    },

    /// List saved interviews
    List {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show progress and readiness of a saved interview
    Status {
        /// Session ID
        #[arg(required = true)]
        session: String,
    },

    /// Export answered questions of a saved interview
    Export {
        /// Session ID
        #[arg(required = true)]
        session: String,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the topic catalog in use
    Topics,
}

/// Output format for list and export commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
