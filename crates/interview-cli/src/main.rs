//! Interview CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use interview_cli::cli::{Cli, Commands};
use interview_cli::commands::{self, AppContext};
use interview_cli::repl::Repl;

fn main() {
    let cli = Cli::parse();

    // The state dir flag must be visible before any path lookup.
    if let Some(dir) = &cli.state_dir {
        std::env::set_var(interview_core::config::STATE_DIR_ENV, dir);
    }
    interview_core::load_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));
    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Option<Commands>) -> commands::Result<()> {
    interview_core::ensure_all_dirs()?;
    let ctx = AppContext::load()?;

    match command {
        Some(Commands::Start { name, company }) => {
            let mut repl = Repl::new(ctx)?;
            repl.start(name, company)?;
            repl.run()
        }
        None => {
            let mut repl = Repl::new(ctx)?;
            repl.start(None, None)?;
            repl.run()
        }
        Some(Commands::Resume { session }) => {
            let mut repl = Repl::new(ctx)?;
            repl.resume(&session)?;
            repl.run()
        }
        Some(cmd) => commands::execute(cmd, &ctx),
    }
}
