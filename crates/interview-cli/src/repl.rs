//! Interactive interview REPL.

use std::path::PathBuf;
use std::sync::Arc;

use interview_core::state_dir;
use interview_engine::{EngineError, EngineSettings, InterviewEngine, OpenRouterClient};
use interview_models::{SessionId, TopicKey, UserInfo};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::{debug, warn};

use crate::cli::OutputFormat;
use crate::commands::{render_pairs, AppContext, Result};

const HELP_TEXT: &str = "\
Answer the interviewer's questions in plain text.
  example          Ask for an example answer
  help             Ask what the question means
  summary          Ask for the summary once all topics are covered

Commands:
  /status          Show progress and missing topics
  /save            Save the interview now
  /finish          Finish the interview (only when complete)
  /export          Show answered questions
  /debug           Show the question ledger
  /reset [topic]   Reset coverage for one topic or all topics
  /help            Show this help
  /quit            Save and exit";

/// Tab completion for slash commands.
struct CommandCompleter;

impl CommandCompleter {
    const COMMANDS: &'static [&'static str] = &[
        "/debug", "/export", "/finish", "/help", "/quit", "/reset", "/save", "/status",
    ];
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let prefix = &line[..pos];
        let matches: Vec<Pair> = Self::COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((0, matches))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}
impl Validator for CommandCompleter {}
impl Helper for CommandCompleter {}

/// Slash commands available in the REPL.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    /// Show progress
    Status,
    /// Save now
    Save,
    /// Try to finish the interview
    Finish,
    /// Show answered questions
    Export,
    /// Dump the question ledger
    Debug,
    /// Reset coverage for a topic, or all topics
    Reset(Option<String>),
    /// Show help
    Help,
    /// Save and quit
    Quit,
    /// Unknown command
    Unknown(String),
    /// An answer for the interviewer
    Text(String),
}

impl ReplCommand {
    /// Parses input into a REPL command.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();

        let Some(stripped) = input.strip_prefix('/') else {
            return ReplCommand::Text(input.to_string());
        };

        let parts: Vec<&str> = stripped.splitn(2, ' ').collect();
        let cmd = parts[0].to_lowercase();
        let arg = parts
            .get(1)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        match cmd.as_str() {
            "status" | "s" => ReplCommand::Status,
            "save" => ReplCommand::Save,
            "finish" | "done" => ReplCommand::Finish,
            "export" => ReplCommand::Export,
            "debug" => ReplCommand::Debug,
            "reset" => ReplCommand::Reset(arg),
            "help" | "h" | "?" => ReplCommand::Help,
            "quit" | "q" | "exit" => ReplCommand::Quit,
            _ => ReplCommand::Unknown(cmd),
        }
    }
}

/// REPL state
pub struct Repl {
    editor: Editor<CommandCompleter, DefaultHistory>,
    engine: InterviewEngine,
    session: Option<SessionId>,
    runtime: tokio::runtime::Runtime,
    history_path: PathBuf,
}

impl Repl {
    /// Creates a REPL backed by the configured model.
    pub fn new(ctx: AppContext) -> Result<Self> {
        let config = rustyline::Config::builder()
            .completion_type(rustyline::CompletionType::List)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(CommandCompleter));

        let history_path = state_dir().join("repl_history.txt");
        if history_path.exists() {
            let _ = editor.load_history(&history_path);
        }

        let model = Arc::new(OpenRouterClient::from_env(ctx.config.model.clone())?);
        let engine = InterviewEngine::new(
            ctx.registry,
            model,
            ctx.store,
            EngineSettings::from_config(&ctx.config),
        );
        let runtime = tokio::runtime::Runtime::new()?;

        Ok(Self {
            editor,
            engine,
            session: None,
            runtime,
            history_path,
        })
    }

    /// Start a new interview, asking for any missing identity fields.
    pub fn start(&mut self, name: Option<String>, company: Option<String>) -> Result<()> {
        let name = match name {
            Some(n) => n,
            None => self.editor.readline("Your name: ")?.trim().to_string(),
        };
        let company = match company {
            Some(c) => c,
            None => self.editor.readline("Your company: ")?.trim().to_string(),
        };
        let id = self.engine.start_session(UserInfo::new(name, company));
        println!("Started interview {}", id);
        self.session = Some(id);
        Ok(())
    }

    /// Resume a saved interview.
    pub fn resume(&mut self, session: &str) -> Result<()> {
        let outcome = self.engine.resume(&SessionId::from(session))?;
        println!("Resumed interview {}", outcome.session_id);
        if let Some(text) = &outcome.directive.current_question_text {
            println!("Last question: {}", text);
        }
        println!(
            "Covered {} of {} topic areas.",
            outcome.directive.covered_topics.len(),
            outcome.directive.covered_topics.len() + outcome.directive.missing_topics.len()
        );
        self.session = Some(outcome.session_id);
        Ok(())
    }

    /// Runs the REPL loop.
    pub fn run(&mut self) -> Result<()> {
        let id = self
            .session
            .clone()
            .ok_or("no interview started or resumed")?;

        println!("Interview REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type /help for commands, /quit to save and exit");
        println!();

        loop {
            match self.editor.readline("you> ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.editor.add_history_entry(&line)?;

                    let cmd = ReplCommand::parse(&line);
                    debug!(?cmd, "Parsed command");

                    match self.handle_command(&id, cmd) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    println!("^D");
                    self.save_quietly(&id);
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        let _ = self.editor.save_history(&self.history_path);
        println!("Resume later with: interview resume {}", id);
        Ok(())
    }

    /// Handles a REPL command. Returns Ok(true) if should quit.
    fn handle_command(&mut self, id: &SessionId, cmd: ReplCommand) -> Result<bool> {
        match cmd {
            ReplCommand::Text(text) => {
                self.answer(id, &text)?;
            }
            ReplCommand::Status => {
                let progress = self.engine.progress(id)?;
                let readiness = self.engine.readiness(id)?;
                println!("{}", progress.summary_line());
                if !progress.missing_topics.is_empty() {
                    println!("Missing: {}", progress.missing_topics.join(", "));
                }
                println!("{}", readiness.message);
            }
            ReplCommand::Save => {
                let handle = self.engine.save(id)?;
                println!("Saved to {}", handle.path.display());
            }
            ReplCommand::Finish => {
                let outcome = self.engine.finish(id)?;
                println!("{}", outcome.readiness.message);
                if outcome.finished {
                    self.engine.save(id)?;
                    println!("Interview finished. Thank you!");
                    return Ok(true);
                }
            }
            ReplCommand::Export => {
                let pairs = self.engine.export(id)?;
                println!("{}", render_pairs(&pairs, OutputFormat::Table)?);
            }
            ReplCommand::Debug => println!("{}", self.engine.debug_status(id)?),
            ReplCommand::Reset(topic) => {
                let key = topic.map(TopicKey::from);
                self.engine.reset_coverage(id, key.as_ref())?;
                println!("Coverage reset.");
            }
            ReplCommand::Help => println!("{}", HELP_TEXT),
            ReplCommand::Quit => {
                self.save_quietly(id);
                return Ok(true);
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: /{}. Type /help for commands.", cmd);
            }
        }
        Ok(false)
    }

    fn answer(&mut self, id: &SessionId, text: &str) -> Result<()> {
        match self.runtime.block_on(self.engine.submit_user_turn(id, text)) {
            Ok(outcome) => {
                println!("\n{}\n", outcome.display_text);
                println!("[{}]", outcome.progress.summary_line());
                self.save_quietly(id);
                Ok(())
            }
            Err(e @ (EngineError::ModelTimeout { .. } | EngineError::ModelUnavailable(_))) => {
                eprintln!("{}", e);
                eprintln!("Your answer was not recorded. Please send it again.");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save_quietly(&mut self, id: &SessionId) {
        if let Err(e) = self.engine.save(id) {
            warn!(session_id = %id, error = %e, "Autosave failed");
            eprintln!("Warning: could not save the interview: {}", e);
        }
    }
}
