//! Interactive REPL for the command activator.
//!
//! Every line that is not a slash command goes through the pipeline.

use std::path::{Path, PathBuf};

use activator_core::{cache_dir, ActivationConfig};
use activator_persistence::CacheStore;
use activator_pipeline::CommandPipeline;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::debug;

use crate::commands::{self, format_entry, format_outcome, format_stats};

/// Number of entries `/history` shows without an argument.
const DEFAULT_HISTORY_LINES: usize = 10;

/// Help information for a command.
pub struct CommandHelp {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub brief: &'static str,
    pub usage: &'static str,
}

/// Static help entries for all slash commands.
static COMMAND_HELP: &[CommandHelp] = &[
    CommandHelp {
        name: "help",
        aliases: &["h", "?"],
        brief: "Show this help, or details for one command",
        usage: "/help [cmd]",
    },
    CommandHelp {
        name: "history",
        aliases: &["hist"],
        brief: "Show recent commands",
        usage: "/history [n]",
    },
    CommandHelp {
        name: "stats",
        aliases: &[],
        brief: "Show history statistics",
        usage: "/stats",
    },
    CommandHelp {
        name: "context",
        aliases: &["ctx"],
        brief: "Summarise the context a command would receive",
        usage: "/context",
    },
    CommandHelp {
        name: "quit",
        aliases: &["q", "exit"],
        brief: "Exit the REPL",
        usage: "/quit",
    },
];

/// Tab completion for slash commands.
struct CommandCompleter;

impl CommandCompleter {
    const COMMANDS: &'static [&'static str] =
        &["/context", "/help", "/history", "/quit", "/stats"];
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
        let matches = Self::COMMANDS
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

/// One parsed REPL line.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Help(Option<String>),
    History(Option<usize>),
    Stats,
    Context,
    Quit,
    /// Unknown slash command
    Unknown(String),
    /// Chat text for the pipeline
    Message(String),
    Empty,
}

impl ReplCommand {
    /// Parses input into a REPL command.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return ReplCommand::Empty;
        }

        let Some(stripped) = input.strip_prefix('/') else {
            return ReplCommand::Message(input.to_string());
        };

        let mut parts = stripped.splitn(2, ' ');
        let cmd = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

        match cmd.as_str() {
            "help" | "h" | "?" => ReplCommand::Help(arg.map(|a| a.trim_start_matches('/').to_lowercase())),
            "history" | "hist" => match arg.map(str::parse::<usize>) {
                None => ReplCommand::History(None),
                Some(Ok(n)) => ReplCommand::History(Some(n)),
                Some(Err(_)) => ReplCommand::Unknown(format!("history {}", arg.unwrap_or(""))),
            },
            "stats" => ReplCommand::Stats,
            "context" | "ctx" => ReplCommand::Context,
            "quit" | "q" | "exit" => ReplCommand::Quit,
            _ => ReplCommand::Unknown(cmd),
        }
    }
}

/// Renders the `/help` text.
pub fn help_text() -> String {
    let mut out = String::from("Commands:\n");
    for help in COMMAND_HELP {
        let aliases = if help.aliases.is_empty() {
            String::new()
        } else {
            format!(" (/{})", help.aliases.join(", /"))
        };
        out.push_str(&format!("  {:<16} {}{}\n", help.usage, help.brief, aliases));
    }
    out.push_str("\nAnything else is treated as a message; prefix with \"ai \" to force a command.");
    out
}

/// Finds a help entry by command name or alias.
fn lookup(name: &str) -> Option<&'static CommandHelp> {
    COMMAND_HELP
        .iter()
        .find(|help| help.name == name || help.aliases.contains(&name))
}

/// Renders the `/help <cmd>` text, or `None` for an unknown command.
pub fn help_for(name: &str) -> Option<String> {
    let help = lookup(name)?;
    let mut out = format!("/{}: {}\n  usage: {}", help.name, help.brief, help.usage);
    if !help.aliases.is_empty() {
        out.push_str(&format!("\n  aliases: /{}", help.aliases.join(", /")));
    }
    Some(out)
}

/// REPL state.
pub struct Repl {
    editor: Editor<CommandCompleter, DefaultHistory>,
    pipeline: CommandPipeline,
    runtime: tokio::runtime::Runtime,
    history_path: PathBuf,
}

impl Repl {
    /// Creates a REPL over a pipeline wired to the cache in `state_dir`.
    pub fn new(config: &ActivationConfig, state_dir: &Path) -> commands::Result<Self> {
        let rl_config = rustyline::Config::builder()
            .completion_type(rustyline::CompletionType::List)
            .build();
        let mut editor = Editor::with_config(rl_config)?;
        editor.set_helper(Some(CommandCompleter));

        let history_path = state_dir.join("repl_history.txt");
        if history_path.exists() {
            let _ = editor.load_history(&history_path);
        }

        let store = CacheStore::new(cache_dir());
        let pipeline = commands::build_pipeline(config, &store)?;
        let runtime = tokio::runtime::Runtime::new()?;

        Ok(Self {
            editor,
            pipeline,
            runtime,
            history_path,
        })
    }

    /// Runs the REPL loop.
    pub fn run(&mut self) -> commands::Result<()> {
        println!("Activator REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type /help for commands, /quit to exit");
        println!();

        loop {
            match self.editor.readline("activator> ") {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        self.editor.add_history_entry(&line)?;
                    }

                    let cmd = ReplCommand::parse(&line);
                    debug!(?cmd, "Parsed command");

                    match self.handle_command(cmd) {
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
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(parent) = self.history_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = self.editor.save_history(&self.history_path);

        println!("Goodbye!");
        Ok(())
    }

    /// Handles a REPL command. Returns Ok(true) if should quit.
    fn handle_command(&mut self, cmd: ReplCommand) -> commands::Result<bool> {
        match cmd {
            ReplCommand::Empty => {}
            ReplCommand::Help(None) => println!("{}", help_text()),
            ReplCommand::Help(Some(name)) => match help_for(&name) {
                Some(text) => println!("{}", text),
                None => println!("No help for /{}. Type /help for commands.", name),
            },
            ReplCommand::History(n) => {
                let entries = self
                    .pipeline
                    .history()
                    .recent(n.unwrap_or(DEFAULT_HISTORY_LINES))?;
                if entries.is_empty() {
                    println!("No commands yet.");
                }
                for entry in &entries {
                    println!("{}", format_entry(entry));
                }
            }
            ReplCommand::Stats => {
                println!("{}", format_stats(&self.pipeline.history().stats()?));
            }
            ReplCommand::Context => {
                let context = self.runtime.block_on(self.pipeline.loader().load());
                match context.as_full() {
                    Some(full) => {
                        println!("Full context, {} files", full.file_count());
                        let missing = full.missing_fields();
                        if !missing.is_empty() {
                            println!("  missing: {}", missing.join(", "));
                        }
                    }
                    None => println!("Minimal context (project files unavailable)"),
                }
            }
            ReplCommand::Quit => return Ok(true),
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: /{}. Type /help for commands.", cmd);
            }
            ReplCommand::Message(text) => {
                let outcome = self.runtime.block_on(self.pipeline.handle_message(&text));
                println!("{}", format_outcome(&outcome));
            }
        }
        Ok(false)
    }
}
