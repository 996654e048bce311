//! Command-line interface definition using clap.

use std::path::PathBuf;

use activator_core::ActivationConfig;
use clap::{Parser, Subcommand};

/// Version with git hash and build date, e.g. `0.1.0 (abc1234, 2026-10-17)`.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// Activator - turns chat messages into project commands
#[derive(Parser, Debug)]
#[command(name = "activator")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to activator.json
    #[arg(short, long, env = "ACTIVATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Project root (overrides the config file)
    #[arg(short, long)]
    pub project_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Classify a message without running it
    Detect {
        #[arg(required = true)]
        message: String,
    },

    /// Run a message through the full pipeline
    Run {
        #[arg(required = true)]
        message: String,
    },

    /// Show the context a command would receive
    Context,

    /// Show persisted command history
    History {
        /// Number of most recent entries to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Show persisted metrics
    Stats,

    /// Start interactive REPL mode
    Repl,
}

impl Cli {
    /// Load the config file and apply command-line overrides.
    pub fn load_config(&self) -> activator_core::Result<ActivationConfig> {
        let mut config = match &self.config {
            Some(path) => ActivationConfig::load(path)?,
            None => ActivationConfig::load_default()?,
        };
        if let Some(root) = &self.project_root {
            config.project_root = root.to_string_lossy().into_owned();
        }
        Ok(config)
    }

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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["activator"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["activator", "run", "ai crear endpoint"]);
        assert_eq!(
            cli.command,
            Some(Commands::Run {
                message: "ai crear endpoint".into()
            })
        );
    }

    #[test]
    fn test_cli_parse_history_limit() {
        let cli = Cli::parse_from(["activator", "history", "--limit", "5"]);
        assert_eq!(cli.command, Some(Commands::History { limit: 5 }));

        let cli = Cli::parse_from(["activator", "history"]);
        assert_eq!(cli.command, Some(Commands::History { limit: 20 }));
    }

    #[test]
    fn test_cli_verbose() {
        let cli = Cli::parse_from(["activator", "-vv", "stats"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_cli_help() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_load_config_with_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("activator.json");
        std::fs::write(&path, r#"{"project_name": "taller", "project_root": "/srv/app"}"#).unwrap();

        let cli = Cli::parse_from([
            "activator",
            "--config",
            path.to_str().unwrap(),
            "--project-root",
            "/tmp/other",
            "context",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.project_name, "taller");
        assert_eq!(config.project_root, "/tmp/other");
    }
}
