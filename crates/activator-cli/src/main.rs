//! Activator CLI entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use activator_cli::cli::{Cli, Commands};
use activator_cli::commands;
use activator_cli::repl::Repl;

fn main() {
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.load_config() {
        Ok(config) => match cli.command.clone() {
            // No command = enter REPL
            Some(Commands::Repl) | None => run_repl(&config),
            Some(cmd) => commands::execute(cmd, &config),
        },
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_repl(config: &activator_core::ActivationConfig) -> commands::Result<()> {
    let mut repl = Repl::new(config, &activator_core::state_dir())?;
    repl.run()
}
