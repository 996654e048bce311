//! Command handlers for CLI subcommands.

use std::sync::Arc;

use activator_core::{cache_dir, ActivationConfig, CommandDetector};
use activator_models::{DetectionKind, HistoryEntry};
use activator_persistence::{CacheStore, HistoryLog, HistoryStats};
use activator_pipeline::{CommandPipeline, JsonCacheSink, PipelineOutcome};
use tracing::{debug, warn};

use crate::cli::Commands;

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command.
pub fn execute(command: Commands, config: &ActivationConfig) -> Result<()> {
    let store = CacheStore::new(cache_dir());

    match command {
        Commands::Detect { message } => cmd_detect(config, &message),
        Commands::Run { message } => cmd_run(config, &store, &message),
        Commands::Context => cmd_context(config, &store),
        Commands::History { limit } => cmd_history(&store, limit),
        Commands::Stats => cmd_stats(&store),
        Commands::Repl => {
            // REPL is handled separately in main
            Ok(())
        }
    }
}

/// History seeded from the cache so context sees commands from earlier runs.
///
/// An unreadable or corrupt cache starts an empty history; the next recorded
/// command rewrites the file.
pub fn seeded_history(config: &ActivationConfig, store: &CacheStore) -> Result<HistoryLog> {
    let history = HistoryLog::with_capacity(config.history_limit);
    let persisted = match store.load_history() {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Ignoring unusable history cache");
            Vec::new()
        }
    };
    debug!(entries = persisted.len(), "Seeding history from cache");
    for entry in persisted {
        history.append(entry)?;
    }
    Ok(history)
}

/// Pipeline that mirrors every run into the JSON cache.
pub fn build_pipeline(config: &ActivationConfig, store: &CacheStore) -> Result<CommandPipeline> {
    let history = seeded_history(config, store)?;
    let sink = JsonCacheSink::new(store.clone(), config.history_limit);
    Ok(CommandPipeline::from_config(config, history)?.with_sink(Arc::new(sink)))
}

fn cmd_detect(config: &ActivationConfig, message: &str) -> Result<()> {
    let detector = CommandDetector::from_config(config)?;
    let detection = detector.detect(message);
    println!("{}", serde_json::to_string_pretty(&detection)?);
    Ok(())
}

fn cmd_run(config: &ActivationConfig, store: &CacheStore, message: &str) -> Result<()> {
    let pipeline = build_pipeline(config, store)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(pipeline.handle_message(message));
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn cmd_context(config: &ActivationConfig, store: &CacheStore) -> Result<()> {
    let pipeline = build_pipeline(config, store)?;
    let runtime = tokio::runtime::Runtime::new()?;
    let context = runtime.block_on(pipeline.loader().load());
    println!("{}", serde_json::to_string_pretty(&context)?);
    Ok(())
}

fn cmd_history(store: &CacheStore, limit: usize) -> Result<()> {
    let entries = store.load_history()?;
    if entries.is_empty() {
        println!("No commands recorded.");
        return Ok(());
    }

    let skip = entries.len().saturating_sub(limit);
    for entry in &entries[skip..] {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

fn cmd_stats(store: &CacheStore) -> Result<()> {
    match store.load_metrics()? {
        Some(metrics) => {
            println!("{}", format_stats(&metrics.stats));
            println!("Updated: {}", metrics.updated_at.format("%Y-%m-%d %H:%M:%S"));
            if let Some(last) = metrics.last_command {
                println!("Last:    {}", format_entry(&last));
            }
        }
        None => println!("No metrics recorded."),
    }
    Ok(())
}

/// One history line: time, status, kind/category, tokens, duration, text.
pub fn format_entry(entry: &HistoryEntry) -> String {
    let status = if entry.success { "ok  " } else { "FAIL" };
    let route = match entry.category {
        Some(category) => format!("{}/{}", entry.kind, category),
        None => entry.kind.to_string(),
    };
    format!(
        "{}  {}  {:<24} {:>5} tok {:>6}ms  {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        status,
        route,
        entry.tokens_used,
        entry.execution_time_ms,
        entry.command
    )
}

/// Multi-line summary of history statistics.
pub fn format_stats(stats: &HistoryStats) -> String {
    let mut out = format!(
        "Commands: {} ({} ok, {} failed, {:.0}% success)\n\
         Average:  {:.1}ms\n\
         Tokens:   {}",
        stats.total,
        stats.successful,
        stats.failed,
        stats.success_rate * 100.0,
        stats.average_execution_ms,
        stats.total_tokens
    );
    for (category, count) in &stats.by_category {
        out.push_str(&format!("\n  {:<14} {}", category, count));
    }
    out
}

/// Short human-readable rendering of a pipeline outcome.
pub fn format_outcome(outcome: &PipelineOutcome) -> String {
    match outcome {
        PipelineOutcome::NotCommand { .. } => "(not a command)".to_string(),
        PipelineOutcome::Completed {
            command, result, ..
        } => {
            let route = match (command.kind, command.category) {
                (_, Some(category)) => category.to_string(),
                (DetectionKind::Direct, None) => "direct".to_string(),
                (_, None) => "generic".to_string(),
            };
            let mut out = format!(
                "[{}] {} ({} tokens, {}ms)",
                route, result.message, result.tokens_used, result.execution_time_ms
            );
            if command.context.is_minimal() {
                out.push_str("\n  note: project context unavailable, used minimal context");
            }
            if let Some(files) = &result.files_modified {
                for file in files {
                    out.push_str(&format!("\n  ~ {}", file));
                }
            }
            out
        }
        PipelineOutcome::Failed { result, .. } => {
            let mut out = result.message.clone();
            if let Some(suggestion) = &result.suggestion {
                out.push_str(&format!("\n  hint: {}", suggestion));
            }
            out
        }
    }
}
