//! Execution logger and metrics sinks.
//!
//! Every completed dispatch is appended to the in-process [`HistoryLog`] and
//! then forwarded to each registered [`MetricsSink`]. Sink failures are
//! logged and never reach the caller.

use std::sync::Arc;

use activator_models::{ExecutionResult, HistoryEntry, ProcessedCommand};
use activator_persistence::{CacheStore, HistoryLog, HistoryStats, MetricsSnapshot};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};

/// Receives a copy of every history entry.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Sink name used in logs.
    fn name(&self) -> &str;

    /// Record one finished dispatch.
    async fn record(&self, entry: &HistoryEntry, result: &ExecutionResult) -> Result<()>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl MetricsSink for NullSink {
    fn name(&self) -> &str {
        "null"
    }

    async fn record(&self, _entry: &HistoryEntry, _result: &ExecutionResult) -> Result<()> {
        Ok(())
    }
}

/// Emits one structured `info` event per dispatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl MetricsSink for TracingSink {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn record(&self, entry: &HistoryEntry, result: &ExecutionResult) -> Result<()> {
        info!(
            kind = ?entry.kind,
            category = entry.category.map(|c| c.label()).unwrap_or("generic"),
            success = entry.success,
            execution_ms = entry.execution_time_ms,
            tokens = entry.tokens_used,
            files = entry.files_modified.len(),
            message = %result.message,
            "Command executed"
        );
        Ok(())
    }
}

/// Mirrors history and metrics into the JSON cache directory.
#[derive(Debug, Clone)]
pub struct JsonCacheSink {
    store: CacheStore,
    limit: usize,
}

impl JsonCacheSink {
    /// Keep at most `limit` entries in `command-history.json`.
    pub fn new(store: CacheStore, limit: usize) -> Self {
        Self {
            store,
            limit: limit.max(1),
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }
}

#[async_trait]
impl MetricsSink for JsonCacheSink {
    fn name(&self) -> &str {
        "json-cache"
    }

    async fn record(&self, entry: &HistoryEntry, result: &ExecutionResult) -> Result<()> {
        let store = self.store.clone();
        let limit = self.limit;
        let entry = entry.clone();
        let result = result.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            store.append_history(&entry, limit)?;
            let persisted = store.load_history()?;
            let snapshot = MetricsSnapshot {
                updated_at: Utc::now(),
                stats: HistoryStats::from_entries(&persisted),
                last_command: Some(entry),
                last_result: Some(result),
            };
            store.save_metrics(&snapshot)?;
            debug!(entries = persisted.len(), dir = %store.dir().display(), "Cache updated");
            Ok(())
        })
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?
    }
}

/// Appends finished dispatches to the history and fans them out to sinks.
#[derive(Clone)]
pub struct ExecutionLogger {
    history: HistoryLog,
    sinks: Vec<Arc<dyn MetricsSink>>,
}

impl ExecutionLogger {
    /// Logger with no sinks.
    pub fn new(history: HistoryLog) -> Self {
        Self {
            history,
            sinks: Vec::new(),
        }
    }

    /// Register an additional sink.
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Append the redacted entry to the history, then notify every sink.
    ///
    /// Only the history append can fail.
    pub async fn record(
        &self,
        command: &ProcessedCommand,
        result: &ExecutionResult,
    ) -> Result<HistoryEntry> {
        let entry = HistoryEntry::from_outcome(command, result);
        let len = self.history.append(entry.clone())?;
        debug!(history_len = len, session = %command.session_id, "History entry appended");

        for sink in &self.sinks {
            if let Err(e) = sink.record(&entry, result).await {
                warn!(sink = sink.name(), error = %e, "Metrics sink failed");
            }
        }

        Ok(entry)
    }
}
