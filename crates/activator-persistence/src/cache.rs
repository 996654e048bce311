//! On-disk cache mirroring the command history and running metrics.
//!
//! ```text
//! <cache dir>/
//! ├── command-history.json   # last N history entries
//! └── metrics.json           # stats plus the last command and result
//! ```

use std::path::{Path, PathBuf};

use activator_models::{ExecutionResult, HistoryEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::atomic::{atomic_write_json, read_json_optional};
use crate::error::Result;
use crate::history::HistoryStats;

const HISTORY_FILE: &str = "command-history.json";
const METRICS_FILE: &str = "metrics.json";

/// Metrics written after every dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub updated_at: DateTime<Utc>,
    pub stats: HistoryStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_command: Option<HistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_result: Option<ExecutionResult>,
}

/// JSON cache files under one directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Creates a store rooted at `dir`. Nothing is touched until the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the persisted history file.
    pub fn history_file(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    /// Path of the metrics file.
    pub fn metrics_file(&self) -> PathBuf {
        self.dir.join(METRICS_FILE)
    }

    /// Loads persisted history; a missing file is an empty history.
    pub fn load_history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(read_json_optional(&self.history_file())?.unwrap_or_default())
    }

    /// Replaces the persisted history.
    pub fn save_history(&self, entries: &[HistoryEntry]) -> Result<()> {
        atomic_write_json(&self.history_file(), &entries)
    }

    /// Appends one entry, keeping at most `limit` entries on disk.
    ///
    /// A corrupt history file is replaced by a fresh one holding only
    /// `entry`. Returns the number of entries persisted.
    pub fn append_history(&self, entry: &HistoryEntry, limit: usize) -> Result<usize> {
        let mut entries = match self.load_history() {
            Ok(entries) => entries,
            Err(e) if e.is_corrupt() => Vec::new(),
            Err(e) => return Err(e),
        };
        entries.push(entry.clone());
        let excess = entries.len().saturating_sub(limit.max(1));
        entries.drain(..excess);
        self.save_history(&entries)?;
        Ok(entries.len())
    }

    /// Loads the metrics file, if present.
    pub fn load_metrics(&self) -> Result<Option<MetricsSnapshot>> {
        read_json_optional(&self.metrics_file())
    }

    /// Replaces the metrics file.
    pub fn save_metrics(&self, metrics: &MetricsSnapshot) -> Result<()> {
        atomic_write_json(&self.metrics_file(), metrics)
    }
}
