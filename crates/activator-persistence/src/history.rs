//! Append-only command history.
//!
//! The log is created once by the host and handed to every component that
//! needs it. Clones share the same storage. Appends take a write lock, so
//! concurrent pipeline runs are serialized here rather than by the caller.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, RwLock};

use activator_models::HistoryEntry;
use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, Result};

/// Label used in statistics for commands without a category.
pub const GENERIC_CATEGORY: &str = "generic";

/// Shared, capacity-bounded history of dispatched commands.
///
/// When the capacity is reached the oldest entry is evicted.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    entries: Arc<RwLock<VecDeque<HistoryEntry>>>,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryLog {
    /// Default number of entries kept.
    pub const DEFAULT_CAPACITY: usize = 500;

    /// Creates an empty log with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates an empty log holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    /// Maximum number of entries kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends an entry, returning the new length.
    pub fn append(&self, entry: HistoryEntry) -> Result<usize> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| PersistenceError::LockPoisoned(e.to_string()))?;

        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
        Ok(entries.len())
    }

    /// Copy of the last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Result<Vec<HistoryEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| PersistenceError::LockPoisoned(e.to_string()))?;

        let skip = entries.len().saturating_sub(n);
        Ok(entries.iter().skip(skip).cloned().collect())
    }

    /// Copy of every entry, oldest first.
    pub fn snapshot(&self) -> Result<Vec<HistoryEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| PersistenceError::LockPoisoned(e.to_string()))?;
        Ok(entries.iter().cloned().collect())
    }

    /// Number of entries.
    ///
    /// A poisoned lock still reports the entries it holds; appends never
    /// leave the deque half-updated.
    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Aggregate statistics over the current entries.
    pub fn stats(&self) -> Result<HistoryStats> {
        Ok(HistoryStats::from_entries(&self.snapshot()?))
    }

    /// Removes every entry.
    pub fn clear(&self) -> Result<()> {
        self.entries
            .write()
            .map_err(|e| PersistenceError::LockPoisoned(e.to_string()))?
            .clear();
        Ok(())
    }
}

/// Summary of a set of history entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Fraction of successful entries, 0.0 when empty.
    pub success_rate: f64,
    pub average_execution_ms: f64,
    pub total_tokens: u64,
    /// Entry count per category label.
    pub by_category: BTreeMap<String, usize>,
}

impl HistoryStats {
    /// Builds statistics from entries.
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        if entries.is_empty() {
            return Self::default();
        }

        let total = entries.len();
        let successful = entries.iter().filter(|e| e.success).count();
        let total_ms: u64 = entries.iter().map(|e| e.execution_time_ms).sum();
        let total_tokens = entries.iter().map(|e| e.tokens_used).sum();

        let mut by_category = BTreeMap::new();
        for entry in entries {
            let label = entry
                .category
                .map(|c| c.label())
                .unwrap_or(GENERIC_CATEGORY);
            *by_category.entry(label.to_string()).or_insert(0) += 1;
        }

        Self {
            total,
            successful,
            failed: total - successful,
            success_rate: successful as f64 / total as f64,
            average_execution_ms: total_ms as f64 / total as f64,
            total_tokens,
            by_category,
        }
    }
}
