//! Persistence layer for the command activator.
//!
//! This crate owns the process-wide command history and the cache files
//! that mirror it on disk. Files are written atomically (temp file, then
//! rename) so a crash never leaves a half-written cache behind.
//!
//! # Example
//!
//! ```no_run
//! use activator_persistence::{CacheStore, HistoryLog};
//!
//! let history = HistoryLog::with_capacity(100);
//! let cache = CacheStore::new("/tmp/activator/cache");
//!
//! let entries = history.snapshot().unwrap();
//! cache.save_history(&entries).unwrap();
//! ```

pub mod atomic;
pub mod cache;
pub mod error;
pub mod history;

pub use cache::{CacheStore, MetricsSnapshot};
pub use error::{PersistenceError, Result};
pub use history::{HistoryLog, HistoryStats, GENERIC_CATEGORY};
