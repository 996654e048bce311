//! Error types for the history log and cache files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the history log and the cache store.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cache file exists but does not hold the expected JSON.
    #[error("invalid JSON in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode JSON: {0}")]
    Encode(#[from] serde_json::Error),

    /// A writer panicked while holding the history lock.
    #[error("history lock poisoned: {0}")]
    LockPoisoned(String),
}

impl PersistenceError {
    /// Whether the error means a cache file is corrupt rather than unreachable.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, PersistenceError::InvalidJson { .. })
    }
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
