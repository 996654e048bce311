//! Error types for detection, configuration and context loading.

use std::path::PathBuf;

use activator_persistence::PersistenceError;
use thiserror::Error;

/// Errors raised by the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape.
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A catalog pattern failed to compile.
    #[error("invalid pattern for {category}: {source}")]
    InvalidPattern {
        category: String,
        #[source]
        source: regex::Error,
    },

    /// The file store cannot be reached at all.
    #[error("file store unavailable: {0}")]
    StoreUnavailable(String),

    /// A single resource read failed for a reason other than absence.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The project inventory could not be produced.
    #[error("inventory failed: {0}")]
    Inventory(String),

    /// The history log could not be read.
    #[error("history unavailable: {0}")]
    History(#[from] PersistenceError),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
