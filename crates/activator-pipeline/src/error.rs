//! Error types for the pipeline.

use thiserror::Error;

/// Errors raised while dispatching or recording a command.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A handler reported a failure.
    #[error("{handler} handler failed: {message}")]
    Handler {
        /// Handler name.
        handler: String,
        /// Error message.
        message: String,
    },

    /// A handler returned a result that is not well formed.
    #[error("malformed result from {handler} handler: {reason}")]
    MalformedResult { handler: String, reason: String },

    /// Detector or loader could not be built.
    #[error("setup error: {0}")]
    Setup(#[from] activator_core::CoreError),

    /// History or cache error.
    #[error("persistence error: {0}")]
    Persistence(#[from] activator_persistence::PersistenceError),

    /// Background task failed to complete.
    #[error("task failed: {0}")]
    Task(String),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
