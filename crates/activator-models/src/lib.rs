//! Core data models for the command activator.
//!
//! This crate provides the types that flow through the activation pipeline:
//! detection results, the project context snapshot, processed commands,
//! execution results and the redacted history entries kept per process.

pub mod command;
pub mod context;
pub mod execution;
pub mod ids;

// Re-export main types
pub use command::{Category, DetectionKind, DetectionResult, ProcessedCommand};
pub use context::{
    FileInventory, LoadedContext, MinimalContext, ProjectContext, RecentChanges, CONTEXT_FIELDS,
};
pub use execution::{ExecutionResult, HandlerDetails, HistoryEntry, COMMAND_PREVIEW_LEN};
pub use ids::SessionId;
