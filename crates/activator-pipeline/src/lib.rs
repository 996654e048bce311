//! Activator Pipeline - runs detected commands end to end.
//!
//! - **handlers**: Execution handlers, one per category plus a generic fallback
//! - **dispatcher**: Routes a processed command to its handler
//! - **logger**: History recording and metrics sinks
//! - **pipeline**: The `Idle → ContextLoading → Dispatching → Logging → Done` state machine

pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod logger;
pub mod pipeline;

pub use dispatcher::Dispatcher;
pub use error::{PipelineError, Result};
pub use handlers::{ExecutionHandler, HandlerSet, PlaceholderHandler, GENERIC_HANDLER};
pub use logger::{ExecutionLogger, JsonCacheSink, MetricsSink, NullSink, TracingSink};
pub use pipeline::{CommandPipeline, PipelineOutcome, PipelineState, FAILURE_SUGGESTION};
