//! End-to-end command pipeline.
//!
//! ```text
//! Idle ──► ContextLoading ──► Dispatching ──► Logging ──► Done
//!                                  │              │
//!                                  └──────────────┴──► Failed
//! ```
//!
//! Non-commands never leave `Idle`. Context loading cannot fail: a broken
//! store degrades to the minimal context. Handler errors, malformed results
//! and history failures end in `Failed` with a failure result; nothing is
//! appended to the history on that path.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use activator_core::{ActivationConfig, CommandDetector, ContextLoader};
use activator_models::{DetectionResult, ExecutionResult, HistoryEntry, ProcessedCommand};
use activator_persistence::HistoryLog;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::error::{PipelineError, Result};
use crate::handlers::HandlerSet;
use crate::logger::{ExecutionLogger, MetricsSink, TracingSink};

/// Suggestion attached to every failure result.
pub const FAILURE_SUGGESTION: &str =
    "Try rephrasing the request, or prefix it with \"ai \" to run it as a direct command.";

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    ContextLoading,
    Dispatching,
    Logging,
    Done,
    Failed,
}

impl PipelineState {
    /// Whether `next` may follow `self`.
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, ContextLoading)
                | (ContextLoading, Dispatching)
                | (Dispatching, Logging)
                | (Dispatching, Failed)
                | (Logging, Done)
                | (Logging, Failed)
        )
    }

    /// `Done` and `Failed` end a run.
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::ContextLoading => "context_loading",
            PipelineState::Dispatching => "dispatching",
            PipelineState::Logging => "logging",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Result of running one message through the pipeline.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// The message is ordinary chat; nothing ran.
    NotCommand { detection: DetectionResult },
    /// The handler ran and the history was updated.
    Completed {
        command: ProcessedCommand,
        result: ExecutionResult,
        entry: HistoryEntry,
        trace: Vec<PipelineState>,
    },
    /// Dispatch or logging failed.
    Failed {
        detection: DetectionResult,
        result: ExecutionResult,
        trace: Vec<PipelineState>,
    },
}

impl PipelineOutcome {
    /// Execution result, if a command was attempted.
    pub fn result(&self) -> Option<&ExecutionResult> {
        match self {
            PipelineOutcome::NotCommand { .. } => None,
            PipelineOutcome::Completed { result, .. } | PipelineOutcome::Failed { result, .. } => {
                Some(result)
            }
        }
    }

    pub fn is_command(&self) -> bool {
        !matches!(self, PipelineOutcome::NotCommand { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Completed { .. })
    }

    /// States visited, starting at `Idle`.
    pub fn trace(&self) -> &[PipelineState] {
        match self {
            PipelineOutcome::NotCommand { .. } => &[PipelineState::Idle],
            PipelineOutcome::Completed { trace, .. } | PipelineOutcome::Failed { trace, .. } => {
                trace
            }
        }
    }

    /// Final state of the run.
    pub fn final_state(&self) -> PipelineState {
        self.trace().last().copied().unwrap_or(PipelineState::Idle)
    }
}

/// Detector, context loader, dispatcher and logger wired together.
#[derive(Clone)]
pub struct CommandPipeline {
    detector: CommandDetector,
    loader: ContextLoader,
    dispatcher: Dispatcher,
    logger: ExecutionLogger,
}

impl CommandPipeline {
    pub fn new(
        detector: CommandDetector,
        loader: ContextLoader,
        dispatcher: Dispatcher,
        logger: ExecutionLogger,
    ) -> Self {
        Self {
            detector,
            loader,
            dispatcher,
            logger,
        }
    }

    /// Pipeline with placeholder handlers and a tracing sink.
    pub fn from_config(config: &ActivationConfig, history: HistoryLog) -> Result<Self> {
        let detector = CommandDetector::from_config(config)?;
        let loader = ContextLoader::from_config(config, history.clone());
        let logger = ExecutionLogger::new(history).with_sink(Arc::new(TracingSink));
        Ok(Self::new(
            detector,
            loader,
            Dispatcher::new(HandlerSet::placeholders()),
            logger,
        ))
    }

    /// Register an additional metrics sink.
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.logger = self.logger.with_sink(sink);
        self
    }

    /// Replace the handler set.
    pub fn with_handlers(mut self, handlers: HandlerSet) -> Self {
        self.dispatcher = Dispatcher::new(handlers);
        self
    }

    pub fn detector(&self) -> &CommandDetector {
        &self.detector
    }

    pub fn loader(&self) -> &ContextLoader {
        &self.loader
    }

    pub fn history(&self) -> &HistoryLog {
        self.logger.history()
    }

    /// Classify a message without running it.
    pub fn detect(&self, message: &str) -> DetectionResult {
        self.detector.detect(message)
    }

    /// Detect and, for commands, run the whole pipeline.
    pub async fn handle_message(&self, message: &str) -> PipelineOutcome {
        let detection = self.detector.detect(message);
        if !detection.is_command {
            debug!("Message is not a command");
            return PipelineOutcome::NotCommand { detection };
        }
        self.process_command(detection).await
    }

    /// Run an already detected command through context loading, dispatch and logging.
    pub async fn process_command(&self, detection: DetectionResult) -> PipelineOutcome {
        if !detection.is_command {
            return PipelineOutcome::NotCommand { detection };
        }

        let started = Instant::now();
        let mut run = Run::new();

        run.advance(PipelineState::ContextLoading);
        let context = self.loader.load().await;
        let command = ProcessedCommand::new(&detection, context);
        run.session = Some(command.session_id.to_string());

        run.advance(PipelineState::Dispatching);
        let result = match self.dispatch_checked(&command).await {
            Ok(result) => result,
            Err(e) => return run.fail(detection, &e, started),
        };

        run.advance(PipelineState::Logging);
        let entry = match self.logger.record(&command, &result).await {
            Ok(entry) => entry,
            Err(e) => return run.fail(detection, &e, started),
        };

        run.advance(PipelineState::Done);
        info!(
            session = %command.session_id,
            kind = ?command.kind,
            tokens = result.tokens_used,
            execution_ms = result.execution_time_ms,
            "Command completed"
        );

        PipelineOutcome::Completed {
            command,
            result,
            entry,
            trace: run.trace,
        }
    }

    async fn dispatch_checked(&self, command: &ProcessedCommand) -> Result<ExecutionResult> {
        let result = self.dispatcher.dispatch(command).await?;
        result.validate().map_err(|reason| PipelineError::MalformedResult {
            handler: self
                .dispatcher
                .handlers()
                .handler_for(command.category)
                .name()
                .to_string(),
            reason,
        })?;
        Ok(result)
    }
}

/// Visited states of one run.
struct Run {
    trace: Vec<PipelineState>,
    session: Option<String>,
}

impl Run {
    fn new() -> Self {
        Self {
            trace: vec![PipelineState::Idle],
            session: None,
        }
    }

    fn current(&self) -> PipelineState {
        self.trace.last().copied().unwrap_or(PipelineState::Idle)
    }

    fn advance(&mut self, next: PipelineState) {
        let current = self.current();
        debug_assert!(
            current.can_transition_to(next),
            "invalid transition {} -> {}",
            current,
            next
        );
        debug!(
            session = self.session.as_deref().unwrap_or("-"),
            from = %current,
            to = %next,
            "Pipeline transition"
        );
        self.trace.push(next);
    }

    fn fail(
        mut self,
        detection: DetectionResult,
        error: &PipelineError,
        started: Instant,
    ) -> PipelineOutcome {
        warn!(
            session = self.session.as_deref().unwrap_or("-"),
            state = %self.current(),
            error = %error,
            "Command failed"
        );
        self.advance(PipelineState::Failed);
        PipelineOutcome::Failed {
            detection,
            result: ExecutionResult::failed(
                error.to_string(),
                FAILURE_SUGGESTION,
                started.elapsed(),
            ),
            trace: self.trace,
        }
    }
}
