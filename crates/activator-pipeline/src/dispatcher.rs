//! Routes processed commands to their handler.

use activator_models::{ExecutionResult, ProcessedCommand};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::handlers::HandlerSet;

/// Selects exactly one handler per command and invokes it once.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HandlerSet,
}

impl Dispatcher {
    pub fn new(handlers: HandlerSet) -> Self {
        Self { handlers }
    }

    /// Registered handlers.
    pub fn handlers(&self) -> &HandlerSet {
        &self.handlers
    }

    /// Invoke the handler registered for the command's category.
    ///
    /// Commands without a category go to the generic handler. Handler errors
    /// are returned unchanged; a handler that panics runs on its own task
    /// and surfaces as [`PipelineError::Task`].
    pub async fn dispatch(&self, command: &ProcessedCommand) -> Result<ExecutionResult> {
        let handler = self.handlers.handler_for(command.category).clone();
        let name = handler.name().to_string();
        debug!(handler = %name, session = %command.session_id, "Dispatching command");

        let command = command.clone();
        tokio::spawn(async move { handler.execute(&command).await })
            .await
            .map_err(|e| {
                if e.is_panic() {
                    PipelineError::Task(format!("{} handler panicked", name))
                } else {
                    PipelineError::Task(format!("{} handler was cancelled", name))
                }
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ExecutionHandler;
    use activator_models::{Category, DetectionResult, LoadedContext, MinimalContext};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ExecutionHandler for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn execute(&self, command: &ProcessedCommand) -> Result<ExecutionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ExecutionResult::succeeded(
                format!("counted {}", command.original),
                std::time::Duration::ZERO,
                0,
            ))
        }
    }

    struct Broken;

    #[async_trait]
    impl ExecutionHandler for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn execute(&self, _command: &ProcessedCommand) -> Result<ExecutionResult> {
            Err(PipelineError::Handler {
                handler: "broken".into(),
                message: "database offline".into(),
            })
        }
    }

    struct Panicking;

    #[async_trait]
    impl ExecutionHandler for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn execute(&self, _command: &ProcessedCommand) -> Result<ExecutionResult> {
            panic!("index out of range")
        }
    }

    fn command(detection: DetectionResult) -> ProcessedCommand {
        ProcessedCommand::new(
            &detection,
            LoadedContext::Minimal(MinimalContext::new("shop", "vue")),
        )
    }

    #[tokio::test]
    async fn test_dispatch_invokes_matching_handler_once() {
        let counting = Arc::new(Counting {
            calls: AtomicUsize::new(0),
        });
        let dispatcher = Dispatcher::new(
            HandlerSet::placeholders().with_handler(Some(Category::Optimization), counting.clone()),
        );

        let result = dispatcher
            .dispatch(&command(DetectionResult::natural(
                Category::Optimization,
                "optimizar el bundle",
            )))
            .await
            .unwrap();

        assert_eq!(result.message, "counted optimizar el bundle");
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_without_category_uses_generic() {
        let dispatcher = Dispatcher::default();
        let result = dispatcher
            .dispatch(&command(DetectionResult::contextual("el login del cliente")))
            .await
            .unwrap();
        assert_eq!(result.tokens_used, 150);
    }

    #[tokio::test]
    async fn test_dispatch_propagates_handler_error() {
        let dispatcher =
            Dispatcher::new(HandlerSet::placeholders().with_handler(None, Arc::new(Broken)));
        let err = dispatcher
            .dispatch(&command(DetectionResult::direct("deploy")))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Handler { .. }));
    }

    #[tokio::test]
    async fn test_dispatch_contains_handler_panic() {
        let dispatcher =
            Dispatcher::new(HandlerSet::placeholders().with_handler(None, Arc::new(Panicking)));
        let err = dispatcher
            .dispatch(&command(DetectionResult::direct("x")))
            .await
            .unwrap_err();
        match err {
            PipelineError::Task(message) => assert_eq!(message, "panicking handler panicked"),
            other => panic!("expected task error, got {:?}", other),
        }
    }
}
