//! Execution handlers, one per category plus a generic fallback.
//!
//! The built-in handlers are placeholders: they always succeed, report the
//! wall-clock time elapsed since the handler set was built, and return a
//! fixed token count and side-effect list per category. Real handlers
//! replace them through [`HandlerSet::with_handler`] and must keep the same
//! contract: return a well-formed result and never block indefinitely.

use std::sync::Arc;
use std::time::Instant;

use activator_models::{Category, ExecutionResult, HandlerDetails, ProcessedCommand};
use async_trait::async_trait;

use crate::error::Result;

/// Label of the handler used when no category applies.
pub const GENERIC_HANDLER: &str = "generic";

/// Executes a processed command.
#[async_trait]
pub trait ExecutionHandler: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Run the command and describe the outcome.
    async fn execute(&self, command: &ProcessedCommand) -> Result<ExecutionResult>;
}

/// Fixed-output handler for one category (`None` = generic).
#[derive(Debug, Clone)]
pub struct PlaceholderHandler {
    category: Option<Category>,
    started: Instant,
}

impl PlaceholderHandler {
    /// Create a placeholder measuring time from `started`.
    pub fn new(category: Option<Category>, started: Instant) -> Self {
        Self { category, started }
    }

    fn succeeded(&self, message: String) -> ExecutionResult {
        ExecutionResult::succeeded(
            message,
            self.started.elapsed(),
            Self::tokens_for(self.category),
        )
    }

    /// Tokens reported per category.
    pub fn tokens_for(category: Option<Category>) -> u64 {
        match category {
            Some(Category::Development) => 250,
            Some(Category::Debugging) => 400,
            Some(Category::Optimization) => 300,
            Some(Category::Testing) => 200,
            Some(Category::Documentation) => 350,
            None => 150,
        }
    }
}

#[async_trait]
impl ExecutionHandler for PlaceholderHandler {
    fn name(&self) -> &str {
        self.category.map(|c| c.label()).unwrap_or(GENERIC_HANDLER)
    }

    async fn execute(&self, command: &ProcessedCommand) -> Result<ExecutionResult> {
        let text = &command.original;

        let result = match self.category {
            Some(Category::Development) => self
                .succeeded(format!("Development task completed: {}", text))
                .with_files(["src/components/GeneratedComponent.vue", "src/router/index.js"])
                .with_details(HandlerDetails::Development),
            Some(Category::Debugging) => self
                .succeeded(format!("Issue resolved: {}", text))
                .with_files(["src/utils/errorHandler.js"])
                .with_details(HandlerDetails::Debugging { error_fixed: true }),
            Some(Category::Optimization) => self
                .succeeded(format!("Optimization applied: {}", text))
                .with_files(["vite.config.js"])
                .with_details(HandlerDetails::Optimization {
                    performance_gain: "25%".to_string(),
                }),
            Some(Category::Testing) => self
                .succeeded(format!("Tests generated: {}", text))
                .with_files(["tests/unit/generated.spec.js"])
                .with_details(HandlerDetails::Testing {
                    tests_run: 12,
                    tests_passed: 12,
                }),
            Some(Category::Documentation) => self
                .succeeded(format!("Documentation updated: {}", text))
                .with_files(["README.md"])
                .with_details(HandlerDetails::Documentation {
                    docs_generated: vec!["README.md".to_string(), "docs/API.md".to_string()],
                }),
            None => self
                .succeeded(format!("Command processed: {}", text))
                .with_details(HandlerDetails::Generic),
        };

        Ok(result)
    }
}

/// Total mapping from category to handler.
#[derive(Clone)]
pub struct HandlerSet {
    development: Arc<dyn ExecutionHandler>,
    debugging: Arc<dyn ExecutionHandler>,
    optimization: Arc<dyn ExecutionHandler>,
    testing: Arc<dyn ExecutionHandler>,
    documentation: Arc<dyn ExecutionHandler>,
    generic: Arc<dyn ExecutionHandler>,
}

impl Default for HandlerSet {
    fn default() -> Self {
        Self::placeholders()
    }
}

impl HandlerSet {
    /// Placeholder handlers sharing one construction instant.
    pub fn placeholders() -> Self {
        let started = Instant::now();
        let make = |category| -> Arc<dyn ExecutionHandler> {
            Arc::new(PlaceholderHandler::new(category, started))
        };

        Self {
            development: make(Some(Category::Development)),
            debugging: make(Some(Category::Debugging)),
            optimization: make(Some(Category::Optimization)),
            testing: make(Some(Category::Testing)),
            documentation: make(Some(Category::Documentation)),
            generic: make(None),
        }
    }

    /// Replace the handler for a category (`None` = generic).
    pub fn with_handler(
        mut self,
        category: Option<Category>,
        handler: Arc<dyn ExecutionHandler>,
    ) -> Self {
        *self.slot_mut(category) = handler;
        self
    }

    /// Handler for a category; absent category routes to the generic handler.
    pub fn handler_for(&self, category: Option<Category>) -> &Arc<dyn ExecutionHandler> {
        match category {
            Some(Category::Development) => &self.development,
            Some(Category::Debugging) => &self.debugging,
            Some(Category::Optimization) => &self.optimization,
            Some(Category::Testing) => &self.testing,
            Some(Category::Documentation) => &self.documentation,
            None => &self.generic,
        }
    }

    fn slot_mut(&mut self, category: Option<Category>) -> &mut Arc<dyn ExecutionHandler> {
        match category {
            Some(Category::Development) => &mut self.development,
            Some(Category::Debugging) => &mut self.debugging,
            Some(Category::Optimization) => &mut self.optimization,
            Some(Category::Testing) => &mut self.testing,
            Some(Category::Documentation) => &mut self.documentation,
            None => &mut self.generic,
        }
    }
}
