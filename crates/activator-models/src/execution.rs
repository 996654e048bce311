//! Execution results and history entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::command::{Category, DetectionKind, ProcessedCommand};

/// Maximum number of characters of command text kept in a history entry.
pub const COMMAND_PREVIEW_LEN: usize = 120;

/// Handler-specific fields of an execution result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "handler", rename_all = "snake_case")]
pub enum HandlerDetails {
    Development,
    Debugging {
        error_fixed: bool,
    },
    Optimization {
        performance_gain: String,
    },
    Testing {
        tests_run: u32,
        tests_passed: u32,
    },
    Documentation {
        docs_generated: Vec<String>,
    },
    Generic,
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the handler completed.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
    /// Wall-clock time reported by the handler, in milliseconds.
    pub execution_time_ms: u64,
    /// Tokens spent by the handler.
    pub tokens_used: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_modified: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Guidance shown to the user when the run failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HandlerDetails>,
}

impl ExecutionResult {
    /// Creates a successful result.
    pub fn succeeded(
        message: impl Into<String>,
        execution_time: Duration,
        tokens_used: u64,
    ) -> Self {
        Self {
            success: true,
            message: message.into(),
            execution_time_ms: duration_ms(execution_time),
            tokens_used,
            files_modified: None,
            error: None,
            suggestion: None,
            details: None,
        }
    }

    /// Creates a failed result carrying an error and a suggestion.
    pub fn failed(
        error: impl Into<String>,
        suggestion: impl Into<String>,
        execution_time: Duration,
    ) -> Self {
        let error = error.into();
        Self {
            success: false,
            message: format!("Command failed: {}", error),
            execution_time_ms: duration_ms(execution_time),
            tokens_used: 0,
            files_modified: None,
            error: Some(error),
            suggestion: Some(suggestion.into()),
            details: None,
        }
    }

    /// Sets the list of modified files.
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files_modified = Some(files.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the handler-specific details.
    pub fn with_details(mut self, details: HandlerDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Reported execution time.
    pub fn execution_time(&self) -> Duration {
        Duration::from_millis(self.execution_time_ms)
    }

    /// Checks that the result is well formed.
    ///
    /// A success must not carry an error, a failure must explain itself, and
    /// every result needs a message.
    pub fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("result message is empty".to_string());
        }
        match (self.success, self.error.as_deref()) {
            (true, Some(err)) => Err(format!("successful result carries an error: {}", err)),
            (false, None) => Err("failed result carries no error".to_string()),
            (false, Some(err)) if err.trim().is_empty() => {
                Err("failed result carries an empty error".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// Redacted record of one dispatch, kept in the process history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    /// Command text, truncated to [`COMMAND_PREVIEW_LEN`] characters.
    pub command: String,
    #[serde(rename = "type")]
    pub kind: DetectionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub success: bool,
    pub execution_time_ms: u64,
    pub tokens_used: u64,
    #[serde(default)]
    pub files_modified: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl HistoryEntry {
    /// Builds the redacted entry for a finished dispatch.
    ///
    /// The context snapshot and session metadata are dropped.
    pub fn from_outcome(command: &ProcessedCommand, result: &ExecutionResult) -> Self {
        Self {
            timestamp: Utc::now(),
            command: preview(&command.original),
            kind: command.kind,
            category: command.category,
            success: result.success,
            execution_time_ms: result.execution_time_ms,
            tokens_used: result.tokens_used,
            files_modified: result.files_modified.clone().unwrap_or_default(),
            error_message: result.error.clone(),
        }
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > COMMAND_PREVIEW_LEN {
        let head: String = text.chars().take(COMMAND_PREVIEW_LEN - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
