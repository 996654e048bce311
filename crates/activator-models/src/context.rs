//! Project context snapshot types.
//!
//! The context is rebuilt for every command. Individual resources may be
//! missing; when the whole load fails a [`MinimalContext`] stands in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::execution::HistoryEntry;

/// Project area -> category -> ordered file names.
pub type FileInventory = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Names of the optional context resources, in load order.
pub const CONTEXT_FIELDS: &[&str] = &[
    "project_rules",
    "user_rules",
    "master_prompt",
    "session_tracker",
    "quick_commands",
    "error_patterns",
    "system_config",
];

/// Recent activity in the project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentChanges {
    /// Newest modification time among the recent files.
    pub last_modified: DateTime<Utc>,
    /// Most recently modified files, newest first.
    pub recent_files: Vec<String>,
    /// Copy of the last history entries at load time, oldest first.
    pub recent_commands: Vec<HistoryEntry>,
}

impl Default for RecentChanges {
    fn default() -> Self {
        Self {
            last_modified: Utc::now(),
            recent_files: Vec::new(),
            recent_commands: Vec::new(),
        }
    }
}

/// Full project context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_rules: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rules: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_tracker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quick_commands: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_patterns: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_config: Option<serde_json::Value>,
    /// Snapshot of the project file inventory.
    #[serde(default)]
    pub current_files: FileInventory,
    /// Recent activity.
    #[serde(default)]
    pub recent_changes: RecentChanges,
}

impl ProjectContext {
    /// Names of the optional resources that could not be loaded.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            self.project_rules.is_some(),
            self.user_rules.is_some(),
            self.master_prompt.is_some(),
            self.session_tracker.is_some(),
            self.quick_commands.is_some(),
            self.error_patterns.is_some(),
            self.system_config.is_some(),
        ];

        CONTEXT_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Total number of files in the inventory.
    pub fn file_count(&self) -> usize {
        self.current_files
            .values()
            .flat_map(|categories| categories.values())
            .map(Vec::len)
            .sum()
    }
}

/// Degraded context used when the full load fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimalContext {
    /// Project identity.
    pub project: String,
    /// Stack description.
    pub stack: String,
    /// When the fallback was produced.
    pub timestamp: DateTime<Utc>,
}

impl MinimalContext {
    /// Creates a minimal context stamped with the current time.
    pub fn new(project: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            stack: stack.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Either a full or a degraded context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LoadedContext {
    /// All sources reachable (individual fields may still be absent).
    Full(ProjectContext),
    /// The aggregate load failed.
    Minimal(MinimalContext),
}

impl LoadedContext {
    /// Returns true for the degraded variant.
    pub fn is_minimal(&self) -> bool {
        matches!(self, Self::Minimal(_))
    }

    /// Returns the full context, if available.
    pub fn as_full(&self) -> Option<&ProjectContext> {
        match self {
            Self::Full(ctx) => Some(ctx),
            Self::Minimal(_) => None,
        }
    }
}
