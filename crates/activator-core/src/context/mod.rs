//! Project context assembly.
//!
//! Every command gets a fresh snapshot of the project: rule documents, cache
//! files, JSON config, the file inventory and recent activity. Each resource
//! is read independently and a failed read only blanks that field. When the
//! load fails as a whole (store unreachable, inventory failure, history
//! unreadable) the loader degrades to a [`MinimalContext`]. `load` itself
//! never fails.

mod inventory;
mod store;

use std::path::Path;
use std::sync::Arc;

use activator_models::{LoadedContext, MinimalContext, ProjectContext, RecentChanges};
use activator_persistence::HistoryLog;
use chrono::Utc;
use tracing::{debug, warn};

pub use self::inventory::{
    DirectoryInventory, InventoryScan, ProjectInventory, RecentFile, StaticInventory,
    ROOT_CATEGORY,
};
pub use self::store::{FileStore, FsFileStore};

use crate::config::{ActivationConfig, InventoryMode, ResourcePaths};
use crate::error::Result;

/// Number of history entries copied into the context.
pub const RECENT_COMMANDS: usize = 5;

/// Number of recently modified files listed in the context.
pub const RECENT_FILES: usize = 10;

/// Builds [`LoadedContext`] snapshots from external collaborators.
#[derive(Clone)]
pub struct ContextLoader {
    store: Arc<dyn FileStore>,
    inventory: Arc<dyn ProjectInventory>,
    history: HistoryLog,
    resources: ResourcePaths,
    project: String,
    stack: String,
}

impl ContextLoader {
    /// Create a loader with default resource paths and identity.
    pub fn new(
        store: Arc<dyn FileStore>,
        inventory: Arc<dyn ProjectInventory>,
        history: HistoryLog,
    ) -> Self {
        let defaults = ActivationConfig::default();
        Self {
            store,
            inventory,
            history,
            resources: defaults.resources,
            project: defaults.project_name,
            stack: defaults.stack,
        }
    }

    /// Create a loader reading from the configured project root.
    pub fn from_config(config: &ActivationConfig, history: HistoryLog) -> Self {
        let root = config.project_root();
        let inventory: Arc<dyn ProjectInventory> = match config.inventory.mode {
            InventoryMode::Scan => Arc::new(DirectoryInventory::new(
                root.clone(),
                config.inventory.areas.clone(),
                config.inventory.max_depth,
            )),
            InventoryMode::Static => {
                Arc::new(StaticInventory::new(config.inventory.snapshot.clone()))
            }
        };

        Self::new(Arc::new(FsFileStore::new(root)), inventory, history)
            .with_resources(config.resources.clone())
            .with_identity(&config.project_name, &config.stack)
    }

    /// Override the resource locations.
    pub fn with_resources(mut self, resources: ResourcePaths) -> Self {
        self.resources = resources;
        self
    }

    /// Override the identity reported by the minimal context.
    pub fn with_identity(mut self, project: impl Into<String>, stack: impl Into<String>) -> Self {
        self.project = project.into();
        self.stack = stack.into();
        self
    }

    /// Load the context, degrading to the minimal variant on aggregate failure.
    pub async fn load(&self) -> LoadedContext {
        match self.load_full().await {
            Ok(context) => {
                debug!(
                    missing = ?context.missing_fields(),
                    files = context.file_count(),
                    "Loaded project context"
                );
                LoadedContext::Full(context)
            }
            Err(e) => {
                warn!(error = %e, "Context load failed, using minimal context");
                LoadedContext::Minimal(self.minimal())
            }
        }
    }

    /// The degraded context for this project.
    pub fn minimal(&self) -> MinimalContext {
        MinimalContext::new(&self.project, &self.stack)
    }

    async fn load_full(&self) -> Result<ProjectContext> {
        self.store.check_available().await?;

        let r = &self.resources;
        let project_rules = self.read_text("project_rules", &r.project_rules).await;
        let user_rules = self.read_text("user_rules", &r.user_rules).await;
        let master_prompt = self.read_text("master_prompt", &r.master_prompt).await;
        let session_tracker = self.read_text("session_tracker", &r.session_tracker).await;
        let quick_commands = self.read_text("quick_commands", &r.quick_commands).await;
        let error_patterns = self.read_json("error_patterns", &r.error_patterns).await;
        let system_config = self.read_json("system_config", &r.system_config).await;

        let InventoryScan {
            files: current_files,
            recent: recent_files,
        } = self.inventory.scan(RECENT_FILES).await?;
        let recent_commands = self.history.recent(RECENT_COMMANDS)?;

        let last_modified = recent_files
            .iter()
            .map(|f| f.modified)
            .max()
            .unwrap_or_else(Utc::now);

        Ok(ProjectContext {
            project_rules,
            user_rules,
            master_prompt,
            session_tracker,
            quick_commands,
            error_patterns,
            system_config,
            current_files,
            recent_changes: RecentChanges {
                last_modified,
                recent_files: recent_files.into_iter().map(|f| f.path).collect(),
                recent_commands,
            },
        })
    }

    /// Reads one text resource; any failure leaves the field absent.
    async fn read_text(&self, field: &str, path: &Path) -> Option<String> {
        match self.store.read_text(path).await {
            Ok(Some(text)) => Some(text),
            Ok(None) => {
                debug!(field, path = %path.display(), "Context resource not found");
                None
            }
            Err(e) => {
                debug!(field, error = %e, "Context resource unreadable");
                None
            }
        }
    }

    /// Reads one JSON resource; unparsable content counts as absent.
    async fn read_json(&self, field: &str, path: &Path) -> Option<serde_json::Value> {
        let text = self.read_text(field, path).await?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(field, error = %e, "Context resource is not valid JSON");
                None
            }
        }
    }
}
