//! Activator Core - command detection and project context assembly.
//!
//! - **catalog**: Ordered pattern catalog and contextual keyword vocabulary
//! - **config**: State directory layout and `activator.json` loading
//! - **context**: Project context loader and its file/inventory collaborators
//! - **detector**: Classifies chat messages into commands

pub mod catalog;
pub mod config;
pub mod context;
pub mod detector;
pub mod error;

pub use catalog::{KeywordSet, PatternCatalog};
pub use config::{
    cache_dir, config_dir, config_file, state_dir, ActivationConfig, InventoryConfig,
    InventoryMode, PatternOverride, ResourcePaths,
};
pub use context::{
    ContextLoader, DirectoryInventory, FileStore, FsFileStore, InventoryScan, ProjectInventory,
    RecentFile, StaticInventory,
};
pub use detector::CommandDetector;
pub use error::{CoreError, Result};
