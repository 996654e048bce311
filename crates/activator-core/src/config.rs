//! Configuration for the command activator.
//!
//! Locates the state directory and loads `activator.json`.
//!
//! # Storage Structure
//!
//! ```text
//! ~/.activator/
//! ├── config/       # activator.json
//! └── cache/        # command-history.json, metrics.json
//! ```
//!
//! # Environment Variables
//!
//! - `ACTIVATOR_STATE_DIR`: Override the base state directory
//! - `ACTIVATOR_CONFIG_DIR`: Override the config directory
//! - `ACTIVATOR_CACHE_DIR`: Override the cache directory

use std::fs;
use std::path::{Path, PathBuf};

use activator_models::{Category, FileInventory};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "ACTIVATOR_STATE_DIR";

/// Environment variable for custom config directory.
pub const CONFIG_DIR_ENV: &str = "ACTIVATOR_CONFIG_DIR";

/// Environment variable for custom cache directory.
pub const CACHE_DIR_ENV: &str = "ACTIVATOR_CACHE_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".activator";

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "activator.json";

// Subdirectory names
const CONFIG_SUBDIR: &str = "config";
const CACHE_SUBDIR: &str = "cache";

/// Prefix that marks an explicit command.
pub const DEFAULT_DIRECT_PREFIX: &str = "ai ";

/// Get the activator state directory.
///
/// Resolution order:
/// 1. `ACTIVATOR_STATE_DIR` environment variable if set
/// 2. `~/.activator` if home directory is available
/// 3. `.activator` in current directory as fallback
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Get the config directory (`ACTIVATOR_CONFIG_DIR` or `<state>/config`).
pub fn config_dir() -> PathBuf {
    std::env::var(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join(CONFIG_SUBDIR))
}

/// Get the cache directory (`ACTIVATOR_CACHE_DIR` or `<state>/cache`).
pub fn cache_dir() -> PathBuf {
    std::env::var(CACHE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join(CACHE_SUBDIR))
}


/// Get the default config file path.
pub fn config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Relative locations of the context resources under the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePaths {
    pub project_rules: PathBuf,
    pub user_rules: PathBuf,
    pub master_prompt: PathBuf,
    pub session_tracker: PathBuf,
    pub quick_commands: PathBuf,
    pub error_patterns: PathBuf,
    pub system_config: PathBuf,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            project_rules: PathBuf::from(".activator/rules/project-rules.md"),
            user_rules: PathBuf::from(".activator/rules/user-rules.md"),
            master_prompt: PathBuf::from(".activator/rules/master-prompt.md"),
            session_tracker: PathBuf::from(".activator/cache/session-tracker.md"),
            quick_commands: PathBuf::from(".activator/cache/quick-commands.md"),
            error_patterns: PathBuf::from(".activator/cache/error-patterns.json"),
            system_config: PathBuf::from(".activator/config/system-config.json"),
        }
    }
}

/// How the project file inventory is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryMode {
    /// Walk the configured areas on every load.
    #[default]
    Scan,
    /// Use the snapshot from the config file.
    Static,
}

/// Inventory settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub mode: InventoryMode,
    /// Top-level directories to scan, relative to the project root.
    pub areas: Vec<String>,
    /// Maximum directory depth below an area.
    pub max_depth: usize,
    /// Inventory used in static mode.
    pub snapshot: FileInventory,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            mode: InventoryMode::Scan,
            areas: vec!["src".into(), "scripts".into(), "public".into()],
            max_depth: 4,
            snapshot: FileInventory::new(),
        }
    }
}

/// A user-supplied catalog pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternOverride {
    pub category: Category,
    pub pattern: String,
}

/// Top-level configuration (`activator.json`). Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationConfig {
    /// Project identity used by the minimal context.
    pub project_name: String,
    /// Stack description used by the minimal context.
    pub stack: String,
    /// Project root; `~` and `$VAR` are expanded.
    pub project_root: String,
    pub resources: ResourcePaths,
    pub inventory: InventoryConfig,
    /// Capacity of the in-process history.
    pub history_limit: usize,
    /// Patterns appended after the built-in ones.
    pub extra_patterns: Vec<PatternOverride>,
    /// Keywords appended to the contextual vocabulary.
    pub extra_keywords: Vec<String>,
    pub direct_prefix: String,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            project_name: "repair-shop".into(),
            stack: "vue3 + vite + supabase".into(),
            project_root: ".".into(),
            resources: ResourcePaths::default(),
            inventory: InventoryConfig::default(),
            history_limit: 500,
            extra_patterns: Vec::new(),
            extra_keywords: Vec::new(),
            direct_prefix: DEFAULT_DIRECT_PREFIX.into(),
        }
    }
}

impl ActivationConfig {
    /// Loads the config from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let data = fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config = serde_json::from_str(&data).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Loads the config from the default location.
    pub fn load_default() -> Result<Self> {
        Self::load(&config_file())
    }

    /// Project root with `~` and environment variables expanded.
    ///
    /// Falls back to the literal value when expansion fails.
    pub fn project_root(&self) -> PathBuf {
        match shellexpand::full(&self.project_root) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(_) => PathBuf::from(&self.project_root),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_directories_share_state_root() {
        // Only checks structure; env overrides are process-global.
        if std::env::var(STATE_DIR_ENV).is_err()
            && std::env::var(CONFIG_DIR_ENV).is_err()
            && std::env::var(CACHE_DIR_ENV).is_err()
        {
            let state = state_dir();
            assert_eq!(config_dir(), state.join("config"));
            assert_eq!(cache_dir(), state.join("cache"));
            assert_eq!(config_file(), state.join("config").join(CONFIG_FILE_NAME));
        }
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = ActivationConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, ActivationConfig::default());
        assert_eq!(config.direct_prefix, "ai ");
        assert_eq!(config.history_limit, 500);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("activator.json");
        fs::write(
            &path,
            r#"{
                "project_name": "taller",
                "inventory": { "mode": "static" },
                "extra_patterns": [{ "category": "testing", "pattern": "\\bqa\\b" }]
            }"#,
        )
        .unwrap();

        let config = ActivationConfig::load(&path).unwrap();
        assert_eq!(config.project_name, "taller");
        assert_eq!(config.stack, "vue3 + vite + supabase");
        assert_eq!(config.inventory.mode, InventoryMode::Static);
        assert_eq!(config.inventory.max_depth, 4);
        assert_eq!(config.extra_patterns[0].category, Category::Testing);
        assert_eq!(config.resources, ResourcePaths::default());
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("activator.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ActivationConfig::load(&path).unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse { .. }));
    }

    #[test]
    fn test_project_root_expansion() {
        let config = ActivationConfig {
            project_root: "/srv/taller".into(),
            ..Default::default()
        };
        assert_eq!(config.project_root(), PathBuf::from("/srv/taller"));

        if let Some(home) = dirs::home_dir() {
            let config = ActivationConfig {
                project_root: "~/taller".into(),
                ..Default::default()
            };
            assert_eq!(config.project_root(), home.join("taller"));
        }
    }
}
