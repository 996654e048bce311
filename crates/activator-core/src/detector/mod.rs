//! Natural-language command detection.
//!
//! Classification runs in three stages, each one short-circuiting the rest:
//! 1. **Direct prefix** - `ai <command>` is always a command (confidence 1.0)
//! 2. **Pattern catalog** - first matching category wins (confidence 0.9)
//! 3. **Keyword fallback** - any domain term makes it contextual (confidence 0.7)
//!
//! A message that passes none of them is not a command. Detection is a pure
//! function of the text, the catalog and the vocabulary.

#[cfg(test)]
mod tests;

use activator_models::DetectionResult;
use tracing::debug;

use crate::catalog::{KeywordSet, PatternCatalog};
use crate::config::{ActivationConfig, DEFAULT_DIRECT_PREFIX};
use crate::error::Result;

/// Classifies chat messages into commands.
#[derive(Debug, Clone)]
pub struct CommandDetector {
    catalog: PatternCatalog,
    keywords: KeywordSet,
    direct_prefix: String,
}

impl Default for CommandDetector {
    fn default() -> Self {
        Self::new(PatternCatalog::builtin(), KeywordSet::builtin())
    }
}

impl CommandDetector {
    /// Create a detector over an explicit catalog and vocabulary.
    pub fn new(catalog: PatternCatalog, keywords: KeywordSet) -> Self {
        Self {
            catalog,
            keywords,
            direct_prefix: DEFAULT_DIRECT_PREFIX.to_string(),
        }
    }

    /// Build the catalog, vocabulary and prefix from config.
    pub fn from_config(config: &ActivationConfig) -> Result<Self> {
        Ok(Self::new(
            PatternCatalog::from_config(config)?,
            KeywordSet::from_config(config),
        )
        .with_prefix(&config.direct_prefix))
    }

    /// Replace the direct-command prefix. It is lowercased but not trimmed,
    /// so the trailing space in `"ai "` is kept. An empty prefix falls back
    /// to the default.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.direct_prefix = if prefix.trim().is_empty() {
            DEFAULT_DIRECT_PREFIX.to_string()
        } else {
            prefix.to_lowercase()
        };
        self
    }

    /// The catalog in use.
    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Lowercase and trim a message.
    pub fn normalize(message: &str) -> String {
        message.trim().to_lowercase()
    }

    /// Classify a message.
    pub fn detect(&self, message: &str) -> DetectionResult {
        let normalized = Self::normalize(message);

        // Stage 1: explicit prefix
        if let Some(command) = normalized.strip_prefix(self.direct_prefix.as_str()) {
            debug!(command = %command, "Direct command");
            return DetectionResult::direct(command);
        }

        // Stage 2: pattern catalog, first match wins
        if let Some(category) = self.catalog.classify(&normalized) {
            debug!(category = %category, "Natural command");
            return DetectionResult::natural(category, normalized);
        }

        // Stage 3: keyword containment
        if let Some(keyword) = self.keywords.find_in(&normalized) {
            debug!(keyword = %keyword, "Contextual command");
            return DetectionResult::contextual(normalized);
        }

        DetectionResult::none()
    }
}
