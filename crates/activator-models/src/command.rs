//! Command classification types.
//!
//! A raw chat message is classified into a [`DetectionResult`]; positive
//! detections are then merged with a freshly loaded project context into a
//! [`ProcessedCommand`] that lives for exactly one dispatch cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::context::LoadedContext;
use crate::ids::SessionId;

/// Confidence reported for commands using the explicit prefix.
pub const DIRECT_CONFIDENCE: f32 = 1.0;
/// Confidence reported for commands matched by a catalog pattern.
pub const NATURAL_CONFIDENCE: f32 = 0.9;
/// Confidence reported for keyword-only matches.
pub const CONTEXTUAL_CONFIDENCE: f32 = 0.7;

/// Intent class used to route a command to its handler.
///
/// Declaration order is the order in which the pattern catalog is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Building new features, components or endpoints.
    Development,
    /// Fixing errors and broken behaviour.
    Debugging,
    /// Performance and size work.
    Optimization,
    /// Writing or running tests.
    Testing,
    /// Producing documentation.
    Documentation,
}

impl Category {
    /// All categories in declaration order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Development,
            Category::Debugging,
            Category::Optimization,
            Category::Testing,
            Category::Documentation,
        ]
    }

    /// Lowercase label, as used in config files and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Development => "development",
            Category::Debugging => "debugging",
            Category::Optimization => "optimization",
            Category::Testing => "testing",
            Category::Documentation => "documentation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::all()
            .iter()
            .copied()
            .find(|c| c.label() == wanted)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// How a message was recognised as a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetectionKind {
    /// Explicit prefix, e.g. `ai crear endpoint`.
    Direct,
    /// Matched a catalog pattern.
    Natural,
    /// Only matched the keyword vocabulary.
    Contextual,
    /// Not a command.
    #[default]
    None,
}

impl fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Natural => write!(f, "natural"),
            Self::Contextual => write!(f, "contextual"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Outcome of classifying one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DetectionResult {
    /// Whether the message should run through the pipeline.
    pub is_command: bool,
    /// How the message was recognised.
    #[serde(rename = "type")]
    pub kind: DetectionKind,
    /// Intent class, only set for natural detections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Command text handed to the dispatcher.
    pub command: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f32,
}

impl DetectionResult {
    /// A negative classification.
    pub fn none() -> Self {
        Self {
            is_command: false,
            kind: DetectionKind::None,
            category: None,
            command: String::new(),
            confidence: 0.0,
        }
    }

    /// A command given with the explicit prefix.
    pub fn direct(command: impl Into<String>) -> Self {
        Self {
            is_command: true,
            kind: DetectionKind::Direct,
            category: None,
            command: command.into(),
            confidence: DIRECT_CONFIDENCE,
        }
    }

    /// A command matched by a catalog pattern.
    pub fn natural(category: Category, command: impl Into<String>) -> Self {
        Self {
            is_command: true,
            kind: DetectionKind::Natural,
            category: Some(category),
            command: command.into(),
            confidence: NATURAL_CONFIDENCE,
        }
    }

    /// A command recognised only through a domain keyword.
    pub fn contextual(command: impl Into<String>) -> Self {
        Self {
            is_command: true,
            kind: DetectionKind::Contextual,
            category: None,
            command: command.into(),
            confidence: CONTEXTUAL_CONFIDENCE,
        }
    }
}

/// A positive detection enriched with context and session metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedCommand {
    /// Command text from the detection.
    pub original: String,
    /// How the command was recognised.
    #[serde(rename = "type")]
    pub kind: DetectionKind,
    /// Intent class, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Context snapshot taken for this command.
    pub context: LoadedContext,
    /// When the command was built.
    pub timestamp: DateTime<Utc>,
    /// Unique token for this dispatch cycle.
    pub session_id: SessionId,
}

impl ProcessedCommand {
    /// Merges a detection with a loaded context.
    pub fn new(detection: &DetectionResult, context: LoadedContext) -> Self {
        Self {
            original: detection.command.clone(),
            kind: detection.kind,
            category: detection.category,
            context,
            timestamp: Utc::now(),
            session_id: SessionId::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MinimalContext;

    #[test]
    fn test_category_order_and_labels() {
        let labels: Vec<_> = Category::all().iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec!["development", "debugging", "optimization", "testing", "documentation"]
        );
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Testing".parse::<Category>(), Ok(Category::Testing));
        assert_eq!(" debugging ".parse::<Category>(), Ok(Category::Debugging));
        assert!("deploy".parse::<Category>().is_err());
    }

    #[test]
    fn test_detection_constructors() {
        let none = DetectionResult::none();
        assert!(!none.is_command);
        assert_eq!(none.confidence, 0.0);

        let direct = DetectionResult::direct("crear login");
        assert_eq!(direct.kind, DetectionKind::Direct);
        assert_eq!(direct.confidence, 1.0);
        assert!(direct.category.is_none());

        let natural = DetectionResult::natural(Category::Testing, "agregar tests");
        assert_eq!(natural.category, Some(Category::Testing));
        assert_eq!(natural.confidence, 0.9);

        let contextual = DetectionResult::contextual("el endpoint");
        assert_eq!(contextual.kind, DetectionKind::Contextual);
        assert_eq!(contextual.confidence, 0.7);
    }

    #[test]
    fn test_detection_serializes_kind_as_type() {
        let json = serde_json::to_value(DetectionResult::direct("x")).unwrap();
        assert_eq!(json["type"], "direct");
        assert!(json.get("category").is_none());
    }

    #[test]
    fn test_processed_command_copies_detection() {
        let detection = DetectionResult::natural(Category::Debugging, "arreglar el login");
        let context = LoadedContext::Minimal(MinimalContext::new("shop", "vue"));
        let cmd = ProcessedCommand::new(&detection, context);

        assert_eq!(cmd.original, "arreglar el login");
        assert_eq!(cmd.kind, DetectionKind::Natural);
        assert_eq!(cmd.category, Some(Category::Debugging));
        assert!(cmd.session_id.as_str().starts_with("sess-"));
    }
}
