//! Tests for command detection.

use activator_models::{Category, DetectionKind};

use super::*;
use crate::config::PatternOverride;

#[test]
fn test_direct_prefix() {
    let detector = CommandDetector::default();
    let result = detector.detect("ai crear endpoint de login");

    assert!(result.is_command);
    assert_eq!(result.kind, DetectionKind::Direct);
    assert_eq!(result.command, "crear endpoint de login");
    assert_eq!(result.confidence, 1.0);
    assert!(result.category.is_none());
}

#[test]
fn test_direct_prefix_is_case_insensitive_and_trimmed() {
    let detector = CommandDetector::default();
    let result = detector.detect("   AI Optimizar Imagenes  ");

    assert_eq!(result.kind, DetectionKind::Direct);
    assert_eq!(result.command, "optimizar imagenes");
}

#[test]
fn test_direct_prefix_short_circuits_patterns() {
    let detector = CommandDetector::default();
    // Would otherwise be a debugging command
    let result = detector.detect("ai arreglar el error");
    assert_eq!(result.kind, DetectionKind::Direct);
    assert!(result.category.is_none());
}

#[test]
fn test_prefix_requires_trailing_space() {
    let detector = CommandDetector::default();
    // "aire" starts with "ai" but not "ai "
    let result = detector.detect("aire acondicionado");
    assert_ne!(result.kind, DetectionKind::Direct);
    // A bare "ai" is trimmed and no longer carries the space
    assert!(!detector.detect("ai").is_command);
}

#[test]
fn test_natural_debugging_command() {
    let detector = CommandDetector::default();
    let result = detector.detect("Necesito arreglar un error en el login");

    assert!(result.is_command);
    assert_eq!(result.kind, DetectionKind::Natural);
    assert_eq!(result.category, Some(Category::Debugging));
    assert_eq!(result.command, "necesito arreglar un error en el login");
    assert_eq!(result.confidence, 0.9);
}

#[test]
fn test_natural_categories() {
    let detector = CommandDetector::default();
    let cases = [
        ("implementa una nueva pantalla de recibos", Category::Development),
        ("el formulario no guarda los datos", Category::Debugging),
        ("optimizar la carga de fotos", Category::Optimization),
        ("agregar cobertura e2e", Category::Testing),
        ("documentar el flujo de ordenes", Category::Documentation),
    ];

    for (message, expected) in cases {
        let result = detector.detect(message);
        assert_eq!(result.kind, DetectionKind::Natural, "message: {}", message);
        assert_eq!(result.category, Some(expected), "message: {}", message);
    }
}

#[test]
fn test_first_declared_category_wins() {
    let detector = CommandDetector::default();
    // Matches development and debugging; development is declared first
    let result = detector.detect("crear un componente para corregir el error de fechas");
    assert_eq!(result.category, Some(Category::Development));

    // Matches debugging and testing; debugging is declared first
    let result = detector.detect("el test falla");
    assert_eq!(result.category, Some(Category::Debugging));
}

#[test]
fn test_contextual_keyword_fallback() {
    let detector = CommandDetector::default();
    let result = detector.detect("Revisa el Ticket del cliente");

    assert!(result.is_command);
    assert_eq!(result.kind, DetectionKind::Contextual);
    assert_eq!(result.confidence, 0.7);
    assert!(result.category.is_none());
    assert_eq!(result.command, "revisa el ticket del cliente");
}

#[test]
fn test_not_a_command() {
    let detector = CommandDetector::default();
    let result = detector.detect("hola, como estas");

    assert!(!result.is_command);
    assert_eq!(result.kind, DetectionKind::None);
    assert_eq!(result.confidence, 0.0);
    assert!(result.category.is_none());

    assert!(!detector.detect("").is_command);
    assert!(!detector.detect("   ").is_command);
}

#[test]
fn test_detection_is_idempotent() {
    let detector = CommandDetector::default();
    for message in [
        "ai crear endpoint de login",
        "necesito arreglar un error en el login",
        "revisa el ticket",
        "hola, como estas",
    ] {
        assert_eq!(detector.detect(message), detector.detect(message));
    }
}

#[test]
fn test_custom_catalog_and_keywords() {
    let mut catalog = PatternCatalog::empty();
    catalog.add_pattern(Category::Testing, r"\bqa\b").unwrap();
    let detector = CommandDetector::new(catalog, KeywordSet::new(["inventario"]));

    assert_eq!(detector.detect("correr qa").category, Some(Category::Testing));
    // Built-in debugging patterns are not present
    assert_eq!(
        detector.detect("arreglar el inventario").kind,
        DetectionKind::Contextual
    );
    assert!(!detector.detect("arreglar algo").is_command);
}

#[test]
fn test_custom_prefix() {
    let detector = CommandDetector::default().with_prefix("Bot: ");
    let result = detector.detect("bot: generar reporte");
    assert_eq!(result.kind, DetectionKind::Direct);
    assert_eq!(result.command, "generar reporte");

    // Empty prefix falls back to the default
    let detector = CommandDetector::default().with_prefix("  ");
    assert_eq!(detector.detect("ai hola").kind, DetectionKind::Direct);
}

#[test]
fn test_from_config() {
    let config = ActivationConfig {
        extra_patterns: vec![PatternOverride {
            category: Category::Documentation,
            pattern: r"\bchangelog\b".into(),
        }],
        extra_keywords: vec!["garantía".into()],
        direct_prefix: "hey ".into(),
        ..Default::default()
    };
    let detector = CommandDetector::from_config(&config).unwrap();

    assert_eq!(
        detector.detect("actualizar changelog").category,
        Some(Category::Documentation)
    );
    assert_eq!(detector.detect("la garantía").kind, DetectionKind::Contextual);
    assert_eq!(detector.detect("hey deploy").kind, DetectionKind::Direct);
}
