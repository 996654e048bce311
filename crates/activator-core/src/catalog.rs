//! Pattern catalog and keyword vocabulary used for classification.
//!
//! The catalog is an ordered list of `(category, matchers)` pairs. Order is
//! significant: the detector walks categories in declaration order and the
//! first matching pattern wins, with no scoring across categories.

use activator_models::Category;
use regex::Regex;

use crate::config::ActivationConfig;
use crate::error::{CoreError, Result};

/// Ordered classification rules.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    entries: Vec<(Category, Vec<Regex>)>,
}

impl Default for PatternCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PatternCatalog {
    /// A catalog with every category and no patterns.
    pub fn empty() -> Self {
        Self {
            entries: Category::all().iter().map(|c| (*c, Vec::new())).collect(),
        }
    }

    /// The built-in Spanish/English catalog.
    pub fn builtin() -> Self {
        let entries = builtin_patterns()
            .into_iter()
            .map(|(category, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("built-in pattern must compile"))
                    .collect();
                (category, compiled)
            })
            .collect();
        Self { entries }
    }

    /// Built-in catalog plus the config's extra patterns.
    pub fn from_config(config: &ActivationConfig) -> Result<Self> {
        let mut catalog = Self::builtin();
        for extra in &config.extra_patterns {
            catalog
                .add_pattern(extra.category, &extra.pattern)
                .map_err(|source| CoreError::InvalidPattern {
                    category: extra.category.to_string(),
                    source,
                })?;
        }
        Ok(catalog)
    }

    /// Compile and append a pattern to a category.
    pub fn add_pattern(
        &mut self,
        category: Category,
        pattern: &str,
    ) -> std::result::Result<(), regex::Error> {
        let regex = Regex::new(pattern)?;
        match self.entries.iter_mut().find(|(c, _)| *c == category) {
            Some((_, patterns)) => patterns.push(regex),
            None => self.entries.push((category, vec![regex])),
        }
        Ok(())
    }

    /// Categories with their patterns, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (Category, &[Regex])> {
        self.entries.iter().map(|(c, p)| (*c, p.as_slice()))
    }

    /// Total number of patterns.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, p)| p.len()).sum()
    }

    /// Whether the catalog holds no patterns.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First category with a matching pattern.
    pub fn classify(&self, text: &str) -> Option<Category> {
        self.entries
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|p| p.is_match(text)))
            .map(|(category, _)| *category)
    }
}

/// Domain vocabulary for the contextual fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeywordSet {
    /// Built-in vocabulary.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_KEYWORDS.iter().copied())
    }

    /// Vocabulary from arbitrary terms. Terms are lowercased; blanks are dropped.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self {
            keywords: Vec::new(),
        };
        set.extend(keywords);
        set
    }

    /// Built-in vocabulary plus the config's extra keywords.
    pub fn from_config(config: &ActivationConfig) -> Self {
        let mut set = Self::builtin();
        set.extend(&config.extra_keywords);
        set
    }

    /// Adds terms, skipping blanks and duplicates.
    pub fn extend<I, S>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if !keyword.is_empty() && !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
    }

    /// First keyword contained in `text`.
    pub fn find_in(&self, text: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|k| text.contains(k.as_str()))
            .map(String::as_str)
    }

    /// Number of keywords.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

const BUILTIN_KEYWORDS: &[&str] = &[
    "componente",
    "endpoint",
    "login",
    "base de datos",
    "supabase",
    "vite",
    "proyecto",
    "código",
    "codigo",
    "función",
    "funcion",
    "ticket",
    "recibo",
    "cliente",
    "dispositivo",
    "component",
    "database",
];

/// Built-in patterns, in category declaration order.
///
/// Patterns run against lowercased, trimmed text.
fn builtin_patterns() -> Vec<(Category, Vec<&'static str>)> {
    vec![
        (
            Category::Development,
            vec![
                // "crear un componente", "implementa el endpoint de pagos"
                r"\b(crear|crea|implementar|implementa|desarrollar|desarrolla|agregar|agrega|añadir|añade|construir|construye|generar|genera)\b.*\b(componente|endpoint|api|función|funcion|página|pagina|vista|pantalla|formulario|servicio|módulo|modulo|modelo|tabla|ruta|funcionalidad|feature)",
                r"\bnuev[oa]s?\s+(funcionalidad|feature|pantalla|vista|página|pagina|sección|seccion|componente|endpoint)\b",
                r"\b(create|implement|build|add)\b.*\b(component|endpoint|api|function|page|view|form|service|module|feature)",
            ],
        ),
        (
            Category::Debugging,
            vec![
                r"\b(arreglar|arregla|corregir|corrige|solucionar|soluciona|depurar|depura|debuggear|debug|fix)\b",
                r"\b(error|errores|bug|bugs|falla|fallo|excepción|excepcion|crash)\b",
                r"\bno\s+(funciona|carga|compila|responde|guarda)\b",
            ],
        ),
        (
            Category::Optimization,
            vec![
                r"\b(optimizar|optimiza|optimización|optimizacion|acelerar|acelera|optimize)\b",
                r"\b(rendimiento|performance|lento|lenta|velocidad)\b",
                r"\b(reducir|reduce|minimizar|minimiza)\b.*\b(tamaño|bundle|carga|peso|memoria)\b",
            ],
        ),
        (
            Category::Testing,
            vec![
                r"\b(test|tests|testear|testing|prueba|pruebas|probar)\b",
                r"\b(cobertura|coverage|e2e|unitari[oa]s?)\b",
            ],
        ),
        (
            Category::Documentation,
            vec![
                r"\b(documentar|documenta|documentación|documentacion|docs|readme|document)\b",
                r"\b(comentar|comenta|explicar|explica)\b.*\b(código|codigo|función|funcion|componente)\b",
            ],
        ),
    ]
}
