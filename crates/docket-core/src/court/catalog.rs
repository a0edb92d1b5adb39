//! Declarative pattern catalogs.
//!
//! A catalog maps field names to a [`FieldPattern`]: an extraction strategy
//! plus its typed parameters. Catalogs are JSON documents:
//!
//! ```json
//! {
//!   "county": "harris",
//!   "extraction_order": ["facts_date", "case_title"],
//!   "patterns": {
//!     "facts_date": { "type": "facts_pattern", "keywords": ["FACTS"], "date_regex": "..." },
//!     "case_title": { "type": "case_title" }
//!   }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CatalogError;

/// The extraction strategies a field can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Regex,
    NearestWord,
    SectionPattern,
    FactsPattern,
    CaseTitle,
    FuzzyDate,
    ContextualSearch,
    MultiPattern,
    MultiDate,
    Email,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::NearestWord => "nearest_word",
            Self::SectionPattern => "section_pattern",
            Self::FactsPattern => "facts_pattern",
            Self::CaseTitle => "case_title",
            Self::FuzzyDate => "fuzzy_date",
            Self::ContextualSearch => "contextual_search",
            Self::MultiPattern => "multi_pattern",
            Self::MultiDate => "multi_date",
            Self::Email => "email",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field's extraction strategy and parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldPattern {
    Regex(RegexParams),
    NearestWord(NearestWordParams),
    SectionPattern(SectionParams),
    FactsPattern(FactsParams),
    CaseTitle(CaseTitleParams),
    FuzzyDate(FuzzyDateParams),
    ContextualSearch(ContextualParams),
    MultiPattern(MultiPatternParams),
    MultiDate(MultiDateParams),
    Email(EmailParams),
    /// A strategy type this build does not know. Never extracts anything.
    #[serde(other)]
    Unknown,
}

impl FieldPattern {
    /// Strategy kind, or `None` for [`FieldPattern::Unknown`].
    pub fn kind(&self) -> Option<StrategyKind> {
        let kind = match self {
            Self::Regex(_) => StrategyKind::Regex,
            Self::NearestWord(_) => StrategyKind::NearestWord,
            Self::SectionPattern(_) => StrategyKind::SectionPattern,
            Self::FactsPattern(_) => StrategyKind::FactsPattern,
            Self::CaseTitle(_) => StrategyKind::CaseTitle,
            Self::FuzzyDate(_) => StrategyKind::FuzzyDate,
            Self::ContextualSearch(_) => StrategyKind::ContextualSearch,
            Self::MultiPattern(_) => StrategyKind::MultiPattern,
            Self::MultiDate(_) => StrategyKind::MultiDate,
            Self::Email(_) => StrategyKind::Email,
            Self::Unknown => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegexParams {
    pub regex: String,
}

/// Which side of the keyword to read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Right,
    /// Any other direction; not supported by the layout search.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NearestWordParams {
    pub keywords: Vec<String>,
    pub position: Direction,
    pub max_distance: f32,
    pub extract_words: usize,
    pub extract_until: Vec<String>,
}

impl Default for NearestWordParams {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            position: Direction::Right,
            max_distance: 150.0,
            extract_words: 1,
            extract_until: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionParams {
    pub start_keywords: Vec<String>,
    pub end_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FactsParams {
    pub keywords: Vec<String>,
    pub date_regex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseTitleParams {
    pub keywords: Vec<String>,
}

impl Default for CaseTitleParams {
    fn default() -> Self {
        Self {
            keywords: vec!["vs.".to_string(), "v.".to_string(), "versus".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzyDateParams {
    pub base_patterns: Vec<String>,
    pub context_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextualParams {
    pub primary_keywords: Vec<String>,
    pub secondary_keywords: Vec<String>,
    pub target_patterns: Vec<String>,
    pub search_radius: usize,
}

impl Default for ContextualParams {
    fn default() -> Self {
        Self {
            primary_keywords: Vec::new(),
            secondary_keywords: Vec::new(),
            target_patterns: Vec::new(),
            search_radius: 250,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiPatternParams {
    /// Sub-patterns in priority order, highest first.
    pub patterns: Vec<WeightedPattern>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedPattern {
    #[serde(default)]
    pub regex: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiDateParams {
    pub date_patterns: Vec<String>,
    pub context_radius: usize,
    pub incident_indicators: Vec<String>,
}

impl Default for MultiDateParams {
    fn default() -> Self {
        Self {
            date_patterns: Vec::new(),
            context_radius: 50,
            incident_indicators: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailParams {
    /// Lowercase domains before de-duplicating.
    pub domain_case_insensitive: bool,
}

/// Catalog document shape before per-field validation.
#[derive(Deserialize)]
struct RawCatalog {
    #[serde(default)]
    county: String,
    extraction_order: Option<Vec<String>>,
    #[serde(default)]
    patterns: IndexMap<String, serde_json::Value>,
}

/// Per-county set of field patterns and the order to apply them in.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatternCatalog {
    pub county: String,
    pub extraction_order: Vec<String>,
    pub patterns: IndexMap<String, FieldPattern>,
}

impl PatternCatalog {
    /// Empty catalog for a county.
    pub fn new(county: impl Into<String>) -> Self {
        Self {
            county: county.into(),
            ..Self::default()
        }
    }

    /// Append a field to the patterns and to the extraction order.
    pub fn with_field(mut self, name: impl Into<String>, pattern: FieldPattern) -> Self {
        let name = name.into();
        self.extraction_order.push(name.clone());
        self.patterns.insert(name, pattern);
        self
    }

    /// Parse a catalog from JSON text.
    ///
    /// Fields whose parameters do not fit their strategy are dropped with a
    /// warning; the rest of the catalog still loads. Without an explicit
    /// `extraction_order` the fields run in document order.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawCatalog = serde_json::from_str(json)?;

        let mut patterns = IndexMap::with_capacity(raw.patterns.len());
        for (name, value) in raw.patterns {
            match serde_json::from_value::<FieldPattern>(value) {
                Ok(FieldPattern::Unknown) => {
                    warn!("Field {} uses an unknown strategy type and will be skipped", name);
                    patterns.insert(name, FieldPattern::Unknown);
                }
                Ok(pattern) => {
                    patterns.insert(name, pattern);
                }
                Err(e) => warn!("Dropping field {}: {}", name, e),
            }
        }

        let extraction_order = raw
            .extraction_order
            .unwrap_or_else(|| patterns.keys().cloned().collect());

        debug!(
            "Loaded catalog for {:?}: {} fields, {} in extraction order",
            raw.county,
            patterns.len(),
            extraction_order.len()
        );

        Ok(Self {
            county: raw.county,
            extraction_order,
            patterns,
        })
    }

    /// Load a catalog file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| CatalogError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a catalog file, falling back to an empty catalog when it is
    /// missing or malformed. E-mail and contact extraction still run
    /// against an empty catalog.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("{}; continuing with an empty pattern catalog", e);
                Self::default()
            }
        }
    }

    /// Find a catalog in `dir`: `{county}_patterns.json` when a county is
    /// given and present, otherwise the first `*_patterns.json` by name.
    pub fn discover(dir: &Path, county: Option<&str>) -> Result<PathBuf, CatalogError> {
        if let Some(county) = county {
            let candidate = dir.join(format!("{}_patterns.json", county.to_lowercase()));
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        let entries = fs::read_dir(dir).map_err(|source| CatalogError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with("_patterns.json"))
            })
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NotFound(dir.to_path_buf()))
    }

    /// Pattern for a field, if the catalog defines one.
    pub fn pattern(&self, field: &str) -> Option<&FieldPattern> {
        self.patterns.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "county": "harris",
        "extraction_order": ["facts_date", "case_title", "plaintiff_name"],
        "patterns": {
            "case_title": { "type": "case_title" },
            "facts_date": {
                "type": "facts_pattern",
                "keywords": ["FACTS"],
                "date_regex": "(\\w+ \\d{1,2}, \\d{4})"
            },
            "plaintiff_name": {
                "type": "nearest_word",
                "keywords": ["Plaintiff:"],
                "extract_words": 2
            },
            "hologram": { "type": "ocr_hologram" },
            "broken": { "type": "multi_pattern", "patterns": "not a list" }
        }
    }"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = PatternCatalog::from_json(CATALOG).unwrap();

        assert_eq!(catalog.county, "harris");
        assert_eq!(catalog.extraction_order, vec!["facts_date", "case_title", "plaintiff_name"]);
        assert_eq!(catalog.pattern("case_title").and_then(|p| p.kind()), Some(StrategyKind::CaseTitle));

        match catalog.pattern("case_title") {
            Some(FieldPattern::CaseTitle(params)) => {
                assert_eq!(params.keywords, vec!["vs.", "v.", "versus"]);
            }
            other => panic!("unexpected pattern: {:?}", other),
        }
        match catalog.pattern("plaintiff_name") {
            Some(FieldPattern::NearestWord(params)) => {
                assert_eq!(params.extract_words, 2);
                assert_eq!(params.max_distance, 150.0);
                assert_eq!(params.position, Direction::Right);
            }
            other => panic!("unexpected pattern: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_and_malformed_fields() {
        let catalog = PatternCatalog::from_json(CATALOG).unwrap();

        assert!(matches!(catalog.pattern("hologram"), Some(FieldPattern::Unknown)));
        assert!(catalog.pattern("broken").is_none());
    }

    #[test]
    fn test_default_extraction_order_follows_document() {
        let catalog = PatternCatalog::from_json(
            r#"{"patterns": {"b": {"type": "email"}, "a": {"type": "regex", "regex": "x"}}}"#,
        )
        .unwrap();

        assert_eq!(catalog.extraction_order, vec!["b", "a"]);
        assert_eq!(catalog.county, "");
    }

    #[test]
    fn test_malformed_catalog_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_patterns.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            PatternCatalog::from_file(&path),
            Err(CatalogError::Malformed { .. })
        ));
        assert!(PatternCatalog::load_or_empty(&path).is_empty());
        assert!(PatternCatalog::load_or_empty(&dir.path().join("missing.json")).is_empty());
    }

    #[test]
    fn test_discover() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("travis_patterns.json"), "{}").unwrap();
        fs::write(dir.path().join("bexar_patterns.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let found = PatternCatalog::discover(dir.path(), Some("Travis")).unwrap();
        assert!(found.ends_with("travis_patterns.json"));

        let fallback = PatternCatalog::discover(dir.path(), Some("dallas")).unwrap();
        assert!(fallback.ends_with("bexar_patterns.json"));

        let empty = tempfile::tempdir().unwrap();
        assert!(matches!(
            PatternCatalog::discover(empty.path(), None),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn test_builder() {
        let catalog = PatternCatalog::new("bexar")
            .with_field("emails", FieldPattern::Email(EmailParams::default()));

        assert_eq!(catalog.extraction_order, vec!["emails"]);
        assert_eq!(catalog.pattern("emails").and_then(|p| p.kind()), Some(StrategyKind::Email));
    }
}
