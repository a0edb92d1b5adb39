//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for docket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocketConfig {
    /// Pattern catalog location.
    pub catalog: CatalogConfig,

    /// Extraction behaviour.
    pub extraction: ExtractionConfig,

    /// Output locations for batch runs.
    pub output: OutputConfig,
}

/// Where pattern catalogs are looked up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory holding `{county}_patterns.json` files.
    pub patterns_dir: PathBuf,

    /// Explicit catalog file; takes precedence over `patterns_dir`.
    pub patterns_file: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            patterns_dir: PathBuf::from("patterns"),
            patterns_file: None,
        }
    }
}

/// Extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Substrings that mark a field name as date-bearing.
    pub date_field_indicators: Vec<String>,

    /// Dates known to be filing dates for the current run. Multi-date
    /// summaries never promote these to incident dates.
    pub excluded_filing_dates: Vec<String>,

    /// Characters captured after a contact trigger phrase.
    pub contact_window_chars: usize,

    /// Minimum similarity for a fuzzy trigger-phrase match (exclusive).
    pub contact_similarity_threshold: f64,

    /// Lowercase the domain part of e-mails before de-duplicating.
    pub email_domain_case_insensitive: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            date_field_indicators: [
                "facts_date",
                "incident_date",
                "contract_date",
                "accident_date",
                "date_of_incident",
                "numeric_date",
                "advanced_incident_date",
                "contextual_incident_search",
                "fuzzy_incident_date",
                "at_time_pattern",
                "subject_incident_date",
                "loss_date",
                "multiple_dates_extractor",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            excluded_filing_dates: Vec::new(),
            contact_window_chars: 500,
            contact_similarity_threshold: 0.8,
            email_domain_case_insensitive: false,
        }
    }
}

/// Output configuration for batch processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for batch JSON, summary CSV and per-document results.
    pub output_dir: PathBuf,

    /// Write one JSON file per document under `{output_dir}/{county}/`.
    pub save_individual: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("outputs"),
            save_individual: true,
        }
    }
}

impl DocketConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: DocketConfig =
            serde_json::from_str(r#"{"extraction": {"excluded_filing_dates": ["July 7, 2025"]}}"#)
                .unwrap();

        assert_eq!(config.extraction.excluded_filing_dates, vec!["July 7, 2025"]);
        assert_eq!(config.extraction.contact_window_chars, 500);
        assert!(!config.extraction.email_domain_case_insensitive);
        assert_eq!(config.output.output_dir, PathBuf::from("outputs"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = DocketConfig::default();
        config.catalog.patterns_file = Some(PathBuf::from("harris_patterns.json"));
        config.save(&path).unwrap();

        let loaded = DocketConfig::from_file(&path).unwrap();
        assert_eq!(loaded.catalog.patterns_file, config.catalog.patterns_file);
        assert_eq!(
            loaded.extraction.date_field_indicators.len(),
            config.extraction.date_field_indicators.len()
        );
    }
}
