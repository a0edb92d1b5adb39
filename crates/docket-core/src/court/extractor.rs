//! Per-document extraction: catalog fields, e-mails, contact block and
//! incident dates assembled into one record.

use chrono::Utc;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::error::{PatternError, Result};
use crate::models::config::ExtractionConfig;
use crate::models::record::DocumentExtractionResult;
use crate::pdf::{DocumentText, TextElement, TextSource};

use super::catalog::{PatternCatalog, StrategyKind};
use super::contact::ContactExtractor;
use super::resolver::{FieldValue, IncidentDateResolver};
use super::strategies::{Strategy, dispatch, extract_emails};

const UNKNOWN_COUNTY: &str = "unknown";

struct CompiledField {
    name: String,
    kind: StrategyKind,
    strategy: Box<dyn Strategy>,
}

/// One field's extracted value.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedField {
    pub name: String,
    pub kind: StrategyKind,
    pub value: String,
}

/// Extracts court document records with a compiled pattern catalog.
///
/// Holds only immutable state, so one extractor can serve many threads.
pub struct CourtExtractor {
    county: String,
    fields: Vec<CompiledField>,
    pattern_errors: Vec<PatternError>,
    contact: ContactExtractor,
    resolver: IncidentDateResolver,
    email_domain_case_insensitive: bool,
}

impl CourtExtractor {
    /// Compile a catalog. Fields in the extraction order without a usable
    /// pattern are left out.
    pub fn new(catalog: &PatternCatalog, config: &ExtractionConfig) -> Self {
        let mut fields = Vec::with_capacity(catalog.extraction_order.len());
        let mut pattern_errors = Vec::new();

        for name in &catalog.extraction_order {
            let Some(pattern) = catalog.pattern(name) else {
                debug!("Field {} is in the extraction order but has no pattern", name);
                continue;
            };
            let dispatched = dispatch(name, pattern);
            pattern_errors.extend(dispatched.errors);

            match dispatched.strategy {
                Some(strategy) => fields.push(CompiledField {
                    name: name.clone(),
                    kind: strategy.kind(),
                    strategy,
                }),
                None => warn!("Field {} has no usable pattern and will be skipped", name),
            }
        }

        debug!(
            "Compiled {} fields for county {:?} ({} pattern errors)",
            fields.len(),
            catalog.county,
            pattern_errors.len()
        );

        Self {
            county: catalog.county.clone(),
            fields,
            pattern_errors,
            contact: ContactExtractor::from_config(config),
            resolver: IncidentDateResolver::new(config),
            email_domain_case_insensitive: config.email_domain_case_insensitive,
        }
    }

    /// Override the catalog county. Empty names are ignored.
    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        let county = county.into();
        if !county.is_empty() {
            self.county = county;
        }
        self
    }

    /// County written into records.
    pub fn county(&self) -> &str {
        if self.county.is_empty() {
            UNKNOWN_COUNTY
        } else {
            &self.county
        }
    }

    /// Sub-patterns that failed to compile.
    pub fn pattern_errors(&self) -> &[PatternError] {
        &self.pattern_errors
    }

    /// Compiled fields in extraction order.
    pub fn field_kinds(&self) -> impl Iterator<Item = (&str, StrategyKind)> {
        self.fields.iter().map(|f| (f.name.as_str(), f.kind))
    }

    /// First multi-date field, whose summary feeds the batch report.
    pub fn multi_date_field(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.kind == StrategyKind::MultiDate)
            .map(|f| f.name.as_str())
    }

    /// Run every compiled field, keeping the non-empty values.
    pub fn extract_fields(&self, doc: &DocumentText<'_>) -> Vec<ExtractedField> {
        self.fields
            .iter()
            .filter_map(|field| {
                let value = field.strategy.extract(doc).filter(|v| !v.is_empty());
                debug!("Field {} ({}): {:?}", field.name, field.kind, value);
                value.map(|value| ExtractedField {
                    name: field.name.clone(),
                    kind: field.kind,
                    value,
                })
            })
            .collect()
    }

    /// Extract a record from text already in memory.
    pub fn extract_text(
        &self,
        name: &str,
        text: &str,
        elements: &[TextElement],
    ) -> DocumentExtractionResult {
        let doc = DocumentText::new(text, elements);

        let emails = extract_emails(text, self.email_domain_case_insensitive);
        let plaintiff_contact = self.contact.extract(text);
        let extracted = self.extract_fields(&doc);

        let values: Vec<FieldValue<'_>> = extracted
            .iter()
            .map(|f| FieldValue::new(&f.name, Some(f.kind), &f.value))
            .collect();
        let resolution = self.resolver.resolve(&values);

        let extracted_data: IndexMap<String, String> = extracted
            .into_iter()
            .map(|f| (f.name, f.value))
            .collect();

        info!(
            "Extracted {}: {} fields, incident date {:?}",
            name,
            extracted_data.len(),
            resolution.incident_date
        );

        DocumentExtractionResult {
            pdf_file: name.to_string(),
            county: self.county().to_string(),
            incident_date: resolution.incident_date,
            incident_end_date: resolution.incident_end_date,
            incident_source_field: resolution.incident_source_field,
            incident_end_source_field: resolution.incident_end_source_field,
            all_incident_dates: resolution.all_incident_dates,
            emails,
            plaintiff_contact,
            extraction_timestamp: Utc::now(),
            extracted_data,
            doc_id: None,
            original_path: None,
        }
    }

    /// Extract a record from a text source.
    ///
    /// Fails only when the source cannot produce text; missing layout
    /// elements just disable the spatial strategies.
    pub fn extract(&self, name: &str, source: &dyn TextSource) -> Result<DocumentExtractionResult> {
        let text = source.full_text()?;
        let elements = source.text_elements().unwrap_or_else(|e| {
            warn!("No layout elements for {}: {}", name, e);
            Vec::new()
        });
        Ok(self.extract_text(name, &text, &elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::court::catalog::{
        CaseTitleParams, FactsParams, FieldPattern, MultiDateParams, NearestWordParams, RegexParams,
    };
    use crate::error::{DocketError, SourceError};
    use crate::pdf::PlainTextSource;
    use pretty_assertions::assert_eq;

    const PETITION: &str = "CAUSE NO. 2024-CI-000123-A\n\
        Jane Roe vs. Acme Freight, Inc.\n\
        II. FACTS\n\
        On or about March 1, 2024, a truck owned by Acme struck plaintiff's vehicle.\n\
        Plaintiff was injured in the collision and again on June 2, 2024.\n\
        Filed 05/10/2024\n\
        Plaintiff demands trial by jury on all issues triable as of right.\n\
        Jane Roe\n\
        1 Elm St, Austin, TX\n\
        jroe@roe-law.com\n\
        Attorneys for Plaintiff\n\
        Roe Law PLLC";

    fn catalog() -> PatternCatalog {
        PatternCatalog::new("travis")
            .with_field(
                "case_number",
                FieldPattern::Regex(RegexParams {
                    regex: r"\d{4}-[A-Z]{2}-\d{6}-[A-Z]".to_string(),
                }),
            )
            .with_field("case_title", FieldPattern::CaseTitle(CaseTitleParams::default()))
            .with_field(
                "facts_date",
                FieldPattern::FactsPattern(FactsParams {
                    keywords: vec!["FACTS".to_string()],
                    date_regex: r"on or about (\w+ \d{1,2}, \d{4})".to_string(),
                }),
            )
            .with_field(
                "multiple_dates_extractor",
                FieldPattern::MultiDate(MultiDateParams {
                    date_patterns: vec![r"(?:March|June)\s+\d{1,2},\s+\d{4}".to_string()],
                    context_radius: 50,
                    incident_indicators: vec!["injured".to_string(), "struck".to_string()],
                }),
            )
            .with_field("hologram", FieldPattern::Unknown)
    }

    #[test]
    fn test_end_to_end_record() {
        let extractor = CourtExtractor::new(&catalog(), &ExtractionConfig::default());
        let record = extractor.extract_text("roe.pdf", PETITION, &[]);

        assert_eq!(record.pdf_file, "roe.pdf");
        assert_eq!(record.county, "travis");
        assert_eq!(
            record.extracted_data.keys().collect::<Vec<_>>(),
            vec!["case_number", "case_title", "facts_date", "multiple_dates_extractor"]
        );
        assert_eq!(record.extracted_data["case_number"], "2024-CI-000123-A");
        assert_eq!(record.extracted_data["case_title"], "Jane Roe vs. Acme Freight, Inc.");
        assert_eq!(record.extracted_data["facts_date"], "March 1, 2024");
        assert_eq!(record.incident_date.as_deref(), Some("March 1, 2024"));
        assert_eq!(record.incident_source_field.as_deref(), Some("facts_date"));
        assert_eq!(record.incident_end_date.as_deref(), Some("June 2, 2024 (injured)"));
        assert_eq!(record.emails.as_deref(), Some("jroe@roe-law.com"));
        assert_eq!(
            record.plaintiff_contact.as_deref(),
            Some("Jane Roe\n1 Elm St, Austin, TX\njroe@roe-law.com")
        );
    }

    #[test]
    fn test_empty_catalog_still_extracts_emails_and_contact() {
        let extractor = CourtExtractor::new(&PatternCatalog::default(), &ExtractionConfig::default());
        let record = extractor.extract_text("roe.pdf", PETITION, &[]);

        assert!(record.extracted_data.is_empty());
        assert_eq!(record.county, "unknown");
        assert!(record.emails.is_some());
        assert!(record.plaintiff_contact.is_some());
        assert_eq!(record.incident_date, None);
        assert!(record.all_incident_dates.is_empty());
    }

    #[test]
    fn test_county_override_and_field_kinds() {
        let extractor =
            CourtExtractor::new(&catalog(), &ExtractionConfig::default()).with_county("bexar");
        assert_eq!(extractor.county(), "bexar");
        assert_eq!(extractor.multi_date_field(), Some("multiple_dates_extractor"));
        // the unknown field is not compiled
        assert_eq!(extractor.field_kinds().count(), 4);
    }

    #[test]
    fn test_missing_pattern_and_compile_errors() {
        let mut catalog = PatternCatalog::new("harris").with_field(
            "broken",
            FieldPattern::Regex(RegexParams {
                regex: "(".to_string(),
            }),
        );
        catalog.extraction_order.push("not_defined".to_string());

        let extractor = CourtExtractor::new(&catalog, &ExtractionConfig::default());
        assert_eq!(extractor.field_kinds().count(), 0);
        assert_eq!(extractor.pattern_errors().len(), 1);
    }

    #[test]
    fn test_spatial_field_uses_elements() {
        let catalog = PatternCatalog::new("harris").with_field(
            "plaintiff_name",
            FieldPattern::NearestWord(NearestWordParams {
                keywords: vec!["Plaintiff:".to_string()],
                extract_words: 2,
                ..NearestWordParams::default()
            }),
        );
        let source = PlainTextSource::new("Plaintiff: Jane Roe").with_elements(vec![
            TextElement::new("Plaintiff:", 50.0, 700.0, 100.0, 712.0, 0),
            TextElement::new("Jane", 105.0, 700.0, 130.0, 712.0, 0),
            TextElement::new("Roe", 135.0, 700.0, 160.0, 712.0, 0),
        ]);

        let extractor = CourtExtractor::new(&catalog, &ExtractionConfig::default());
        let record = extractor.extract("roe.txt", &source).unwrap();
        assert_eq!(record.extracted_data["plaintiff_name"], "Jane Roe");
    }

    struct FailingSource;

    impl TextSource for FailingSource {
        fn full_text(&self) -> crate::pdf::Result<String> {
            Err(SourceError::Encrypted)
        }

        fn text_elements(&self) -> crate::pdf::Result<Vec<TextElement>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_source_failure_is_an_error() {
        let extractor = CourtExtractor::new(&PatternCatalog::default(), &ExtractionConfig::default());
        let err = extractor.extract("locked.pdf", &FailingSource).unwrap_err();
        assert!(matches!(err, DocketError::Source(SourceError::Encrypted)));
    }
}
