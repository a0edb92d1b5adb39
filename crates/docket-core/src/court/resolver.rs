//! Incident date resolution.
//!
//! Every date-bearing field contributes a [`DateCandidate`]. A running
//! primary date is kept while fields are visited in catalog order, then the
//! multi-date summaries are merged in and the earliest and latest true
//! incident dates decide the final primary and end dates.

use tracing::{debug, trace};

use crate::models::config::ExtractionConfig;
use crate::models::record::DateCandidate;

use super::catalog::StrategyKind;
use super::rules::dates::{is_bare_numeric_date, is_true_incident_date, summary_entries, to_standard_date};

/// One extracted field value, in extraction order.
#[derive(Debug, Clone, Copy)]
pub struct FieldValue<'a> {
    pub field: &'a str,
    pub kind: Option<StrategyKind>,
    pub value: &'a str,
}

impl<'a> FieldValue<'a> {
    pub fn new(field: &'a str, kind: Option<StrategyKind>, value: &'a str) -> Self {
        Self { field, kind, value }
    }
}

/// Resolved incident dates for one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncidentResolution {
    pub incident_date: Option<String>,
    pub incident_source_field: Option<String>,
    pub incident_end_date: Option<String>,
    pub incident_end_source_field: Option<String>,
    pub all_incident_dates: Vec<DateCandidate>,
}

#[derive(Debug, Clone)]
struct Primary {
    value: String,
    field: String,
    is_incident: bool,
}

/// A date listed as a known filing date, never an incident.
#[derive(Debug, Clone)]
struct ExcludedDate {
    text: String,
    standard: Option<String>,
}

/// Merges the date candidates of one document into a primary/end pair.
#[derive(Debug, Clone)]
pub struct IncidentDateResolver {
    date_field_indicators: Vec<String>,
    excluded: Vec<ExcludedDate>,
}

impl IncidentDateResolver {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            date_field_indicators: config.date_field_indicators.clone(),
            excluded: config
                .excluded_filing_dates
                .iter()
                .map(|text| ExcludedDate {
                    text: text.trim().to_string(),
                    standard: to_standard_date(text),
                })
                .collect(),
        }
    }

    /// Whether a field's values are dates: its name contains a date-field
    /// indicator, or it is a multi-date field.
    pub fn is_date_field(&self, field: &str, kind: Option<StrategyKind>) -> bool {
        kind == Some(StrategyKind::MultiDate)
            || self
                .date_field_indicators
                .iter()
                .any(|indicator| field.contains(indicator.as_str()))
    }

    /// Whether a summary date is a known filing date: same text, or the same
    /// calendar date when both sides standardize.
    fn is_excluded(&self, date_text: &str, standard: Option<&str>) -> bool {
        self.excluded.iter().any(|e| {
            e.text == date_text || (e.standard.is_some() && e.standard.as_deref() == standard)
        })
    }

    /// Resolve the incident dates of one document from its field values.
    pub fn resolve(&self, fields: &[FieldValue<'_>]) -> IncidentResolution {
        let mut candidates: Vec<DateCandidate> = Vec::new();
        let mut primary: Option<Primary> = None;

        for fv in fields {
            if fv.value.is_empty() || !self.is_date_field(fv.field, fv.kind) {
                continue;
            }

            let is_incident = is_true_incident_date(fv.field, fv.value);
            let standard = to_standard_date(fv.value);
            let duplicate = standard
                .as_ref()
                .is_some_and(|s| candidates.iter().any(|c| c.standard_date.as_ref() == Some(s)));
            if !duplicate {
                candidates.push(DateCandidate {
                    original_date: fv.value.to_string(),
                    standard_date: standard,
                    source_field: fv.field.to_string(),
                    is_incident,
                });
            }

            let replace = match &primary {
                None => true,
                Some(current) if is_incident && !current.is_incident => true,
                Some(current) => {
                    is_incident == current.is_incident && fv.value.chars().count() > current.value.chars().count()
                }
            };
            if replace {
                trace!("Primary incident date now {:?} from {}", fv.value, fv.field);
                primary = Some(Primary {
                    value: fv.value.to_string(),
                    field: fv.field.to_string(),
                    is_incident,
                });
            }
        }

        let mut incidents: Vec<DateCandidate> = candidates
            .iter()
            .filter(|c| c.is_incident && c.standard_date.is_some())
            .cloned()
            .collect();

        for fv in fields.iter().filter(|f| f.kind == Some(StrategyKind::MultiDate)) {
            for merged in self.merge_summary(fv.field, fv.value, &incidents) {
                let known = candidates.iter().any(|c| c.standard_date == merged.standard_date);
                if !known {
                    candidates.push(merged.clone());
                }
                incidents.push(merged);
            }
        }

        let mut resolution = IncidentResolution {
            incident_date: primary.as_ref().map(|p| p.value.clone()),
            incident_source_field: primary.as_ref().map(|p| p.field.clone()),
            ..IncidentResolution::default()
        };

        // stable: equal dates keep their discovery order
        incidents.sort_by(|a, b| a.standard_date.cmp(&b.standard_date));

        if let (Some(earliest), Some(latest)) = (incidents.first(), incidents.last()) {
            let primary_standard = resolution.incident_date.as_deref().and_then(to_standard_date);
            let earlier = match (&primary_standard, &earliest.standard_date) {
                (Some(current), Some(candidate)) => candidate < current,
                _ => true,
            };
            if earlier {
                resolution.incident_date = Some(earliest.original_date.clone());
                resolution.incident_source_field = Some(earliest.source_field.clone());
            }

            if earliest.standard_date != latest.standard_date {
                resolution.incident_end_date = Some(latest.original_date.clone());
                resolution.incident_end_source_field = Some(latest.source_field.clone());
            }
        }

        debug!(
            "Resolved incident date {:?} (end {:?}) from {} candidates",
            resolution.incident_date,
            resolution.incident_end_date,
            candidates.len()
        );

        resolution.all_incident_dates = candidates;
        resolution
    }

    /// True incident candidates from one multi-date summary that are not
    /// already known.
    fn merge_summary(&self, field: &str, summary: &str, known: &[DateCandidate]) -> Vec<DateCandidate> {
        let mut merged: Vec<DateCandidate> = Vec::new();

        for (entry, date_text) in summary_entries(summary) {
            if is_bare_numeric_date(date_text) {
                continue;
            }
            let standard = to_standard_date(date_text);
            if self.is_excluded(date_text, standard.as_deref()) {
                trace!("Skipping excluded filing date {:?}", date_text);
                continue;
            }
            let Some(standard) = standard else {
                continue;
            };
            let present = known
                .iter()
                .chain(merged.iter())
                .any(|c| c.standard_date.as_deref() == Some(standard.as_str()));
            if present {
                continue;
            }
            merged.push(DateCandidate {
                original_date: entry.to_string(),
                standard_date: Some(standard),
                source_field: field.to_string(),
                is_incident: true,
            });
        }
        merged
    }
}
