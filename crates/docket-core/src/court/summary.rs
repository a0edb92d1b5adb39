//! Tabular batch summary, one row per document.

use serde::Serialize;

use crate::models::record::{BatchRecord, DocumentExtractionResult};

use super::rules::dates::{is_bare_numeric_date, is_true_incident_date, standardize_multiple_dates, to_standard_date};

/// Column headers in output order.
pub const SUMMARY_HEADERS: [&str; 13] = [
    "PDF File",
    "County",
    "Doc ID",
    "Incident Date",
    "Incident End Date",
    "Standard Incident Date",
    "Standard Incident End Date",
    "Is Incident",
    "All Dates Count",
    "Multiple Dates",
    "Standard Multiple Dates",
    "Emails",
    "Status",
];

const NOT_AVAILABLE: &str = "NA";
const MAX_SUMMARY_CHARS: usize = 100;

/// One summary row. Serializes with the [`SUMMARY_HEADERS`] column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryRow {
    #[serde(rename = "PDF File")]
    pub pdf_file: String,
    #[serde(rename = "County")]
    pub county: String,
    #[serde(rename = "Doc ID")]
    pub doc_id: String,
    #[serde(rename = "Incident Date")]
    pub incident_date: String,
    #[serde(rename = "Incident End Date")]
    pub incident_end_date: String,
    #[serde(rename = "Standard Incident Date")]
    pub standard_incident_date: String,
    #[serde(rename = "Standard Incident End Date")]
    pub standard_incident_end_date: String,
    #[serde(rename = "Is Incident")]
    pub is_incident: String,
    #[serde(rename = "All Dates Count")]
    pub all_dates_count: String,
    #[serde(rename = "Multiple Dates")]
    pub multiple_dates: String,
    #[serde(rename = "Standard Multiple Dates")]
    pub standard_multiple_dates: String,
    #[serde(rename = "Emails")]
    pub emails: String,
    #[serde(rename = "Status")]
    pub status: String,
}

impl SummaryRow {
    /// Summarize a batch entry. `multi_date_field` names the field whose
    /// value fills the Multiple Dates column.
    pub fn from_record(record: &BatchRecord, multi_date_field: Option<&str>) -> Self {
        match record {
            BatchRecord::Failed(failure) => Self {
                pdf_file: failure.pdf_file.clone(),
                county: failure.county.clone(),
                doc_id: failure.doc_id.clone().unwrap_or_default(),
                status: format!("ERROR: {}", failure.error),
                ..Self::default()
            },
            BatchRecord::Extracted(result) => Self::from_result(result, multi_date_field),
        }
    }

    fn from_result(result: &DocumentExtractionResult, multi_date_field: Option<&str>) -> Self {
        let primary = result.incident_date.as_deref().unwrap_or_default();
        let end = result.incident_end_date.as_deref().unwrap_or_default();

        // a bare filing-style primary means nothing better was found
        let has_incident = result.has_true_incident() && !is_bare_numeric_date(primary);

        let mut row = Self {
            pdf_file: result.pdf_file.clone(),
            county: result.county.clone(),
            doc_id: result.doc_id.clone().unwrap_or_default(),
            all_dates_count: result.all_incident_dates.len().to_string(),
            emails: result.emails.clone().unwrap_or_default(),
            status: "Success".to_string(),
            ..Self::default()
        };

        if !has_incident {
            row.incident_date = NOT_AVAILABLE.to_string();
            row.standard_incident_date = NOT_AVAILABLE.to_string();
            row.is_incident = "False".to_string();
            row.multiple_dates = NOT_AVAILABLE.to_string();
            return row;
        }

        let source_field = result.incident_source_field.as_deref().unwrap_or_default();
        let is_incident = !primary.is_empty() && is_true_incident_date(source_field, primary);
        let summary = multi_date_field
            .and_then(|field| result.extracted_data.get(field))
            .map(String::as_str)
            .unwrap_or_default();

        row.incident_date = primary.to_string();
        row.incident_end_date = end.to_string();
        row.standard_incident_date = to_standard_date(primary).unwrap_or_default();
        row.standard_incident_end_date = to_standard_date(end).unwrap_or_default();
        row.is_incident = if is_incident { "True" } else { "False" }.to_string();
        row.multiple_dates = truncate(summary);
        row.standard_multiple_dates = standardize_multiple_dates(summary);
        row
    }
}

fn truncate(summary: &str) -> String {
    match summary.char_indices().nth(MAX_SUMMARY_CHARS) {
        Some((cut, _)) => format!("{}...", &summary[..cut]),
        None => summary.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{BatchFailure, DateCandidate};
    use chrono::Utc;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn result(incident: Option<&str>, candidates: Vec<DateCandidate>) -> DocumentExtractionResult {
        let mut extracted_data = IndexMap::new();
        extracted_data.insert(
            "multiple_dates_extractor".to_string(),
            "March 1, 2024 (collision) | June 2, 2024".to_string(),
        );
        DocumentExtractionResult {
            pdf_file: "roe.pdf".to_string(),
            county: "travis".to_string(),
            incident_date: incident.map(str::to_string),
            incident_end_date: Some("June 2, 2024".to_string()),
            incident_source_field: Some("facts_date".to_string()),
            incident_end_source_field: Some("multiple_dates_extractor".to_string()),
            all_incident_dates: candidates,
            emails: Some("a@firm.com".to_string()),
            plaintiff_contact: None,
            extraction_timestamp: Utc::now(),
            extracted_data,
            doc_id: Some("doc-1".to_string()),
            original_path: None,
        }
    }

    fn candidate(date: &str, is_incident: bool) -> DateCandidate {
        DateCandidate {
            original_date: date.to_string(),
            standard_date: to_standard_date(date),
            source_field: "facts_date".to_string(),
            is_incident,
        }
    }

    #[test]
    fn test_success_row() {
        let record = BatchRecord::Extracted(Box::new(result(
            Some("March 1, 2024"),
            vec![candidate("March 1, 2024", true)],
        )));
        let row = SummaryRow::from_record(&record, Some("multiple_dates_extractor"));

        assert_eq!(row.doc_id, "doc-1");
        assert_eq!(row.incident_date, "March 1, 2024");
        assert_eq!(row.standard_incident_date, "2024-03-01");
        assert_eq!(row.standard_incident_end_date, "2024-06-02");
        assert_eq!(row.is_incident, "True");
        assert_eq!(row.all_dates_count, "1");
        assert_eq!(row.multiple_dates, "March 1, 2024 (collision) | June 2, 2024");
        assert_eq!(row.standard_multiple_dates, "2024-03-01 | 2024-06-02");
        assert_eq!(row.status, "Success");
    }

    #[test]
    fn test_no_true_incident_is_na() {
        let record = BatchRecord::Extracted(Box::new(result(
            Some("May 10, 2024"),
            vec![candidate("May 10, 2024", false)],
        )));
        let row = SummaryRow::from_record(&record, Some("multiple_dates_extractor"));

        assert_eq!(row.incident_date, "NA");
        assert_eq!(row.standard_incident_date, "NA");
        assert_eq!(row.incident_end_date, "");
        assert_eq!(row.standard_incident_end_date, "");
        assert_eq!(row.is_incident, "False");
        assert_eq!(row.multiple_dates, "NA");
        assert_eq!(row.standard_multiple_dates, "");
    }

    #[test]
    fn test_bare_primary_is_na() {
        let record = BatchRecord::Extracted(Box::new(result(
            Some("05/10/2024"),
            vec![candidate("05/10/2024", true)],
        )));
        let row = SummaryRow::from_record(&record, None);
        assert_eq!(row.incident_date, "NA");
        assert_eq!(row.is_incident, "False");
    }

    #[test]
    fn test_failure_row() {
        let record = BatchRecord::Failed(BatchFailure {
            pdf_file: "locked.pdf".to_string(),
            county: "travis".to_string(),
            error: "PDF is encrypted".to_string(),
            doc_id: None,
        });
        let row = SummaryRow::from_record(&record, None);

        assert_eq!(row.status, "ERROR: PDF is encrypted");
        assert_eq!(row.incident_date, "");
        assert_eq!(row.all_dates_count, "");
    }

    #[test]
    fn test_long_summary_truncated() {
        let long = "x".repeat(120);
        assert_eq!(truncate(&long), format!("{}...", "x".repeat(100)));
        assert_eq!(truncate("short"), "short");
        assert_eq!(truncate(&"y".repeat(100)), "y".repeat(100));
    }
}
