//! Extraction records produced per document.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A date value observed in a document, with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCandidate {
    /// Date text exactly as extracted.
    pub original_date: String,

    /// `YYYY-MM-DD` form, when the text parses.
    pub standard_date: Option<String>,

    /// Catalog field that produced the date.
    pub source_field: String,

    /// Whether the date describes the incident rather than a filing.
    pub is_incident: bool,
}

/// Extraction result for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentExtractionResult {
    /// Source file name.
    pub pdf_file: String,

    /// County the catalog belongs to.
    pub county: String,

    /// Primary incident date (raw text).
    pub incident_date: Option<String>,

    /// Latest incident date when the incident spans several days (raw text).
    pub incident_end_date: Option<String>,

    /// Field the primary incident date came from.
    pub incident_source_field: Option<String>,

    /// Field the end date came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_end_source_field: Option<String>,

    /// Every date candidate seen while resolving.
    pub all_incident_dates: Vec<DateCandidate>,

    /// Comma separated e-mail addresses.
    pub emails: Option<String>,

    /// Plaintiff contact block, one line per entry.
    pub plaintiff_contact: Option<String>,

    /// When the record was assembled.
    pub extraction_timestamp: DateTime<Utc>,

    /// Raw field values in extraction order.
    pub extracted_data: IndexMap<String, String>,

    /// External document id from the batch mapping file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,

    /// Original storage path from the batch mapping file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_path: Option<String>,
}

impl DocumentExtractionResult {
    /// Whether any candidate was classified as a true incident date.
    pub fn has_true_incident(&self) -> bool {
        self.all_incident_dates.iter().any(|d| d.is_incident)
    }
}

/// A document that could not be processed in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub pdf_file: String,
    pub county: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
}

/// One entry of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchRecord {
    Failed(BatchFailure),
    Extracted(Box<DocumentExtractionResult>),
}

impl BatchRecord {
    /// File name of the document this entry describes.
    pub fn pdf_file(&self) -> &str {
        match self {
            Self::Extracted(r) => &r.pdf_file,
            Self::Failed(f) => &f.pdf_file,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
