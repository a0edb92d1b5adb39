//! Core library for court document extraction.
//!
//! This crate provides:
//! - Text sources (PDF text and positioned layout elements)
//! - Declarative pattern catalogs with ten extraction strategies
//! - Plaintiff contact block and e-mail extraction
//! - Incident date classification and resolution

pub mod court;
pub mod error;
pub mod models;
pub mod pdf;

pub use court::{
    CourtExtractor, DateCandidate, FieldPattern, IncidentDateResolver, PatternCatalog,
    StrategyKind, SummaryRow,
};
pub use error::{CatalogError, DocketError, PatternError, Result, SourceError};
pub use models::config::{DocketConfig, ExtractionConfig};
pub use models::record::{BatchFailure, BatchRecord, DocumentExtractionResult};
pub use pdf::{DocumentText, LayoutDocument, PlainTextSource, TextElement, TextSource};

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;
