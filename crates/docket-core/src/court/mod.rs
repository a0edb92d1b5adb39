//! Court document extraction module.

pub mod catalog;
pub mod contact;
mod extractor;
pub mod resolver;
pub mod rules;
pub mod strategies;
mod summary;

pub use catalog::{FieldPattern, PatternCatalog, StrategyKind};
pub use contact::ContactExtractor;
pub use extractor::{CourtExtractor, ExtractedField};
pub use resolver::{FieldValue, IncidentDateResolver, IncidentResolution};
pub use summary::{SUMMARY_HEADERS, SummaryRow};

pub use crate::models::record::DateCandidate;
