//! Error types for the docket-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the docket library.
#[derive(Error, Debug)]
pub enum DocketError {
    /// Text source (PDF or layout) error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Pattern catalog error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by a text source when it cannot produce document text.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Failed to open/parse the document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Failed to extract text.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The document has no pages.
    #[error("document has no pages")]
    NoPages,

    /// The document produced no usable text.
    #[error("no text extracted from {0}")]
    Empty(String),
}

/// Errors loading a pattern catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("cannot read pattern file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog document is not valid JSON or has the wrong shape.
    #[error("malformed pattern file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No catalog file was found in a directory.
    #[error("no pattern file found in {0}")]
    NotFound(PathBuf),
}

/// A single sub-pattern that could not be compiled.
#[derive(Error, Debug)]
#[error("invalid pattern {pattern:?} in field {field}: {source}")]
pub struct PatternError {
    /// Field the pattern belongs to.
    pub field: String,
    /// Pattern source text.
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// Result type for the docket library.
pub type Result<T> = std::result::Result<T, DocketError>;
