//! Document text sources.
//!
//! The extraction engine consumes plain text plus an ordered list of
//! positioned text elements. [`TextSource`] abstracts where those come from:
//! a PDF ([`PdfExtractor`]), a pre-computed layout file ([`LayoutDocument`]),
//! or in-memory text ([`PlainTextSource`]).

#[cfg(feature = "pdf")]
mod extractor;
#[cfg(feature = "pdf")]
mod layout;

#[cfg(feature = "pdf")]
pub use extractor::PdfExtractor;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Result type for text source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// A positioned run of text on a page.
///
/// Coordinates are PDF user-space units with the origin at the bottom-left
/// corner of the page. Elements are ordered page-then-layout order, which is
/// not guaranteed to be reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub text: String,
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    /// Zero-based page index.
    pub page: u32,
}

impl TextElement {
    pub fn new(text: impl Into<String>, x0: f32, y0: f32, x1: f32, y1: f32, page: u32) -> Self {
        Self {
            text: text.into(),
            x0,
            y0,
            x1,
            y1,
            page,
        }
    }
}

/// Trait for anything that can supply document text to the extractor.
pub trait TextSource {
    /// Full document text.
    fn full_text(&self) -> Result<String>;

    /// Positioned text elements. An empty list disables spatial strategies.
    fn text_elements(&self) -> Result<Vec<TextElement>>;
}

/// Borrowed view of one document handed to extraction strategies.
#[derive(Debug, Clone, Copy)]
pub struct DocumentText<'a> {
    pub text: &'a str,
    pub elements: &'a [TextElement],
}

impl<'a> DocumentText<'a> {
    pub fn new(text: &'a str, elements: &'a [TextElement]) -> Self {
        Self { text, elements }
    }

    /// Text-only view with no layout information.
    pub fn text_only(text: &'a str) -> Self {
        Self { text, elements: &[] }
    }
}

/// In-memory text with optional elements.
#[derive(Debug, Clone, Default)]
pub struct PlainTextSource {
    text: String,
    elements: Vec<TextElement>,
}

impl PlainTextSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            elements: Vec::new(),
        }
    }

    pub fn with_elements(mut self, elements: Vec<TextElement>) -> Self {
        self.elements = elements;
        self
    }
}

impl TextSource for PlainTextSource {
    fn full_text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn text_elements(&self) -> Result<Vec<TextElement>> {
        Ok(self.elements.clone())
    }
}

/// Pre-extracted layout stored as JSON: `{ "text": ..., "elements": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub text: String,
    #[serde(default)]
    pub elements: Vec<TextElement>,
}

impl LayoutDocument {
    /// Parse a layout document from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|e| SourceError::Parse(e.to_string()))
    }
}

impl TextSource for LayoutDocument {
    fn full_text(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn text_elements(&self) -> Result<Vec<TextElement>> {
        Ok(self.elements.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_document_from_json() {
        let json = br#"{
            "text": "Case No. 2024-CI-000123-A",
            "elements": [
                {"text": "Case No.", "x0": 10.0, "y0": 700.0, "x1": 50.0, "y1": 710.0, "page": 0}
            ]
        }"#;

        let doc = LayoutDocument::from_json(json).unwrap();
        assert_eq!(doc.full_text().unwrap(), "Case No. 2024-CI-000123-A");
        assert_eq!(doc.text_elements().unwrap().len(), 1);
    }

    #[test]
    fn test_layout_document_elements_optional() {
        let doc = LayoutDocument::from_json(br#"{"text": "hello"}"#).unwrap();
        assert!(doc.text_elements().unwrap().is_empty());
    }

    #[test]
    fn test_layout_document_rejects_garbage() {
        assert!(matches!(
            LayoutDocument::from_json(b"not json"),
            Err(SourceError::Parse(_))
        ));
    }
}
