//! PDF text and layout extraction using lopdf and pdf-extract.

use std::panic::{AssertUnwindSafe, catch_unwind};

use lopdf::Document;
use lopdf::content::Content;
use tracing::{debug, error, trace, warn};

use super::layout::elements_from_operations;
use super::{Result, TextElement, TextSource};
use crate::error::SourceError;

/// PDF text source backed by lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create an extractor with no document loaded.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Create an extractor from PDF bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    /// Load a PDF from bytes.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| SourceError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(SourceError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the raw bytes, so keep the decrypted copy
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| SourceError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(SourceError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    /// Number of pages in the loaded document.
    pub fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| SourceError::Parse("No document loaded".to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSource for PdfExtractor {
    fn full_text(&self) -> Result<String> {
        self.document()?;

        // pdf-extract panics on some malformed fonts
        let extracted = catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(&self.raw_data)
        }));
        let text = match extracted {
            Ok(result) => result.map_err(|e| SourceError::TextExtraction(e.to_string()))?,
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    (*s).to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic".to_string()
                };
                error!(panic = %panic_msg, "pdf-extract panicked");
                return Err(SourceError::TextExtraction(format!(
                    "text extraction panicked: {}",
                    panic_msg
                )));
            }
        };

        // scanned PDFs without a text layer decode to whitespace only
        if text.trim().is_empty() {
            return Err(SourceError::Empty("PDF".to_string()));
        }
        Ok(text)
    }

    fn text_elements(&self) -> Result<Vec<TextElement>> {
        let doc = self.document()?;
        let mut elements = Vec::new();

        // get_pages is keyed by 1-based page number in page order
        for (index, (page_num, page_id)) in doc.get_pages().into_iter().enumerate() {
            let content = match doc.get_page_content(page_id) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping layout of page {}: {}", page_num, e);
                    continue;
                }
            };
            let operations = match Content::decode(&content) {
                Ok(content) => content.operations,
                Err(e) => {
                    warn!("Cannot decode content stream of page {}: {}", page_num, e);
                    continue;
                }
            };

            let page_elements = elements_from_operations(&operations, index as u32);
            trace!("Page {}: {} text elements", page_num, page_elements.len());
            elements.extend(page_elements);
        }

        debug!("Recovered {} positioned text elements", elements.len());
        Ok(elements)
    }
}
