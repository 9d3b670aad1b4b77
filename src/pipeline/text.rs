//! Embedded-text strategy: read each page's text layer with `lopdf`.
//!
//! Pure Rust, no native libraries, and far cheaper than OCR. It only works
//! for documents that actually carry a text layer; scans come back empty.

use crate::error::ExtractionError;
use crate::pipeline::extract::{ExtractedText, TextExtractor};
use lopdf::Document;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedTextExtractor;

impl TextExtractor for EmbeddedTextExtractor {
    fn name(&self) -> &'static str {
        "embedded"
    }

    /// Pages are visited in order; each contributes its text plus one
    /// trailing newline, and the assembled result is trimmed.
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::InvalidDocument {
            detail: e.to_string(),
        })?;

        // BTreeMap keyed by 1-based page number, so iteration is page order.
        let pages = doc.get_pages();
        let mut text = String::new();

        for &page_num in pages.keys() {
            let page_text =
                doc.extract_text(&[page_num])
                    .map_err(|e| ExtractionError::PageText {
                        page: page_num as usize,
                        detail: e.to_string(),
                    })?;
            debug!("Page {}: {} chars of embedded text", page_num, page_text.len());
            text.push_str(page_text.trim_end());
            text.push('\n');
        }

        Ok(ExtractedText {
            text: text.trim().to_string(),
            page_count: pages.len(),
            strategy: self.name(),
        })
    }
}
