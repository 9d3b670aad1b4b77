//! The extraction contract shared by every strategy.
//!
//! Extractors are synchronous: both the PDF parser and the OCR toolchain are
//! blocking, CPU-heavy work. The service runs them on tokio's blocking pool,
//! so implementations never need to care about the async runtime.

use crate::config::{ExtractionStrategy, ServiceConfig};
use crate::error::ExtractionError;
use crate::pipeline::{ocr::OcrExtractor, text::EmbeddedTextExtractor};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Text produced from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    /// All pages' text, in page order.
    pub text: String,
    /// Pages in the document.
    pub page_count: usize,
    /// Name of the extractor that produced `text`.
    pub strategy: &'static str,
}

/// Turns raw document bytes into text.
pub trait TextExtractor: Send + Sync {
    /// Short name used in logs and output.
    fn name(&self) -> &'static str;

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError>;
}

/// Tries `primary` and runs `fallback` only when the primary text is empty.
pub struct FallbackExtractor {
    primary: Box<dyn TextExtractor>,
    fallback: Box<dyn TextExtractor>,
}

impl FallbackExtractor {
    pub fn new(primary: Box<dyn TextExtractor>, fallback: Box<dyn TextExtractor>) -> Self {
        Self { primary, fallback }
    }
}

impl TextExtractor for FallbackExtractor {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let first = self.primary.extract(bytes)?;
        if !first.text.trim().is_empty() {
            return Ok(first);
        }
        info!(
            "{} produced no text for {} pages, falling back to {}",
            self.primary.name(),
            first.page_count,
            self.fallback.name()
        );
        self.fallback.extract(bytes)
    }
}

/// Build the extractor selected by `config.strategy`.
pub fn build_extractor(config: &ServiceConfig) -> Arc<dyn TextExtractor> {
    match config.strategy {
        ExtractionStrategy::Embedded => Arc::new(EmbeddedTextExtractor),
        ExtractionStrategy::Ocr => Arc::new(OcrExtractor::new(config.ocr.clone())),
        ExtractionStrategy::Auto => Arc::new(FallbackExtractor::new(
            Box::new(EmbeddedTextExtractor),
            Box::new(OcrExtractor::new(config.ocr.clone())),
        )),
    }
}
