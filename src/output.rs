//! Result of one successful pipeline run.

use serde::Serialize;

/// Extracted text plus what it took to produce it.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionOutput {
    /// Identifier the link resolved to.
    pub file_id: String,
    /// All pages' text, in page order.
    pub text: String,
    /// Extractor that produced `text` (`embedded` or `ocr`).
    pub strategy: &'static str,
    pub page_count: usize,
    pub stats: ExtractionStats,
}

/// Sizes and timings for one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionStats {
    pub bytes_downloaded: u64,
    pub download_duration_ms: u64,
    pub extract_duration_ms: u64,
    pub total_duration_ms: u64,
}
