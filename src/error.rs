//! Error types for the drivetext library.
//!
//! One error type per pipeline stage, so each failure maps onto exactly one
//! response category at the HTTP boundary:
//!
//! * [`InvalidLinkError`] (Client input): the link carries no file
//!   identifier. Raised before any network activity.
//!
//! * [`DownloadError`] (Retrieval): transport failure, non-success
//!   upstream status, unreadable body, or a spool file that could not be
//!   written.
//!
//! * [`ExtractionError`] (Extraction): the bytes are not a usable
//!   document, or the rendering/OCR toolchain failed.
//!
//! [`PipelineError`] wraps all three and records which [`PipelineStage`]
//! failed. Configuration problems are reported separately as [`ConfigError`]
//! because they surface at startup, never per request.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

// ── Pipeline stages ──────────────────────────────────────────────────────

/// The three states a request's pipeline visits, strictly in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Resolving,
    Downloading,
    Extracting,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Resolving => "resolving",
            PipelineStage::Downloading => "downloading",
            PipelineStage::Extracting => "extracting",
        };
        f.write_str(name)
    }
}

// ── Stage errors ─────────────────────────────────────────────────────────

/// The link matched neither the `/file/d/<ID>` nor the `?id=<ID>` shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid Google Drive URL")]
pub struct InvalidLinkError {
    /// The rejected input, kept for logging.
    pub input: String,
}

/// Failure while retrieving the document bytes.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The request never produced a response (DNS, TLS, connect, timeout).
    #[error("request to '{url}' failed: {reason}")]
    Request { url: String, reason: String },

    /// Upstream answered with a non-success status.
    #[error("HTTP {status} from '{url}'")]
    Status { url: String, status: u16 },

    /// The response started but the body could not be read to the end.
    #[error("failed to read response body from '{url}': {reason}")]
    Body { url: String, reason: String },

    /// The body exceeded the configured `max_document_bytes`.
    #[error("document exceeds the {limit}-byte limit")]
    TooLarge { limit: u64 },

    /// Writing the download to its temporary spool file failed.
    #[error("failed to spool download to disk: {0}")]
    Spool(#[source] std::io::Error),
}

impl DownloadError {
    /// Upstream HTTP status, when the failure was a status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            DownloadError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure while turning document bytes into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The buffer is not a document the strategy can open.
    #[error("not a valid PDF document: {detail}")]
    InvalidDocument { detail: String },

    /// The document opened but a page's text layer could not be read.
    #[error("failed to read text from page {page}: {detail}")]
    PageText { page: usize, detail: String },

    /// pdfium could not be loaded, so pages cannot be rasterised.
    #[error(
        "PDF renderer unavailable: {0}\n\
Set PDFIUM_LIB_PATH (or --pdfium-lib) to a directory containing libpdfium."
    )]
    RendererUnavailable(String),

    /// pdfium returned an error for a specific page.
    #[error("rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// The OCR executable could not be started.
    #[error("OCR engine '{command}' unavailable: {detail}")]
    OcrUnavailable { command: String, detail: String },

    /// The OCR executable ran but reported failure.
    #[error("OCR failed on page {page}: {detail}")]
    OcrFailed { page: usize, detail: String },

    /// Reading a spooled document or writing a page image failed.
    #[error("I/O error during extraction: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking extraction task panicked or was cancelled.
    #[error("extraction task failed: {0}")]
    Task(String),
}

// ── Pipeline error ───────────────────────────────────────────────────────

/// A failed pipeline run: which stage failed and why.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidLink(#[from] InvalidLinkError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl PipelineError {
    /// The stage in which the pipeline stopped.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::InvalidLink(_) => PipelineStage::Resolving,
            PipelineError::Download(_) => PipelineStage::Downloading,
            PipelineError::Extraction(_) => PipelineStage::Extracting,
        }
    }
}

/// Builder validation failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid configuration: {0}")]
pub struct ConfigError(pub String);
