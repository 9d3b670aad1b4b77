//! # drivetext
//!
//! Turn a shared Google Drive link into the text of the document behind it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! link
//!  │
//!  ├─ 1. Resolve   pull the file id out of /file/d/<ID>/… or ?id=<ID>
//!  ├─ 2. Download  uc?export=download&id=<ID>, confirm-token handshake
//!  ├─ 3. Extract   embedded text layer (lopdf) or render + OCR (pdfium + tesseract)
//!  └─ 4. Output    text + per-stage stats
//! ```
//!
//! Each stage failure stops the run and surfaces as one
//! [`PipelineError`] variant, which the HTTP layer maps onto a status code.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use drivetext::{DriveTextService, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = DriveTextService::from_config(&ServiceConfig::default())?;
//!     let output = service
//!         .extract("https://drive.google.com/file/d/ABC123/view")
//!         .await?;
//!     println!("{}", output.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `drivetext` binary (clap + anyhow + tracing-subscriber) |
//!
//! ## Choosing a Strategy
//!
//! | Strategy | Native deps | Notes |
//! |----------|-------------|-------|
//! | `embedded` | none | Default. Reads the PDF text layer; empty for scans |
//! | `ocr` | libpdfium, tesseract | Renders each page and recognises it |
//! | `auto` | libpdfium, tesseract | Embedded first, OCR only if that is empty |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod server;
pub mod service;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DownloadStorage, ExtractionStrategy, OcrConfig, ServiceConfig, ServiceConfigBuilder};
pub use error::{
    ConfigError, DownloadError, ExtractionError, InvalidLinkError, PipelineError, PipelineStage,
};
pub use output::{ExtractionOutput, ExtractionStats};
pub use pipeline::extract::{ExtractedText, TextExtractor};
pub use pipeline::fetch::{DocumentFetcher, FetchedDocument};
pub use pipeline::link::{resolve_file_id, FileId};
pub use server::{create_router, serve, AppState};
pub use service::DriveTextService;
