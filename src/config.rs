//! Configuration for the text-extraction service.
//!
//! Every knob lives in [`ServiceConfig`], built via [`ServiceConfigBuilder`].
//! The config is constructed once at startup and shared read-only by every
//! request, so nothing here is ever mutated while the service runs.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default host for direct-download URLs.
pub const DEFAULT_DRIVE_BASE_URL: &str = "https://drive.google.com";

/// Configuration for a [`crate::DriveTextService`].
///
/// # Example
/// ```rust
/// use drivetext::{ExtractionStrategy, ServiceConfig};
///
/// let config = ServiceConfig::builder()
///     .strategy(ExtractionStrategy::Ocr)
///     .ocr_command("/usr/bin/tesseract")
///     .download_timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.ocr.language, "eng");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Scheme and host that direct-download URLs are built on.
    /// Default: `https://drive.google.com`.
    pub drive_base_url: String,

    /// Which extractor turns document bytes into text. Default: [`ExtractionStrategy::Embedded`].
    pub strategy: ExtractionStrategy,

    /// OCR toolchain settings. Only read when the strategy can run OCR.
    pub ocr: OcrConfig,

    /// Where downloaded bytes live until extraction finishes. Default: memory.
    pub storage: DownloadStorage,

    /// Client-side timeout for each download request in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Reject downloads larger than this many bytes. Default: unlimited.
    pub max_document_bytes: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            drive_base_url: DEFAULT_DRIVE_BASE_URL.to_string(),
            strategy: ExtractionStrategy::default(),
            ocr: OcrConfig::default(),
            storage: DownloadStorage::default(),
            download_timeout_secs: 120,
            max_document_bytes: None,
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// OCR engine and rasteriser settings.
///
/// The engine location is explicit configuration handed to the extractor at
/// construction time, never process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Tesseract executable: a bare name resolved via `PATH`, or a full path.
    pub command: PathBuf,

    /// Tesseract language code(s), e.g. `eng` or `eng+deu`.
    pub language: String,

    /// Rendering resolution. 72 DPI is the page's intrinsic size
    /// (one pixel per PDF point). Range: 72–400.
    pub dpi: u32,

    /// Directory holding the pdfium shared library. `None` binds the
    /// system library.
    pub pdfium_library: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            dpi: 72,
            pdfium_library: None,
        }
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn drive_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.drive_base_url = url.into();
        self
    }

    pub fn strategy(mut self, strategy: ExtractionStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn ocr_command(mut self, command: impl Into<PathBuf>) -> Self {
        self.config.ocr.command = command.into();
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr.language = lang.into();
        self
    }

    pub fn ocr_dpi(mut self, dpi: u32) -> Self {
        self.config.ocr.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn pdfium_library(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.ocr.pdfium_library = Some(dir.into());
        self
    }

    pub fn storage(mut self, storage: DownloadStorage) -> Self {
        self.config.storage = storage;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_document_bytes(mut self, limit: u64) -> Self {
        self.config.max_document_bytes = Some(limit);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, ConfigError> {
        let c = &self.config;
        let base = c.drive_base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError(format!(
                "drive base URL must be http(s), got '{}'",
                c.drive_base_url
            )));
        }
        if reqwest::Url::parse(base).is_err() {
            return Err(ConfigError(format!(
                "drive base URL is not a valid URL: '{}'",
                c.drive_base_url
            )));
        }
        if c.ocr.dpi < 72 || c.ocr.dpi > 400 {
            return Err(ConfigError(format!(
                "OCR DPI must be 72–400, got {}",
                c.ocr.dpi
            )));
        }
        if c.ocr.language.trim().is_empty() {
            return Err(ConfigError("OCR language must not be empty".into()));
        }
        if c.download_timeout_secs == 0 {
            return Err(ConfigError("download timeout must be ≥ 1s".into()));
        }
        if c.max_document_bytes == Some(0) {
            return Err(ConfigError("max document bytes must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How document bytes are turned into text.
///
/// | Strategy | Needs | Good for |
/// |----------|-------|----------|
/// | `Embedded` | nothing native | born-digital PDFs (default) |
/// | `Ocr` | pdfium + tesseract | scans, image-only PDFs |
/// | `Auto` | pdfium + tesseract | mixed input; OCR only when the text layer is empty |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStrategy {
    /// Read the document's embedded text layer. (default)
    #[default]
    Embedded,
    /// Rasterise every page and run OCR.
    Ocr,
    /// Embedded first; OCR when that yields no text.
    Auto,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStrategy::Embedded => "embedded",
            ExtractionStrategy::Ocr => "ocr",
            ExtractionStrategy::Auto => "auto",
        }
    }
}

/// Where a downloaded document is held until extraction completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadStorage {
    /// Keep bytes in memory. (default)
    #[default]
    Memory,
    /// Stream into a uniquely named temp file, deleted when the request ends.
    /// `dir: None` uses the OS temp directory.
    TempFile { dir: Option<PathBuf> },
}
