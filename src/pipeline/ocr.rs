//! Optical-recognition strategy: rasterise pages and run tesseract on each.
//!
//! Each page image is written to its own temp PNG and passed to the
//! configured tesseract executable, which prints the recognised text on
//! stdout. Page outputs are concatenated in page order as-is: tesseract
//! already ends every page with its own line breaks and form feed.

use crate::config::OcrConfig;
use crate::error::ExtractionError;
use crate::pipeline::extract::{ExtractedText, TextExtractor};
use crate::pipeline::render;
use image::{DynamicImage, ImageFormat};
use std::io::ErrorKind;
use std::process::Command;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct OcrExtractor {
    config: OcrConfig,
}

impl OcrExtractor {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    fn command_name(&self) -> String {
        self.config.command.display().to_string()
    }

    /// Run `tesseract --version` and return its first line.
    ///
    /// Lets operators see a missing engine at startup instead of on the
    /// first OCR request.
    pub fn probe(&self) -> Result<String, ExtractionError> {
        let output = Command::new(&self.config.command)
            .arg("--version")
            .output()
            .map_err(|e| ExtractionError::OcrUnavailable {
                command: self.command_name(),
                detail: e.to_string(),
            })?;

        // Older tesseract builds print the version banner on stderr.
        let banner = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            String::from_utf8_lossy(&output.stdout).to_string()
        };
        Ok(banner.lines().next().unwrap_or_default().trim().to_string())
    }

    /// Recognise the text on one rendered page.
    fn recognise(&self, page: usize, image: &DynamicImage) -> Result<String, ExtractionError> {
        let png = tempfile::Builder::new()
            .prefix("drivetext-page-")
            .suffix(".png")
            .tempfile()?;
        image
            .save_with_format(png.path(), ImageFormat::Png)
            .map_err(|e| ExtractionError::RenderFailed {
                page,
                detail: format!("PNG encoding failed: {}", e),
            })?;

        let output = Command::new(&self.config.command)
            .arg(png.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .output()
            .map_err(|e| {
                let detail = if e.kind() == ErrorKind::NotFound {
                    "executable not found; install tesseract-ocr or set --tesseract-cmd".to_string()
                } else {
                    e.to_string()
                };
                ExtractionError::OcrUnavailable {
                    command: self.command_name(),
                    detail,
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("Tesseract failed on page {}: {}", page, stderr);
            return Err(ExtractionError::OcrFailed {
                page,
                detail: if stderr.is_empty() {
                    format!("exit status {}", output.status)
                } else {
                    stderr
                },
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        debug!("Page {}: OCR produced {} chars", page, text.len());
        Ok(text)
    }
}

impl TextExtractor for OcrExtractor {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let pdfium = render::bind_pdfium(self.config.pdfium_library.as_deref())?;

        let mut text = String::new();
        let page_count = render::render_pages(&pdfium, bytes, self.config.dpi, |page, image| {
            text.push_str(&self.recognise(page, &image)?);
            Ok(())
        })?;

        info!("OCR complete: {} pages, {} chars", page_count, text.len());
        Ok(ExtractedText {
            text,
            page_count,
            strategy: self.name(),
        })
    }
}
