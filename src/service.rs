//! The link-to-text pipeline: resolve → download → extract.
//!
//! [`DriveTextService`] is cheap to clone and safe to share across
//! concurrent requests: it holds the fetcher (and its connection pool) and
//! the extractor behind `Arc`s and never mutates either. Everything a single
//! run creates (the file id, the downloaded bytes, a spool file) is owned by
//! that run and dropped when it returns.

use crate::config::ServiceConfig;
use crate::error::{ConfigError, ExtractionError, PipelineError, PipelineStage};
use crate::output::{ExtractionOutput, ExtractionStats};
use crate::pipeline::extract::{build_extractor, TextExtractor};
use crate::pipeline::fetch::{DocumentFetcher, DriveFetcher};
use crate::pipeline::link::resolve_file_id;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct DriveTextService {
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Arc<dyn TextExtractor>,
}

impl DriveTextService {
    /// Assemble a service from explicit parts. Tests use this to stub the
    /// network or the extractor.
    pub fn new(fetcher: Arc<dyn DocumentFetcher>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self { fetcher, extractor }
    }

    /// The production wiring: Drive fetcher plus the configured strategy.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let fetcher = DriveFetcher::new(config)?;
        Ok(Self::new(Arc::new(fetcher), build_extractor(config)))
    }

    /// Name of the configured extractor.
    pub fn strategy(&self) -> &'static str {
        self.extractor.name()
    }

    /// Run the whole pipeline for one sharing link.
    ///
    /// # Errors
    /// The returned [`PipelineError`] names the stage that failed. A link
    /// without a file identifier fails in [`PipelineStage::Resolving`]
    /// before any network activity.
    pub async fn extract(&self, reference: &str) -> Result<ExtractionOutput, PipelineError> {
        let result = self.run(reference).await;
        if let Err(ref e) = result {
            warn!(stage = %e.stage(), error = %e, "Pipeline failed");
        }
        result
    }

    async fn run(&self, reference: &str) -> Result<ExtractionOutput, PipelineError> {
        let total_start = Instant::now();

        // ── Stage 1: Resolve ─────────────────────────────────────────────────
        debug!(stage = %PipelineStage::Resolving, "{}", reference);
        let file_id = resolve_file_id(reference)?;

        // ── Stage 2: Download ────────────────────────────────────────────────
        debug!(stage = %PipelineStage::Downloading, file_id = %file_id);
        let download_start = Instant::now();
        let document = self.fetcher.fetch(&file_id).await?;
        let download_duration_ms = download_start.elapsed().as_millis() as u64;
        let bytes_downloaded = document.len();

        // ── Stage 3: Extract ─────────────────────────────────────────────────
        debug!(stage = %PipelineStage::Extracting, strategy = self.extractor.name());
        let extract_start = Instant::now();
        let extractor = Arc::clone(&self.extractor);
        // `document` moves into the task and is dropped there, which removes
        // any spool file whether extraction succeeds or not.
        let extracted = tokio::task::spawn_blocking(move || {
            let bytes = document.bytes()?;
            extractor.extract(&bytes)
        })
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))??;
        let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

        let stats = ExtractionStats {
            bytes_downloaded,
            download_duration_ms,
            extract_duration_ms,
            total_duration_ms: total_start.elapsed().as_millis() as u64,
        };

        info!(
            file_id = %file_id,
            strategy = extracted.strategy,
            pages = extracted.page_count,
            chars = extracted.text.len(),
            "Extraction complete in {}ms",
            stats.total_duration_ms
        );

        Ok(ExtractionOutput {
            file_id: file_id.to_string(),
            text: extracted.text,
            strategy: extracted.strategy,
            page_count: extracted.page_count,
            stats,
        })
    }
}
