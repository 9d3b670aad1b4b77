//! Retrieval: download the raw document bytes for a [`FileId`].
//!
//! ## The confirmation interstitial
//!
//! For files Drive cannot virus-scan (large ones, mostly) the direct-download
//! URL answers with an HTML warning page instead of the file. That page links
//! back to the same URL with a `confirm=<token>` parameter; reissuing the
//! request with that token releases the bytes. The page format is
//! undocumented, so the scan is a heuristic: when no token turns up we log a
//! warning and hand back whatever HTML we received rather than failing here.
//! Extraction will then reject it as "not a PDF", which is the accurate
//! diagnosis for the caller.
//!
//! The whole heuristic sits behind [`DocumentFetcher`] so it can be replaced
//! without touching the resolver or the extractors.

use crate::config::{DownloadStorage, ServiceConfig};
use crate::error::{ConfigError, DownloadError};
use crate::pipeline::link::FileId;
use async_trait::async_trait;
use futures::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, SET_COOKIE};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

static CONFIRM_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"confirm=([0-9A-Za-z_-]+)").unwrap());
static CONFIRM_INPUT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"name="confirm"\s+value="([0-9A-Za-z_-]+)""#).unwrap());

/// Anything that can turn a [`FileId`] into document bytes.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, file_id: &FileId) -> Result<FetchedDocument, DownloadError>;
}

/// Downloaded document bytes, owned by exactly one request.
///
/// The `Spooled` variant owns its [`NamedTempFile`]: dropping the document
/// deletes the file, so cleanup happens on every exit path including panics.
#[derive(Debug)]
pub enum FetchedDocument {
    Memory(Vec<u8>),
    Spooled { file: NamedTempFile, len: u64 },
}

impl FetchedDocument {
    /// Number of bytes received.
    pub fn len(&self) -> u64 {
        match self {
            FetchedDocument::Memory(bytes) => bytes.len() as u64,
            FetchedDocument::Spooled { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path of the spool file, if the document lives on disk.
    pub fn path(&self) -> Option<&Path> {
        match self {
            FetchedDocument::Memory(_) => None,
            FetchedDocument::Spooled { file, .. } => Some(file.path()),
        }
    }

    /// The document bytes, read back from disk for spooled documents.
    pub fn bytes(&self) -> std::io::Result<Cow<'_, [u8]>> {
        match self {
            FetchedDocument::Memory(bytes) => Ok(Cow::Borrowed(bytes)),
            FetchedDocument::Spooled { file, .. } => std::fs::read(file.path()).map(Cow::Owned),
        }
    }
}

/// Build the direct-download URL for a file on `base_url`.
pub fn direct_download_url(base_url: &str, file_id: &FileId) -> String {
    format!(
        "{}/uc?export=download&id={}",
        base_url.trim_end_matches('/'),
        file_id
    )
}

/// Find the confirmation token on a Drive interstitial page.
///
/// Checks the link parameter form first, then the hidden form input newer
/// pages use.
pub fn find_confirm_token(html: &str) -> Option<String> {
    CONFIRM_PARAM
        .captures(html)
        .or_else(|| CONFIRM_INPUT.captures(html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Token carried by a `download_warning*` cookie on the interstitial response.
fn cookie_confirm_token(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(parse_warning_cookie)
}

fn parse_warning_cookie(header: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    if name.starts_with("download_warning") && !value.is_empty() {
        Some(value.to_string())
    } else {
        None
    }
}

fn is_html(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false)
}

/// Production fetcher for Google Drive direct downloads.
///
/// Holds one `reqwest::Client`, shared by every request the service handles.
/// The client is never reconfigured after construction and keeps no cookie
/// jar, so concurrent requests share nothing but the connection pool.
#[derive(Debug, Clone)]
pub struct DriveFetcher {
    client: reqwest::Client,
    base_url: String,
    storage: DownloadStorage,
    max_bytes: Option<u64>,
    timeout_secs: u64,
}

impl DriveFetcher {
    pub fn new(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()
            .map_err(|e| ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.drive_base_url.trim().to_string(),
            storage: config.storage.clone(),
            max_bytes: config.max_document_bytes,
            timeout_secs: config.download_timeout_secs,
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                format!("timed out after {}s", self.timeout_secs)
            } else {
                e.to_string()
            };
            DownloadError::Request {
                url: url.to_string(),
                reason,
            }
        })?;

        if !response.status().is_success() {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }

    /// Stream a response body into a [`Sink`], enforcing the size limit.
    async fn collect(
        &self,
        url: &str,
        response: reqwest::Response,
        storage: &DownloadStorage,
    ) -> Result<FetchedDocument, DownloadError> {
        if let (Some(limit), Some(declared)) = (self.max_bytes, declared_length(&response)) {
            if declared > limit {
                return Err(DownloadError::TooLarge { limit });
            }
        }

        let mut sink = Sink::open(storage).await?;
        let mut received: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| DownloadError::Body {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
            received += chunk.len() as u64;
            if let Some(limit) = self.max_bytes {
                if received > limit {
                    return Err(DownloadError::TooLarge { limit });
                }
            }
            sink.write(&chunk).await?;
        }

        sink.finish().await
    }
}

#[async_trait]
impl DocumentFetcher for DriveFetcher {
    async fn fetch(&self, file_id: &FileId) -> Result<FetchedDocument, DownloadError> {
        let url = direct_download_url(&self.base_url, file_id);
        info!("Downloading {}", url);

        let response = self.get(&url).await?;
        if !is_html(&response) {
            let doc = self.collect(&url, response, &self.storage).await?;
            info!("Downloaded {} bytes for {}", doc.len(), file_id);
            return Ok(doc);
        }

        // Interstitial: read the page into memory and look for the token.
        let cookie_token = cookie_confirm_token(&response);
        let page = self.collect(&url, response, &DownloadStorage::Memory).await?;
        let html_token = match &page {
            FetchedDocument::Memory(bytes) => find_confirm_token(&String::from_utf8_lossy(bytes)),
            FetchedDocument::Spooled { .. } => None,
        };

        let Some(token) = html_token.or(cookie_token) else {
            warn!(
                "No confirmation token on interstitial page for {}; returning {} bytes as received",
                file_id,
                page.len()
            );
            return respool(page, &self.storage).await;
        };

        debug!("Confirmation token found for {}", file_id);
        let confirm_url = format!("{url}&confirm={token}");
        let response = self.get(&confirm_url).await?;
        let doc = self.collect(&confirm_url, response, &self.storage).await?;
        info!("Downloaded {} bytes for {} after confirmation", doc.len(), file_id);
        Ok(doc)
    }
}

fn declared_length(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// Move an in-memory document into the configured storage.
async fn respool(
    doc: FetchedDocument,
    storage: &DownloadStorage,
) -> Result<FetchedDocument, DownloadError> {
    match (doc, storage) {
        (FetchedDocument::Memory(bytes), DownloadStorage::TempFile { .. }) => {
            let mut sink = Sink::open(storage).await?;
            sink.write(&bytes).await?;
            sink.finish().await
        }
        (doc, _) => Ok(doc),
    }
}

/// Destination for a streamed body.
enum Sink {
    Memory(Vec<u8>),
    Spool {
        file: NamedTempFile,
        writer: tokio::fs::File,
        len: u64,
    },
}

impl Sink {
    async fn open(storage: &DownloadStorage) -> Result<Self, DownloadError> {
        match storage {
            DownloadStorage::Memory => Ok(Sink::Memory(Vec::new())),
            DownloadStorage::TempFile { dir } => {
                let file = spool_file(dir.as_deref()).map_err(DownloadError::Spool)?;
                let writer = file.reopen().map_err(DownloadError::Spool)?;
                debug!("Spooling download to {}", file.path().display());
                Ok(Sink::Spool {
                    file,
                    writer: tokio::fs::File::from_std(writer),
                    len: 0,
                })
            }
        }
    }

    async fn write(&mut self, chunk: &[u8]) -> Result<(), DownloadError> {
        match self {
            Sink::Memory(buf) => {
                buf.extend_from_slice(chunk);
                Ok(())
            }
            Sink::Spool { writer, len, .. } => {
                writer
                    .write_all(chunk)
                    .await
                    .map_err(DownloadError::Spool)?;
                *len += chunk.len() as u64;
                Ok(())
            }
        }
    }

    async fn finish(self) -> Result<FetchedDocument, DownloadError> {
        match self {
            Sink::Memory(buf) => Ok(FetchedDocument::Memory(buf)),
            Sink::Spool {
                file,
                mut writer,
                len,
            } => {
                writer.flush().await.map_err(DownloadError::Spool)?;
                Ok(FetchedDocument::Spooled { file, len })
            }
        }
    }
}

fn spool_file(dir: Option<&Path>) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("drivetext-").suffix(".pdf");
    match dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
}

/// Directory spool files are created in for the given storage, if any.
pub fn spool_dir(storage: &DownloadStorage) -> Option<PathBuf> {
    match storage {
        DownloadStorage::Memory => None,
        DownloadStorage::TempFile { dir } => {
            Some(dir.clone().unwrap_or_else(std::env::temp_dir))
        }
    }
}
