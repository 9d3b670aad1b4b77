//! Download-stage tests against a local stand-in for Drive's `/uc` endpoint.
//!
//! The fake server answers per file id:
//!
//! | id | response |
//! |----|----------|
//! | `DIRECT` | the PDF, `application/pdf` |
//! | `GUARDED` | interstitial with a `confirm=` link, PDF once confirmed |
//! | `COOKIE` | interstitial with only a `download_warning` cookie, PDF once confirmed |
//! | `NOTOKEN` | interstitial with no token anywhere |
//! | anything else | 404 |

mod common;

use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use common::pdf_with_pages;
use drivetext::pipeline::fetch::DriveFetcher;
use drivetext::{
    resolve_file_id, DocumentFetcher, DownloadError, DownloadStorage, DriveTextService,
    FetchedDocument, PipelineError, PipelineStage, ServiceConfig,
};
use std::collections::HashMap;
use std::path::Path;
use tokio::net::TcpListener;

const TOKEN: &str = "t0k-3N_x";
const COOKIE_TOKEN: &str = "ck9";

fn pdf_response() -> Response {
    (
        [(header::CONTENT_TYPE, "application/pdf")],
        pdf_with_pages(&["Hello", "World"]),
    )
        .into_response()
}

async fn uc(Query(params): Query<HashMap<String, String>>) -> Response {
    let id = params.get("id").map(String::as_str).unwrap_or_default();
    let confirm = params.get("confirm").map(String::as_str);

    match (id, confirm) {
        ("DIRECT", _) => pdf_response(),
        ("GUARDED", Some(TOKEN)) => pdf_response(),
        ("GUARDED", _) => Html(format!(
            r#"<html><body>Google Drive can't scan this file for viruses.
            <a id="uc-download-link" href="/uc?export=download&amp;confirm={TOKEN}&amp;id=GUARDED">Download anyway</a>
            </body></html>"#
        ))
        .into_response(),
        ("COOKIE", Some(COOKIE_TOKEN)) => pdf_response(),
        ("COOKIE", _) => (
            [(
                header::SET_COOKIE,
                format!("download_warning_13058_COOKIE={COOKIE_TOKEN}; Path=/uc; Secure"),
            )],
            Html("<html><body>Virus scan warning</body></html>"),
        )
            .into_response(),
        ("NOTOKEN", _) => Html("<html><body>Quota exceeded</body></html>").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn start_fake_drive() -> (String, tokio::sync::oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://127.0.0.1:{}", addr.port());

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        let app = Router::new().route("/uc", get(uc));
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (base_url, shutdown_tx)
}

fn config_for(base_url: &str) -> ServiceConfig {
    ServiceConfig::builder()
        .drive_base_url(base_url)
        .download_timeout_secs(10)
        .build()
        .unwrap()
}

async fn fetch(config: &ServiceConfig, id: &str) -> Result<FetchedDocument, DownloadError> {
    let fetcher = DriveFetcher::new(config).unwrap();
    let file_id = resolve_file_id(&format!("https://drive.google.com/open?id={id}")).unwrap();
    fetcher.fetch(&file_id).await
}

fn is_pdf(doc: &FetchedDocument) -> bool {
    doc.bytes().unwrap().starts_with(b"%PDF-")
}

fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[tokio::test]
async fn downloads_direct_pdf() {
    let (base_url, shutdown) = start_fake_drive().await;

    let doc = fetch(&config_for(&base_url), "DIRECT").await.unwrap();
    assert!(is_pdf(&doc));
    assert!(doc.path().is_none(), "memory storage by default");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn follows_confirmation_link_on_interstitial() {
    let (base_url, shutdown) = start_fake_drive().await;

    let doc = fetch(&config_for(&base_url), "GUARDED").await.unwrap();
    assert!(is_pdf(&doc), "expected the confirmed PDF, not the warning page");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn falls_back_to_download_warning_cookie() {
    let (base_url, shutdown) = start_fake_drive().await;

    let doc = fetch(&config_for(&base_url), "COOKIE").await.unwrap();
    assert!(is_pdf(&doc));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn returns_page_as_received_when_no_token() {
    let (base_url, shutdown) = start_fake_drive().await;

    let doc = fetch(&config_for(&base_url), "NOTOKEN").await.unwrap();
    let bytes = doc.bytes().unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("Quota exceeded"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn non_success_status_is_download_error() {
    let (base_url, shutdown) = start_fake_drive().await;

    let err = fetch(&config_for(&base_url), "NOPE").await.unwrap_err();
    assert_eq!(err.status(), Some(404), "got: {err}");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn enforces_size_limit() {
    let (base_url, shutdown) = start_fake_drive().await;
    let config = ServiceConfig::builder()
        .drive_base_url(&base_url)
        .max_document_bytes(16)
        .build()
        .unwrap();

    let err = fetch(&config, "DIRECT").await.unwrap_err();
    assert!(
        matches!(err, DownloadError::TooLarge { limit: 16 }),
        "got: {err:?}"
    );

    let _ = shutdown.send(());
}

#[tokio::test]
async fn unreachable_host_is_request_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = fetch(&config_for(&format!("http://127.0.0.1:{port}")), "DIRECT")
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::Request { .. }), "got: {err:?}");
}

// ── Full pipeline over HTTP ──────────────────────────────────────────────

#[tokio::test]
async fn pipeline_extracts_text_from_guarded_file() {
    let (base_url, shutdown) = start_fake_drive().await;
    let service = DriveTextService::from_config(&config_for(&base_url)).unwrap();

    let out = service
        .extract("https://drive.google.com/file/d/GUARDED/view?usp=sharing")
        .await
        .unwrap();
    assert_eq!(out.text, "Hello\nWorld");
    assert_eq!(out.page_count, 2);
    assert_eq!(out.strategy, "embedded");
    assert!(out.stats.bytes_downloaded > 0);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn spool_files_removed_after_success_and_failure() {
    let (base_url, shutdown) = start_fake_drive().await;
    let spool = tempfile::tempdir().unwrap();
    let config = ServiceConfig::builder()
        .drive_base_url(&base_url)
        .storage(DownloadStorage::TempFile {
            dir: Some(spool.path().to_path_buf()),
        })
        .build()
        .unwrap();
    let service = DriveTextService::from_config(&config).unwrap();

    let out = service
        .extract("https://drive.google.com/open?id=DIRECT")
        .await
        .unwrap();
    assert_eq!(out.text, "Hello\nWorld");
    assert!(dir_is_empty(spool.path()), "spool left behind after success");

    let err = service
        .extract("https://drive.google.com/open?id=NOTOKEN")
        .await
        .unwrap_err();
    assert_eq!(err.stage(), PipelineStage::Extracting);
    assert!(matches!(err, PipelineError::Extraction(_)));
    assert!(dir_is_empty(spool.path()), "spool left behind after failure");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let (base_url, shutdown) = start_fake_drive().await;
    let service = DriveTextService::from_config(&config_for(&base_url)).unwrap();

    let ok = service.extract("https://drive.google.com/open?id=DIRECT");
    let missing = service.extract("https://drive.google.com/open?id=GONE");
    let invalid = service.extract("https://example.com/nothing");
    let (ok, missing, invalid) = tokio::join!(ok, missing, invalid);

    assert_eq!(ok.unwrap().text, "Hello\nWorld");
    assert_eq!(missing.unwrap_err().stage(), PipelineStage::Downloading);
    assert_eq!(invalid.unwrap_err().stage(), PipelineStage::Resolving);

    let _ = shutdown.send(());
}
