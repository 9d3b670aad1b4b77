//! HTTP surface: an axum router over [`crate::DriveTextService`].
//!
//! Two wire contracts are served side by side and share one pipeline:
//!
//! | Route | Body | Success |
//! |-------|------|---------|
//! | `POST /extract_text/` | `{"url": …}` | `{"extracted_text": …}` |
//! | `POST /extract-text`  | `{"drive_link": …}` | `{"success": true, "text": …}` |
//! | `GET /health` | (none) | `{"status": "healthy", …}` |

pub mod handlers;
pub mod router;

pub use router::create_router;

use crate::service::DriveTextService;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: DriveTextService,
}

impl AppState {
    pub fn new(service: DriveTextService) -> Self {
        Self { service }
    }
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, service: DriveTextService) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(
        strategy = service.strategy(),
        "Listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, create_router(AppState::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C ({}); running until killed", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
