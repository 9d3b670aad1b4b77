use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::server::AppState;

// ── GET /health ──────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            message: "Service is running".to_string(),
        }),
    )
}

// ── POST /extract_text/ ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ExtractTextRequest {
    pub url: String,
}

#[derive(Serialize)]
pub struct ExtractTextResponse {
    pub extracted_text: String,
}

#[derive(Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

pub async fn extract_text_handler(
    State(state): State<AppState>,
    Json(body): Json<ExtractTextRequest>,
) -> Response {
    match state.service.extract(&body.url).await {
        Ok(output) => (
            StatusCode::OK,
            Json(ExtractTextResponse {
                extracted_text: output.text,
            }),
        )
            .into_response(),
        Err(e) => detail_response(&e),
    }
}

/// Map a pipeline failure onto the `{"detail": …}` error contract.
fn detail_response(err: &PipelineError) -> Response {
    let (status, detail) = match err {
        PipelineError::InvalidLink(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        PipelineError::Download(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error downloading file: {}", e),
        ),
        PipelineError::Extraction(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error extracting text: {}", e),
        ),
    };
    (status, Json(DetailResponse { detail })).into_response()
}

// ── POST /extract-text ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DriveLinkRequest {
    pub drive_link: Option<String>,
}

#[derive(Serialize)]
pub struct DriveLinkResponse {
    pub success: bool,
    pub text: String,
}

#[derive(Serialize)]
pub struct DriveLinkFailure {
    pub success: bool,
    pub error: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn drive_link_handler(
    State(state): State<AppState>,
    body: Result<Json<DriveLinkRequest>, JsonRejection>,
) -> Response {
    let link = match body {
        Ok(Json(DriveLinkRequest {
            drive_link: Some(link),
        })) => link,
        Ok(_) => return missing_drive_link(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable request body");
            return missing_drive_link();
        }
    };

    match state.service.extract(&link).await {
        Ok(output) => (
            StatusCode::OK,
            Json(DriveLinkResponse {
                success: true,
                text: output.text,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(DriveLinkFailure {
                success: false,
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

fn missing_drive_link() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: "Missing drive_link in request body".to_string(),
        }),
    )
        .into_response()
}
