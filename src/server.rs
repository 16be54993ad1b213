//! HTTP surface.
//!
//! - `POST /`: multipart upload (field `file`) → `context.md` attachment
//! - `GET /health`: fixed liveness payload
//!
//! Handlers share only read-only state: the config and the model client.

use crate::config::ContextConfig;
use crate::convert::convert_bytes;
use crate::error::Pdf2ContextError;
use crate::pipeline::llm::{ChatCompletionsClient, VisionModel};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Name of the attachment returned by `POST /`.
pub const ATTACHMENT_NAME: &str = "context.md";

/// State shared by all handlers.
pub struct AppState {
    pub config: ContextConfig,
    pub model: Arc<dyn VisionModel>,
}

impl AppState {
    /// State backed by the real chat completions client.
    pub fn from_config(config: ContextConfig) -> Result<Self, Pdf2ContextError> {
        let model = Arc::new(ChatCompletionsClient::new(&config)?);
        Ok(Self { config, model })
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", post(extract_context))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Serve `state` on an already-bound listener until Ctrl-C.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "healthy"}))
}

async fn extract_context(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, Pdf2ContextError> {
    let pdf_bytes = read_upload(multipart, state.config.max_upload_bytes).await?;
    let markdown = convert_bytes(state.model.as_ref(), &state.config, pdf_bytes).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", ATTACHMENT_NAME),
            ),
        ],
        markdown,
    )
        .into_response())
}

/// Pull the bytes of the `file` field out of a multipart body.
async fn read_upload(mut multipart: Multipart, limit: usize) -> Result<Vec<u8>, Pdf2ContextError> {
    let upload_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Pdf2ContextError::UploadTooLarge { limit }
        } else {
            Pdf2ContextError::InvalidUpload {
                detail: e.body_text(),
            }
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() == Some("file") {
            let bytes = field.bytes().await.map_err(upload_error)?;
            info!("received upload of {} bytes", bytes.len());
            return Ok(bytes.to_vec());
        }
    }
    Err(Pdf2ContextError::MissingUpload)
}

impl IntoResponse for Pdf2ContextError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            warn!("request rejected: {}", self);
        } else {
            error!("request failed: {}", self);
        }
        (self.status_code(), Json(json!({"detail": self.to_string()}))).into_response()
    }
}
