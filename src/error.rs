//! Error type for the pdf2context library.
//!
//! Every failure is fatal for the request that hit it: there is no per-page
//! partial success because the whole document goes to the model in a single
//! call. [`Pdf2ContextError::status_code`] maps each variant onto the HTTP
//! status the endpoint answers with, so the server layer stays a thin shim.

use axum::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2context library.
#[derive(Debug, Error)]
pub enum Pdf2ContextError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The multipart body had no `file` field.
    #[error("No file provided in upload (expected multipart field 'file')")]
    MissingUpload,

    /// The multipart body could not be read.
    #[error("Failed to read upload: {detail}")]
    InvalidUpload { detail: String },

    /// The upload exceeded the configured body limit.
    #[error("Upload exceeds the {limit}-byte limit")]
    UploadTooLarge { limit: usize },

    /// The uploaded bytes are not a PDF.
    #[error("Uploaded file is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}")]
    CorruptPdf { detail: String },

    /// PDF requires a password; uploads carry none.
    #[error("PDF is encrypted and requires a password")]
    PasswordRequired,

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install libpdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Image errors ──────────────────────────────────────────────────────
    /// The composite image could not be PNG-encoded.
    #[error("Image encoding failed: {0}")]
    ImageEncodingFailed(#[from] image::ImageError),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The HTTP client for the model API could not be constructed.
    #[error("LLM provider is not configured: {hint}")]
    ProviderNotConfigured { hint: String },

    /// The model API rejected the credential (401/403).
    #[error("Authentication error from model API: {detail}")]
    AuthError { detail: String },

    /// The model API returned HTTP 429.
    #[error("Rate limit exceeded by model API")]
    RateLimitExceeded { retry_after_secs: Option<u64> },

    /// The model call did not finish within the configured timeout.
    #[error("Model API call timed out after {secs}s")]
    ApiTimeout { secs: u64 },

    /// The model API returned any other error.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The model answered without any text content.
    #[error("Model returned an empty completion")]
    EmptyCompletion,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write the debug composite image.
    #[error("Failed to write debug image into '{dir}': {source}")]
    DebugArtifactFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2ContextError {
    /// HTTP status the endpoint reports for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingUpload | Self::InvalidUpload { .. } => StatusCode::BAD_REQUEST,
            Self::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotAPdf { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::CorruptPdf { .. } | Self::PasswordRequired => StatusCode::UNPROCESSABLE_ENTITY,
            Self::AuthError { .. }
            | Self::RateLimitExceeded { .. }
            | Self::LlmApiError { .. }
            | Self::EmptyCompletion => StatusCode::BAD_GATEWAY,
            Self::ApiTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::PdfiumBindingFailed(_)
            | Self::ImageEncodingFailed(_)
            | Self::ProviderNotConfigured { .. }
            | Self::DebugArtifactFailed { .. }
            | Self::InvalidConfig(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// `true` when the caller sent something we cannot process.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}
