//! Whole-document entry point: PDF bytes in, Markdown out.
//!
//! ```text
//! bytes ──▶ extract ──▶ composite ──▶ encode ──▶ model ──▶ markdown
//!           (pdfium)    (stack)       (PNG/b64)  (1 call)
//! ```

use crate::analyze::analyze_document;
use crate::config::ContextConfig;
use crate::error::Pdf2ContextError;
use crate::pipeline::extract::extract_document;
use crate::pipeline::llm::VisionModel;
use std::time::Instant;
use tracing::info;

/// Convert PDF bytes into the model's Markdown reconstruction.
///
/// # Errors
/// - `NotAPdf` / `CorruptPdf` / `PasswordRequired` for unusable input
/// - `PdfiumBindingFailed` when the PDF engine is unavailable
/// - any model error, unretried
pub async fn convert_bytes(
    model: &dyn VisionModel,
    config: &ContextConfig,
    bytes: Vec<u8>,
) -> Result<String, Pdf2ContextError> {
    let total_start = Instant::now();
    info!("Starting conversion of {} bytes", bytes.len());

    // ── Step 1: Extract text and images ─────────────────────────────────
    let extracted = extract_document(bytes, config.pdfium_lib_path.as_deref()).await?;
    info!(
        "{} pages, {} chars of text, {} images",
        extracted.page_count,
        extracted.text.len(),
        extracted.images.len()
    );

    // ── Step 2: Analyse with the model ──────────────────────────────────
    let markdown = analyze_document(model, config, extracted.text, extracted.images).await?;

    info!(
        "Conversion complete in {}ms",
        total_start.elapsed().as_millis()
    );
    Ok(markdown)
}
