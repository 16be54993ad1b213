//! Document analysis: prompt + composite image → one model call → Markdown.
//!
//! All extracted images are merged into one stacked composite and sent as the
//! only image part; the model never sees them individually.

use crate::config::ContextConfig;
use crate::error::Pdf2ContextError;
use crate::pipeline::llm::{ChatRequest, VisionModel};
use crate::pipeline::{composite, encode};
use crate::prompts::reconstruction_prompt;
use image::DynamicImage;
use std::time::Instant;
use tracing::{debug, info};

/// Build the chat request for a document without sending it.
///
/// Composites and encodes `images` when there are any, and writes the
/// composite into `config.debug_image_dir` when that is set. CPU-bound; call
/// it from a blocking context for large documents.
pub fn build_chat_request(
    config: &ContextConfig,
    text: &str,
    images: &[DynamicImage],
) -> Result<ChatRequest, Pdf2ContextError> {
    let prompt = reconstruction_prompt(text);

    let image_url = match composite::stack_vertically(images) {
        Some(stacked) => {
            let png = encode::encode_png(&stacked)?;
            if let Some(dir) = &config.debug_image_dir {
                encode::write_debug_image(dir, &png)?;
            }
            Some(encode::png_data_url(&png))
        }
        None => None,
    };

    let mut request = ChatRequest::user(config.model.clone(), prompt, image_url);
    request.temperature = config.temperature;
    request.max_tokens = config.max_tokens;
    Ok(request)
}

/// Send the document to the model and return its Markdown unmodified.
///
/// Exactly one request is issued; failures propagate without retry.
pub async fn analyze_document(
    model: &dyn VisionModel,
    config: &ContextConfig,
    text: String,
    images: Vec<DynamicImage>,
) -> Result<String, Pdf2ContextError> {
    let start = Instant::now();
    let image_count = images.len();

    let build_config = config.clone();
    let request =
        tokio::task::spawn_blocking(move || build_chat_request(&build_config, &text, &images))
            .await
            .map_err(|e| Pdf2ContextError::Internal(format!("Encode task panicked: {}", e)))??;
    debug!(
        "Built request from {} image(s) in {:?}",
        image_count,
        start.elapsed()
    );

    let markdown = model.complete(&request).await?;
    info!(
        "Analysis complete: {} chars of Markdown in {:?}",
        markdown.len(),
        start.elapsed()
    );
    Ok(markdown)
}
