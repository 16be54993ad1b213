//! Model interaction: the chat request body and the client that sends it.
//!
//! The request always holds exactly one user message whose content is a text
//! part followed by at most one image part. [`VisionModel`] is the seam the
//! analyzer talks to; [`ChatCompletionsClient`] is the production
//! implementation for any OpenAI-compatible `/chat/completions` endpoint.
//!
//! There is no retry. The call is bounded by the client timeout, and dropping
//! the returned future aborts the in-flight HTTP request.

use crate::config::ContextConfig;
use crate::error::Pdf2ContextError;
use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

// ── Request body ─────────────────────────────────────────────────────────

/// Body of a `POST /chat/completions` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

/// One part of a multimodal message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatRequest {
    /// Single user message: `prompt` plus an optional image data URL.
    pub fn user(model: impl Into<String>, prompt: String, image_url: Option<String>) -> Self {
        let mut content = vec![ContentPart::Text { text: prompt }];
        if let Some(url) = image_url {
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrl { url },
            });
        }
        Self {
            model: model.into(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            temperature: None,
            max_tokens: None,
        }
    }

    /// Number of image parts across all messages.
    pub fn image_count(&self) -> usize {
        self.messages
            .iter()
            .flat_map(|m| &m.content)
            .filter(|p| matches!(p, ContentPart::ImageUrl { .. }))
            .count()
    }
}

// ── Response body ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

/// Pull the first choice's text out of a raw response body.
pub fn parse_completion(body: &str) -> Result<String, Pdf2ContextError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| Pdf2ContextError::LlmApiError {
            message: format!("malformed response body: {}", e),
        })?;

    if let Some(usage) = &response.usage {
        debug!(
            "{} input tokens, {} output tokens",
            usage.prompt_tokens.unwrap_or(0),
            usage.completion_tokens.unwrap_or(0)
        );
    }

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.is_empty())
        .ok_or(Pdf2ContextError::EmptyCompletion)
}

// ── Client seam ──────────────────────────────────────────────────────────

/// A multimodal chat model: one request in, one text completion out.
pub trait VisionModel: Send + Sync {
    fn complete<'a>(&'a self, request: &'a ChatRequest)
        -> BoxFuture<'a, Result<String, Pdf2ContextError>>;
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    timeout_secs: u64,
}

impl ChatCompletionsClient {
    pub fn new(config: &ContextConfig) -> Result<Self, Pdf2ContextError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("pdf2context/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Pdf2ContextError::ProviderNotConfigured {
                hint: e.to_string(),
            })?;

        Ok(Self {
            http,
            url: config.completions_url(),
            api_key: config.api_key.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, Pdf2ContextError> {
        let start = Instant::now();
        info!(
            "Calling {} with model {} ({} image part(s))",
            self.url,
            request.model,
            request.image_count()
        );

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            warn!("Model API answered {}", status);
            return Err(status_error(status, &headers, body));
        }

        let content = parse_completion(&body)?;
        info!(
            "Model returned {} chars in {:?}",
            content.len(),
            start.elapsed()
        );
        Ok(content)
    }

    fn transport_error(&self, e: reqwest::Error) -> Pdf2ContextError {
        if e.is_timeout() {
            Pdf2ContextError::ApiTimeout {
                secs: self.timeout_secs,
            }
        } else {
            Pdf2ContextError::LlmApiError {
                message: e.to_string(),
            }
        }
    }
}

impl VisionModel for ChatCompletionsClient {
    fn complete<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> BoxFuture<'a, Result<String, Pdf2ContextError>> {
        Box::pin(self.send(request))
    }
}

/// Classify a non-2xx answer from the model API.
fn status_error(status: StatusCode, headers: &HeaderMap, body: String) -> Pdf2ContextError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Pdf2ContextError::AuthError { detail: body }
        }
        StatusCode::TOO_MANY_REQUESTS => Pdf2ContextError::RateLimitExceeded {
            retry_after_secs: headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok()),
        },
        _ => Pdf2ContextError::LlmApiError {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}
