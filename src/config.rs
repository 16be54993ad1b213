//! Configuration for the extraction service.
//!
//! Everything the server needs lives in one [`ContextConfig`], built via its
//! [`ContextConfigBuilder`]. The config is read once at startup and shared
//! read-only between requests behind an `Arc`.

use crate::error::Pdf2ContextError;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default OpenAI-compatible endpoint (Groq).
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default multimodal model identifier.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Configuration for the PDF context extraction service.
///
/// # Example
/// ```rust
/// use pdf2context::ContextConfig;
///
/// let config = ContextConfig::builder()
///     .api_key("gsk_test")
///     .request_timeout_secs(60)
///     .build()
///     .unwrap();
/// assert_eq!(config.request_timeout_secs, 60);
/// ```
#[derive(Clone)]
pub struct ContextConfig {
    /// Credential for the model provider. Required.
    pub api_key: String,

    /// Base URL of the OpenAI-compatible API; `/chat/completions` is appended.
    pub api_base: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Upper bound on one model call in seconds. Default: 120.
    ///
    /// Long documents produce long completions, so this is generous. When it
    /// expires the request fails with [`Pdf2ContextError::ApiTimeout`].
    pub request_timeout_secs: u64,

    /// Sampling temperature. `None` leaves the provider default.
    pub temperature: Option<f32>,

    /// Completion token cap. `None` leaves the provider default.
    pub max_tokens: Option<usize>,

    /// Largest accepted upload body in bytes. Default: 64 MiB.
    pub max_upload_bytes: usize,

    /// Explicit path to the pdfium shared library. `None` binds the system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Directory receiving one `composite-*.png` per request. `None` disables it.
    pub debug_image_dir: Option<PathBuf>,

    /// Address the HTTP server listens on. Default: `0.0.0.0:8000`.
    pub bind_addr: SocketAddr,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: 120,
            temperature: None,
            max_tokens: None,
            max_upload_bytes: 64 * 1024 * 1024,
            pdfium_lib_path: None,
            debug_image_dir: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

impl fmt::Debug for ContextConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("debug_image_dir", &self.debug_image_dir)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl ContextConfig {
    /// Create a new builder for `ContextConfig`.
    pub fn builder() -> ContextConfigBuilder {
        ContextConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

/// Builder for [`ContextConfig`].
#[derive(Debug)]
pub struct ContextConfigBuilder {
    config: ContextConfig,
}

impl ContextConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n;
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn debug_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.debug_image_dir = Some(dir.into());
        self
    }

    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ContextConfig, Pdf2ContextError> {
        let c = &self.config;
        if c.api_key.trim().is_empty() {
            return Err(Pdf2ContextError::InvalidConfig(
                "an API key for the model provider is required (GROQ_API_KEY)".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(Pdf2ContextError::InvalidConfig(
                "model identifier must not be empty".into(),
            ));
        }
        if !(c.api_base.starts_with("http://") || c.api_base.starts_with("https://")) {
            return Err(Pdf2ContextError::InvalidConfig(format!(
                "API base must be an HTTP/HTTPS URL, got '{}'",
                c.api_base
            )));
        }
        if c.request_timeout_secs == 0 {
            return Err(Pdf2ContextError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        if c.temperature.is_some_and(|t| !t.is_finite()) {
            return Err(Pdf2ContextError::InvalidConfig(
                "temperature must be a finite number".into(),
            ));
        }
        if c.max_upload_bytes == 0 {
            return Err(Pdf2ContextError::InvalidConfig(
                "max upload size must be ≥ 1 byte".into(),
            ));
        }
        Ok(self.config)
    }
}
