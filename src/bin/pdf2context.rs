//! Server binary for pdf2context.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables onto `ContextConfig` and runs the HTTP server.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2context::{serve, AppState, ContextConfig};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the server on the default address (0.0.0.0:8000)
  GROQ_API_KEY=gsk_... pdf2context

  # Upload a PDF and save the reconstruction
  curl -X POST http://localhost:8000 -F "file=@report.pdf" --output context.md

  # Liveness probe
  curl http://localhost:8000/health

  # Keep every composite image for inspection
  pdf2context --debug-dir ./composites

ENVIRONMENT VARIABLES:
  GROQ_API_KEY                  Model provider API key (required)
  PDF2CONTEXT_MODEL             Model ID
  PDF2CONTEXT_API_BASE          OpenAI-compatible API base URL
  PDF2CONTEXT_BIND              Listen address
  PDF2CONTEXT_TIMEOUT_SECS      Upper bound on one model call
  PDF2CONTEXT_MAX_UPLOAD_BYTES  Largest accepted upload
  PDF2CONTEXT_DEBUG_DIR         Directory for composite images
  PDFIUM_LIB_PATH               Path to libpdfium (default: system library)
  RUST_LOG                      Log filter (default: info)
"#;

/// Serve PDF → Markdown context extraction over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2context",
    version,
    about = "Upload a PDF, get back an exhaustive Markdown reconstruction",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// API key for the model provider.
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Model ID.
    #[arg(long, env = "PDF2CONTEXT_MODEL", default_value = pdf2context::config::DEFAULT_MODEL)]
    model: String,

    /// OpenAI-compatible API base URL.
    #[arg(long, env = "PDF2CONTEXT_API_BASE", default_value = pdf2context::config::DEFAULT_API_BASE)]
    api_base: String,

    /// Address to listen on.
    #[arg(long, env = "PDF2CONTEXT_BIND", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Upper bound on one model call in seconds.
    #[arg(long, env = "PDF2CONTEXT_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,

    /// Sampling temperature (0.0–2.0). Provider default when unset.
    #[arg(long, env = "PDF2CONTEXT_TEMPERATURE")]
    temperature: Option<f32>,

    /// Completion token cap. Provider default when unset.
    #[arg(long, env = "PDF2CONTEXT_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Largest accepted upload in bytes.
    #[arg(long, env = "PDF2CONTEXT_MAX_UPLOAD_BYTES", default_value_t = 64 * 1024 * 1024)]
    max_upload_bytes: usize,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Write each request's composite image into this directory.
    #[arg(long, env = "PDF2CONTEXT_DEBUG_DIR")]
    debug_dir: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2CONTEXT_VERBOSE")]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> Result<ContextConfig> {
        let mut builder = ContextConfig::builder()
            .api_key(&self.api_key)
            .model(&self.model)
            .api_base(&self.api_base)
            .bind_addr(self.bind)
            .request_timeout_secs(self.timeout_secs)
            .max_upload_bytes(self.max_upload_bytes);

        if let Some(t) = self.temperature {
            builder = builder.temperature(t);
        }
        if let Some(n) = self.max_tokens {
            builder = builder.max_tokens(n);
        }
        if let Some(ref p) = self.pdfium_lib {
            builder = builder.pdfium_lib_path(p);
        }
        if let Some(ref d) = self.debug_dir {
            builder = builder.debug_image_dir(d);
        }

        builder.build().context("Invalid configuration")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Config + state ───────────────────────────────────────────────────
    let config = cli.to_config()?;
    tracing::debug!("{:?}", config);

    // Fail at startup rather than on the first upload when pdfium is missing.
    tokio::task::block_in_place(|| {
        pdf2context::pipeline::extract::probe_pdfium(config.pdfium_lib_path.as_deref())
    })
    .context("PDF engine unavailable")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    let state = AppState::from_config(config).context("Failed to create model client")?;

    serve(listener, Arc::new(state))
        .await
        .context("Server error")
}
