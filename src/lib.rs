//! # pdf2context
//!
//! Upload a PDF, get back a long-form Markdown reconstruction written by a
//! multimodal LLM.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Extract    page text with `--- PAGE n ---` markers + embedded images (pdfium)
//!  ├─ 2. Composite  stack every image into one canvas (image)
//!  ├─ 3. Encode     PNG → base64 data URL
//!  ├─ 4. Analyse    one chat request: reconstruction prompt + composite
//!  └─ 5. Respond    Markdown returned as `context.md`
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2context::{convert_bytes, ChatCompletionsClient, ContextConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ContextConfig::builder()
//!         .api_key(std::env::var("GROQ_API_KEY")?)
//!         .build()?;
//!     let client = ChatCompletionsClient::new(&config)?;
//!     let bytes = std::fs::read("document.pdf")?;
//!     let markdown = convert_bytes(&client, &config, bytes).await?;
//!     println!("{}", markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2context` server binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod convert;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{analyze_document, build_chat_request};
pub use config::{ContextConfig, ContextConfigBuilder};
pub use convert::convert_bytes;
pub use error::Pdf2ContextError;
pub use pipeline::composite::stack_vertically;
pub use pipeline::extract::{extract_document, ExtractedDocument};
pub use pipeline::llm::{ChatCompletionsClient, ChatRequest, VisionModel};
pub use server::{router, serve, AppState};
