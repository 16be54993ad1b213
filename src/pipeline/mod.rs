//! Pipeline stages for PDF-to-context conversion.
//!
//! Each submodule implements one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ composite ──▶ encode ──▶ llm
//! (pdfium)    (stack)       (PNG/b64)  (chat call)
//! ```
//!
//! 1. [`extract`]: walk pages for text and raster images; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 2. [`composite`]: stack all images into one RGB canvas
//! 3. [`encode`]: PNG-encode and wrap as a data URL
//! 4. [`llm`]: request body, response parsing, and the HTTP client

pub mod composite;
pub mod encode;
pub mod extract;
pub mod llm;
