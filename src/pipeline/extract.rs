//! PDF extraction: page text with page markers plus every embedded raster image.
//!
//! pdfium is a blocking C++ library, so the walk runs inside
//! `tokio::task::spawn_blocking`. Uploads arrive as bytes and are opened with
//! `load_pdf_from_byte_slice`; nothing touches the file system.

use crate::error::Pdf2ContextError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Bytes inspected for the `%PDF` header. Writers may prepend garbage; pdfium
/// accepts a header anywhere in the first kilobyte.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Serialises pdfium sessions. Each session initialises and tears down the
/// library, and those calls must not interleave across threads.
static PDFIUM_SESSION: Mutex<()> = Mutex::new(());

fn pdfium_session() -> MutexGuard<'static, ()> {
    PDFIUM_SESSION.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Text of one page, tagged with its 1-based page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_num: usize,
    pub text: String,
}

/// Everything pulled out of one PDF.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Page texts joined with page markers. Empty when no page has text.
    pub text: String,
    /// Embedded images in page order, then in-page order.
    pub images: Vec<DynamicImage>,
    pub page_count: usize,
}

/// Extract text and images from PDF bytes.
///
/// `pdfium_lib_path` selects an explicit pdfium shared library; `None` binds
/// the system library.
pub async fn extract_document(
    bytes: Vec<u8>,
    pdfium_lib_path: Option<&Path>,
) -> Result<ExtractedDocument, Pdf2ContextError> {
    check_pdf_header(&bytes)?;

    let lib_path = pdfium_lib_path.map(Path::to_path_buf);
    tokio::task::spawn_blocking(move || extract_blocking(&bytes, lib_path.as_deref()))
        .await
        .map_err(|e| Pdf2ContextError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Reject byte streams without a `%PDF` header before the engine sees them.
pub fn check_pdf_header(bytes: &[u8]) -> Result<(), Pdf2ContextError> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    if window.windows(4).any(|w| w == b"%PDF") {
        return Ok(());
    }
    Err(Pdf2ContextError::NotAPdf {
        magic: bytes.iter().take(4).copied().collect(),
    })
}

/// Check that pdfium can be bound, without opening a document.
pub fn probe_pdfium(lib_path: Option<&Path>) -> Result<(), Pdf2ContextError> {
    let _session = pdfium_session();
    bind_pdfium(lib_path).map(drop)
}

/// Bind to pdfium, from an explicit path when one is configured.
fn bind_pdfium(lib_path: Option<&Path>) -> Result<Pdfium, Pdf2ContextError> {
    let bindings = match lib_path {
        Some(path) => Pdfium::bind_to_library(path).map_err(|e| {
            Pdf2ContextError::PdfiumBindingFailed(format!("{}: {:?}", path.display(), e))
        })?,
        None => Pdfium::bind_to_system_library()
            .map_err(|e| Pdf2ContextError::PdfiumBindingFailed(format!("{:?}", e)))?,
    };
    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of the page walk.
fn extract_blocking(
    bytes: &[u8],
    lib_path: Option<&Path>,
) -> Result<ExtractedDocument, Pdf2ContextError> {
    let _session = pdfium_session();
    let pdfium = bind_pdfium(lib_path)?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                Pdf2ContextError::PasswordRequired
            } else {
                Pdf2ContextError::CorruptPdf { detail: err_str }
            }
        })?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    info!("PDF loaded: {} pages", page_count);

    let mut fragments = Vec::with_capacity(page_count);
    let mut images = Vec::new();

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;

        match page.text() {
            Ok(text) => fragments.push(PageText {
                page_num,
                text: text.all(),
            }),
            Err(e) => warn!("Page {}: text extraction failed: {:?}", page_num, e),
        }

        let mut seen = HashSet::new();
        collect_images(page.objects().iter(), page_num, &mut seen, &mut images);
    }

    let text = join_page_text(&fragments);
    info!(
        "Extracted {} chars of text and {} images",
        text.len(),
        images.len()
    );

    Ok(ExtractedDocument {
        text,
        images,
        page_count,
    })
}

/// Decode every raster image in `objects`, descending into form XObjects.
///
/// `seen` holds fingerprints of the images already taken from this page, so
/// a picture drawn more than once (a repeated logo) is collected once.
fn collect_images<'a>(
    objects: impl Iterator<Item = PdfPageObject<'a>>,
    page_num: usize,
    seen: &mut HashSet<u64>,
    images: &mut Vec<DynamicImage>,
) {
    for object in objects {
        if let Some(form) = object.as_x_object_form_object() {
            collect_images(form.iter(), page_num, seen, images);
            continue;
        }
        let Some(image_object) = object.as_image_object() else {
            continue;
        };
        match image_object.get_raw_image() {
            Ok(img) => {
                debug!(
                    "Page {}: image {}x{} px",
                    page_num,
                    img.width(),
                    img.height()
                );
                if !push_unique(seen, images, img) {
                    debug!("Page {}: repeated image skipped", page_num);
                }
            }
            Err(e) => warn!("Page {}: skipping undecodable image: {:?}", page_num, e),
        }
    }
}

/// Append `img` unless an identical bitmap was already seen. Returns whether
/// it was appended.
fn push_unique(
    seen: &mut HashSet<u64>,
    images: &mut Vec<DynamicImage>,
    img: DynamicImage,
) -> bool {
    let mut hasher = DefaultHasher::new();
    img.width().hash(&mut hasher);
    img.height().hash(&mut hasher);
    img.as_bytes().hash(&mut hasher);
    if !seen.insert(hasher.finish()) {
        return false;
    }
    images.push(img);
    true
}

/// Format the marker that opens a page's text.
pub fn page_marker(page_num: usize) -> String {
    format!("--- PAGE {} ---", page_num)
}

/// Concatenate page texts, prefixing each non-blank page with its marker.
///
/// Pages whose text is empty or whitespace-only contribute nothing, marker
/// included.
pub fn join_page_text(pages: &[PageText]) -> String {
    pages
        .iter()
        .filter(|p| !p.text.trim().is_empty())
        .map(|p| format!("\n{}\n{}", page_marker(p.page_num), p.text))
        .collect::<Vec<_>>()
        .join("\n")
}
