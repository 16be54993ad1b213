//! Image encoding: composite bitmap → PNG → base64 data URL.
//!
//! Chat APIs accept inline images as `data:` URLs in the JSON request body.
//! PNG is lossless, which keeps small text inside figures legible.

use crate::error::Pdf2ContextError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PNG-encode an image into memory.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Wrap PNG bytes as `data:image/png;base64,...`.
pub fn png_data_url(png: &[u8]) -> String {
    let b64 = STANDARD.encode(png);
    debug!("Encoded image → {} bytes base64", b64.len());
    format!("data:image/png;base64,{}", b64)
}

/// Write the composite PNG into `dir` under a fresh `composite-*.png` name.
///
/// Each request gets its own file, so concurrent requests never overwrite
/// one another. Files are kept for inspection; nothing here deletes them.
pub fn write_debug_image(dir: &Path, png: &[u8]) -> Result<PathBuf, Pdf2ContextError> {
    let io_err = |source: std::io::Error| Pdf2ContextError::DebugArtifactFailed {
        dir: dir.to_path_buf(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut file = tempfile::Builder::new()
        .prefix("composite-")
        .suffix(".png")
        .tempfile_in(dir)
        .map_err(io_err)?;
    std::io::Write::write_all(&mut file, png).map_err(io_err)?;
    let (_, path) = file.keep().map_err(|e| io_err(e.error))?;

    info!("Composite image saved to {}", path.display());
    Ok(path)
}
