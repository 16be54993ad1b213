//! Vertical image compositing.
//!
//! All images extracted from a document are stacked top-to-bottom on one
//! canvas so the model receives a single image part. The canvas is as wide as
//! the widest image and as tall as all images together; narrower images are
//! centred horizontally on a white background.

use image::{imageops, DynamicImage, Rgb, RgbImage};
use tracing::debug;

/// Canvas fill behind narrower images.
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Stack `images` vertically in the given order.
///
/// Returns `None` for an empty list. Every image is converted to RGB8 first,
/// so alpha is dropped rather than blended.
pub fn stack_vertically(images: &[DynamicImage]) -> Option<RgbImage> {
    if images.is_empty() {
        return None;
    }

    let rgb: Vec<RgbImage> = images.iter().map(DynamicImage::to_rgb8).collect();

    let width = rgb.iter().map(RgbImage::width).max().unwrap_or(0);
    let height: u32 = rgb.iter().map(RgbImage::height).sum();

    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);

    let mut y_offset: i64 = 0;
    for img in &rgb {
        let x_offset = i64::from((width - img.width()) / 2);
        imageops::replace(&mut canvas, img, x_offset, y_offset);
        y_offset += i64::from(img.height());
    }

    debug!(
        "Composited {} images → {}x{} px",
        images.len(),
        width,
        height
    );

    Some(canvas)
}
