//! Pixel buffer construction and size normalization.

use image::imageops::FilterType;

use crate::{LowPolyError, Result};

/// Row-major RGBA pixel buffer consumed by the pipeline
pub type PixelBuffer = image::RgbaImage;

/// Build a pixel buffer from raw RGBA bytes (length must be `width * height * 4`).
pub fn from_raw(width: u32, height: u32, rgba: Vec<u8>) -> Result<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(LowPolyError::InvalidInput(format!(
            "image dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(LowPolyError::InvalidInput(format!(
            "RGBA buffer has {} bytes, expected {} for {}x{}",
            rgba.len(),
            expected,
            width,
            height
        )));
    }
    image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| LowPolyError::InvalidInput("RGBA buffer size mismatch".into()))
}

/// Decode an encoded image (PNG, JPEG, ...) into a pixel buffer.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Dimensions after fitting `(width, height)` into a `max_size` square.
///
/// The larger side becomes `max_size` when either side exceeds it; the
/// other side keeps the aspect ratio, rounded to nearest and at least 1.
pub fn fit_dimensions(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    if width <= max_size && height <= max_size {
        return (width, height);
    }
    let larger = width.max(height) as f64;
    let scale = max_size as f64 / larger;
    if width >= height {
        let h = ((height as f64 * scale).round() as u32).max(1);
        (max_size, h)
    } else {
        let w = ((width as f64 * scale).round() as u32).max(1);
        (w, max_size)
    }
}

/// Rescale so neither dimension exceeds `max_size`.
///
/// Returns the input untouched when it already fits.
pub fn normalize(image: PixelBuffer, max_size: u32, filter: FilterType) -> Result<PixelBuffer> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(LowPolyError::InvalidInput(format!(
            "image dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    if max_size == 0 {
        return Err(LowPolyError::InvalidInput("max_size must be positive".into()));
    }

    let (target_w, target_h) = fit_dimensions(width, height, max_size);
    if (target_w, target_h) == (width, height) {
        return Ok(image);
    }
    log::debug!("Resizing {}x{} -> {}x{}", width, height, target_w, target_h);
    Ok(image::imageops::resize(&image, target_w, target_h, filter))
}
