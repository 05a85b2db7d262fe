//! Image loading for the grading session.

use std::path::Path;

use triad_core::image::BalanceImage;

/// Load an image from disk and convert to the internal RGBA8 format.
///
/// Supports common formats via the `image` crate (PNG, JPEG, TIFF, BMP).
pub fn load_image(path: &Path) -> Result<BalanceImage, ImageLoadError> {
    let bytes = std::fs::read(path)?;
    decode_bytes(&bytes)
}

/// Decode an encoded image byte buffer to the internal RGBA8 format.
pub fn decode_bytes(bytes: &[u8]) -> Result<BalanceImage, ImageLoadError> {
    let img = image::load_from_memory(bytes).map_err(ImageLoadError::Decode)?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(BalanceImage::from_rgba8(width, height, rgba.into_raw()))
}

/// Errors that can occur during image loading.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
