//! PNG export of rendered frames.

use std::io::Cursor;

use image::ImageEncoder;
use triad_core::image::BalanceImage;

/// Filename convention for exports.
pub fn export_filename(width: u32, height: u32) -> String {
    format!("{width}x{height}.png")
}

/// Encode a rendered frame as PNG bytes.
pub fn encode_png(frame: &BalanceImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(Cursor::new(&mut bytes));
    encoder
        .write_image(
            frame.as_bytes(),
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(ExportError::Encode)?;
    Ok(bytes)
}

/// Errors that can occur during export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode PNG: {0}")]
    Encode(image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
