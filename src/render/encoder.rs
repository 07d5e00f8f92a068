//! Deterministic PNG encoding.
//!
//! # Design Decisions
//!
//! - **No metadata**: only `IHDR`, `IDAT` and `IEND` chunks are written. No
//!   timestamps or text chunks, so identical pixels give identical bytes.
//!
//! - **Fixed settings**: compression level and row filter are constants, never
//!   chosen per image.

use bytes::Bytes;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, ImageError, RgbImage};

use crate::error::RenderError;

use super::compositor::Canvas;

const COMPRESSION: CompressionType = CompressionType::Best;
const FILTER: FilterType = FilterType::Adaptive;

/// Encode an RGB buffer as PNG with the fixed settings.
///
/// Also used by the disk tile cache so cached tiles are byte-stable.
pub fn encode_rgb_png(image: &RgbImage) -> Result<Vec<u8>, ImageError> {
    let mut output = Vec::new();
    PngEncoder::new_with_quality(&mut output, COMPRESSION, FILTER).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(output)
}

/// Serializes a finished [`Canvas`] to PNG.
#[derive(Debug, Clone, Default)]
pub struct PngCanvasEncoder {}

impl PngCanvasEncoder {
    pub fn new() -> Self {
        Self {}
    }

    /// Encode `canvas`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Encode`] if the PNG writer fails.
    pub fn encode(&self, canvas: &Canvas) -> Result<Bytes, RenderError> {
        let png = encode_rgb_png(canvas.image()).map_err(|e| RenderError::Encode {
            message: e.to_string(),
        })?;
        Ok(Bytes::from(png))
    }
}
