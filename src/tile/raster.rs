//! Immutable decoded tile raster.

use std::sync::Arc;

use image::RgbImage;

use crate::error::FetchCause;

/// Default tile side length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// A decoded RGB tile.
///
/// The pixel buffer is shared, never mutated: cloning is cheap and pasting
/// into a canvas copies the pixels out.
#[derive(Debug, Clone, PartialEq)]
pub struct TileImage {
    pixels: Arc<RgbImage>,
}

impl TileImage {
    pub fn new(pixels: RgbImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Decode a PNG or JPEG body, dropping any alpha channel.
    pub fn decode(data: &[u8]) -> Result<Self, FetchCause> {
        let img = image::load_from_memory(data).map_err(|e| FetchCause::Decode(e.to_string()))?;
        Ok(Self::new(img.to_rgb8()))
    }

    /// Decode and require a `tile_size` x `tile_size` raster.
    pub fn decode_tile(data: &[u8], tile_size: u32) -> Result<Self, FetchCause> {
        let tile = Self::decode(data)?;
        if !tile.is_square_of(tile_size) {
            return Err(FetchCause::Dimensions {
                width: tile.width(),
                height: tile.height(),
                expected: tile_size,
            });
        }
        Ok(tile)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_square_of(&self, tile_size: u32) -> bool {
        self.width() == tile_size && self.height() == tile_size
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }
}
