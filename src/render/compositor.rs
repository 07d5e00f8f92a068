//! Tile stitching and marker overlay.
//!
//! The canvas covers exactly the rectangle of supplied tiles. Tile `(x, y)`
//! lands at `((x - min_x) * tile_size, (y - min_y) * tile_size)`; a point's
//! marker lands at its projected pixel minus `(min_x, min_y) * tile_size`.

use std::collections::BTreeMap;

use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};

use crate::error::RenderError;
use crate::geo::{project, GeoPoint, TileCoord};
use crate::tile::TileImage;

/// Default marker radius in pixels.
pub const DEFAULT_MARKER_RADIUS: u32 = 4;

// =============================================================================
// Canvas
// =============================================================================

/// The stitched map image.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

// =============================================================================
// Marker Style
// =============================================================================

/// Appearance of a point marker: filled circle with a 1px outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    pub radius: u32,
    pub fill: Rgb<u8>,
    pub outline: Rgb<u8>,
}

impl MarkerStyle {
    pub fn with_radius(radius: u32) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: DEFAULT_MARKER_RADIUS,
            fill: Rgb([255, 0, 0]),
            outline: Rgb([0, 0, 0]),
        }
    }
}

// =============================================================================
// Compositor
// =============================================================================

/// Assembles tiles into a [`Canvas`] and draws point markers on top.
#[derive(Debug, Clone)]
pub struct Compositor {
    tile_size: u32,
    marker: MarkerStyle,
}

impl Compositor {
    pub fn new(tile_size: u32, marker: MarkerStyle) -> Self {
        Self { tile_size, marker }
    }

    /// Stitch `tiles` and draw one marker per point, in input order.
    ///
    /// All tiles are expected to share `zoom`. Markers falling partly or
    /// wholly outside the canvas are clipped.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NoTiles`] if `tiles` is empty.
    pub fn composite(
        &self,
        tiles: &BTreeMap<TileCoord, TileImage>,
        points: &[GeoPoint],
        zoom: u8,
    ) -> Result<Canvas, RenderError> {
        let (min_x, max_x, min_y, max_y) = tiles
            .keys()
            .fold(None, |acc: Option<(u32, u32, u32, u32)>, c| {
                Some(match acc {
                    None => (c.x, c.x, c.y, c.y),
                    Some((min_x, max_x, min_y, max_y)) => {
                        (min_x.min(c.x), max_x.max(c.x), min_y.min(c.y), max_y.max(c.y))
                    }
                })
            })
            .ok_or(RenderError::NoTiles)?;

        let ts = self.tile_size;
        let mut image = RgbImage::new((max_x - min_x + 1) * ts, (max_y - min_y + 1) * ts);

        for (coord, tile) in tiles {
            let left = ((coord.x - min_x) * ts) as i64;
            let top = ((coord.y - min_y) * ts) as i64;
            imageops::replace(&mut image, tile.pixels(), left, top);
        }

        let origin_x = min_x as f64 * ts as f64;
        let origin_y = min_y as f64 * ts as f64;
        let radius = self.marker.radius as i32;

        for point in points {
            let pixel = project(*point, zoom, ts);
            // Truncate toward zero, matching integer pixel addressing.
            let center = ((pixel.x - origin_x) as i32, (pixel.y - origin_y) as i32);

            draw_filled_circle_mut(&mut image, center, radius, self.marker.fill);
            draw_hollow_circle_mut(&mut image, center, radius, self.marker.outline);
        }

        Ok(Canvas { image })
    }
}
