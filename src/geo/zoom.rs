//! Zoom level selection.
//!
//! Picks the most detailed zoom at which the projected bounding box of all
//! points fits inside the target viewport.

use crate::error::RenderError;

use super::projection::{project, GeoPoint};

/// Default lowest zoom considered.
pub const DEFAULT_MIN_ZOOM: u8 = 4;

/// Default highest zoom considered.
pub const DEFAULT_MAX_ZOOM: u8 = 12;

/// Highest zoom the tile addressing supports.
pub const MAX_SUPPORTED_ZOOM: u8 = 22;

/// Inclusive range of candidate zoom levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomBounds {
    pub min: u8,
    pub max: u8,
}

impl ZoomBounds {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
    }
}

/// Width and height in pixels of the bounding box of `points` at `zoom`.
///
/// Returns `(0.0, 0.0)` for an empty slice.
pub fn pixel_extent(points: &[GeoPoint], zoom: u8, tile_size: u32) -> (f64, f64) {
    let mut projected = points.iter().map(|p| project(*p, zoom, tile_size));

    let Some(first) = projected.next() else {
        return (0.0, 0.0);
    };

    let (min_x, max_x, min_y, max_y) = projected.fold(
        (first.x, first.x, first.y, first.y),
        |(min_x, max_x, min_y, max_y), p| {
            (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
        },
    );

    (max_x - min_x, max_y - min_y)
}

/// Choose the highest zoom in `bounds` whose pixel bounding box is within
/// `target_width` x `target_height`.
///
/// Falls back to `bounds.min` when nothing fits; the rendered map is then
/// larger than the target, which is not an error.
///
/// # Errors
///
/// Returns [`RenderError::EmptyInput`] if `points` is empty.
pub fn select_zoom(
    points: &[GeoPoint],
    target_width: u32,
    target_height: u32,
    bounds: ZoomBounds,
    tile_size: u32,
) -> Result<u8, RenderError> {
    if points.is_empty() {
        return Err(RenderError::EmptyInput);
    }

    let zoom = (bounds.min..=bounds.max)
        .rev()
        .find(|&zoom| {
            let (width, height) = pixel_extent(points, zoom, tile_size);
            width <= target_width as f64 && height <= target_height as f64
        })
        .unwrap_or(bounds.min);

    Ok(zoom)
}
