//! Slippy-map tile addressing and coverage enumeration.

use std::fmt;

use super::projection::{project, GeoBounds, GeoPoint};

/// Nudge applied to the south-east corner so a bound that sits exactly on a
/// tile edge does not pull in the neighbouring tile.
const EDGE_EPSILON: f64 = 1e-11;

// =============================================================================
// Tile Coordinate
// =============================================================================

/// Address of one tile: zoom level plus column (`x`) and row (`y`).
///
/// `x` and `y` are in `[0, 2^z)`, with `(0, 0)` at the north-west corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Number of tiles along one axis at `zoom`.
#[inline]
pub fn tiles_per_side(zoom: u8) -> u32 {
    1u32 << zoom
}

// =============================================================================
// Tile Range
// =============================================================================

/// Inclusive rectangle of tiles at a single zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub zoom: u8,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    /// Number of tile columns.
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    /// Number of tile rows.
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Total number of tiles in the range.
    pub fn tile_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        coord.z == self.zoom
            && (self.min_x..=self.max_x).contains(&coord.x)
            && (self.min_y..=self.max_y).contains(&coord.y)
    }

    /// All tiles in row-major order (top row first, west to east).
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (self.min_y..=self.max_y).flat_map(move |y| {
            (self.min_x..=self.max_x).map(move |x| TileCoord::new(self.zoom, x, y))
        })
    }
}

// =============================================================================
// Coverage
// =============================================================================

/// Index of the tile containing global pixel coordinate `pixel`.
fn tile_index(pixel: f64, tile_size: u32, zoom: u8) -> u32 {
    let last = (tiles_per_side(zoom) - 1) as f64;
    (pixel / tile_size as f64).floor().clamp(0.0, last) as u32
}

/// Tiles covering `bounds` at `zoom`.
///
/// Corners are projected with the same [`project`] used for markers so tile
/// placement and marker placement agree to the pixel.
pub fn tiles_covering(bounds: &GeoBounds, zoom: u8, tile_size: u32) -> TileRange {
    let corner = |lat: f64, lon: f64| {
        let pixel = project(GeoPoint::clamped(lat, lon), zoom, tile_size);
        (
            tile_index(pixel.x, tile_size, zoom),
            tile_index(pixel.y, tile_size, zoom),
        )
    };

    let (nw_x, nw_y) = corner(bounds.north, bounds.west);
    let (se_x, se_y) = corner(bounds.south + EDGE_EPSILON, bounds.east - EDGE_EPSILON);

    TileRange {
        zoom,
        min_x: nw_x.min(se_x),
        max_x: nw_x.max(se_x),
        min_y: nw_y.min(se_y),
        max_y: nw_y.max(se_y),
    }
}
