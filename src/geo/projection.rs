//! Web Mercator forward projection.
//!
//! Geographic coordinates are mapped to *global* pixel coordinates: at zoom
//! `z` the whole world is a square of `tile_size * 2^z` pixels with the origin
//! at the north-west corner (180°W, ~85.05°N).

use std::f64::consts::PI;

use crate::error::PointError;

/// Northern/southern limit of the Web Mercator square, in degrees.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// `sin(lat)` is clamped to this before the log term so the poles stay finite.
const SIN_LAT_LIMIT: f64 = 0.9999;

// =============================================================================
// Geographic Point
// =============================================================================

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Create a point, rejecting values outside [-90, 90] / [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, PointError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(PointError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(PointError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a point from values that may have drifted just outside the
    /// valid range (e.g. after padding or edge nudging).
    pub(crate) fn clamped(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: longitude.clamp(-180.0, 180.0),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Global pixel coordinates at a fixed zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

// =============================================================================
// Projection
// =============================================================================

/// Side length of the world square in pixels at `zoom`.
#[inline]
pub fn map_size(zoom: u8, tile_size: u32) -> f64 {
    tile_size as f64 * 2f64.powi(zoom as i32)
}

/// Project a geographic point to global pixel coordinates at `zoom`.
///
/// Every caller (zoom selection, tile enumeration, marker placement) goes
/// through this function so the same point always lands on the same pixel.
pub fn project(point: GeoPoint, zoom: u8, tile_size: u32) -> PixelPoint {
    let sin_lat = point
        .latitude
        .to_radians()
        .sin()
        .clamp(-SIN_LAT_LIMIT, SIN_LAT_LIMIT);

    let scale = map_size(zoom, tile_size);
    let x = (point.longitude + 180.0) / 360.0 * scale;
    let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * scale;

    PixelPoint { x, y }
}

// =============================================================================
// Geographic Bounds
// =============================================================================

/// Axis-aligned geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    /// Smallest box containing all `points`, or `None` if there are none.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let init = Self {
            west: first.longitude,
            south: first.latitude,
            east: first.longitude,
            north: first.latitude,
        };

        Some(points.iter().skip(1).fold(init, |b, p| Self {
            west: b.west.min(p.longitude),
            south: b.south.min(p.latitude),
            east: b.east.max(p.longitude),
            north: b.north.max(p.latitude),
        }))
    }

    /// Grow the box by `degrees` on every side, clamped to the Mercator square.
    pub fn padded(&self, degrees: f64) -> Self {
        Self {
            west: (self.west - degrees).max(-180.0),
            south: (self.south - degrees).max(-MAX_LATITUDE),
            east: (self.east + degrees).min(180.0),
            north: (self.north + degrees).min(MAX_LATITUDE),
        }
    }
}
