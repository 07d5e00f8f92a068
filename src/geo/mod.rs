//! Geometry layer.
//!
//! Pure, deterministic math with no I/O:
//!
//! - [`project`]: Web Mercator forward projection to global pixel coordinates
//! - [`select_zoom`]: highest zoom whose pixel bounding box fits the viewport
//! - [`tiles_covering`]: slippy-map tiles covering a geographic bounding box

mod projection;
mod tiles;
mod zoom;

pub use projection::{map_size, project, GeoBounds, GeoPoint, PixelPoint, MAX_LATITUDE};
pub use tiles::{tiles_covering, tiles_per_side, TileCoord, TileRange};
pub use zoom::{
    pixel_extent, select_zoom, ZoomBounds, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, MAX_SUPPORTED_ZOOM,
};
