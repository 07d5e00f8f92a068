//! # Activation Map
//!
//! Renders a static PNG map of a set of geographic points, such as the summits
//! a radio amateur has activated.
//!
//! Given the points, the library picks the most detailed zoom level at which
//! they all fit a target viewport, downloads the covering OpenStreetMap-style
//! raster tiles (with a persistent on-disk cache), stitches them into one
//! image, draws a marker at every point and encodes the result as PNG.
//!
//! ## Features
//!
//! - **Web Mercator math**: Projection, zoom selection and tile enumeration
//! - **Persistent tile cache**: `{z}/{x}/{y}.png` files written atomically
//! - **Bounded parallel downloads**: The first failed tile aborts the render
//! - **Deterministic output**: Same tiles and points give byte-identical PNGs
//!
//! ## Architecture
//!
//! - [`geo`] - Projection, zoom selection and tile coordinates
//! - [`tile`] - Tile images, caches, HTTP source and the cache-first fetcher
//! - [`render`] - Compositor, PNG encoder and the end-to-end renderer
//! - [`points`] - Point producers (activation API, JSON file)
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use activation_map::{DiskTileCache, GeoPoint, HttpTileSource, MapRenderer, RenderConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RenderConfig::default();
//!     let source =
//!         HttpTileSource::new(&config.tile_url, &config.user_agent, config.fetch_timeout)?;
//!     let cache = DiskTileCache::new(&config.cache_dir);
//!     let output_path = config.output_path.clone();
//!     let renderer = MapRenderer::new(source, cache, config);
//!
//!     let points = [GeoPoint::new(47.5183, 18.9597)?, GeoPoint::new(47.8722, 20.0092)?];
//!     let output = renderer.render_to_file(&points, &output_path).await?;
//!     println!("zoom {}: {}x{}", output.zoom, output.width, output.height);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod geo;
pub mod points;
pub mod render;
pub mod tile;

// Re-export commonly used types
pub use config::{Config, PointInput, RenderConfig};
pub use error::{CacheWriteError, FetchCause, PointError, RenderError, TileFetchError};
pub use geo::{
    project, select_zoom, tiles_covering, GeoBounds, GeoPoint, PixelPoint, TileCoord, TileRange,
    ZoomBounds,
};
pub use points::{ActivationApiSource, JsonFileSource, PointSource};
pub use render::{Canvas, Compositor, MapRenderer, MarkerStyle, PngCanvasEncoder, RenderOutput};
pub use tile::{
    DiskTileCache, FetchedTile, HttpTileSource, MemoryTileCache, TileFetcher, TileImage,
    TileSource, TileStore,
};
