//! Tile acquisition layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              MapRenderer                │
//! └────────────────────┬────────────────────┘
//!                      │ one call per tile
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              TileFetcher                │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  TileStore   │  │   TileSource    │  │
//! │  │  (disk or    │  │  (HTTP GET      │  │
//! │  │   memory)    │  │   z/x/y)        │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileFetcher`]: cache-first fetch with one download attempt on miss
//! - [`TileStore`]: key-value store from [`TileCoord`](crate::geo::TileCoord) to tile
//! - [`DiskTileCache`]: persistent `{z}/{x}/{y}.png` directory tree
//! - [`MemoryTileCache`]: in-process store for tests
//! - [`TileSource`] / [`HttpTileSource`]: where missing tiles come from
//! - [`TileImage`]: decoded, immutable RGB raster
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use activation_map::geo::TileCoord;
//! use activation_map::tile::{DiskTileCache, HttpTileSource, TileFetcher, DEFAULT_TILE_URL};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpTileSource::new(DEFAULT_TILE_URL, "my-app/1.0", Duration::from_secs(20))?;
//!     let fetcher = TileFetcher::new(source, DiskTileCache::new("tile_cache"), 256);
//!
//!     let tile = fetcher.fetch(TileCoord::new(12, 2264, 1440)).await?;
//!     println!("cache hit: {}", tile.cache_hit);
//!     Ok(())
//! }
//! ```

mod cache;
mod fetcher;
mod raster;
mod source;

pub(crate) use cache::write_atomic;
pub use cache::{DiskTileCache, MemoryTileCache, TileStore, DEFAULT_CACHE_DIR};
pub use fetcher::{FetchedTile, TileFetcher};
pub use raster::{TileImage, DEFAULT_TILE_SIZE};
pub use source::{
    tile_url, HttpTileSource, TileSource, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_TILE_URL,
    DEFAULT_USER_AGENT,
};
