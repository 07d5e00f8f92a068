//! Cache-first tile fetching.
//!
//! ```text
//! fetch(coord)
//!   ├─ cache.get(coord) ── hit ──────────────────────────► tile
//!   └─ miss ─► source.fetch(coord) ─► decode ─► cache.put ─► tile
//!                   │                   │          │
//!                   ▼                   ▼          ▼
//!             TileFetchError     TileFetchError   warn! and continue
//! ```

use tracing::{debug, warn};

use crate::error::TileFetchError;
use crate::geo::TileCoord;

use super::cache::TileStore;
use super::raster::TileImage;
use super::source::TileSource;

/// A tile together with where it came from.
#[derive(Debug, Clone)]
pub struct FetchedTile {
    pub image: TileImage,

    /// Whether the tile was served from the cache
    pub cache_hit: bool,
}

/// Fetches tiles through a [`TileStore`], falling back to a [`TileSource`].
///
/// There is no retry here: a failed download is returned to the caller with
/// the coordinate attached.
pub struct TileFetcher<S, C> {
    source: S,
    cache: C,
    tile_size: u32,
}

impl<S: TileSource, C: TileStore> TileFetcher<S, C> {
    pub fn new(source: S, cache: C, tile_size: u32) -> Self {
        Self {
            source,
            cache,
            tile_size,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Get a tile, from cache when possible.
    ///
    /// # Errors
    ///
    /// Returns [`TileFetchError`] if the download fails, times out, returns a
    /// non-success status, or the body is not a `tile_size` square image.
    /// Failing to write the cache is logged and otherwise ignored.
    pub async fn fetch(&self, coord: TileCoord) -> Result<FetchedTile, TileFetchError> {
        if let Some(image) = self.cache.get(coord).await {
            if image.is_square_of(self.tile_size) {
                debug!(tile = %coord, "Tile cache hit");
                return Ok(FetchedTile {
                    image,
                    cache_hit: true,
                });
            }
            debug!(
                tile = %coord,
                width = image.width(),
                height = image.height(),
                "Cached tile has wrong size, refetching"
            );
        }

        debug!(tile = %coord, "Tile cache miss");

        let data = self
            .source
            .fetch(coord)
            .await
            .map_err(|cause| TileFetchError::new(coord, cause))?;

        let image = TileImage::decode_tile(&data, self.tile_size)
            .map_err(|cause| TileFetchError::new(coord, cause))?;

        if let Err(e) = self.cache.put(coord, &image).await {
            warn!(error = %e, "Continuing without caching tile");
        }

        Ok(FetchedTile {
            image,
            cache_hit: false,
        })
    }
}
