//! Map rendering pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          MapRenderer                            │
//! │  ┌─────────────────────────────────────────────────────────┐    │
//! │  │                       render()                          │    │
//! │  │  1. Validate config      5. Fetch tiles (bounded pool)  │    │
//! │  │  2. Reject empty input   6. Composite + markers         │    │
//! │  │  3. Select zoom          7. Encode PNG                  │    │
//! │  │  4. Enumerate tiles (capped at max_tiles)               │    │
//! │  └─────────────────────────────────────────────────────────┘    │
//! │           │                    │                    │           │
//! │           ▼                    ▼                    ▼           │
//! │    ┌────────────┐      ┌──────────────┐    ┌──────────────────┐ │
//! │    │    geo     │      │ TileFetcher  │    │ Compositor + PNG │ │
//! │    └────────────┘      └──────────────┘    └──────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::geo::{select_zoom, tiles_covering, GeoBounds, GeoPoint, TileCoord, TileRange};
use crate::tile::{write_atomic, TileFetcher, TileImage, TileSource, TileStore};

use super::compositor::{Compositor, MarkerStyle};
use super::encoder::PngCanvasEncoder;

// =============================================================================
// Render Output
// =============================================================================

/// Result of one render.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// The encoded PNG
    pub png: Bytes,

    /// Zoom level the map was rendered at
    pub zoom: u8,

    /// Tiles that make up the canvas
    pub tiles: TileRange,

    /// Canvas width in pixels
    pub width: u32,

    /// Canvas height in pixels
    pub height: u32,

    /// Tiles served from the cache
    pub cache_hits: usize,

    /// Tiles downloaded
    pub cache_misses: usize,
}

// =============================================================================
// Map Renderer
// =============================================================================

/// Renders a set of points to a static PNG map.
///
/// # Type Parameters
///
/// * `S` - Where missing tiles are downloaded from
/// * `C` - The tile cache
///
/// # Example
///
/// ```ignore
/// use activation_map::{MapRenderer, RenderConfig, DiskTileCache, HttpTileSource};
///
/// let config = RenderConfig::default();
/// let source = HttpTileSource::new(&config.tile_url, &config.user_agent, config.fetch_timeout)?;
/// let renderer = MapRenderer::new(source, DiskTileCache::new(&config.cache_dir), config);
///
/// let output = renderer.render(&points).await?;
/// println!("zoom {} -> {}x{}", output.zoom, output.width, output.height);
/// ```
pub struct MapRenderer<S, C> {
    config: RenderConfig,
    fetcher: TileFetcher<S, C>,
    compositor: Compositor,
    encoder: PngCanvasEncoder,
}

impl<S: TileSource, C: TileStore> MapRenderer<S, C> {
    pub fn new(source: S, cache: C, config: RenderConfig) -> Self {
        let fetcher = TileFetcher::new(source, cache, config.tile_size);
        let compositor = Compositor::new(
            config.tile_size,
            MarkerStyle::with_radius(config.marker_radius),
        );

        Self {
            config,
            fetcher,
            compositor,
            encoder: PngCanvasEncoder::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &TileFetcher<S, C> {
        &self.fetcher
    }

    /// Render `points` to PNG bytes.
    ///
    /// Markers are drawn in the order of `points`.
    ///
    /// # Errors
    ///
    /// - [`RenderError::InvalidConfig`] if the [`RenderConfig`] fails validation
    /// - [`RenderError::EmptyInput`] before any network activity if `points` is empty
    /// - [`RenderError::TooManyTiles`] before any network activity if the map
    ///   needs more than `max_tiles` tiles
    /// - [`RenderError::TileFetch`] for the first tile that cannot be obtained;
    ///   in-flight fetches are dropped and nothing is rendered
    /// - [`RenderError::DeadlineExceeded`] if the configured deadline passes
    /// - [`RenderError::Encode`] if PNG serialization fails
    pub async fn render(&self, points: &[GeoPoint]) -> Result<RenderOutput, RenderError> {
        self.config
            .validate()
            .map_err(|message| RenderError::InvalidConfig { message })?;

        match self.config.render_timeout {
            Some(deadline) => tokio::time::timeout(deadline, self.render_inner(points))
                .await
                .map_err(|_| RenderError::DeadlineExceeded { limit: deadline })?,
            None => self.render_inner(points).await,
        }
    }

    /// Render `points` and write the PNG to `path`, creating parent
    /// directories as needed. Nothing is written if rendering fails.
    ///
    /// The PNG goes to a sibling temp file first and is renamed into place,
    /// so `path` never holds a partial image.
    pub async fn render_to_file(
        &self,
        points: &[GeoPoint],
        path: &Path,
    ) -> Result<RenderOutput, RenderError> {
        let output = self.render(points).await?;

        let fail = |e: std::io::Error| RenderError::Output {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(fail)?;
        }
        write_atomic(path, &output.png).await.map_err(fail)?;

        info!(path = %path.display(), bytes = output.png.len(), "Wrote map");
        Ok(output)
    }

    async fn render_inner(&self, points: &[GeoPoint]) -> Result<RenderOutput, RenderError> {
        let config = &self.config;

        let bounds = GeoBounds::from_points(points).ok_or(RenderError::EmptyInput)?;
        let zoom = select_zoom(
            points,
            config.target_width,
            config.target_height,
            config.zoom,
            config.tile_size,
        )?;

        let range = tiles_covering(
            &bounds.padded(config.padding_degrees),
            zoom,
            config.tile_size,
        );
        info!(
            zoom,
            points = points.len(),
            tiles_wide = range.width(),
            tiles_high = range.height(),
            "Selected zoom level"
        );

        let count = range.tile_count();
        if count > config.max_tiles {
            return Err(RenderError::TooManyTiles {
                count,
                limit: config.max_tiles,
            });
        }

        let (tiles, cache_hits) = self.fetch_all(&range).await?;
        let cache_misses = tiles.len() - cache_hits;
        debug!(cache_hits, cache_misses, "Fetched all tiles");

        let canvas = self.compositor.composite(&tiles, points, zoom)?;
        let png = self.encoder.encode(&canvas)?;

        Ok(RenderOutput {
            png,
            zoom,
            tiles: range,
            width: canvas.width(),
            height: canvas.height(),
            cache_hits,
            cache_misses,
        })
    }

    /// Fetch every tile in `range` with at most `fetch_concurrency` in flight.
    ///
    /// Stops at the first failure.
    async fn fetch_all(
        &self,
        range: &TileRange,
    ) -> Result<(BTreeMap<TileCoord, TileImage>, usize), RenderError> {
        let fetched: Vec<_> = stream::iter(range.iter())
            .map(|coord| async move {
                self.fetcher
                    .fetch(coord)
                    .await
                    .map(|tile| (coord, tile))
            })
            .buffer_unordered(self.config.fetch_concurrency.max(1))
            .try_collect()
            .await?;

        let cache_hits = fetched.iter().filter(|(_, tile)| tile.cache_hit).count();
        let tiles = fetched
            .into_iter()
            .map(|(coord, tile)| (coord, tile.image))
            .collect();

        Ok((tiles, cache_hits))
    }
}
