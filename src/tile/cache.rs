//! Tile cache keyed by tile coordinate.
//!
//! Tile content is assumed immutable per coordinate, so the cache is
//! append-only: no eviction, no invalidation. Writing the same coordinate
//! twice is an idempotent overwrite.
//!
//! # Backends
//!
//! - [`DiskTileCache`]: persistent, one PNG per tile at `{root}/{z}/{x}/{y}.png`.
//!   Existence on disk is the only hit signal; there is no index file.
//! - [`MemoryTileCache`]: process-local map, for tests and one-shot runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::CacheWriteError;
use crate::geo::TileCoord;
use crate::render::encode_rgb_png;

use super::raster::TileImage;

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "tile_cache";

// =============================================================================
// TileStore Trait
// =============================================================================

/// Key-value store from [`TileCoord`] to [`TileImage`].
///
/// `get` never touches the network. `put` may be called concurrently and
/// redundantly for the same coordinate; implementations must not corrupt the
/// entry when that happens.
#[async_trait]
pub trait TileStore: Send + Sync {
    /// Look up a tile. Any read problem is reported as a miss.
    async fn get(&self, coord: TileCoord) -> Option<TileImage>;

    /// Store a tile, replacing any existing entry for `coord`.
    async fn put(&self, coord: TileCoord, tile: &TileImage) -> Result<(), CacheWriteError>;
}

// =============================================================================
// Disk Cache
// =============================================================================

/// Disambiguates temp files written concurrently by this process.
static WRITE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Sibling temp file for `path`, unique within this process.
fn temp_path_for(path: &Path) -> PathBuf {
    let seq = WRITE_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}.{}.tmp", std::process::id(), seq));
    PathBuf::from(name)
}

/// Write `data` to `path` via a temp file in the same directory and a rename.
///
/// Readers see either the previous file or the complete new one, and two
/// writers racing on the same path each replace it with a whole file. The
/// temp file is removed on failure.
pub(crate) async fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let temp = temp_path_for(path);
    if let Err(e) = tokio::fs::write(&temp, data).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }
    Ok(())
}

/// Persistent tile cache rooted at a directory.
#[derive(Debug)]
pub struct DiskTileCache {
    root: PathBuf,
}

impl DiskTileCache {
    /// Create a cache rooted at `root`. Directories are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds (or would hold) the tile at `coord`.
    pub fn path_for(&self, coord: TileCoord) -> PathBuf {
        self.root
            .join(coord.z.to_string())
            .join(coord.x.to_string())
            .join(format!("{}.png", coord.y))
    }
}

#[async_trait]
impl TileStore for DiskTileCache {
    async fn get(&self, coord: TileCoord) -> Option<TileImage> {
        let path = self.path_for(coord);

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(tile = %coord, path = %path.display(), error = %e, "Unreadable cached tile");
                return None;
            }
        };

        match TileImage::decode(&data) {
            Ok(tile) => Some(tile),
            Err(e) => {
                warn!(tile = %coord, path = %path.display(), error = %e, "Corrupt cached tile, ignoring");
                None
            }
        }
    }

    async fn put(&self, coord: TileCoord, tile: &TileImage) -> Result<(), CacheWriteError> {
        let fail = |message: String| CacheWriteError { coord, message };

        let path = self.path_for(coord);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| fail(format!("create {}: {}", parent.display(), e)))?;
        }

        let png = encode_rgb_png(tile.pixels()).map_err(|e| fail(e.to_string()))?;

        write_atomic(&path, &png)
            .await
            .map_err(|e| fail(format!("write {}: {}", path.display(), e)))?;

        debug!(tile = %coord, bytes = png.len(), "Cached tile");
        Ok(())
    }
}

// =============================================================================
// Memory Cache
// =============================================================================

/// In-memory tile cache.
#[derive(Debug, Default)]
pub struct MemoryTileCache {
    tiles: RwLock<HashMap<TileCoord, TileImage>>,
}

impl MemoryTileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, coord: TileCoord) -> bool {
        self.tiles.read().await.contains_key(&coord)
    }

    pub async fn len(&self) -> usize {
        self.tiles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tiles.read().await.is_empty()
    }
}

#[async_trait]
impl TileStore for MemoryTileCache {
    async fn get(&self, coord: TileCoord) -> Option<TileImage> {
        self.tiles.read().await.get(&coord).cloned()
    }

    async fn put(&self, coord: TileCoord, tile: &TileImage) -> Result<(), CacheWriteError> {
        self.tiles.write().await.insert(coord, tile.clone());
        Ok(())
    }
}
