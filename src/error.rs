use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::geo::TileCoord;

/// Why a single tile could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchCause {
    /// Transport-level failure (DNS, connection reset, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The request did not complete within the per-tile timeout
    #[error("request timed out")]
    Timeout,

    /// The tile server answered with a non-success status
    #[error("tile server returned status {0}")]
    Status(u16),

    /// The response body is not a decodable raster image
    #[error("invalid tile image: {0}")]
    Decode(String),

    /// The decoded image is not a square tile of the configured size
    #[error("unexpected tile dimensions {width}x{height}, expected {expected}x{expected}")]
    Dimensions { width: u32, height: u32, expected: u32 },
}

/// A tile could not be fetched. Fatal for the whole render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch tile {coord}: {cause}")]
pub struct TileFetchError {
    /// The tile that failed
    pub coord: TileCoord,

    /// What went wrong
    pub cause: FetchCause,
}

impl TileFetchError {
    pub fn new(coord: TileCoord, cause: FetchCause) -> Self {
        Self { coord, cause }
    }
}

/// A tile could not be persisted to the cache.
///
/// Never fatal: the caller logs it and carries on with the in-memory tile.
#[derive(Debug, Clone, Error)]
#[error("failed to cache tile {coord}: {message}")]
pub struct CacheWriteError {
    pub coord: TileCoord,
    pub message: String,
}

/// Errors produced while obtaining or validating input points.
#[derive(Debug, Clone, Error)]
pub enum PointError {
    /// Latitude outside [-90, 90] or not finite
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] or not finite
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Network or connection error talking to the point API
    #[error("HTTP error: {0}")]
    Http(String),

    /// The point API answered with a non-success status
    #[error("point API returned status {0}")]
    Status(u16),

    /// The payload could not be parsed
    #[error("failed to parse points: {0}")]
    Parse(String),

    /// Local file could not be read
    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },
}

/// Errors that abort a render.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No points were supplied
    #[error("no points to render")]
    EmptyInput,

    /// A required tile could not be fetched
    #[error(transparent)]
    TileFetch(#[from] TileFetchError),

    /// Compositing was asked to work on an empty tile set
    #[error("no tiles to composite")]
    NoTiles,

    /// The canvas could not be serialized
    #[error("failed to encode PNG: {message}")]
    Encode { message: String },

    /// The overall render deadline elapsed
    #[error("render did not finish within {limit:?}")]
    DeadlineExceeded { limit: Duration },

    /// The covering tile set is larger than the configured cap
    #[error("map needs {count} tiles, more than the limit of {limit}")]
    TooManyTiles { count: usize, limit: usize },

    /// The render settings are inconsistent
    #[error("invalid render configuration: {message}")]
    InvalidConfig { message: String },

    /// The output artifact could not be written
    #[error("failed to write {path}: {message}")]
    Output { path: PathBuf, message: String },

    /// Input points could not be obtained
    #[error(transparent)]
    Points(#[from] PointError),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {message}")]
    HttpClient { message: String },
}
