//! Configuration management for the map renderer.
//!
//! This module provides:
//! - [`Config`]: command-line arguments via clap, with `MAP_`-prefixed
//!   environment variable fallbacks and sensible defaults
//! - [`RenderConfig`]: the plain settings struct handed to the pipeline
//!
//! # Environment Variables
//!
//! - `MAP_TARGET_WIDTH` / `MAP_TARGET_HEIGHT` - Target viewport (default: 1200x800)
//! - `MAP_MIN_ZOOM` / `MAP_MAX_ZOOM` - Zoom search range (default: 4-12)
//! - `MAP_TILE_SIZE` - Tile side in pixels (default: 256)
//! - `MAP_MARKER_RADIUS` - Marker radius in pixels (default: 4)
//! - `MAP_PADDING_DEGREES` - Padding around points for tile coverage (default: 0.1)
//! - `MAP_CACHE_DIR` - Tile cache directory (default: tile_cache)
//! - `MAP_OUTPUT` - Output PNG path (default: map.png)
//! - `MAP_TILE_URL` - Tile URL template with `{z}`, `{x}`, `{y}`
//! - `MAP_USER_AGENT` - Client identifier sent to the tile server
//! - `MAP_FETCH_TIMEOUT` - Per-tile timeout in seconds (default: 20)
//! - `MAP_FETCH_CONCURRENCY` - Parallel tile downloads (default: 4)
//! - `MAP_MAX_TILES` - Refuse maps needing more tiles (default: 1024)
//! - `MAP_RENDER_TIMEOUT` - Optional overall deadline in seconds
//! - `MAP_POINTS_FILE` - Read points from a JSON file
//! - `CALLSIGN` - Fetch activations for this callsign
//! - `GITHUB_REPOSITORY_OWNER` - Callsign used when `CALLSIGN` is unset
//! - `MAP_API_BASE` - Activation API base URL (default: https://sotl.as)

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::geo::{ZoomBounds, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, MAX_SUPPORTED_ZOOM};
use crate::points::DEFAULT_API_BASE;
use crate::render::DEFAULT_MARKER_RADIUS;
use crate::tile::{
    DEFAULT_CACHE_DIR, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_TILE_SIZE, DEFAULT_TILE_URL,
    DEFAULT_USER_AGENT,
};

// =============================================================================
// Default Values
// =============================================================================

/// Default target viewport width in pixels.
pub const DEFAULT_TARGET_WIDTH: u32 = 1200;

/// Default target viewport height in pixels.
pub const DEFAULT_TARGET_HEIGHT: u32 = 800;

/// Default padding around the points, in degrees, when choosing tiles.
pub const DEFAULT_PADDING_DEGREES: f64 = 0.1;

/// Default output path.
pub const DEFAULT_OUTPUT_PATH: &str = "map.png";

/// Default number of tiles downloaded in parallel.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Upper bound on parallel downloads, to stay polite to tile servers.
pub const MAX_FETCH_CONCURRENCY: usize = 64;

/// Default cap on the number of tiles in one map.
pub const DEFAULT_MAX_TILES: usize = 1024;

/// Largest accepted tile cap.
pub const MAX_TILE_LIMIT: usize = 16_384;

/// Largest accepted tile side in pixels.
pub const MAX_TILE_SIZE: u32 = 4096;

// =============================================================================
// Render Configuration
// =============================================================================

/// Settings for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub target_width: u32,
    pub target_height: u32,
    pub zoom: ZoomBounds,
    pub tile_size: u32,
    pub marker_radius: u32,
    pub padding_degrees: f64,
    pub cache_dir: PathBuf,
    pub output_path: PathBuf,
    pub tile_url: String,
    pub user_agent: String,
    pub fetch_timeout: Duration,
    pub fetch_concurrency: usize,

    /// Refuse to render maps needing more tiles than this
    pub max_tiles: usize,

    /// Abort the whole render after this long
    pub render_timeout: Option<Duration>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            target_height: DEFAULT_TARGET_HEIGHT,
            zoom: ZoomBounds::new(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM),
            tile_size: DEFAULT_TILE_SIZE,
            marker_radius: DEFAULT_MARKER_RADIUS,
            padding_degrees: DEFAULT_PADDING_DEGREES,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            tile_url: DEFAULT_TILE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            max_tiles: DEFAULT_MAX_TILES,
            render_timeout: None,
        }
    }
}

impl RenderConfig {
    /// Validate the settings and return an error message if invalid.
    ///
    /// [`MapRenderer`](crate::render::MapRenderer) runs this before every
    /// render, so library callers get the same checks as the CLI.
    pub fn validate(&self) -> Result<(), String> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err("target_width and target_height must be greater than 0".to_string());
        }

        if self.zoom.min > self.zoom.max {
            return Err(format!(
                "min_zoom ({}) must not exceed max_zoom ({})",
                self.zoom.min, self.zoom.max
            ));
        }
        if self.zoom.max > MAX_SUPPORTED_ZOOM {
            return Err(format!("max_zoom must be at most {}", MAX_SUPPORTED_ZOOM));
        }

        if self.tile_size == 0 || self.tile_size > MAX_TILE_SIZE {
            return Err(format!("tile_size must be between 1 and {}", MAX_TILE_SIZE));
        }

        if !self.padding_degrees.is_finite() || self.padding_degrees < 0.0 {
            return Err("padding_degrees must be a non-negative number".to_string());
        }

        if self.fetch_timeout.is_zero() {
            return Err("fetch_timeout must be greater than 0".to_string());
        }

        if self.fetch_concurrency == 0 || self.fetch_concurrency > MAX_FETCH_CONCURRENCY {
            return Err(format!(
                "fetch_concurrency must be between 1 and {}",
                MAX_FETCH_CONCURRENCY
            ));
        }

        if self.max_tiles == 0 || self.max_tiles > MAX_TILE_LIMIT {
            return Err(format!("max_tiles must be between 1 and {}", MAX_TILE_LIMIT));
        }

        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.tile_url.contains(placeholder) {
                return Err(format!("tile_url must contain {}", placeholder));
            }
        }
        url::Url::parse(&self.tile_url).map_err(|e| format!("tile_url is not a valid URL: {}", e))?;

        if self.user_agent.trim().is_empty() {
            return Err("user_agent must not be empty".to_string());
        }

        Ok(())
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Where the points come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointInput {
    File(PathBuf),
    Callsign { api_base: String, callsign: String },
}

/// activation-map - render a static PNG map of activation locations.
///
/// Picks the most detailed zoom at which all points fit the target size,
/// stitches OpenStreetMap-style tiles (cached on disk) and marks each point.
#[derive(Parser, Debug, Clone)]
#[command(name = "activation-map")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Input
    // =========================================================================
    /// Read points from a JSON file instead of the activation API.
    #[arg(long, env = "MAP_POINTS_FILE")]
    pub points_file: Option<PathBuf>,

    /// Callsign whose activations should be plotted.
    #[arg(long, env = "CALLSIGN")]
    pub callsign: Option<String>,

    /// Callsign used when none is given, e.g. the repository owner in CI.
    #[arg(long, env = "GITHUB_REPOSITORY_OWNER", hide = true)]
    pub fallback_callsign: Option<String>,

    /// Base URL of the activation API.
    #[arg(long, default_value = DEFAULT_API_BASE, env = "MAP_API_BASE")]
    pub api_base: String,

    // =========================================================================
    // Map Geometry
    // =========================================================================
    /// Target map width in pixels.
    #[arg(long, default_value_t = DEFAULT_TARGET_WIDTH, env = "MAP_TARGET_WIDTH")]
    pub target_width: u32,

    /// Target map height in pixels.
    #[arg(long, default_value_t = DEFAULT_TARGET_HEIGHT, env = "MAP_TARGET_HEIGHT")]
    pub target_height: u32,

    /// Lowest zoom level to consider.
    #[arg(long, default_value_t = DEFAULT_MIN_ZOOM, env = "MAP_MIN_ZOOM")]
    pub min_zoom: u8,

    /// Highest zoom level to consider.
    #[arg(long, default_value_t = DEFAULT_MAX_ZOOM, env = "MAP_MAX_ZOOM")]
    pub max_zoom: u8,

    /// Tile side length in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "MAP_TILE_SIZE")]
    pub tile_size: u32,

    /// Marker radius in pixels.
    #[arg(long, default_value_t = DEFAULT_MARKER_RADIUS, env = "MAP_MARKER_RADIUS")]
    pub marker_radius: u32,

    /// Extra margin around the points, in degrees, when selecting tiles.
    #[arg(long, default_value_t = DEFAULT_PADDING_DEGREES, env = "MAP_PADDING_DEGREES")]
    pub padding_degrees: f64,

    // =========================================================================
    // Tiles
    // =========================================================================
    /// Tile URL template containing `{z}`, `{x}` and `{y}`.
    #[arg(long, default_value = DEFAULT_TILE_URL, env = "MAP_TILE_URL")]
    pub tile_url: String,

    /// Client identifier sent to the tile server.
    #[arg(long, default_value = DEFAULT_USER_AGENT, env = "MAP_USER_AGENT")]
    pub user_agent: String,

    /// Directory for the persistent tile cache.
    #[arg(long, default_value = DEFAULT_CACHE_DIR, env = "MAP_CACHE_DIR")]
    pub cache_dir: PathBuf,

    /// Per-tile download timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS, env = "MAP_FETCH_TIMEOUT")]
    pub fetch_timeout: u64,

    /// Number of tiles downloaded in parallel.
    #[arg(long, default_value_t = DEFAULT_FETCH_CONCURRENCY, env = "MAP_FETCH_CONCURRENCY")]
    pub fetch_concurrency: usize,

    /// Refuse maps that need more tiles than this.
    #[arg(long, default_value_t = DEFAULT_MAX_TILES, env = "MAP_MAX_TILES")]
    pub max_tiles: usize,

    /// Abort the whole render after this many seconds.
    #[arg(long, env = "MAP_RENDER_TIMEOUT")]
    pub render_timeout: Option<u64>,

    // =========================================================================
    // Output
    // =========================================================================
    /// Where to write the PNG.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH, env = "MAP_OUTPUT")]
    pub output: PathBuf,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        match (&self.points_file, &self.callsign) {
            (Some(_), Some(_)) => {
                return Err("--points-file and --callsign are mutually exclusive".to_string());
            }
            (Some(_), None) => {}
            (None, _) => match self.resolved_callsign() {
                None => {
                    return Err(
                        "No point input. Set --points-file or --callsign (or CALLSIGN)"
                            .to_string(),
                    );
                }
                Some(callsign) if callsign.trim().is_empty() => {
                    return Err("callsign must not be empty".to_string());
                }
                Some(_) => {
                    url::Url::parse(&self.api_base)
                        .map_err(|e| format!("api_base is not a valid URL: {}", e))?;
                }
            },
        }

        self.render_config().validate()
    }

    /// `--callsign` / `CALLSIGN`, else the fallback owner name.
    pub fn resolved_callsign(&self) -> Option<&str> {
        self.callsign
            .as_deref()
            .or(self.fallback_callsign.as_deref())
    }

    /// The selected point input. Call [`validate`](Self::validate) first.
    pub fn point_input(&self) -> Option<PointInput> {
        if let Some(ref path) = self.points_file {
            return Some(PointInput::File(path.clone()));
        }
        self.resolved_callsign().map(|callsign| PointInput::Callsign {
            api_base: self.api_base.clone(),
            callsign: callsign.to_string(),
        })
    }

    /// Settings for the render pipeline.
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            target_width: self.target_width,
            target_height: self.target_height,
            zoom: ZoomBounds::new(self.min_zoom, self.max_zoom),
            tile_size: self.tile_size,
            marker_radius: self.marker_radius,
            padding_degrees: self.padding_degrees,
            cache_dir: self.cache_dir.clone(),
            output_path: self.output.clone(),
            tile_url: self.tile_url.clone(),
            user_agent: self.user_agent.clone(),
            fetch_timeout: Duration::from_secs(self.fetch_timeout),
            fetch_concurrency: self.fetch_concurrency,
            max_tiles: self.max_tiles,
            render_timeout: self.render_timeout.map(Duration::from_secs),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
