//! Remote tile sources.
//!
//! [`TileSource`] abstracts "give me the raw bytes of tile z/x/y" so the
//! fetcher can be exercised without network access.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::{FetchCause, RenderError};
use crate::geo::TileCoord;

/// Default tile server URL template.
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Default per-request timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;

/// Default client identifier sent with every tile request.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "activation-map/",
    env!("CARGO_PKG_VERSION"),
    " (static map renderer)"
);

/// Something that can produce the encoded bytes of a tile.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Fetch the encoded image for `coord`. One attempt, no retries.
    async fn fetch(&self, coord: TileCoord) -> Result<Bytes, FetchCause>;
}

/// Substitute `{z}`, `{x}` and `{y}` in a tile URL template.
pub fn tile_url(template: &str, coord: TileCoord) -> String {
    template
        .replace("{z}", &coord.z.to_string())
        .replace("{x}", &coord.x.to_string())
        .replace("{y}", &coord.y.to_string())
}

// =============================================================================
// HTTP Source
// =============================================================================

/// Tile source backed by a slippy-map HTTP server.
#[derive(Debug, Clone)]
pub struct HttpTileSource {
    client: reqwest::Client,
    url_template: String,
}

impl HttpTileSource {
    /// Build a source with its own HTTP client.
    ///
    /// `user_agent` identifies this client to the tile server, as most
    /// providers' usage policies require.
    pub fn new(
        url_template: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| RenderError::HttpClient {
                message: e.to_string(),
            })?;

        Ok(Self::with_client(client, url_template))
    }

    /// Build a source around an existing client.
    pub fn with_client(client: reqwest::Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    pub fn url_for(&self, coord: TileCoord) -> String {
        tile_url(&self.url_template, coord)
    }
}

fn classify(err: reqwest::Error) -> FetchCause {
    if err.is_timeout() {
        FetchCause::Timeout
    } else {
        FetchCause::Http(err.to_string())
    }
}

#[async_trait]
impl TileSource for HttpTileSource {
    async fn fetch(&self, coord: TileCoord) -> Result<Bytes, FetchCause> {
        let url = self.url_for(coord);
        debug!(tile = %coord, %url, "Downloading tile");

        let response = self.client.get(&url).send().await.map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchCause::Status(status.as_u16()));
        }

        response.bytes().await.map_err(classify)
    }
}
