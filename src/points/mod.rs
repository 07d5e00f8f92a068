//! Point producers.
//!
//! The renderer only needs a non-empty sequence of [`GeoPoint`]s. This module
//! provides two ways to get one:
//!
//! - [`ActivationApiSource`]: summit activations for a callsign from a
//!   SOTLAS-style HTTP API
//! - [`JsonFileSource`]: points stored in a local JSON file
//!
//! Both accept activation records (`{"summit": {"coordinates": {...}}}`);
//! the file source also accepts bare `{"latitude", "longitude"}` objects.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::PointError;
use crate::geo::GeoPoint;

/// Default activation API base URL.
pub const DEFAULT_API_BASE: &str = "https://sotl.as";

/// Timeout for the activation API request.
pub const API_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// PointSource Trait
// =============================================================================

/// Something that yields the points to put on the map.
#[async_trait]
pub trait PointSource: Send + Sync {
    async fn points(&self) -> Result<Vec<GeoPoint>, PointError>;
}

// =============================================================================
// Wire Format
// =============================================================================

#[derive(Debug, Deserialize)]
struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct Summit {
    coordinates: Coordinates,
}

#[derive(Debug, Deserialize)]
struct Activation {
    summit: Summit,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PointRecord {
    Activation(Activation),
    Plain(Coordinates),
}

impl PointRecord {
    fn coordinates(&self) -> &Coordinates {
        match self {
            PointRecord::Activation(a) => &a.summit.coordinates,
            PointRecord::Plain(c) => c,
        }
    }
}

/// Parse a JSON array of point records, preserving order.
pub fn parse_points(json: &str) -> Result<Vec<GeoPoint>, PointError> {
    let records: Vec<PointRecord> =
        serde_json::from_str(json).map_err(|e| PointError::Parse(e.to_string()))?;

    records
        .iter()
        .map(|r| {
            let c = r.coordinates();
            GeoPoint::new(c.latitude, c.longitude)
        })
        .collect()
}

/// Sort by (latitude, longitude) so the marker stacking order does not depend
/// on API response order.
pub fn sort_points(points: &mut [GeoPoint]) {
    points.sort_by(|a, b| {
        a.latitude()
            .total_cmp(&b.latitude())
            .then(a.longitude().total_cmp(&b.longitude()))
    });
}

// =============================================================================
// Activation API Source
// =============================================================================

/// Fetches `{api_base}/api/activations/{CALLSIGN}`.
#[derive(Debug, Clone)]
pub struct ActivationApiSource {
    client: reqwest::Client,
    api_base: String,
    callsign: String,
}

impl ActivationApiSource {
    pub fn new(
        api_base: impl Into<String>,
        callsign: &str,
        user_agent: &str,
    ) -> Result<Self, PointError> {
        let client = reqwest::Client::builder()
            .timeout(API_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .map_err(|e| PointError::Http(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            callsign: callsign.trim().to_uppercase(),
        })
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    pub fn url(&self) -> String {
        format!(
            "{}/api/activations/{}",
            self.api_base.trim_end_matches('/'),
            self.callsign
        )
    }
}

#[async_trait]
impl PointSource for ActivationApiSource {
    async fn points(&self) -> Result<Vec<GeoPoint>, PointError> {
        let url = self.url();
        debug!(%url, "Fetching activations");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PointError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PointError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PointError::Http(e.to_string()))?;

        let mut points = parse_points(&body)?;
        sort_points(&mut points);

        info!(callsign = %self.callsign, count = points.len(), "Loaded activations");
        Ok(points)
    }
}

// =============================================================================
// JSON File Source
// =============================================================================

/// Reads points from a JSON file, in file order.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PointSource for JsonFileSource {
    async fn points(&self) -> Result<Vec<GeoPoint>, PointError> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| PointError::Io {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        let points = parse_points(&body)?;
        info!(path = %self.path.display(), count = points.len(), "Loaded points");
        Ok(points)
    }
}
