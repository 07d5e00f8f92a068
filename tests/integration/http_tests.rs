//! HTTP client integration tests against a local server.
//!
//! Tests verify:
//! - Tile URLs are built from the template and the User-Agent is sent
//! - Non-success status, undecodable bodies, timeouts and refused
//!   connections surface as distinct fetch causes
//! - A full render through HTTP fills the disk cache, so a second render
//!   makes no requests
//! - The activation API source parses, sorts and reports errors

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use activation_map::error::{FetchCause, PointError};
use activation_map::geo::{GeoPoint, TileCoord};
use activation_map::points::{ActivationApiSource, PointSource};
use activation_map::render::MapRenderer;
use activation_map::tile::{DiskTileCache, HttpTileSource, TileFetcher, TileSource};
use activation_map::RenderConfig;

use super::test_utils::{pattern_tile, pattern_tile_png, spawn_server};

const TILE_SIZE: u32 = 32;
const USER_AGENT: &str = "activation-map-tests/1.0";

// =============================================================================
// Tile Server
// =============================================================================

#[derive(Clone, Default)]
struct TileServerState {
    hits: Arc<AtomicUsize>,
    user_agents: Arc<Mutex<Vec<String>>>,
}

impl TileServerState {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn tile_handler(
    State(state): State<TileServerState>,
    Path((z, x, y)): Path<(u8, u32, u32)>,
    headers: HeaderMap,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(agent) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        state.user_agents.lock().unwrap().push(agent.to_string());
    }

    // Row 0 is deliberately missing, row 1 is garbage, row 2 is slow.
    match y {
        0 => (StatusCode::NOT_FOUND, "no such tile").into_response(),
        1 => ([(header::CONTENT_TYPE, "image/png")], "not a png").into_response(),
        2 => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            StatusCode::OK.into_response()
        }
        _ => (
            [(header::CONTENT_TYPE, "image/png")],
            pattern_tile_png(TileCoord::new(z, x, y), TILE_SIZE),
        )
            .into_response(),
    }
}

async fn start_tile_server() -> (String, TileServerState) {
    let state = TileServerState::default();
    let router = Router::new()
        .route("/tiles/{z}/{x}/{y}", get(tile_handler))
        .with_state(state.clone());
    let addr = spawn_server(router).await;
    (format!("http://{}/tiles/{{z}}/{{x}}/{{y}}", addr), state)
}

fn http_source(template: &str, timeout: Duration) -> HttpTileSource {
    HttpTileSource::new(template, USER_AGENT, timeout).unwrap()
}

// =============================================================================
// HttpTileSource
// =============================================================================

#[tokio::test]
async fn test_fetch_tile_over_http() {
    let (template, state) = start_tile_server().await;
    let source = http_source(&template, Duration::from_secs(5));
    let coord = TileCoord::new(6, 35, 22);

    let body = source.fetch(coord).await.unwrap();
    let decoded = image::load_from_memory(&body).unwrap().to_rgb8();
    assert_eq!(decoded, pattern_tile(coord, TILE_SIZE));

    assert_eq!(state.hits(), 1);
    assert_eq!(
        state.user_agents.lock().unwrap().as_slice(),
        &[USER_AGENT.to_string()]
    );
}

#[tokio::test]
async fn test_not_found_is_status_cause() {
    let (template, _state) = start_tile_server().await;
    let source = http_source(&template, Duration::from_secs(5));

    let result = source.fetch(TileCoord::new(3, 1, 0)).await;
    assert_eq!(result.unwrap_err(), FetchCause::Status(404));
}

#[tokio::test]
async fn test_garbage_body_is_decode_error_with_coord() {
    let (template, _state) = start_tile_server().await;
    let dir = tempfile::tempdir().unwrap();
    let fetcher = TileFetcher::new(
        http_source(&template, Duration::from_secs(5)),
        DiskTileCache::new(dir.path()),
        TILE_SIZE,
    );
    let coord = TileCoord::new(3, 4, 1);

    let err = fetcher.fetch(coord).await.unwrap_err();
    assert_eq!(err.coord, coord);
    assert!(matches!(err.cause, FetchCause::Decode(_)));

    // Nothing was cached for the bad tile.
    assert!(!dir.path().join("3").join("4").join("1.png").exists());
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let (template, _state) = start_tile_server().await;
    let source = http_source(&template, Duration::from_millis(200));

    let result = source.fetch(TileCoord::new(3, 1, 2)).await;
    assert_eq!(result.unwrap_err(), FetchCause::Timeout);
}

#[tokio::test]
async fn test_refused_connection_is_http_cause() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let template = format!("http://{}/{{z}}/{{x}}/{{y}}.png", addr);
    let source = http_source(&template, Duration::from_secs(2));

    let result = source.fetch(TileCoord::new(1, 0, 0)).await;
    assert!(matches!(result, Err(FetchCause::Http(_))));
}

// =============================================================================
// Full Render over HTTP
// =============================================================================

#[tokio::test]
async fn test_second_render_makes_no_requests() {
    let (template, state) = start_tile_server().await;
    let dir = tempfile::tempdir().unwrap();

    // Renders at zoom 12, far from the special rows of the test server.
    let points = [
        GeoPoint::new(47.5, 19.0).unwrap(),
        GeoPoint::new(47.9, 20.0).unwrap(),
    ];
    let config = RenderConfig {
        tile_size: TILE_SIZE,
        tile_url: template.clone(),
        user_agent: USER_AGENT.to_string(),
        ..RenderConfig::default()
    };

    let renderer = MapRenderer::new(
        http_source(&template, Duration::from_secs(5)),
        DiskTileCache::new(dir.path()),
        config.clone(),
    );
    let first = renderer.render(&points).await.unwrap();
    let hits_after_first = state.hits();
    assert_eq!(hits_after_first, first.tiles.tile_count());

    let renderer = MapRenderer::new(
        http_source(&template, Duration::from_secs(5)),
        DiskTileCache::new(dir.path()),
        config,
    );
    let second = renderer.render(&points).await.unwrap();

    assert_eq!(state.hits(), hits_after_first);
    assert_eq!(first.png, second.png);
}

// =============================================================================
// Activation API
// =============================================================================

async fn activations_handler(Path(callsign): Path<String>) -> Response {
    if callsign != "HA5XYZ" {
        return (StatusCode::NOT_FOUND, "unknown callsign").into_response();
    }
    (
        [(header::CONTENT_TYPE, "application/json")],
        r#"[
            {"summit": {"code": "HA/MA-001", "coordinates": {"latitude": 47.8722, "longitude": 20.0092}}},
            {"summit": {"code": "HA/BU-001", "coordinates": {"latitude": 47.5183, "longitude": 18.9597}}},
            {"summit": {"code": "HA/BU-002", "coordinates": {"latitude": 47.5183, "longitude": 18.9000}}}
        ]"#,
    )
        .into_response()
}

async fn start_api_server() -> String {
    let router = Router::new().route("/api/activations/{callsign}", get(activations_handler));
    let addr = spawn_server(router).await;
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_activation_api_points_sorted() {
    let base = start_api_server().await;
    let source = ActivationApiSource::new(base, "ha5xyz", USER_AGENT).unwrap();

    let points = source.points().await.unwrap();
    assert_eq!(
        points,
        vec![
            GeoPoint::new(47.5183, 18.9000).unwrap(),
            GeoPoint::new(47.5183, 18.9597).unwrap(),
            GeoPoint::new(47.8722, 20.0092).unwrap(),
        ]
    );
}

#[tokio::test]
async fn test_activation_api_unknown_callsign() {
    let base = start_api_server().await;
    let source = ActivationApiSource::new(base, "N0CALL", USER_AGENT).unwrap();

    assert!(matches!(
        source.points().await,
        Err(PointError::Status(404))
    ));
}
