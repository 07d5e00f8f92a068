//! End-to-end rendering tests.
//!
//! Tests verify:
//! - A fully cached map renders without touching the tile source
//! - Identical inputs give byte-identical PNGs
//! - Far-apart points select a low zoom and the expected tile rectangle
//! - Tiles are pasted at their offsets and markers drawn at projected pixels
//! - A single point at default settings lands in the middle of the canvas
//! - A failed tile aborts the render and leaves no output file

use image::{GenericImageView, Rgb};

use activation_map::error::RenderError;
use activation_map::geo::{project, select_zoom, tiles_covering, GeoBounds, GeoPoint, TileCoord};
use activation_map::render::MapRenderer;
use activation_map::tile::{DiskTileCache, MemoryTileCache};
use activation_map::RenderConfig;

use super::test_utils::{pattern_tile, populate_disk_cache, MockTileSource, OfflineSource};

const TILE_SIZE: u32 = 64;

fn point(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon).unwrap()
}

fn small_tile_config() -> RenderConfig {
    RenderConfig {
        tile_size: TILE_SIZE,
        ..RenderConfig::default()
    }
}

fn hungarian_summits() -> Vec<GeoPoint> {
    vec![
        point(47.5183, 18.9597),
        point(47.8722, 20.0092),
        point(47.7636, 19.0103),
    ]
}

// =============================================================================
// Offline Rendering from Disk Cache
// =============================================================================

#[tokio::test]
async fn test_render_from_populated_cache_needs_no_network() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_tile_config();
    let points = hungarian_summits();

    let zoom = select_zoom(
        &points,
        config.target_width,
        config.target_height,
        config.zoom,
        TILE_SIZE,
    )
    .unwrap();
    let bounds = GeoBounds::from_points(&points).unwrap();
    let range = tiles_covering(&bounds.padded(config.padding_degrees), zoom, TILE_SIZE);
    populate_disk_cache(dir.path(), &range, TILE_SIZE);

    let renderer = MapRenderer::new(OfflineSource, DiskTileCache::new(dir.path()), config);
    let output = renderer.render(&points).await.unwrap();

    assert_eq!(output.zoom, zoom);
    assert_eq!(output.tiles, range);
    assert_eq!(output.cache_hits, range.tile_count());
    assert_eq!(output.cache_misses, 0);
}

#[tokio::test]
async fn test_identical_inputs_give_identical_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let points = hungarian_summits();

    // First renderer downloads and fills the disk cache.
    let source = MockTileSource::new(TILE_SIZE);
    let first = MapRenderer::new(
        source.clone(),
        DiskTileCache::new(dir.path()),
        small_tile_config(),
    )
    .render(&points)
    .await
    .unwrap();
    assert!(source.request_count() > 0);

    // Second renderer runs entirely from the cache written by the first.
    let second = MapRenderer::new(
        OfflineSource,
        DiskTileCache::new(dir.path()),
        small_tile_config(),
    )
    .render(&points)
    .await
    .unwrap();

    assert_eq!(first.png, second.png);
    assert_eq!(second.cache_hits, second.tiles.tile_count());
}

// =============================================================================
// Zoom Selection and Coverage
// =============================================================================

#[tokio::test]
async fn test_far_apart_points_use_low_zoom() {
    let source = MockTileSource::new(256);
    let renderer = MapRenderer::new(
        source.clone(),
        MemoryTileCache::new(),
        RenderConfig::default(),
    );
    let points = [point(47.0, 19.0), point(60.0, 5.0)];

    let output = renderer.render(&points).await.unwrap();

    // 318 x 502 px at zoom 5; zoom 6 would be 1005 px tall.
    assert_eq!(output.zoom, 5);
    assert_eq!(
        (output.tiles.min_x, output.tiles.max_x),
        (16, 17),
        "unexpected columns"
    );
    assert_eq!(
        (output.tiles.min_y, output.tiles.max_y),
        (9, 11),
        "unexpected rows"
    );
    assert_eq!((output.width, output.height), (512, 768));

    // Every tile of the rectangle fetched exactly once.
    assert_eq!(source.request_count(), 6);
    let requested = source.requested();
    assert!(requested.iter().all(|c| output.tiles.contains(c)));
    assert_eq!(requested.len(), 6);
}

#[tokio::test]
async fn test_tiles_and_markers_land_at_expected_pixels() {
    let source = MockTileSource::new(256);
    let renderer = MapRenderer::new(source, MemoryTileCache::new(), RenderConfig::default());
    let points = [point(47.0, 19.0), point(60.0, 5.0)];

    let output = renderer.render(&points).await.unwrap();
    let decoded = image::load_from_memory(&output.png).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (output.width, output.height));

    // Tile (16, 9) is the top-left of the canvas, far from both markers.
    let top_left = pattern_tile(TileCoord::new(5, 16, 9), 256);
    assert_eq!(decoded.get_pixel(0, 0), top_left.get_pixel(0, 0));
    assert_eq!(decoded.get_pixel(200, 200), top_left.get_pixel(200, 200));

    // Tile (17, 11) is the bottom-right.
    let bottom_right = pattern_tile(TileCoord::new(5, 17, 11), 256);
    assert_eq!(
        decoded.get_pixel(511, 767),
        bottom_right.get_pixel(255, 255)
    );

    // Marker centers are red.
    for p in points {
        let pixel = project(p, 5, 256);
        let x = (pixel.x - 16.0 * 256.0) as u32;
        let y = (pixel.y - 9.0 * 256.0) as u32;
        assert_eq!(decoded.get_pixel(x, y), &Rgb([255, 0, 0]));
    }
}

#[tokio::test]
async fn test_single_point_renders_at_max_zoom() {
    let source = MockTileSource::new(TILE_SIZE);
    let renderer = MapRenderer::new(source, MemoryTileCache::new(), small_tile_config());

    let output = renderer.render(&[point(47.0, 19.0)]).await.unwrap();
    assert_eq!(output.zoom, 12);

    let decoded = image::load_from_memory(&output.png).unwrap();
    assert_eq!(decoded.dimensions(), (output.width, output.height));
}

#[tokio::test]
async fn test_single_point_default_settings_marks_center() {
    let source = MockTileSource::new(256);
    let renderer = MapRenderer::new(source, MemoryTileCache::new(), RenderConfig::default());
    let p = point(47.0, 19.0);

    let output = renderer.render(&[p]).await.unwrap();
    assert_eq!(output.zoom, 12);
    assert!(output.width >= 256 && output.width % 256 == 0);
    assert!(output.height >= 256 && output.height % 256 == 0);
    assert_eq!(
        (output.tiles.min_x, output.tiles.max_x, output.tiles.min_y, output.tiles.max_y),
        (2263, 2265, 1439, 1442)
    );

    let decoded = image::load_from_memory(&output.png).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (output.width, output.height));

    let pixel = project(p, 12, 256);
    let x = (pixel.x - f64::from(output.tiles.min_x * 256)) as u32;
    let y = (pixel.y - f64::from(output.tiles.min_y * 256)) as u32;
    assert_eq!(decoded.get_pixel(x, y), &Rgb([255, 0, 0]));

    // The point sits in the middle column and row of the tile grid.
    assert_eq!(x / 256, (output.tiles.width() - 1) / 2);
    assert_eq!(y / 256, (output.tiles.height() - 1) / 2);
}

// =============================================================================
// Failure Handling
// =============================================================================

#[tokio::test]
async fn test_missing_tile_aborts_render_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("map.png");
    let victim = TileCoord::new(5, 17, 10);

    let source = MockTileSource::new(256).failing_at(victim);
    let renderer = MapRenderer::new(source, MemoryTileCache::new(), RenderConfig::default());

    let result = renderer
        .render_to_file(&[point(47.0, 19.0), point(60.0, 5.0)], &output_path)
        .await;

    match result {
        Err(RenderError::TileFetch(err)) => assert_eq!(err.coord, victim),
        other => panic!("Expected TileFetch error, got {other:?}"),
    }
    assert!(!output_path.exists());
}

#[tokio::test]
async fn test_empty_points_rejected_before_fetching() {
    let source = MockTileSource::new(TILE_SIZE);
    let renderer = MapRenderer::new(source.clone(), MemoryTileCache::new(), small_tile_config());

    assert!(matches!(
        renderer.render(&[]).await,
        Err(RenderError::EmptyInput)
    ));
    assert_eq!(source.request_count(), 0);
}
