//! activation-map - render a static map of activation locations.
//!
//! This binary loads the points, renders the map and writes the PNG.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use activation_map::{
    config::{Config, PointInput, RenderConfig},
    error::RenderError,
    points::{ActivationApiSource, JsonFileSource, PointSource},
    render::MapRenderer,
    tile::{DiskTileCache, HttpTileSource},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let render_config = config.render_config();

    info!("Configuration:");
    info!(
        "  Target: {}x{} px, zoom {}-{}",
        render_config.target_width,
        render_config.target_height,
        render_config.zoom.min,
        render_config.zoom.max
    );
    info!("  Tiles: {}", render_config.tile_url);
    info!("  Cache: {}", render_config.cache_dir.display());

    match run(&config, render_config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, render_config: RenderConfig) -> Result<(), RenderError> {
    let point_source = build_point_source(config, &render_config.user_agent)?;
    let points = point_source.points().await?;

    let source = HttpTileSource::new(
        &render_config.tile_url,
        &render_config.user_agent,
        render_config.fetch_timeout,
    )?;
    let cache = DiskTileCache::new(&render_config.cache_dir);
    let output_path = render_config.output_path.clone();

    let renderer = MapRenderer::new(source, cache, render_config);
    let output = renderer.render_to_file(&points, &output_path).await?;

    info!(
        "Rendered {} point(s) at zoom {}: {}x{} px from {} tile(s) ({} cached, {} downloaded)",
        points.len(),
        output.zoom,
        output.width,
        output.height,
        output.tiles.tile_count(),
        output.cache_hits,
        output.cache_misses
    );

    Ok(())
}

fn build_point_source(
    config: &Config,
    user_agent: &str,
) -> Result<Box<dyn PointSource>, RenderError> {
    match config.point_input() {
        Some(PointInput::File(path)) => Ok(Box::new(JsonFileSource::new(path))),
        Some(PointInput::Callsign { api_base, callsign }) => Ok(Box::new(
            ActivationApiSource::new(api_base, &callsign, user_agent)?,
        )),
        None => Err(RenderError::EmptyInput),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "activation_map=debug"
    } else {
        "activation_map=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
