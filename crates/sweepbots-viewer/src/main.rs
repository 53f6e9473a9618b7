//! Visualization client: loads the static map, bootstraps the tracked
//! world, and synchronizes it against the remote simulation server.

mod client;
mod render_log;
mod sync;
mod telemetry;

use anyhow::{Context, Result};
use sweepbots_core::{FrameCodes, ViewerConfig};
use sweepbots_world::{spawn_world, EntityRegistry, WorldGrid};
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;

    telemetry::init_telemetry();

    info!("Starting sweepbots viewer");
    info!("Server URL: {}", config.server_url);

    let map_text = std::fs::read_to_string(&config.map_path)
        .with_context(|| format!("reading map {}", config.map_path))?;
    // A bad map is the one unrecoverable condition: nothing can be shown
    // without a valid static world.
    let grid = WorldGrid::parse(&map_text).context("parsing map")?;
    info!("Loaded {}x{} world from {}", grid.height(), grid.width(), config.map_path);

    let mut registry = EntityRegistry::new();
    let mut render = render_log::TracingRender::new();
    spawn_world(&grid, &config.protocol, &mut registry, &mut render);

    let codes = FrameCodes::new(&config.protocol);
    let client = client::SimulationClient::new(config)?;
    info!("Session {}", client.session_id());

    let mut engine = sync::SyncEngine::new(client, codes);

    tokio::select! {
        result = engine.run(&grid, &mut registry, &mut render) => {
            let report = result?;
            info!(
                "Run finished: {}/{} frames applied, {} skipped",
                report.frames_applied, report.iterations, report.frames_skipped
            );
        }
        _ = shutdown_signal() => {
            info!("Interrupted, leaving the world as of the last applied frame");
        }
    }

    Ok(())
}

fn load_config() -> Result<ViewerConfig> {
    let mut config = match std::env::var("SWEEPBOTS_CONFIG") {
        Ok(path) => {
            ViewerConfig::from_file(&path).with_context(|| format!("loading config {}", path))?
        }
        Err(_) => ViewerConfig::default(),
    };

    if let Ok(url) = std::env::var("SWEEPBOTS_SERVER_URL") {
        config.server_url = url;
    }
    if let Ok(path) = std::env::var("SWEEPBOTS_MAP") {
        config.map_path = path;
    }

    Ok(config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
