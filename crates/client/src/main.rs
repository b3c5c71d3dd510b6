//! Tower-defense client binary.
//!
//! Main entry point for the headless client.
//!
//! # Architecture
//!
//! This binary is the composition root that assembles:
//! 1. Content (card list, game config) via `game-content`
//! 2. Runtime (world, hand, descriptor cache) via `RuntimeBuilder`
//! 3. A scripted session driving the runtime frame by frame
//!
//! # Examples
//!
//! ```bash
//! DATA_DIR=data FRAMES=3600 RUST_LOG=runtime=debug cargo run -p defense-client
//! ```
mod config;
mod logging;
mod session;

use anyhow::Result;

use crate::config::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env();
    let _guard = logging::setup_logging(config.log_dir.as_deref())?;

    tracing::info!("Starting tower-defense client");
    tracing::info!("Data directory: {}", config.data_dir.display());

    let summary = session::run(&config).await?;

    tracing::info!(
        frames = summary.frames,
        towers = summary.towers,
        spawned = summary.enemies_spawned,
        destroyed = summary.enemies_destroyed,
        escaped = summary.enemies_escaped,
        towers_lost = summary.towers_destroyed,
        "session finished"
    );
    Ok(())
}
