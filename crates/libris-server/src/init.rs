//! Server startup
//!
//! Configuration, logging, application context, then Rocket. The bootstrap
//! admin is seeded while the context is built.

use crate::builder::build_rocket;
use anyhow::Context;
use libris_infrastructure::config::{AppConfig, ConfigLoader};
use libris_infrastructure::logging::init_logging;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Load configuration from an optional explicit path
pub fn load_config(config_path: Option<&Path>) -> libris_domain::Result<AppConfig> {
    let loader = match config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    loader.load()
}

/// Run the server until it is shut down
pub async fn run(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path).context("failed to load configuration")?;
    init_logging(&config.logging).context("failed to initialize logging")?;

    info!(
        address = %config.server.address,
        port = config.server.port,
        cache = ?config.cache.provider,
        database = config.database.enabled,
        "Starting Libris server"
    );

    let ctx = libris_infrastructure::init_app(config)
        .await
        .context("failed to initialize application context")?;

    build_rocket(Arc::new(ctx))
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server failed: {e}"))?;

    info!("Libris server stopped");
    Ok(())
}
