//! HTTP server command

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::ClassrConfig;
use crate::engine::{ActiveModel, OrtLoader};
use crate::server;

/// Start the classification server
///
/// Blocks until the run pointer exists, loads the production run, then serves.
pub async fn serve(mut config: ClassrConfig, port: Option<u16>, host: Option<String>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(host) = host {
        config.server.host = host;
    }

    tracing::info!("Volume: {}", config.storage.volume_dir.display());

    let model = ActiveModel::bootstrap(&config, Arc::new(OrtLoader))
        .await
        .context("failed to load the production model")?;

    tracing::info!("Starting server at http://{}", config.server.addr());
    server::start(Arc::new(model), config.server).await
}
