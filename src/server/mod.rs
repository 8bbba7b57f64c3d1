//! HTTP server for classification
//!
//! Serves the liveness, predict and model switch endpoints.

mod handlers;
mod routes;

use std::sync::Arc;

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::engine::ActiveModel;

pub use handlers::{
    AppState, ApiError, ErrorResponse, ModelInfoResponse, PredictParams, PredictResponse,
    StatusResponse, SwitchResponse,
};
pub use routes::api_routes;

/// Build the application router with middleware applied
pub fn router(model: Arc<ActiveModel>, config: &ServerConfig) -> Router {
    let state = Arc::new(AppState::new(model));

    let mut app = Router::new()
        .merge(api_routes())
        .layer(DefaultBodyLimit::max(config.max_body_size));

    if config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    if config.request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app.with_state(state)
}

/// Start the HTTP inference server
pub async fn start(model: Arc<ActiveModel>, config: ServerConfig) -> Result<()> {
    let app = router(model, &config);

    let addr = config.addr();
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /            - Liveness check");
    tracing::info!("  GET  /predict     - Classify ?file_name=<image>");
    tracing::info!("  POST /switchmodel - Load a new production run");
    tracing::info!("  GET  /model       - Active run info");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
