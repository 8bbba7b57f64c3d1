//! Route definitions

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{model_info, predict, root, switch_model, AppState};

/// Create the API router
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Liveness
        .route("/", get(root))
        // Classification
        .route("/predict", get(predict))
        // Model management
        .route("/switchmodel", post(switch_model))
        .route("/model", get(model_info))
}
