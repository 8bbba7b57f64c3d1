//! HTTP request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::engine::ActiveModel;
use crate::error::ClassrError;
use crate::loader::RunId;

/// Shared application state
pub struct AppState {
    pub model: Arc<ActiveModel>,
}

impl AppState {
    pub fn new(model: Arc<ActiveModel>) -> Self {
        Self { model }
    }
}

/// Liveness check
pub async fn root() -> impl IntoResponse {
    Json(StatusResponse {
        status: "OK".to_string(),
    })
}

/// Classify an image from the shared images directory
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PredictParams>,
) -> Result<Json<PredictResponse>, ApiError> {
    tracing::info!("Starting prediction for {}", params.file_name);

    let image_path = state.model.storage().image_path(&params.file_name)?;
    let (run, prediction) = state.model.predict(image_path).await?;

    tracing::info!(
        "Prediction finished with run {}: {}, score: {}",
        run.run_id,
        prediction.label,
        prediction.score
    );

    Ok(Json(PredictResponse {
        prediction: prediction.label,
        score: prediction.score,
        filename: params.file_name,
    }))
}

/// Promote a run to production and load it
pub async fn switch_model(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SwitchResponse>, ApiError> {
    let body = body.map_err(|e| ApiError::Request(e.body_text()))?;
    let raw = std::str::from_utf8(&body)
        .map_err(|e| ApiError::Request(format!("run id is not valid UTF-8: {}", e)))?;
    let run_id = RunId::parse(raw)?;
    let run = state.model.switch(run_id).await?;

    Ok(Json(SwitchResponse {
        message: format!("Now serving the model from run id: {}", run.run_id),
        run_id: run.run_id.to_string(),
    }))
}

/// Describe the active run
pub async fn model_info(State(state): State<Arc<AppState>>) -> Json<ModelInfoResponse> {
    let run = state.model.current();
    Json(ModelInfoResponse {
        run_id: run.run_id.to_string(),
        model_dir: run.predictor.source().model_dir.display().to_string(),
        num_classes: run.predictor.classes().len(),
        loaded_at: run.loaded_at.to_rfc3339(),
    })
}

/// Request failure, rendered as an opaque 500
///
/// The underlying error is logged, never sent to the client.
#[derive(Debug)]
pub enum ApiError {
    /// Loading or inference failed
    Classr(ClassrError),
    /// Request could not be read
    Request(String),
}

impl From<ClassrError> for ApiError {
    fn from(e: ClassrError) -> Self {
        Self::Classr(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Classr(e) => tracing::error!("Request failed: {}", e),
            Self::Request(message) => tracing::error!("Unreadable request: {}", message),
        }
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                detail: "Internal server error".to_string(),
            }),
        )
            .into_response()
    }
}

// Request/Response types

#[derive(Deserialize)]
pub struct PredictParams {
    pub file_name: String,
}

#[derive(Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "Status")]
    pub status: String,
}

#[derive(Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: String,
    pub score: f32,
    pub filename: String,
}

#[derive(Serialize, Deserialize)]
pub struct SwitchResponse {
    pub message: String,
    pub run_id: String,
}

#[derive(Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub run_id: String,
    pub model_dir: String,
    pub num_classes: usize,
    pub loaded_at: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
