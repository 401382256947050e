//! HTTP boundary
//!
//! - `GET /predict/?sentence1=..&sentence2=..` (also `/predict`)
//! - `GET /health`
//!
//! Errors are returned as `{"detail": "..."}` with 400 for caller mistakes
//! and 500 for model or internal faults.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use paraphrase_core::{DetectorError, Label, ParaphraseDetector, Prediction};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    detector: Arc<ParaphraseDetector>,
}

impl AppState {
    pub fn new(detector: Arc<ParaphraseDetector>) -> Self {
        Self { detector }
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictParams {
    sentence1: Option<String>,
    sentence2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub sentence1: String,
    pub sentence2: String,
    pub predicted_label: Label,
    pub confidence: f32,
}

impl From<Prediction> for PredictResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            sentence1: prediction.sentence1,
            sentence2: prediction.sentence2,
            predicted_label: prediction.predicted_label,
            confidence: prediction.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub backend_info: String,
    pub max_length: usize,
}

/// Error rendered as `{"detail": msg}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl From<DetectorError> for ApiError {
    fn from(err: DetectorError) -> Self {
        if err.is_client_error() {
            warn!("Rejected request: {}", err);
            Self::bad_request(err.to_string())
        } else {
            error!("Prediction failed: {}", err);
            Self::internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

/// Build the service router
///
/// ```rust,ignore
/// let app = paraphrase::http::router(Arc::new(detector));
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
/// axum::serve(listener, app).await?;
/// ```
pub fn router(detector: Arc<ParaphraseDetector>) -> Router {
    Router::new()
        .route("/predict", get(predict))
        .route("/predict/", get(predict))
        .route("/health", get(health))
        .with_state(AppState::new(detector))
}

async fn predict(
    State(state): State<AppState>,
    query: Result<Query<PredictParams>, QueryRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Query(params) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let sentence1 = params
        .sentence1
        .ok_or_else(|| ApiError::bad_request("Missing query parameter: sentence1"))?;
    let sentence2 = params
        .sentence2
        .ok_or_else(|| ApiError::bad_request("Missing query parameter: sentence2"))?;

    // Inference is CPU-bound; keep it off the async workers
    let detector = Arc::clone(&state.detector);
    let prediction = tokio::task::spawn_blocking(move || detector.predict(&sentence1, &sentence2))
        .await
        .map_err(|e| {
            error!("Prediction task failed: {}", e);
            ApiError::internal("Prediction task failed")
        })??;

    Ok(Json(prediction.into()))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.detector.engine();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        backend: engine.backend_name().to_string(),
        backend_info: engine.backend_info(),
        max_length: state.detector.encoder().max_length(),
    })
}
