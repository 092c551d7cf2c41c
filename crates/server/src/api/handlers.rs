use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use hirewire_core::SanitizedConfig;
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// Error body shared by all API handlers.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Unwrap a JSON body, turning extractor rejections into 400 responses.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| api_error(StatusCode::BAD_REQUEST, rejection.body_text()))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    crate::metrics::collect_dynamic_metrics(&state).await;
    crate::metrics::encode_metrics()
}
