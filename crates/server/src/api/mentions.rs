//! Mention resolution API handler.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use hirewire_core::catalog::normalize_results;
use hirewire_core::ResolvedText;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::handlers::{json_body, ApiError};
use crate::state::AppState;

/// Request body for resolving mentions in free text
#[derive(Debug, Deserialize)]
pub struct ResolveMentionsBody {
    pub text: String,
    /// Freelancer results returned with the text, flat or wrapped.
    #[serde(default)]
    pub matches: Vec<Value>,
}

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ResolveMentionsBody>, JsonRejection>,
) -> Result<Json<ResolvedText>, ApiError> {
    let body = json_body(payload)?;
    let matches = normalize_results(&body.matches);
    let resolved = state
        .assistant()
        .resolve_mentions(&body.text, &matches)
        .await;
    Ok(Json(resolved))
}
