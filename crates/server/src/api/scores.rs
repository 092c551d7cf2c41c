//! Match score API handler.

use axum::{extract::rejection::JsonRejection, Json};
use hirewire_core::catalog::normalize_results;
use hirewire_core::{annotate_matches, FreelancerRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::handlers::{json_body, ApiError};

#[derive(Debug, Deserialize)]
pub struct ScoreBody {
    pub freelancers: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    /// Records with `matchScore` filled in, best first.
    pub freelancers: Vec<FreelancerRecord>,
}

pub async fn score(
    payload: Result<Json<ScoreBody>, JsonRejection>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let body = json_body(payload)?;
    let mut freelancers = normalize_results(&body.freelancers);
    annotate_matches(&mut freelancers);
    Ok(Json(ScoreResponse { freelancers }))
}
