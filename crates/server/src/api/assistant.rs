//! Provider status API handler.

use axum::{extract::State, Json};
use hirewire_core::provider::select_active;
use hirewire_core::{Provider, ProviderStatus};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantStatusResponse {
    #[serde(flatten)]
    pub status: ProviderStatus,
    /// Provider a fresh session would use.
    pub active_provider: Option<Provider>,
}

/// Probe the assistant backend now.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<AssistantStatusResponse> {
    let status = state.assistant().probe_status().await;
    let active_provider = select_active(&status, None).active;
    Json(AssistantStatusResponse {
        status,
        active_provider,
    })
}
