//! Chat session API handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use hirewire_core::session::SessionSnapshot;
use hirewire_core::{ChatMessage, FallbackNotice};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::handlers::{api_error, json_body, ApiError};
use crate::state::{AppState, SharedSession};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for sending a chat message
#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub content: String,
}

/// Result of one chat turn
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub message: ChatMessage,
    pub notices: Vec<FallbackNotice>,
    pub stale: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Start a new chat session
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let session = state.create_session().await;
    let snapshot = session.lock().await.snapshot();
    debug!("Created chat session {}", snapshot.id);
    (StatusCode::CREATED, Json(snapshot))
}

/// Get a chat session by ID
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = find_session(&state, &id).await?;
    let snapshot = session.lock().await.snapshot();
    Ok(Json(snapshot))
}

/// Send a user message and wait for the assistant reply
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<SendMessageBody>, JsonRejection>,
) -> Result<Json<TurnResponse>, ApiError> {
    let body = json_body(payload)?;
    let content = body.content.trim();
    if content.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Message content must not be empty",
        ));
    }

    let session = find_session(&state, &id).await?;
    let outcome = state.assistant().send_message(&session, content).await;

    Ok(Json(TurnResponse {
        message: outcome.message,
        notices: outcome.notices,
        stale: outcome.stale,
    }))
}

/// Delete a chat session
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.remove_session(&id).await {
        return Err(session_not_found(&id));
    }
    debug!("Deleted chat session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn find_session(state: &AppState, id: &str) -> Result<SharedSession, ApiError> {
    state.session(id).await.ok_or_else(|| session_not_found(id))
}

fn session_not_found(id: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("Chat session not found: {}", id))
}
