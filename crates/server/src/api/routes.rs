use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{assistant, chat, handlers, mentions, middleware::metrics_middleware, scores};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Provider status
        .route("/assistant/status", get(assistant::get_status))
        // Chat
        .route("/chat/sessions", post(chat::create_session))
        .route(
            "/chat/sessions/{id}",
            get(chat::get_session).delete(chat::delete_session),
        )
        .route("/chat/sessions/{id}/messages", post(chat::send_message))
        // Mentions and scores
        .route("/mentions/resolve", post(mentions::resolve))
        .route("/scores", post(scores::score));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
