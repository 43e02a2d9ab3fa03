pub mod chat;
pub mod sessions;
pub mod transcribe;
pub mod ws;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
pub fn router() -> Router<AppState> {
    Router::new()
        // Liveness probe
        .route("/health", get(health))
        // WebSocket conversation loop
        .route("/ws", get(ws::chat_ws))
        // Chat (HTTP fallback through the same composer path)
        .route("/v1/chat", post(chat::chat))
        // Audio input.  The body limit must sit above the configured
        // upload cap so the handler's own 422 governs oversized files.
        .route(
            "/v1/transcribe",
            post(transcribe::transcribe)
                .layer(axum::extract::DefaultBodyLimit::max(32 * 1024 * 1024)),
        )
        // Session management
        .route("/v1/sessions", get(sessions::list_sessions))
        .route("/v1/sessions/:key", get(sessions::get_session))
        .route("/v1/sessions/:key/transcript", get(sessions::get_transcript))
        .route("/v1/sessions/:key/reset", post(sessions::reset_session))
}

/// GET /health — liveness probe.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}
