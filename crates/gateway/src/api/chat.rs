//! Chat endpoint — synchronous HTTP path through the composer.
//!
//! `POST /v1/chat` services clients without an open WebSocket: the same
//! composition step runs and the reply comes back in the response body.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use uuid::Uuid;

use vg_domain::error::Error;

use crate::api::api_error;
use crate::composer;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request shape
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    /// Explicit session key. If absent, a fresh one is generated.
    #[serde(default)]
    pub session_key: Option<String>,
    /// User message text.
    pub message: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/chat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> impl IntoResponse {
    if body.message.trim().is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "message must not be empty");
    }

    let session_key = body
        .session_key
        .unwrap_or_else(|| format!("http:{}", Uuid::new_v4()));

    // One turn per session at a time.
    let _permit = match state.session_locks.try_acquire(&session_key) {
        Ok(p) => p,
        Err(busy) => {
            return api_error(
                StatusCode::TOO_MANY_REQUESTS,
                format!("{busy} — try again shortly"),
            );
        }
    };

    match composer::compose_reply(&state, &session_key, &body.message).await {
        Ok(reply) => Json(serde_json::json!({
            "session_key": reply.session_key,
            "session_id": reply.session_id,
            "content": reply.content,
        }))
        .into_response(),
        Err(Error::EmptyInput) => api_error(StatusCode::BAD_REQUEST, "message must not be empty"),
        Err(e) => {
            tracing::error!(session_key = %session_key, error = %e, "chat turn failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}
