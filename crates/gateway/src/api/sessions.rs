//! Session management endpoints.
//!
//! - `GET  /v1/sessions`                 — list all sessions
//! - `GET  /v1/sessions/:key`            — session detail with history
//! - `GET  /v1/sessions/:key/transcript` — persisted JSONL transcript
//! - `POST /v1/sessions/:key/reset`      — clear history, new session id

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

use crate::api::api_error;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let sessions: Vec<_> = state
        .sessions
        .list()
        .into_iter()
        .map(|s| {
            serde_json::json!({
                "session_key": s.session_key,
                "session_id": s.session_id,
                "created_at": s.created_at,
                "updated_at": s.updated_at,
                "turns": s.turns.len(),
            })
        })
        .collect();

    Json(serde_json::json!({ "sessions": sessions }))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/sessions/:key
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_session(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match state.sessions.get(&key) {
        Some(entry) => Json(entry).into_response(),
        None => api_error(StatusCode::NOT_FOUND, format!("unknown session `{key}`")),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/sessions/:key/transcript
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_transcript(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let entry = match state.sessions.get(&key) {
        Some(e) => e,
        None => return api_error(StatusCode::NOT_FOUND, format!("unknown session `{key}`")),
    };

    match state.transcripts.read(&entry.session_id).await {
        Ok(lines) => Json(serde_json::json!({
            "session_key": entry.session_key,
            "session_id": entry.session_id,
            "lines": lines,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(session_key = %key, error = %e, "transcript read failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "transcript read failed")
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/sessions/:key/reset
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn reset_session(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    match state.sessions.reset(&key) {
        Some(entry) => {
            tracing::info!(session_key = %key, session_id = %entry.session_id, "session reset");
            Json(serde_json::json!({
                "session_key": entry.session_key,
                "session_id": entry.session_id,
                "reset": true,
            }))
            .into_response()
        }
        None => api_error(StatusCode::NOT_FOUND, format!("unknown session `{key}`")),
    }
}
