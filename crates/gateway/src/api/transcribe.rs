//! Audio input endpoint.
//!
//! `POST /v1/transcribe` takes a multipart audio upload, sends it to the
//! external speech-to-text service, then runs the transcribed text through
//! the same composer path as typed messages.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use uuid::Uuid;

use vg_domain::error::Error;

use crate::api::api_error;
use crate::composer;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /v1/transcribe
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    // Pull the `file` part (session key may ride along as a text part).
    let mut audio: Option<(String, Vec<u8>)> = None;
    let mut session_key: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(f)) => f,
            Ok(None) => break,
            Err(e) => {
                return api_error(StatusCode::BAD_REQUEST, format!("malformed multipart: {e}"));
            }
        };

        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_owned)
                    .unwrap_or_else(|| "upload.m4a".to_owned());
                match field.bytes().await {
                    Ok(bytes) => audio = Some((filename, bytes.to_vec())),
                    Err(e) => {
                        return api_error(
                            StatusCode::BAD_REQUEST,
                            format!("reading upload: {e}"),
                        );
                    }
                }
            }
            Some("session_key") => {
                if let Ok(text) = field.text().await {
                    if !text.trim().is_empty() {
                        session_key = Some(text);
                    }
                }
            }
            _ => {}
        }
    }

    let (filename, bytes) = match audio {
        Some(a) => a,
        None => return api_error(StatusCode::BAD_REQUEST, "missing `file` part"),
    };

    if bytes.is_empty() {
        return api_error(StatusCode::UNPROCESSABLE_ENTITY, "audio file is empty");
    }
    let max = state.config.transcription.max_upload_bytes;
    if bytes.len() > max {
        return api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("audio file exceeds {max} bytes"),
        );
    }

    let session_key = session_key.unwrap_or_else(|| format!("audio:{}", Uuid::new_v4()));

    // ── Speech to text ───────────────────────────────────────────────
    let transcription = match state.transcriber.transcribe(&filename, bytes).await {
        Ok(t) => t,
        Err(Error::EmptyInput) => {
            return api_error(StatusCode::UNPROCESSABLE_ENTITY, "audio file is empty");
        }
        Err(e) => {
            tracing::error!(session_key = %session_key, error = %e, "transcription failed");
            return api_error(
                StatusCode::BAD_GATEWAY,
                "transcription service is unavailable",
            );
        }
    };

    if transcription.text.trim().is_empty() {
        return api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "audio could not be transcribed to text",
        );
    }

    // ── Same path as a typed message ─────────────────────────────────
    let _permit = match state.session_locks.try_acquire(&session_key) {
        Ok(p) => p,
        Err(busy) => {
            return api_error(
                StatusCode::TOO_MANY_REQUESTS,
                format!("{busy} — try again shortly"),
            );
        }
    };

    match composer::compose_reply(&state, &session_key, &transcription.text).await {
        Ok(reply) => Json(serde_json::json!({
            "text": transcription.text,
            "content": reply.content,
            "session_key": reply.session_key,
            "session_id": reply.session_id,
        }))
        .into_response(),
        Err(Error::EmptyInput) => api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "audio could not be transcribed to text",
        ),
        Err(e) => {
            tracing::error!(session_key = %session_key, error = %e, "chat turn failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}
