//! Answer composition — retrieve, prompt, call, fall back.
//!
//! `compose_reply` is the single path every transport goes through: the
//! WebSocket loop, the HTTP chat endpoint, and the transcription endpoint
//! all hand the user's text here and get a reply string back.  Provider
//! failures never escape: rate limits are retried with backoff, and
//! anything that still fails degrades to a fixed apology so a broken turn
//! never breaks the conversation.

use std::time::Duration;

use vg_domain::error::{Error, Result};
use vg_domain::types::{ChatTurn, Role};
use vg_providers::{ChatRequest, PromptMessage};
use vg_sessions::TranscriptWriter;

use crate::state::AppState;

/// Shown to the user when the provider fails past the retry budget.
pub const FALLBACK_REPLY: &str =
    "I apologize, but there was an error processing your request. Please try again.";

/// Fixed instruction prepended to every outbound prompt.
///
/// The passages below it are quoted verbatim from the corpus; the model is
/// told to reproduce them exactly when asked for a quotation, minus the
/// verse numbers the corpus text carries.
const SYSTEM_INSTRUCTION: &str = "\
You are a warm, ordinary conversational companion who happens to know The Hidden Words deeply.

Rules:
- For casual conversation (greetings, small talk, daily life), respond as a normal friendly person. No quotes, no spiritual content.
- Only quote or reference The Hidden Words when the user explicitly asks for a quote, spiritual guidance, or the text itself, or shares a clear emotional state.
- When you do quote, reproduce the passage text exactly as given below. Never paraphrase a quotation. Omit any leading verse numbers.
- Keep quotes brief and return to normal conversation afterwards.

Relevant passages:
";

/// Result of a successful composition.
#[derive(Debug)]
pub struct ComposedReply {
    pub session_key: String,
    pub session_id: String,
    pub content: String,
}

/// Run one conversation turn for a session.
///
/// The caller must already hold the session lock.  Returns `EmptyInput`
/// for blank messages; every other failure mode resolves to a reply
/// string (possibly [`FALLBACK_REPLY`]).
pub async fn compose_reply(
    state: &AppState,
    session_key: &str,
    user_text: &str,
) -> Result<ComposedReply> {
    let user_text = user_text.trim();
    if user_text.is_empty() {
        return Err(Error::EmptyInput);
    }

    let (entry, created) = state.sessions.resolve_or_create(session_key);
    if created {
        tracing::info!(session_key = %session_key, session_id = %entry.session_id, "session created");
    }

    // History is captured before the user turn is appended so the prompt
    // window holds prior turns only; the user message rides separately.
    let history = state
        .sessions
        .history(session_key, state.config.composer.history_window);

    state
        .sessions
        .append_turn(session_key, ChatTurn::now(Role::User, user_text));

    // Retrieval goes through the provider's embeddings endpoint, so its
    // failures degrade the same way chat failures do.
    let content = match build_request(state, user_text, &history).await {
        Ok(request) => call_with_retry(state, request).await,
        Err(e) => {
            tracing::error!(session_key = %session_key, error = %e, "retrieval failed, falling back");
            FALLBACK_REPLY.to_owned()
        }
    };

    state
        .sessions
        .append_turn(session_key, ChatTurn::now(Role::Assistant, &content));

    if let Err(e) = state
        .transcripts
        .append(
            &entry.session_id,
            &[
                TranscriptWriter::line(Role::User.as_str(), user_text),
                TranscriptWriter::line(Role::Assistant.as_str(), &content),
            ],
        )
        .await
    {
        tracing::warn!(session_id = %entry.session_id, error = %e, "transcript write failed");
    }

    Ok(ComposedReply {
        session_key: session_key.to_owned(),
        session_id: entry.session_id,
        content,
    })
}

/// Build the outbound prompt: system instruction + retrieved passages,
/// trailing history window, then the user message.
async fn build_request(
    state: &AppState,
    user_text: &str,
    history: &[ChatTurn],
) -> Result<ChatRequest> {
    let scored = state
        .index
        .retrieve(user_text, state.config.composer.top_k)
        .await?;

    let mut system = String::from(SYSTEM_INSTRUCTION);
    if scored.is_empty() {
        system.push_str("(none)\n");
    }
    for hit in &scored {
        system.push_str(&hit.passage.text);
        system.push_str("\n\n");
    }

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(PromptMessage::new(Role::System, system));
    for turn in history {
        messages.push(PromptMessage::new(turn.role, turn.content.clone()));
    }
    messages.push(PromptMessage::new(Role::User, user_text));

    Ok(ChatRequest {
        messages,
        temperature: state.config.llm.temperature,
    })
}

/// Call the provider, retrying transient failures with exponential
/// backoff.  Resolves to [`FALLBACK_REPLY`] once the budget is spent or
/// on any non-transient provider error.
async fn call_with_retry(state: &AppState, request: ChatRequest) -> String {
    let max_retries = state.config.llm.max_retries;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match state.llm.chat(request.clone()).await {
            Ok(resp) => return resp.content,
            Err(e) if e.is_transient() && attempt <= max_retries => {
                let backoff_ms = match &e {
                    Error::RateLimited {
                        retry_after_ms: Some(ms),
                    } => *ms,
                    _ => 100u64 * 2u64.pow(attempt - 1),
                };
                tracing::warn!(
                    attempt = attempt,
                    backoff_ms = backoff_ms,
                    error = %e,
                    "provider call failed, retrying"
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
            Err(e) => {
                tracing::error!(attempt = attempt, error = %e, "provider call failed, falling back");
                return FALLBACK_REPLY.to_owned();
            }
        }
    }
}
