use std::sync::Arc;

use vg_corpus::PassageIndex;
use vg_domain::config::Config;
use vg_providers::LlmProvider;
use vg_sessions::{SessionLockMap, SessionStore, TranscriptWriter};
use vg_transcribe::TranscribeClient;

/// Shared application state passed to all API handlers.
///
/// Fields are grouped by concern:
/// - **Core services** — config, LLM provider, passage index
/// - **Session management** — sessions, transcripts, per-session locks
/// - **Audio** — transcription client
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub llm: Arc<dyn LlmProvider>,
    pub index: Arc<PassageIndex>,

    // ── Session management ────────────────────────────────────────────
    pub sessions: Arc<SessionStore>,
    pub transcripts: Arc<TranscriptWriter>,
    pub session_locks: Arc<SessionLockMap>,

    // ── Audio ─────────────────────────────────────────────────────────
    pub transcriber: Arc<TranscribeClient>,
}
