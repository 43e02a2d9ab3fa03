use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Transcription service
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuration for the external speech-to-text service.
///
/// Any Whisper-compatible `/audio/transcriptions` endpoint works.  The API
/// key env var is optional because self-hosted Whisper servers are commonly
/// unauthenticated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    #[serde(default = "d_stt_base_url")]
    pub base_url: String,
    #[serde(default = "d_stt_model")]
    pub model: String,
    /// Environment variable holding the STT API key, if the service needs one.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default = "d_60000u")]
    pub timeout_ms: u64,
    #[serde(default = "d_2")]
    pub max_retries: u32,
    /// Uploads larger than this are rejected before leaving the gateway.
    #[serde(default = "d_max_upload")]
    pub max_upload_bytes: usize,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: d_stt_base_url(),
            model: d_stt_model(),
            api_key_env: None,
            timeout_ms: d_60000u(),
            max_retries: d_2(),
            max_upload_bytes: d_max_upload(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_stt_base_url() -> String {
    "http://localhost:9000/v1".into()
}
fn d_stt_model() -> String {
    "whisper-1".into()
}
fn d_60000u() -> u64 {
    60_000
}
fn d_2() -> u32 {
    2
}
fn d_max_upload() -> usize {
    25 * 1024 * 1024
}
