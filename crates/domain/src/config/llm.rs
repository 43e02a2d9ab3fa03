use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuration for the hosted language-model provider.
///
/// One provider, resolved once at startup.  The API key itself never lives
/// in the config file — only the name of the environment variable that
/// holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat completions API.
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Chat model identifier (e.g. `"openrouter/horizon-beta"`).
    #[serde(default = "d_model")]
    pub model: String,
    /// Embedding model used to index the corpus and queries.
    #[serde(default = "d_embedding_model")]
    pub embedding_model: String,
    /// Environment variable holding the provider API key.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_30000u")]
    pub timeout_ms: u64,
    /// Maximum retries after a rate-limited or transient failure.
    #[serde(default = "d_3")]
    pub max_retries: u32,
    /// Sampling temperature. `None` lets the provider choose.
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            model: d_model(),
            embedding_model: d_embedding_model(),
            api_key_env: d_api_key_env(),
            timeout_ms: d_30000u(),
            max_retries: d_3(),
            temperature: None,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn d_model() -> String {
    "openrouter/horizon-beta".into()
}
fn d_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn d_api_key_env() -> String {
    "VG_API_KEY".into()
}
fn d_30000u() -> u64 {
    30_000
}
fn d_3() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_openrouter() {
        let cfg = LlmConfig::default();
        assert_eq!(cfg.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(cfg.api_key_env, "VG_API_KEY");
        assert_eq!(cfg.max_retries, 3);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: LlmConfig = toml::from_str(r#"model = "gpt-4o-mini""#).unwrap();
        assert_eq!(cfg.model, "gpt-4o-mini");
        assert_eq!(cfg.embedding_model, "text-embedding-3-small");
    }
}
