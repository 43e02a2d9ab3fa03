//! AppState construction extracted from `main.rs`.
//!
//! Validates the configuration, loads the corpus, embeds it into the
//! passage index, and wires every subsystem into a fully-built
//! [`AppState`].

use std::sync::Arc;

use anyhow::Context;

use vg_corpus::{load_corpus, Embedder, PassageIndex};
use vg_domain::config::{Config, ConfigSeverity};
use vg_domain::error::Result;
use vg_providers::{EmbeddingsRequest, LlmProvider, OpenAiCompatProvider};
use vg_sessions::{SessionLockMap, SessionStore, TranscriptWriter};
use vg_transcribe::TranscribeClient;

use crate::state::AppState;

/// Adapts the LLM provider's embeddings endpoint to the index's
/// [`Embedder`] seam.
pub struct ProviderEmbedder {
    provider: Arc<dyn LlmProvider>,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl Embedder for ProviderEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let resp = self
            .provider
            .embeddings(EmbeddingsRequest {
                input: texts.to_vec(),
            })
            .await?;
        Ok(resp.embeddings)
    }
}

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── LLM provider ─────────────────────────────────────────────────
    let llm: Arc<dyn LlmProvider> = Arc::new(
        OpenAiCompatProvider::from_config(&config.llm).context("initializing LLM provider")?,
    );
    tracing::info!(
        model = %config.llm.model,
        base_url = %config.llm.base_url,
        "LLM provider ready"
    );

    // ── Corpus & passage index ───────────────────────────────────────
    let passages = load_corpus(&config.corpus.path)
        .with_context(|| format!("loading corpus from {}", config.corpus.path.display()))?;
    tracing::info!(
        path = %config.corpus.path.display(),
        passages = passages.len(),
        "corpus loaded"
    );

    let embedder = Arc::new(ProviderEmbedder::new(llm.clone()));
    let index = Arc::new(
        PassageIndex::build(passages, embedder)
            .await
            .context("embedding corpus into passage index")?,
    );
    tracing::info!(passages = index.len(), "passage index built");

    // ── Sessions & transcripts ───────────────────────────────────────
    let sessions = Arc::new(SessionStore::new());
    let transcripts = Arc::new(
        TranscriptWriter::new(&config.sessions.state_path)
            .context("initializing transcript writer")?,
    );
    let session_locks = Arc::new(SessionLockMap::new());

    // ── Transcription client ─────────────────────────────────────────
    let transcriber = Arc::new(
        TranscribeClient::from_config(&config.transcription)
            .context("initializing transcription client")?,
    );

    Ok(AppState {
        config,
        llm,
        index,
        sessions,
        transcripts,
        session_locks,
        transcriber,
    })
}

/// Spawn periodic maintenance tasks.
///
/// A single sweep evicts sessions idle past `sessions.idle_timeout_sec`
/// and drops lock entries no request is holding, so anonymous one-shot
/// keys do not accumulate in either map.
pub fn spawn_background_tasks(state: &AppState) {
    let interval_sec = state.config.sessions.prune_interval_sec.max(1);
    let idle = chrono::Duration::seconds(state.config.sessions.idle_timeout_sec as i64);

    {
        let sessions = state.sessions.clone();
        let session_locks = state.session_locks.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(interval_sec));
            loop {
                interval.tick().await;
                let evicted = sessions.prune_idle(idle);
                let pruned = session_locks.prune_idle();
                if evicted > 0 || pruned > 0 {
                    tracing::debug!(
                        sessions_evicted = evicted,
                        locks_pruned = pruned,
                        "session sweep complete"
                    );
                }
            }
        });
    }

    tracing::info!(
        interval_sec,
        idle_timeout_sec = state.config.sessions.idle_timeout_sec,
        "background session sweep started"
    );
}
