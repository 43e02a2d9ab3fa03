//! Passage index: brute-force cosine-similarity retrieval.
//!
//! Built once at startup from the corpus store, read-only afterwards.
//! O(n) per query is fine at this corpus size (The Hidden Words is a few
//! hundred passages); swapping in an ANN structure later would not change
//! the contract.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use vg_domain::error::Result;

use crate::loader::Passage;

/// Upper bound on cached query embeddings before the cache is cleared.
const QUERY_CACHE_CAP: usize = 256;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Embedder seam
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Turns text into embedding vectors.
///
/// Production wires this to the LLM provider's embeddings endpoint; tests
/// substitute deterministic stubs.
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Embed each input text, returning one vector per input in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Index
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A retrieval hit: a passage together with its similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredPassage {
    pub passage: Arc<Passage>,
    /// Cosine similarity in [-1.0, 1.0].
    pub score: f64,
}

/// Read-only nearest-neighbor index over the corpus.
pub struct PassageIndex {
    passages: Vec<Arc<Passage>>,
    embedder: Arc<dyn Embedder>,
    /// Query-text → embedding cache, so repeated queries skip the provider.
    query_cache: RwLock<HashMap<String, Vec<f32>>>,
}

impl PassageIndex {
    /// Embed every passage and build the index.
    ///
    /// An empty corpus builds an empty index; `retrieve` then always
    /// returns an empty vec and callers degrade to context-free prompts.
    pub async fn build(corpus: Vec<Passage>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let passages = if corpus.is_empty() {
            Vec::new()
        } else {
            let texts: Vec<String> = corpus.iter().map(|p| p.text.clone()).collect();
            let embeddings = embedder.embed(&texts).await?;

            corpus
                .into_iter()
                .zip(embeddings)
                .map(|(mut passage, embedding)| {
                    passage.embedding = Some(embedding);
                    Arc::new(passage)
                })
                .collect()
        };

        tracing::info!(passages = passages.len(), "passage index built");

        Ok(Self {
            passages,
            embedder,
            query_cache: RwLock::new(HashMap::new()),
        })
    }

    /// Number of indexed passages.
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// Return up to `k` passages most similar to `query`, best first.
    ///
    /// Ordering is by descending cosine similarity; equal scores keep
    /// corpus order (the sort is stable and candidates are scored in
    /// corpus order).
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredPassage>> {
        if self.passages.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.query_embedding(query).await?;

        let mut scored: Vec<ScoredPassage> = self
            .passages
            .iter()
            .map(|passage| {
                let embedding = passage.embedding.as_deref().unwrap_or(&[]);
                ScoredPassage {
                    passage: passage.clone(),
                    score: cosine_similarity(&query_embedding, embedding),
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }

    /// Look up or compute the embedding for a query string.
    async fn query_embedding(&self, query: &str) -> Result<Vec<f32>> {
        if let Some(cached) = self.query_cache.read().get(query) {
            return Ok(cached.clone());
        }

        let mut embeddings = self.embedder.embed(&[query.to_string()]).await?;
        let embedding = embeddings.pop().unwrap_or_default();

        let mut cache = self.query_cache.write();
        if cache.len() >= QUERY_CACHE_CAP {
            cache.clear();
        }
        cache.insert(query.to_string(), embedding.clone());

        Ok(embedding)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude inputs.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic embedder: maps known keywords onto fixed axes so
    /// similarity ordering is fully controlled by the test.
    struct KeywordEmbedder {
        calls: AtomicUsize,
    }

    impl KeywordEmbedder {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let lower = t.to_lowercase();
                    vec![
                        if lower.contains("love") { 1.0 } else { 0.0 },
                        if lower.contains("patience") { 1.0 } else { 0.0 },
                        if lower.contains("justice") { 1.0 } else { 0.0 },
                    ]
                })
                .collect())
        }
    }

    fn passage(id: usize, text: &str) -> Passage {
        Passage {
            id,
            text: text.to_string(),
            embedding: None,
        }
    }

    async fn love_index() -> PassageIndex {
        let corpus = vec![
            passage(0, "O Son of Man! The sign of love is patience in My trials."),
            passage(1, "O Son of Being! Love Me, that I may love thee."),
            passage(2, "O Son of Spirit! The best beloved of all things in My sight is Justice."),
        ];
        PassageIndex::build(corpus, Arc::new(KeywordEmbedder::new()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn love_query_ranks_love_passage_first() {
        let index = love_index().await;
        let hits = index.retrieve("tell me about love", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].passage.id, 1);
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn returns_at_most_k() {
        let index = love_index().await;
        let hits = index.retrieve("love and patience and justice", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        let all = index.retrieve("love and patience and justice", 10).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn scores_are_non_increasing() {
        let index = love_index().await;
        let hits = index.retrieve("love patience justice", 3).await.unwrap();
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn ties_break_by_corpus_order() {
        let corpus = vec![
            passage(0, "first passage about patience"),
            passage(1, "second passage about patience"),
            passage(2, "third passage about patience"),
        ];
        let index = PassageIndex::build(corpus, Arc::new(KeywordEmbedder::new()))
            .await
            .unwrap();
        let hits = index.retrieve("patience", 3).await.unwrap();
        let ids: Vec<usize> = hits.iter().map(|h| h.passage.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn empty_corpus_returns_empty() {
        let index = PassageIndex::build(Vec::new(), Arc::new(KeywordEmbedder::new()))
            .await
            .unwrap();
        assert!(index.is_empty());
        let hits = index.retrieve("anything", 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn query_embedding_is_cached() {
        let embedder = Arc::new(KeywordEmbedder::new());
        let corpus = vec![passage(0, "about love")];
        let index = PassageIndex::build(corpus, embedder.clone()).await.unwrap();
        // One call for the corpus build.
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);

        index.retrieve("love", 1).await.unwrap();
        index.retrieve("love", 1).await.unwrap();
        index.retrieve("love", 1).await.unwrap();
        // Only one more call for the first query; the rest hit the cache.
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
