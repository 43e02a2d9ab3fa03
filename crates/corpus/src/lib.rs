//! The fixed devotional corpus and its retrieval index.
//!
//! Passages are loaded once at startup from a plain-text file and never
//! change afterwards; the index embeds them through the configured provider
//! and answers nearest-neighbor queries by brute-force cosine similarity.

pub mod index;
pub mod loader;

pub use index::{Embedder, PassageIndex, ScoredPassage};
pub use loader::{load_corpus, Passage};
