use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Corpus
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where the devotional source text lives.
///
/// The file is loaded exactly once at startup; passages are blank-line
/// delimited blocks reproduced verbatim (no summarization, no reflow).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "d_corpus_path")]
    pub path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: d_corpus_path(),
        }
    }
}

fn d_corpus_path() -> PathBuf {
    PathBuf::from("hidden_words.txt")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path() {
        let cfg = CorpusConfig::default();
        assert_eq!(cfg.path, PathBuf::from("hidden_words.txt"));
    }
}
