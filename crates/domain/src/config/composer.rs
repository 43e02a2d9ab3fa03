use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Answer composer
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Tuning for prompt assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// How many trailing conversation turns accompany each request.
    /// Bounds the prompt size regardless of session length.
    #[serde(default = "d_10")]
    pub history_window: usize,
    /// How many passages to retrieve per user message.
    #[serde(default = "d_3usize")]
    pub top_k: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            history_window: 10,
            top_k: 3,
        }
    }
}

fn d_10() -> usize {
    10
}
fn d_3usize() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ComposerConfig::default();
        assert_eq!(cfg.history_window, 10);
        assert_eq!(cfg.top_k, 3);
    }
}
