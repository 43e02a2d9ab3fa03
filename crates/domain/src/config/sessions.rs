use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Directory for session transcripts (`<state_path>/transcripts/*.jsonl`).
    #[serde(default = "d_state_path")]
    pub state_path: PathBuf,
    /// Sessions untouched for this long are evicted from memory.  The
    /// JSONL transcript survives eviction.
    #[serde(default = "d_3600")]
    pub idle_timeout_sec: u64,
    /// How often the background sweep runs.
    #[serde(default = "d_60")]
    pub prune_interval_sec: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            state_path: d_state_path(),
            idle_timeout_sec: d_3600(),
            prune_interval_sec: d_60(),
        }
    }
}

fn d_state_path() -> PathBuf {
    PathBuf::from("./data")
}
fn d_3600() -> u64 {
    3_600
}
fn d_60() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_path() {
        let cfg = SessionsConfig::default();
        assert_eq!(cfg.state_path, PathBuf::from("./data"));
        assert_eq!(cfg.idle_timeout_sec, 3_600);
        assert_eq!(cfg.prune_interval_sec, 60);
    }
}
