mod composer;
mod corpus;
mod llm;
mod observability;
mod server;
mod sessions;
mod transcription;

pub use composer::*;
pub use corpus::*;
pub use llm::*;
pub use observability::*;
pub use server::*;
pub use sessions::*;
pub use transcription::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub composer: ComposerConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Missing provider credentials and an unreadable corpus file are
    /// startup-fatal errors; the gateway never defers them to request time.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut issues = Vec::new();

        if self.llm.model.trim().is_empty() {
            issues.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "llm.model".into(),
                message: "model identifier must not be empty".into(),
            });
        }
        if std::env::var(&self.llm.api_key_env).is_err() {
            issues.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "llm.api_key_env".into(),
                message: format!(
                    "environment variable '{}' is not set — the provider API key \
                     is required at startup",
                    self.llm.api_key_env
                ),
            });
        }
        if !self.corpus.path.exists() {
            issues.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "corpus.path".into(),
                message: format!(
                    "corpus file '{}' does not exist",
                    self.corpus.path.display()
                ),
            });
        }
        if self.composer.history_window == 0 {
            issues.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "composer.history_window".into(),
                message: "history window of 0 disables conversational context".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.observability.sample_rate) {
            issues.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "observability.sample_rate".into(),
                message: "sample_rate outside [0.0, 1.0] — clamping applies".into(),
            });
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_model_is_an_error() {
        let mut config = Config::default();
        config.llm.model = "  ".into();
        let issues = config.validate();
        assert!(issues
            .iter()
            .any(|i| i.field == "llm.model" && i.severity == ConfigSeverity::Error));
    }

    #[test]
    fn missing_api_key_env_is_an_error() {
        let mut config = Config::default();
        config.llm.api_key_env = "VG_TEST_UNSET_KEY_VAR_4242".into();
        let issues = config.validate();
        assert!(issues
            .iter()
            .any(|i| i.field == "llm.api_key_env" && i.severity == ConfigSeverity::Error));
    }

    #[test]
    fn zero_history_window_is_only_a_warning() {
        let mut config = Config::default();
        config.composer.history_window = 0;
        let issues = config.validate();
        let issue = issues
            .iter()
            .find(|i| i.field == "composer.history_window")
            .unwrap();
        assert_eq!(issue.severity, ConfigSeverity::Warning);
    }
}
