/// Shared error type used across all VerseGate crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("provider {provider}: {message}")]
    Provider { provider: String, message: String },

    #[error("rate limited by provider")]
    RateLimited {
        /// Provider-suggested wait before the next attempt, when the
        /// `Retry-After` header was present and parseable.
        retry_after_ms: Option<u64>,
    },

    #[error("transcription: {0}")]
    Transcription(String),

    #[error("empty input: nothing to process")]
    EmptyInput,

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is worth retrying with backoff.
    ///
    /// Rate limiting and transport-level failures are transient; structured
    /// provider errors (bad request, auth) are permanent.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::RateLimited { .. } | Error::Timeout(_) | Error::Http(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_transient() {
        assert!(Error::RateLimited { retry_after_ms: None }.is_transient());
        assert!(Error::Timeout("read".into()).is_transient());
    }

    #[test]
    fn provider_error_is_permanent() {
        let err = Error::Provider {
            provider: "openai".into(),
            message: "HTTP 401 - invalid key".into(),
        };
        assert!(!err.is_transient());
        assert!(!Error::EmptyInput.is_transient());
    }
}
