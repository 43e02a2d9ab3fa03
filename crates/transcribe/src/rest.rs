//! REST client for Whisper-compatible transcription endpoints.

use std::time::Duration;

use serde::Deserialize;

use vg_domain::config::TranscriptionConfig;
use vg_domain::error::{Error, Result};

/// Result of a transcription call.
#[derive(Debug, Clone, Deserialize)]
pub struct Transcription {
    pub text: String,
}

/// Client for an OpenAI-compatible `/audio/transcriptions` endpoint.
#[derive(Debug)]
pub struct TranscribeClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_retries: u32,
    client: reqwest::Client,
}

impl TranscribeClient {
    pub fn from_config(cfg: &TranscriptionConfig) -> Result<Self> {
        let api_key = match &cfg.api_key_env {
            Some(var) => match std::env::var(var) {
                Ok(v) if !v.is_empty() => Some(v),
                _ => {
                    return Err(Error::Config(format!(
                        "transcription.api_key_env names `{var}` but it is not set"
                    )))
                }
            },
            None => None,
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(format!("building transcription client: {e}")))?;

        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            api_key,
            model: cfg.model.clone(),
            max_retries: cfg.max_retries,
            client,
        })
    }

    /// Transcribe an audio payload, retrying transient failures.
    ///
    /// Server errors and timeouts are retried with exponential backoff;
    /// client errors (bad audio, unsupported format) are not.
    pub async fn transcribe(&self, filename: &str, audio: Vec<u8>) -> Result<Transcription> {
        if audio.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.transcribe_once(filename, audio.clone()).await {
                Ok(t) => return Ok(t),
                Err(e) if e.is_transient() && attempt <= self.max_retries => {
                    let backoff_ms = 100u64 * 2u64.pow(attempt - 1);
                    tracing::warn!(
                        attempt = attempt,
                        backoff_ms = backoff_ms,
                        error = %e,
                        "transcription failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn transcribe_once(&self, filename: &str, audio: Vec<u8>) -> Result<Transcription> {
        let url = format!("{}/audio/transcriptions", self.base_url);
        let part = reqwest::multipart::Part::bytes(audio)
            .file_name(filename.to_owned())
            .mime_str("application/octet-stream")
            .map_err(|e| Error::Transcription(format!("building upload part: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", part);

        let mut req = self.client.post(&url).multipart(form);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(format!("transcription request to {url}"))
            } else {
                Error::Http(format!("transcription request to {url}: {e}"))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = format!("transcription endpoint returned {status}: {body}");
            // 5xx is worth a retry, 4xx means the payload is bad.
            if status.is_server_error() {
                return Err(Error::Http(message));
            }
            return Err(Error::Transcription(message));
        }

        let transcription: Transcription = resp
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("decoding transcription response: {e}")))?;
        Ok(transcription)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TranscriptionConfig {
        TranscriptionConfig {
            api_key_env: None,
            ..TranscriptionConfig::default()
        }
    }

    #[tokio::test]
    async fn empty_payload_is_rejected_without_a_request() {
        let client = TranscribeClient::from_config(&test_config()).unwrap();
        let err = client.transcribe("empty.wav", Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::EmptyInput));
    }

    #[test]
    fn missing_api_key_env_is_a_config_error() {
        let cfg = TranscriptionConfig {
            api_key_env: Some("VG_TEST_TRANSCRIBE_KEY_UNSET".to_owned()),
            ..TranscriptionConfig::default()
        };
        let err = TranscribeClient::from_config(&cfg).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let cfg = TranscriptionConfig {
            base_url: "http://localhost:9000/v1/".to_owned(),
            api_key_env: None,
            ..TranscriptionConfig::default()
        };
        let client = TranscribeClient::from_config(&cfg).unwrap();
        assert_eq!(client.base_url, "http://localhost:9000/v1");
    }
}
