//! OpenAI-compatible adapter.
//!
//! Works with OpenRouter, OpenAI, Ollama, vLLM, LM Studio, and any other
//! endpoint that follows the OpenAI chat completions contract.

use crate::traits::{
    ChatRequest, ChatResponse, EmbeddingsRequest, EmbeddingsResponse, LlmProvider, PromptMessage,
    Usage,
};
use crate::util::{from_reqwest, parse_retry_after, resolve_api_key};
use serde_json::Value;
use vg_domain::config::LlmConfig;
use vg_domain::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An LLM provider adapter for any OpenAI-compatible API endpoint.
pub struct OpenAiCompatProvider {
    id: String,
    base_url: String,
    api_key: String,
    model: String,
    embedding_model: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new provider from the application's [`LlmConfig`].
    ///
    /// Resolves the API key from `cfg.api_key_env` eagerly — a missing key
    /// fails here, at startup, with `Error::Config`.
    pub fn from_config(cfg: &LlmConfig) -> Result<Self> {
        let api_key = resolve_api_key(&cfg.api_key_env)?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            id: "openai_compat".into(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: cfg.model.clone(),
            embedding_model: cfg.embedding_model.clone(),
            client,
        })
    }

    fn authed_post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    fn build_chat_body(&self, req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req.messages.iter().map(msg_to_openai).collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(temp) = req.temperature {
            body["temperature"] = serde_json::json!(temp);
        }
        body
    }

    /// Map an unsuccessful HTTP response to a domain error.
    ///
    /// 429 becomes [`Error::RateLimited`] so callers can retry with backoff;
    /// everything else is a permanent [`Error::Provider`].
    fn status_error(
        &self,
        status: reqwest::StatusCode,
        headers: &reqwest::header::HeaderMap,
        body: &str,
    ) -> Error {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Error::RateLimited {
                retry_after_ms: parse_retry_after(headers),
            }
        } else {
            Error::Provider {
                provider: self.id.clone(),
                message: format!("HTTP {} - {}", status.as_u16(), body),
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Serialization helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn msg_to_openai(msg: &PromptMessage) -> Value {
    serde_json::json!({
        "role": msg.role.as_str(),
        "content": msg.content,
    })
}

fn parse_chat_response(body: &Value) -> Result<ChatResponse> {
    let choice = body
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|a| a.first())
        .ok_or_else(|| Error::Provider {
            provider: "openai_compat".into(),
            message: "no choices in response".into(),
        })?;

    let message = choice.get("message").ok_or_else(|| Error::Provider {
        provider: "openai_compat".into(),
        message: "no message in choice".into(),
    })?;

    let content = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let finish_reason = choice
        .get("finish_reason")
        .and_then(|v| v.as_str())
        .map(String::from);

    let model = body
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    let usage = body.get("usage").and_then(parse_openai_usage);

    Ok(ChatResponse {
        content,
        model,
        finish_reason,
        usage,
    })
}

fn parse_openai_usage(v: &Value) -> Option<Usage> {
    Some(Usage {
        prompt_tokens: v.get("prompt_tokens")?.as_u64()? as u32,
        completion_tokens: v.get("completion_tokens")?.as_u64()? as u32,
        total_tokens: v.get("total_tokens")?.as_u64()? as u32,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatProvider {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_chat_body(&req);

        tracing::debug!(provider = %self.id, url = %url, messages = req.messages.len(), "chat request");

        let resp = self
            .authed_post(&url)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(self.status_error(status, &headers, &resp_text));
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        parse_chat_response(&resp_json)
    }

    async fn embeddings(&self, req: EmbeddingsRequest) -> Result<EmbeddingsResponse> {
        let url = format!("{}/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": self.embedding_model,
            "input": req.input,
        });

        tracing::debug!(provider = %self.id, inputs = req.input.len(), "embeddings request");

        let resp = self
            .authed_post(&url)
            .json(&body)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(self.status_error(status, &headers, &resp_text));
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        let data = resp_json
            .get("data")
            .and_then(|d| d.as_array())
            .ok_or_else(|| Error::Provider {
                provider: self.id.clone(),
                message: "missing 'data' array in embeddings response".into(),
            })?;

        let embeddings: Vec<Vec<f32>> = data
            .iter()
            .filter_map(|item| {
                let embedding = item.get("embedding")?.as_array()?;
                Some(
                    embedding
                        .iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect(),
                )
            })
            .collect();

        if embeddings.len() != req.input.len() {
            return Err(Error::Provider {
                provider: self.id.clone(),
                message: format!(
                    "expected {} embeddings, got {}",
                    req.input.len(),
                    embeddings.len()
                ),
            });
        }

        Ok(EmbeddingsResponse { embeddings })
    }

    fn provider_id(&self) -> &str {
        &self.id
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use vg_domain::types::Role;

    #[test]
    fn chat_body_includes_model_and_roles() {
        let provider = test_provider();
        let req = ChatRequest {
            messages: vec![
                PromptMessage::new(Role::System, "be kind"),
                PromptMessage::new(Role::User, "hello"),
            ],
            temperature: Some(0.7),
        };
        let body = provider.build_chat_body(&req);
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn chat_body_omits_temperature_when_unset() {
        let provider = test_provider();
        let body = provider.build_chat_body(&ChatRequest::default());
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn parse_chat_response_happy_path() {
        let body: Value = serde_json::json!({
            "model": "test-model",
            "choices": [{
                "message": { "role": "assistant", "content": "peace be with you" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
        });
        let resp = parse_chat_response(&body).unwrap();
        assert_eq!(resp.content, "peace be with you");
        assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
        assert_eq!(resp.usage.unwrap().total_tokens, 17);
    }

    #[test]
    fn parse_chat_response_no_choices_errors() {
        let body: Value = serde_json::json!({ "choices": [] });
        let err = parse_chat_response(&body).unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
    }

    #[test]
    fn status_429_maps_to_rate_limited() {
        let provider = test_provider();
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::RETRY_AFTER,
            reqwest::header::HeaderValue::from_static("1"),
        );
        let err = provider.status_error(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            &headers,
            "slow down",
        );
        assert!(matches!(
            err,
            Error::RateLimited {
                retry_after_ms: Some(1000)
            }
        ));
    }

    #[test]
    fn status_500_maps_to_provider_error() {
        let provider = test_provider();
        let err = provider.status_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            &reqwest::header::HeaderMap::new(),
            "boom",
        );
        assert!(matches!(err, Error::Provider { .. }));
    }

    fn test_provider() -> OpenAiCompatProvider {
        OpenAiCompatProvider {
            id: "openai_compat".into(),
            base_url: "http://localhost:1".into(),
            api_key: "test".into(),
            model: "test-model".into(),
            embedding_model: "test-embed".into(),
            client: reqwest::Client::new(),
        }
    }
}
