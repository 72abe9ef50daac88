//! Anthropic Messages API client.
//!
//! API key: `ANTHROPIC_API_KEY` (see [`MirrorConfig`](crate::MirrorConfig)). Default model:
//! `claude-3-5-sonnet-20241022`.

use super::{preview, LlmClient};
use crate::config::MirrorConfig;
use crate::error::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1000;

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

pub struct AnthropicClient {
    api_key: String,
    model: String,
    api_url: String,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Build a client with an explicit key and request timeout.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let defaults = MirrorConfig::default();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key: api_key.into().trim().to_string(),
            model: defaults.llm_model,
            api_url: defaults.llm_api_url,
            client,
        })
    }

    /// `None` when no credential is configured or the HTTP client cannot be built;
    /// callers then run in fallback mode.
    pub fn from_config(cfg: &MirrorConfig) -> Option<Self> {
        let key = cfg.anthropic_api_key.as_deref()?;
        match Self::new(key, Duration::from_secs(cfg.llm_timeout_secs)) {
            Ok(client) => Some(client.with_model(&cfg.llm_model).with_api_url(&cfg.llm_api_url)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to build LLM HTTP client");
                None
            }
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::MissingCredential);
        }
        tracing::debug!(model = %self.model, prompt = %preview(prompt, 200), "sending prompt to Anthropic");

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let res = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        tracing::debug!(status = status.as_u16(), "Anthropic response status");
        let text = res.text().await?;

        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::Decode(e.to_string()))?;
        let reply = parsed
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or(LlmError::EmptyReply)?;

        tracing::debug!(reply = %preview(&reply, 300), "Anthropic reply received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_client_without_credential() {
        assert!(AnthropicClient::from_config(&MirrorConfig::default()).is_none());
    }

    #[test]
    fn client_picks_up_model_from_config() {
        let cfg = MirrorConfig {
            anthropic_api_key: Some("sk-test".into()),
            llm_model: "claude-test".into(),
            ..MirrorConfig::default()
        };
        let client = AnthropicClient::from_config(&cfg).unwrap();
        assert_eq!(client.model(), "claude-test");
    }

    #[tokio::test]
    async fn blank_key_is_missing_credential() {
        let client = AnthropicClient::new("   ", Duration::from_secs(1)).unwrap();
        let err = client.complete("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingCredential));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_request_error() {
        let client = AnthropicClient::new("sk-test", Duration::from_millis(500))
            .unwrap()
            .with_api_url("http://127.0.0.1:9/v1/messages");
        let err = client.complete("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::Request(_)));
    }

    #[tokio::test]
    async fn silent_endpoint_hits_the_request_timeout() {
        // Accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            loop {
                if let Ok((sock, _)) = listener.accept().await {
                    held.push(sock);
                }
            }
        });

        let client = AnthropicClient::new("sk-test", Duration::from_millis(200))
            .unwrap()
            .with_api_url(&format!("http://{addr}/v1/messages"));
        let started = std::time::Instant::now();
        let err = client.complete("hi").await.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(5));
        match err {
            LlmError::Request(e) => assert!(e.is_timeout(), "expected timeout, got {e}"),
            other => panic!("expected request timeout, got {other:?}"),
        }
        server.abort();
    }

    #[test]
    fn request_body_shape() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: MAX_TOKENS,
            messages: vec![Message { role: "user", content: "p" }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "p");
    }
}
