//! OpenAI-compatible chat completion client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::traits::{CompletionRequest, SamplingParams, TextGenerator};
use crate::config::Config;
use crate::error::{ReframeError, Result};

pub struct OpenAiChatClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(flatten)]
    sampling: &'a SamplingParams,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl OpenAiChatClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReframeError::Internal {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url,
        })
    }

    /// Build from config; the API key is mandatory for generation.
    pub fn from_config(config: &Config) -> Result<Self> {
        let key = config
            .runtime
            .openai_api_key
            .clone()
            .ok_or_else(|| ReframeError::Config {
                message: "OPENAI_API_KEY is not set".into(),
            })?;
        Self::new(
            key,
            config.system.chat_model.clone(),
            config.system.openai_base_url.clone(),
            Duration::from_secs(config.system.request_timeout_secs),
        )
    }
}

#[async_trait]
impl TextGenerator for OpenAiChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        debug!(
            "Chat completion (model={}, prompt_chars={}, max_tokens={})",
            self.model,
            request.user_prompt.len(),
            request.sampling.max_tokens
        );

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.user_prompt,
        });

        let body = ChatRequest {
            model: &self.model,
            messages,
            sampling: &request.sampling,
        };
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReframeError::Generation {
                message: format!("HTTP request failed: {}", e),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(ReframeError::Generation {
                message: format!("chat completion returned {}: {}", status, body_text),
            });
        }

        let parsed: ChatResponse = resp.json().await.map_err(|e| ReframeError::Generation {
            message: format!("Failed to parse chat completion: {}", e),
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(ReframeError::Generation {
                message: "chat completion returned no content".into(),
            });
        }
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_omits_unset_sampling() {
        let sampling = SamplingParams {
            max_tokens: 50,
            top_p: Some(0.6),
            ..Default::default()
        };
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            sampling: &sampling,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["max_tokens"], 50);
        assert!((value["top_p"].as_f64().unwrap() - 0.6).abs() < 1e-6);
        assert!(value.get("temperature").is_none());
        assert!(value.get("presence_penalty").is_none());
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let config = Config::default();
        let err = OpenAiChatClient::from_config(&config).err().unwrap();
        assert!(matches!(err, ReframeError::Config { .. }));
    }
}
