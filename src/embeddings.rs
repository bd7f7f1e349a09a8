use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;

/// Vector embedding provider: one vector per input text, same order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
    fn dimensions(&self) -> usize;
}

// OpenAI API implementation
pub struct OpenAIEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    dims: usize,
    attempts: u32,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct OpenAIResponseData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    data: Vec<OpenAIResponseData>,
}

impl OpenAIEmbedder {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        dims: Option<usize>,
        attempts: u32,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .context("Failed to build reqwest client with timeout")?;

        let dims = dims.unwrap_or(match model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        });

        Ok(Self {
            client,
            api_key,
            model,
            base_url,
            dims,
            attempts: attempts.max(1),
        })
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!(
            "Generating OpenAI embeddings (model={}, inputs={})",
            self.model,
            texts.len()
        );
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = OpenAIRequest {
            model: &self.model,
            input: texts,
        };
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));

        let mut last_err: Option<anyhow::Error> = None;
        for i in 0..self.attempts {
            if i > 0 {
                let delay_ms = 200u64 * (1u64 << (i - 1));
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let response = match self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .context("Failed to send request to OpenAI API")
            {
                Ok(resp) => resp,
                Err(e) => {
                    last_err = Some(e);
                    continue;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                last_err = Some(anyhow::anyhow!(
                    "OpenAI API error {}: {}",
                    status,
                    error_text
                ));
                continue;
            }

            match response
                .json::<OpenAIResponse>()
                .await
                .context("Failed to parse OpenAI response")
            {
                Ok(mut result) => {
                    if result.data.len() != texts.len() {
                        anyhow::bail!(
                            "OpenAI returned {} embeddings for {} inputs",
                            result.data.len(),
                            texts.len()
                        );
                    }
                    result.data.sort_by_key(|d| d.index);
                    return Ok(result.data.into_iter().map(|d| d.embedding).collect());
                }
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Unknown OpenAI embedding error")))
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

// Deterministic, local FakeEmbedder for testing/dev (no network)
pub struct FakeEmbedder {
    dims: usize,
}

impl FakeEmbedder {
    pub fn new(dims: Option<usize>) -> Self {
        let d = dims.unwrap_or(384).max(1);
        Self { dims: d }
    }

    // Stable pseudo-random values in [-1.0, 1.0) from the blake3 XOF stream
    fn generate(&self, text: &str) -> Vec<f32> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(text.as_bytes());
        let mut reader = hasher.finalize_xof();

        let mut out = Vec::with_capacity(self.dims);
        let mut bytes = [0u8; 4];
        while out.len() < self.dims {
            reader.fill(&mut bytes);
            let v01 = (u32::from_le_bytes(bytes) as f32) / (u32::MAX as f32 + 1.0);
            out.push(v01 * 2.0 - 1.0);
        }

        // Normalize to unit length to emulate real embeddings
        let norm: f32 = out.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut out {
                *v /= norm;
            }
        }
        out
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.generate(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Stand-in used when no embedding gateway is reachable. Every call fails, so
/// callers fall back to their degraded path instead of scoring noise.
pub struct UnavailableEmbedder {
    reason: String,
    dims: usize,
}

impl UnavailableEmbedder {
    pub fn new(reason: impl Into<String>, dims: usize) -> Self {
        Self {
            reason: reason.into(),
            dims,
        }
    }
}

#[async_trait]
impl Embedder for UnavailableEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        anyhow::bail!("embedding gateway unavailable: {}", self.reason)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

/// Build the configured embedder.
///
/// `fake` is a development provider: its vectors carry no meaning, so
/// specificity computed with it is not a real score.
pub fn create_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    let embedding = config.embedding();
    let key = config.runtime.openai_api_key.clone();

    let reason = match embedding.provider.as_str() {
        "openai" => {
            if let Some(key) = key {
                info!("Using OpenAI embeddings (model={})", embedding.model);
                return Ok(Arc::new(OpenAIEmbedder::new(
                    key,
                    embedding.model,
                    config.system.openai_base_url.clone(),
                    Some(embedding.dimensions),
                    embedding.retries,
                )?));
            }
            "OPENAI_API_KEY is not set".to_string()
        }
        "fake" => {
            warn!(
                "Using FakeEmbedder ({} dims); specificity scores are not meaningful",
                embedding.dimensions
            );
            return Ok(Arc::new(FakeEmbedder::new(Some(embedding.dimensions))));
        }
        other => format!("unknown embedding provider '{}'", other),
    };

    if config.runtime.embed_strict {
        anyhow::bail!("Embeddings required but {}", reason);
    }
    warn!(
        "No embedding gateway ({}); specificity will use the fallback value",
        reason
    );
    Ok(Arc::new(UnavailableEmbedder::new(reason, embedding.dimensions)))
}
