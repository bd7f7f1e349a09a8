use serde::{Deserialize, Serialize};

use crate::clients::SamplingParams;
use crate::metrics::MetricLexicon;

/// Main configuration structure loaded from reframe_mind.toml and environment variables
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub system: SystemConfig,
    pub retrieval: RetrievalConfig,
    pub sampling: SamplingConfig,
    pub metrics: MetricLexicon,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Model gateway and corpus location
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub chat_model: String,
    pub openai_base_url: String,
    pub embedding_provider: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub embed_retries: u32,
    pub request_timeout_secs: u64,
    pub dataset_path: String,
}

/// Embedding configuration snapshot for use across components
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    pub retries: u32,
}

/// Few-shot retrieval and fan-out sizing
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub candidates: usize,
}

/// Per-operation sampling parameters for the generation gateway
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub classify: SamplingParams,
    pub reframe: SamplingParams,
    pub control: SamplingParams,
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub openai_api_key: Option<String>,
    pub transport: String,
    pub http_bind: std::net::SocketAddr,
    pub request_timeout_ms: u64,
    pub embed_strict: bool,
    pub log_level: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            chat_model: "gpt-4o-mini".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            embedding_provider: "openai".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
            embed_retries: 1,
            request_timeout_secs: 30,
            dataset_path: "data/reframing_dataset.csv".to_string(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            candidates: 3,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            classify: SamplingParams {
                max_tokens: 50,
                top_p: Some(0.6),
                ..Default::default()
            },
            reframe: SamplingParams {
                max_tokens: 256,
                top_p: Some(0.6),
                frequency_penalty: Some(0.0),
                presence_penalty: Some(0.0),
                ..Default::default()
            },
            control: SamplingParams {
                max_tokens: 256,
                temperature: Some(0.7),
                ..Default::default()
            },
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            transport: "http".to_string(),
            http_bind: std::net::SocketAddr::from(([0, 0, 0, 0], 8000)),
            request_timeout_ms: 60_000,
            embed_strict: false,
            log_level: "reframe_mind=info,rmcp=info".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            system: SystemConfig::default(),
            retrieval: RetrievalConfig::default(),
            sampling: SamplingConfig::default(),
            metrics: MetricLexicon::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses REFRAME_MIND_CONFIG environment variable or defaults to "reframe_mind.toml"
    pub fn load() -> anyhow::Result<Self> {
        // .env resolution: REFRAME_ENV_FILE, then ./.env, then ../.env
        if let Ok(env_path) = std::env::var("REFRAME_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
            if std::env::var("OPENAI_API_KEY").is_err() {
                let _ = dotenvy::from_path("../.env");
            }
        }

        let config_path = std::env::var("REFRAME_MIND_CONFIG")
            .unwrap_or_else(|_| "reframe_mind.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            toml::from_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        // Env-first overrides
        if let Ok(path) = std::env::var("REFRAME_DATASET_PATH") {
            config.system.dataset_path = path;
        }
        if let Ok(model) = std::env::var("REFRAME_CHAT_MODEL") {
            config.system.chat_model = model;
        }
        if let Ok(provider) = std::env::var("REFRAME_EMBED_PROVIDER") {
            config.system.embedding_provider = provider;
        }
        if let Ok(model) = std::env::var("REFRAME_EMBED_MODEL") {
            config.system.embedding_model = model;
        }
        if let Ok(base) = std::env::var("OPENAI_BASE_URL") {
            config.system.openai_base_url = base;
        }

        config.runtime = RuntimeConfig::load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Check ranges and clamp values that have a safe bound
    pub fn validate(&mut self) -> anyhow::Result<()> {
        if self.retrieval.top_k == 0 {
            anyhow::bail!("retrieval.top_k must be at least 1");
        }
        if self.retrieval.candidates == 0 {
            anyhow::bail!("retrieval.candidates must be at least 1");
        }

        if self.system.embed_retries == 0 {
            self.system.embed_retries = 1;
        } else if self.system.embed_retries > 5 {
            tracing::warn!(
                "embed_retries {} exceeds max 5, clamping to 5",
                self.system.embed_retries
            );
            self.system.embed_retries = 5;
        }

        self.metrics.validate()?;

        match self.system.embedding_provider.as_str() {
            "openai" => match self.system.embedding_model.as_str() {
                "text-embedding-3-small" if self.system.embedding_dimensions != 1536 => {
                    tracing::warn!(
                        "OpenAI text-embedding-3-small should use 1536 dimensions, got {}",
                        self.system.embedding_dimensions
                    );
                }
                "text-embedding-3-large" if self.system.embedding_dimensions != 3072 => {
                    tracing::warn!(
                        "OpenAI text-embedding-3-large should use 3072 dimensions, got {}",
                        self.system.embedding_dimensions
                    );
                }
                _ => {}
            },
            "fake" => {}
            other => tracing::warn!("Unknown embedding provider '{}', validation skipped", other),
        }

        Ok(())
    }

    /// Convenience: snapshot embedding configuration
    pub fn embedding(&self) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: self.system.embedding_provider.clone(),
            model: self.system.embedding_model.clone(),
            dimensions: self.system.embedding_dimensions,
            retries: self.system.embed_retries,
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        let mut cfg = Self {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !is_placeholder(k)),
            transport: std::env::var("REFRAME_TRANSPORT").unwrap_or_else(|_| "http".to_string()),
            request_timeout_ms: std::env::var("REFRAME_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60_000),
            embed_strict: std::env::var("REFRAME_EMBED_STRICT")
                .ok()
                .is_some_and(|v| v == "true" || v == "1"),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "reframe_mind=info,rmcp=info".to_string()),
            ..Default::default()
        };

        if let Ok(v) = std::env::var("REFRAME_HTTP_BIND")
            && let Ok(bind) = v.parse::<std::net::SocketAddr>()
        {
            cfg.http_bind = bind;
        } else if let Some(port) = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
        {
            cfg.http_bind.set_port(port);
        }

        cfg
    }
}

/// Keys copied from templates are treated as unset
pub fn is_placeholder(value: &str) -> bool {
    let t = value.trim();
    t.is_empty()
        || t.contains("${")
        || t.eq_ignore_ascii_case("your-api-key-here")
        || t.eq_ignore_ascii_case("changeme")
}
