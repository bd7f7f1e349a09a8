//! Server module containing the ReframeServer implementation
//!
//! `ReframeServer` wires the corpus, the model gateways and the pipeline
//! components together and exposes the four caller-facing operations. Both the
//! MCP tool surface and the HTTP API go through these methods, so input
//! validation happens here before any gateway call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::{ClassificationResult, DistortionClassifier};
use crate::clients::{OpenAiChatClient, TextGenerator};
use crate::config::Config;
use crate::control::{Attribute, AttributeController, ControlRequest};
use crate::corpus::{CaseStore, Dataset};
use crate::embeddings::{Embedder, create_embedder};
use crate::error::{ReframeError, Result};
use crate::generator::ReframeGenerator;
use crate::metrics::{MetricScorer, ScoreVector};
use crate::retrieval::{self, RetrievalQuery, RetrievalResult};

pub mod router;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyParams {
    pub thought: String,
    #[serde(default)]
    pub situation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReframeParams {
    pub thought: String,
    #[serde(default)]
    pub situation: String,
    #[serde(default)]
    pub k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreParams {
    pub reframe: String,
    pub thought: String,
    #[serde(default)]
    pub situation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlParams {
    pub reframe: String,
    pub attribute: String,
    #[serde(default)]
    pub thought: String,
    #[serde(default)]
    pub situation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReframeOutcome {
    pub candidates: Vec<String>,
    pub similar_cases: RetrievalResult,
    pub retrieved_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlOutcome {
    pub controlled_reframe: String,
    pub attributes: ScoreVector,
}

/// Main reframing server implementation
#[derive(Clone)]
pub struct ReframeServer {
    pub config: Arc<Config>,
    pub corpus: Arc<CaseStore>,
    model: String,
    classifier: Arc<DistortionClassifier>,
    generator: Arc<ReframeGenerator>,
    scorer: Arc<MetricScorer>,
    controller: Arc<AttributeController>,
}

impl ReframeServer {
    /// Build with the OpenAI gateway and the configured embedder and corpus.
    pub fn new(config: Config) -> Result<Self> {
        let embedder = create_embedder(&config).map_err(|e| ReframeError::Embedding {
            message: e.to_string(),
        })?;
        let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiChatClient::from_config(&config)?);
        let corpus = CaseStore::from_path(&config.system.dataset_path);
        Self::with_gateways(config, corpus, generator, embedder)
    }

    /// Build over explicit gateways; used by tests and alternate deployments.
    pub fn with_gateways(
        config: Config,
        corpus: CaseStore,
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let scorer = MetricScorer::new(embedder, config.metrics.clone())?;
        let sampling = &config.sampling;
        Ok(Self {
            model: generator.model().to_string(),
            classifier: Arc::new(DistortionClassifier::new(
                generator.clone(),
                sampling.classify.clone(),
            )),
            generator: Arc::new(ReframeGenerator::new(
                generator.clone(),
                sampling.reframe.clone(),
            )),
            controller: Arc::new(AttributeController::new(
                generator,
                sampling.control.clone(),
            )),
            scorer: Arc::new(scorer),
            corpus: Arc::new(corpus),
            config: Arc::new(config),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The shared corpus, read from its source on first access.
    pub fn dataset(&self) -> &Dataset {
        self.corpus.load()
    }

    pub async fn classify(&self, params: ClassifyParams) -> Result<ClassificationResult> {
        require("thought", &params.thought)?;
        self.classifier
            .classify(params.thought.trim(), params.situation.trim())
            .await
    }

    pub fn retrieve(&self, thought: &str, situation: &str, k: Option<usize>) -> Result<RetrievalResult> {
        require("thought", thought)?;
        let k = k.unwrap_or(self.config.retrieval.top_k);
        if k == 0 {
            return Err(ReframeError::validation("k must be a positive integer"));
        }
        let query = RetrievalQuery::new(thought.trim(), situation.trim()).with_k(k);
        Ok(retrieval::retrieve(&query, self.dataset()))
    }

    pub async fn reframe(&self, params: ReframeParams) -> Result<ReframeOutcome> {
        let k = params.k.unwrap_or(self.config.retrieval.top_k);
        let similar_cases = self.retrieve(&params.thought, &params.situation, Some(k))?;
        info!(
            "Reframe request: k={}, retrieved={}",
            k,
            similar_cases.len()
        );

        let candidates = self
            .generator
            .generate(
                params.thought.trim(),
                params.situation.trim(),
                &similar_cases,
                self.config.retrieval.candidates,
            )
            .await?;

        Ok(ReframeOutcome {
            candidates,
            similar_cases,
            retrieved_k: k,
        })
    }

    pub async fn score(&self, params: ScoreParams) -> Result<ScoreVector> {
        require("reframe", &params.reframe)?;
        require("thought", &params.thought)?;
        Ok(self
            .scorer
            .score(
                params.reframe.trim(),
                params.thought.trim(),
                params.situation.trim(),
            )
            .await)
    }

    /// Rewrite toward one attribute, then re-score the rewrite.
    pub async fn control(&self, params: ControlParams) -> Result<ControlOutcome> {
        require("reframe", &params.reframe)?;
        let attribute: Attribute = params.attribute.parse()?;
        info!("Attribute control request: {}", attribute);

        let request = ControlRequest {
            reframe: params.reframe.trim().to_string(),
            attribute,
            thought: params.thought.trim().to_string(),
            situation: params.situation.trim().to_string(),
        };
        let controlled_reframe = self.controller.control(&request).await?;
        let attributes = self
            .scorer
            .score(&controlled_reframe, &request.thought, &request.situation)
            .await;

        Ok(ControlOutcome {
            controlled_reframe,
            attributes,
        })
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReframeError::validation(format!("{} is required", field)));
    }
    Ok(())
}
