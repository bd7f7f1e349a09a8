//! Few-shot cognitive distortion classification

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clients::{CompletionRequest, SamplingParams, TextGenerator};
use crate::error::{ReframeError, Result};
use crate::prompts;

/// Trailing "(85%)" style confidence emitted by the model
static CONFIDENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*(\d{1,3}(?:\.\d+)?)\s*%\s*\)\s*$").expect("valid regex"));

/// Raw model label such as "Mind Reading (85%)". The text is the contract;
/// the accessors below are best-effort views and never reject the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label_with_confidence: String,
}

impl ClassificationResult {
    pub fn new(label_with_confidence: impl Into<String>) -> Self {
        Self {
            label_with_confidence: label_with_confidence.into(),
        }
    }

    /// Label without the trailing confidence, if one is present.
    pub fn label(&self) -> &str {
        match CONFIDENCE_REGEX.find(&self.label_with_confidence) {
            Some(m) => self.label_with_confidence[..m.start()].trim_end(),
            None => self.label_with_confidence.trim(),
        }
    }

    /// Confidence in percent, when the model emitted one.
    pub fn confidence_percent(&self) -> Option<f32> {
        CONFIDENCE_REGEX
            .captures(&self.label_with_confidence)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f32>().ok())
    }
}

pub struct DistortionClassifier {
    generator: Arc<dyn TextGenerator>,
    sampling: SamplingParams,
}

impl DistortionClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>, sampling: SamplingParams) -> Self {
        Self {
            generator,
            sampling,
        }
    }

    pub async fn classify(&self, thought: &str, situation: &str) -> Result<ClassificationResult> {
        let request = CompletionRequest::new(
            prompts::classification_prompt(thought, situation),
            self.sampling.clone(),
        )
        .with_system(prompts::CLASSIFIER_SYSTEM_PROMPT);

        let text = self.generator.complete(&request).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ReframeError::Generation {
                message: "classifier returned an empty label".into(),
            });
        }
        info!("Thinking trap classified: {}", text);
        Ok(ClassificationResult::new(text))
    }
}
