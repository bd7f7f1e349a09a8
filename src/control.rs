//! Attribute-directed rewriting of a chosen reframe

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clients::{CompletionRequest, SamplingParams, TextGenerator};
use crate::error::{ReframeError, Result};
use crate::prompts;

/// Attribute a rewrite should strengthen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Empathy,
    Actionability,
    Specificity,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [
        Attribute::Empathy,
        Attribute::Actionability,
        Attribute::Specificity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Empathy => "empathy",
            Attribute::Actionability => "actionability",
            Attribute::Specificity => "specificity",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = ReframeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empathy" => Ok(Attribute::Empathy),
            "actionability" => Ok(Attribute::Actionability),
            "specificity" => Ok(Attribute::Specificity),
            other => Err(ReframeError::validation(format!(
                "unknown attribute '{}' (expected empathy, actionability or specificity)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControlRequest {
    pub reframe: String,
    pub attribute: Attribute,
    pub thought: String,
    pub situation: String,
}

/// Single-shot rewrite toward one attribute; callers decide whether to repeat.
pub struct AttributeController {
    generator: Arc<dyn TextGenerator>,
    sampling: SamplingParams,
}

impl AttributeController {
    pub fn new(generator: Arc<dyn TextGenerator>, sampling: SamplingParams) -> Self {
        Self {
            generator,
            sampling,
        }
    }

    pub async fn control(&self, request: &ControlRequest) -> Result<String> {
        let prompt = prompts::control_prompt(
            request.attribute,
            &request.reframe,
            &request.thought,
            &request.situation,
        );
        debug!("Rewriting reframe for {}", request.attribute);

        let completion = CompletionRequest::new(prompt, self.sampling.clone());
        let text = self.generator.complete(&completion).await?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_attributes_case_insensitively() {
        assert_eq!("Empathy".parse::<Attribute>().unwrap(), Attribute::Empathy);
        assert_eq!(
            " actionability ".parse::<Attribute>().unwrap(),
            Attribute::Actionability
        );
        for attribute in Attribute::ALL {
            assert_eq!(attribute.as_str().parse::<Attribute>().unwrap(), attribute);
        }
    }

    #[test]
    fn unknown_attribute_is_a_validation_error() {
        let err = "positivity".parse::<Attribute>().unwrap_err();
        assert!(matches!(err, ReframeError::Validation { .. }));
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let value = serde_json::to_value(Attribute::Specificity).unwrap();
        assert_eq!(value, "specificity");
    }
}
