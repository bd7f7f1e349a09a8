//! Interpretable reframe attributes: specificity, actionability, empathy, positivity
//!
//! Specificity is embedding-based. The other three are keyword heuristics over a
//! bilingual (English/Korean) lexicon that lives in configuration so it can be
//! tuned without touching the scoring code.

use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

use crate::embeddings::Embedder;
use crate::error::{ReframeError, Result};
use crate::utils::{cosine_similarity, round3};

/// Token lists and divisors for the heuristic scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricLexicon {
    /// Whole-word action tokens; each distinct token found counts once.
    pub action_tokens: Vec<String>,
    pub action_divisor: f64,
    /// Substring markers of validation and emotional support.
    pub empathy_keywords: Vec<String>,
    pub empathy_divisor: f64,
    /// Substring markers of capability and optimism.
    pub positive_keywords: Vec<String>,
    pub positive_divisor: f64,
    /// Specificity reported when the embedding gateway fails.
    pub specificity_fallback: f64,
}

fn owned(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

impl Default for MetricLexicon {
    fn default() -> Self {
        Self {
            action_tokens: owned(&[
                "can", "will", "could", "should", "try", "start", "practice", "focus", "work",
                "plan", "하자", "해보자", "할 수 있다", "하겠다", "시작하다",
            ]),
            action_divisor: 3.0,
            empathy_keywords: owned(&[
                "understand", "feel", "okay", "normal", "valid", "이해", "괜찮", "힘들", "당연",
                "자연스러운",
            ]),
            empathy_divisor: 3.0,
            positive_keywords: owned(&[
                "can", "will", "able", "succeed", "good", "better", "improve", "할 수 있", "잘",
                "개선", "성장", "가능",
            ]),
            positive_divisor: 4.0,
            specificity_fallback: 0.5,
        }
    }
}

impl MetricLexicon {
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, divisor) in [
            ("action_divisor", self.action_divisor),
            ("empathy_divisor", self.empathy_divisor),
            ("positive_divisor", self.positive_divisor),
        ] {
            if !(divisor.is_finite() && divisor > 0.0) {
                anyhow::bail!("metrics.{} must be a positive number, got {}", name, divisor);
            }
        }
        if !(0.0..=1.0).contains(&self.specificity_fallback) {
            anyhow::bail!("metrics.specificity_fallback must be between 0.0 and 1.0");
        }
        Ok(())
    }
}

/// Four attribute scores, each in [0, 1] and rounded to 3 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
    pub specificity: f64,
    pub actionability: f64,
    pub empathy: f64,
    pub positivity: f64,
}

/// Specificity with a flag telling whether the fallback was used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecificityOutcome {
    pub value: f64,
    pub degraded: bool,
}

pub struct MetricScorer {
    embedder: Arc<dyn Embedder>,
    lexicon: MetricLexicon,
    action_patterns: Vec<Regex>,
}

impl MetricScorer {
    pub fn new(embedder: Arc<dyn Embedder>, lexicon: MetricLexicon) -> Result<Self> {
        lexicon.validate().map_err(|e| ReframeError::Config {
            message: e.to_string(),
        })?;
        let action_patterns = lexicon
            .action_tokens
            .iter()
            .map(|token| {
                RegexBuilder::new(&format!(r"\b{}\b", regex::escape(&normalize(token))))
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ReframeError::Config {
                        message: format!("invalid action token '{}': {}", token, e),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            embedder,
            lexicon,
            action_patterns,
        })
    }

    pub fn lexicon(&self) -> &MetricLexicon {
        &self.lexicon
    }

    /// Score every attribute; embedding failure only degrades specificity.
    pub async fn score(&self, reframe: &str, thought: &str, situation: &str) -> ScoreVector {
        let specificity = self.specificity(reframe, thought, situation).await;
        ScoreVector {
            specificity: round3(specificity.value),
            actionability: round3(self.actionability(reframe)),
            empathy: round3(self.empathy(reframe)),
            positivity: round3(self.positivity(reframe)),
        }
    }

    pub async fn specificity(&self, reframe: &str, thought: &str, situation: &str) -> SpecificityOutcome {
        let context = format!("{} {}", thought, situation);
        let texts = [reframe.to_string(), context];

        match self.embedder.embed(&texts).await {
            Ok(vectors) if vectors.len() == 2 => SpecificityOutcome {
                value: (cosine_similarity(&vectors[0], &vectors[1]) as f64).clamp(0.0, 1.0),
                degraded: false,
            },
            Ok(vectors) => {
                warn!(
                    "Embedding gateway returned {} vectors for 2 inputs; using fallback specificity",
                    vectors.len()
                );
                self.fallback()
            }
            Err(e) => {
                warn!("Embedding gateway failed ({}); using fallback specificity", e);
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> SpecificityOutcome {
        SpecificityOutcome {
            value: self.lexicon.specificity_fallback,
            degraded: true,
        }
    }

    pub fn actionability(&self, reframe: &str) -> f64 {
        let text = normalize(reframe);
        let hits = self
            .action_patterns
            .iter()
            .filter(|p| p.is_match(&text))
            .count();
        (hits as f64 / self.lexicon.action_divisor).min(1.0)
    }

    pub fn empathy(&self, reframe: &str) -> f64 {
        (keyword_hits(reframe, &self.lexicon.empathy_keywords) as f64
            / self.lexicon.empathy_divisor)
            .min(1.0)
    }

    pub fn positivity(&self, reframe: &str) -> f64 {
        (keyword_hits(reframe, &self.lexicon.positive_keywords) as f64
            / self.lexicon.positive_divisor)
            .min(1.0)
    }
}

fn normalize(text: &str) -> String {
    text.nfc().collect()
}

fn keyword_hits(text: &str, keywords: &[String]) -> usize {
    let haystack = normalize(text).to_lowercase();
    keywords
        .iter()
        .filter(|kw| haystack.contains(&normalize(kw).to_lowercase()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::FakeEmbedder;
    use async_trait::async_trait;

    struct DownEmbedder;

    #[async_trait]
    impl Embedder for DownEmbedder {
        async fn embed(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            anyhow::bail!("embedding service unavailable")
        }

        fn dimensions(&self) -> usize {
            0
        }
    }

    fn scorer() -> MetricScorer {
        MetricScorer::new(Arc::new(FakeEmbedder::new(Some(64))), MetricLexicon::default()).unwrap()
    }

    #[test]
    fn two_distinct_action_tokens_score_two_thirds() {
        let s = scorer();
        assert_eq!(round3(s.actionability("I will plan it")), 0.667);
        // Repeats of one token count once.
        assert_eq!(round3(s.actionability("try, try, try")), 0.333);
    }

    #[test]
    fn action_tokens_match_whole_words_only() {
        let s = scorer();
        assert_eq!(s.actionability("Cannot, workshop, planet"), 0.0);
        assert_eq!(s.actionability("CAN"), 1.0 / 3.0);
    }

    #[test]
    fn actionability_is_capped() {
        let s = scorer();
        assert_eq!(s.actionability("I can start to practice and plan"), 1.0);
    }

    #[test]
    fn korean_tokens_are_recognized() {
        let s = scorer();
        assert_eq!(round3(s.actionability("다시 해보자 그리고 시작하다")), 0.667);
        assert_eq!(round3(s.empathy("정말 힘들었겠다, 괜찮아")), 0.667);
        assert_eq!(s.positivity("나는 성장 중이다"), 0.25);
    }

    #[test]
    fn empathy_counts_keywords_case_insensitively() {
        let s = scorer();
        assert_eq!(round3(s.empathy("I UNDERSTAND how you feel")), 0.667);
        assert_eq!(s.empathy("It is okay, normal and valid to feel this"), 1.0);
    }

    #[test]
    fn positivity_divides_by_four() {
        let s = scorer();
        assert_eq!(s.positivity("I can"), 0.25);
        assert_eq!(s.positivity("nothing here"), 0.0);
        assert_eq!(
            s.positivity("I can and will be able to do good and better"),
            1.0
        );
    }

    #[tokio::test]
    async fn specificity_falls_back_when_embeddings_fail() {
        let s = MetricScorer::new(Arc::new(DownEmbedder), MetricLexicon::default()).unwrap();
        let outcome = s.specificity("anything", "I will fail", "exam").await;
        assert!(outcome.degraded);
        assert_eq!(outcome.value, 0.5);

        let scores = s.score("I can try", "I will fail", "exam").await;
        assert_eq!(scores.specificity, 0.5);
        assert_eq!(scores.actionability, 0.667);
    }

    #[tokio::test]
    async fn identical_text_and_context_is_fully_specific() {
        let s = scorer();
        let outcome = s.specificity("I will fail exam", "I will fail", "exam").await;
        assert!(!outcome.degraded);
        assert!((outcome.value - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn all_scores_stay_in_unit_range() {
        let s = scorer();
        for text in ["", "can will could should try", "괜찮 이해 힘들 당연", "zzz"] {
            let v = s.score(text, "I will fail", "exam").await;
            for x in [v.specificity, v.actionability, v.empathy, v.positivity] {
                assert!((0.0..=1.0).contains(&x), "{} out of range for {:?}", x, text);
            }
        }
    }

    #[test]
    fn invalid_divisor_is_rejected() {
        let lexicon = MetricLexicon {
            empathy_divisor: 0.0,
            ..Default::default()
        };
        assert!(MetricScorer::new(Arc::new(FakeEmbedder::new(None)), lexicon).is_err());
    }
}
