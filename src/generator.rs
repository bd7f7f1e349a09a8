//! Concurrent multi-candidate reframe generation

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::try_join_all;
use tracing::{debug, info};

use crate::clients::{CompletionRequest, SamplingParams, TextGenerator};
use crate::error::{ReframeError, Result};
use crate::prompts;
use crate::retrieval::RetrievalResult;

pub const DEFAULT_CANDIDATES: usize = 3;

pub struct ReframeGenerator {
    generator: Arc<dyn TextGenerator>,
    sampling: SamplingParams,
}

impl ReframeGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, sampling: SamplingParams) -> Self {
        Self {
            generator,
            sampling,
        }
    }

    /// Issue `n` independent completions over one shared prompt and join them.
    ///
    /// Candidates come back in issue order. Any single failure fails the whole
    /// call; there is no partial result.
    pub async fn generate(
        &self,
        thought: &str,
        situation: &str,
        retrieval: &RetrievalResult,
        n: usize,
    ) -> Result<Vec<String>> {
        if n == 0 {
            return Err(ReframeError::validation("candidate count must be at least 1"));
        }

        let request = CompletionRequest::new(
            prompts::generation_prompt(thought, situation, retrieval),
            self.sampling.clone(),
        )
        .with_system(prompts::REFRAME_SYSTEM_PROMPT);
        debug!(
            "Generating {} candidates from {} few-shot cases",
            n,
            retrieval.len()
        );

        let started = Instant::now();
        let calls = (0..n).map(|_| {
            let request = &request;
            async move {
                let text = self.generator.complete(request).await?;
                Ok::<_, ReframeError>(text.trim().to_string())
            }
        });
        let candidates = try_join_all(calls).await?;

        info!(
            "Generated {} reframes in {}ms",
            candidates.len(),
            started.elapsed().as_millis()
        );
        Ok(candidates)
    }
}
