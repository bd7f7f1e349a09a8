//! Similar-case retrieval for few-shot prompting
//!
//! Cases are ranked by bigram (Sorensen-Dice) similarity of `thought + " " + situation`.
//! Rank decides membership of the top-k set; the selected cases are then shuffled
//! so that prompt position does not track similarity rank.

use std::cmp::Ordering;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::corpus::{CaseRecord, Dataset};

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalQuery {
    pub thought: String,
    #[serde(default)]
    pub situation: String,
    #[serde(default = "default_top_k")]
    pub k: usize,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl RetrievalQuery {
    pub fn new(thought: impl Into<String>, situation: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            situation: situation.into(),
            k: DEFAULT_TOP_K,
        }
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
}

/// Top-k cases in shuffled order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetrievalResult {
    cases: Vec<CaseRecord>,
}

impl RetrievalResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CaseRecord> {
        self.cases.iter()
    }

    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    pub fn into_cases(self) -> Vec<CaseRecord> {
        self.cases
    }
}

impl From<Vec<CaseRecord>> for RetrievalResult {
    fn from(cases: Vec<CaseRecord>) -> Self {
        Self { cases }
    }
}

/// Comparison key shared by corpus records and queries.
pub fn comparison_text(thought: &str, situation: &str) -> String {
    format!("{} {}", thought, situation)
        .nfc()
        .collect::<String>()
        .to_lowercase()
}

/// Normalized bigram similarity in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::sorensen_dice(a, b)
}

/// Indices of the `k` most similar records, best first; ties keep corpus order.
pub fn rank(query: &RetrievalQuery, dataset: &Dataset) -> Vec<(usize, f64)> {
    let query_text = comparison_text(&query.thought, &query.situation);
    let mut scored: Vec<(usize, f64)> = dataset
        .iter()
        .enumerate()
        .map(|(idx, case)| {
            let text = comparison_text(&case.thought, &case.situation);
            (idx, similarity(&query_text, &text))
        })
        .collect();

    // sort_by is stable, so equal scores stay in corpus order
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(query.k);
    scored
}

/// Retrieve with the thread-local RNG.
pub fn retrieve(query: &RetrievalQuery, dataset: &Dataset) -> RetrievalResult {
    retrieve_with_rng(query, dataset, &mut rand::thread_rng())
}

pub fn retrieve_with_rng<R: Rng + ?Sized>(
    query: &RetrievalQuery,
    dataset: &Dataset,
    rng: &mut R,
) -> RetrievalResult {
    if dataset.is_empty() || query.k == 0 {
        return RetrievalResult::empty();
    }

    let ranked = rank(query, dataset);
    for (position, (idx, score)) in ranked.iter().enumerate() {
        debug!("  rank {}: case #{} similarity {:.3}", position + 1, idx, score);
    }

    let mut cases: Vec<CaseRecord> = ranked
        .into_iter()
        .filter_map(|(idx, _)| dataset.get(idx).cloned())
        .collect();
    cases.shuffle(rng);

    debug!("Top-{} similar cases retrieved (shuffled)", cases.len());
    RetrievalResult::from(cases)
}
