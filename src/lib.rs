//! Retrieval-augmented cognitive reframing.
//!
//! A distorted thought is classified, similar historical cases are retrieved
//! from a static corpus, several candidate reframes are generated concurrently
//! from a few-shot prompt, candidates are scored on interpretable attributes,
//! and a chosen candidate can be rewritten toward one attribute.

pub mod classifier;
pub mod clients;
pub mod config;
pub mod control;
pub mod corpus;
pub mod embeddings;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod prompts;
pub mod retrieval;
pub mod schemas;
pub mod server;
pub mod tools;
pub mod utils;

pub use classifier::ClassificationResult;
pub use control::Attribute;
pub use corpus::{CaseRecord, CaseStore, Dataset};
pub use error::{ReframeError, Result};
pub use metrics::ScoreVector;
pub use retrieval::{RetrievalQuery, RetrievalResult};
pub use server::ReframeServer;
