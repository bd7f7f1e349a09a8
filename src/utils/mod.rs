//! Utility functions shared across the codebase

pub mod math;

// Re-export commonly used utilities
pub use math::{cosine_similarity, round3};
