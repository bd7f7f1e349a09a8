//! Domain-specific error types for reframe-mind

use serde_json::json;
use thiserror::Error;

/// Main error type for the reframing pipeline
#[derive(Error, Debug)]
pub enum ReframeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    #[error("Generation service error: {message}")]
    Generation { message: String },

    #[error("Embedding service error: {message}")]
    Embedding { message: String },

    #[error("Corpus error: {message}")]
    Corpus { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ReframeError {
    /// Errors caused by the caller's input rather than a collaborator failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ReframeError::Validation { .. } | ReframeError::InvalidParams { .. }
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ReframeError::Validation {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ReframeError {
    fn from(err: anyhow::Error) -> Self {
        ReframeError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ReframeError {
    fn from(err: serde_json::Error) -> Self {
        ReframeError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for ReframeError {
    fn from(err: csv::Error) -> Self {
        ReframeError::Corpus {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ReframeError {
    fn from(err: toml::de::Error) -> Self {
        ReframeError::Config {
            message: err.to_string(),
        }
    }
}

/// Convert ReframeError to MCP error
impl From<ReframeError> for rmcp::ErrorData {
    fn from(err: ReframeError) -> Self {
        let (code, label, details) = match err {
            ReframeError::Config { message } => (
                rmcp::model::ErrorCode::INTERNAL_ERROR,
                "Configuration error",
                message,
            ),
            ReframeError::Validation { message } => (
                rmcp::model::ErrorCode::INVALID_PARAMS,
                "Validation error",
                message,
            ),
            ReframeError::InvalidParams { message } => (
                rmcp::model::ErrorCode::INVALID_PARAMS,
                "Invalid parameters",
                message,
            ),
            ReframeError::Generation { message } => (
                rmcp::model::ErrorCode::INTERNAL_ERROR,
                "Generation service error",
                message,
            ),
            ReframeError::Embedding { message } => (
                rmcp::model::ErrorCode::INTERNAL_ERROR,
                "Embedding service error",
                message,
            ),
            ReframeError::Corpus { message } => (
                rmcp::model::ErrorCode::INTERNAL_ERROR,
                "Corpus error",
                message,
            ),
            ReframeError::Serialization { message } => (
                rmcp::model::ErrorCode::INTERNAL_ERROR,
                "Serialization error",
                message,
            ),
            ReframeError::Internal { message } => (
                rmcp::model::ErrorCode::INTERNAL_ERROR,
                "Internal error",
                message,
            ),
        };

        rmcp::ErrorData {
            code,
            message: format!("{label}: {details}").into(),
            data: Some(json!({ "details": details })),
        }
    }
}

/// Result type alias for reframing operations
pub type Result<T> = std::result::Result<T, ReframeError>;
