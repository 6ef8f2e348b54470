//! # Model Errors

use thiserror::Error;

/// Result type for document model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while parsing or serializing the document model
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("malformed citation: {0}")]
    MalformedCitation(String),

    #[error("malformed name: {0}")]
    MalformedName(String),

    #[error("missing parameter: {0}")]
    MissingParameter(String),

    #[error("invalid parameter {0}: {1}")]
    InvalidParameter(String, String),
}
