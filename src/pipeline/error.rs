use serde::Serialize;
use thiserror::Error;

use crate::condense::CondenseError;
use crate::embedding::{EmbeddingError, RerankerError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("condensation failed: {0}")]
    Condense(#[from] CondenseError),

    #[error("reranking failed: {0}")]
    Reranker(#[from] RerankerError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),
}

impl PipelineError {
    /// Short machine-readable category.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidRequest(_)
            | PipelineError::Condense(CondenseError::InvalidInput { .. }) => "invalid_request",
            PipelineError::Condense(CondenseError::Provider(_)) => "condense_error",
            PipelineError::Reranker(_) => "reranker_error",
            PipelineError::Embedding(_) => "embedding_error",
        }
    }

    /// `true` when the caller sent something unusable rather than a model failing.
    pub fn is_client_error(&self) -> bool {
        self.kind() == "invalid_request"
    }
}

/// JSON body reported for a failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
}

impl From<&PipelineError> for ErrorResponse {
    fn from(err: &PipelineError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
        }
    }
}
