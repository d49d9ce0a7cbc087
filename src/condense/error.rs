use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum CondenseError {
    /// Rejected before any scoring happened (empty query, zero budget, ...).
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The similarity provider failed; passed through unchanged.
    #[error("similarity provider failed: {0}")]
    Provider(#[from] EmbeddingError),
}

impl CondenseError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        CondenseError::InvalidInput {
            reason: reason.into(),
        }
    }
}
