//! Embedding + model utilities.
//!
//! - [`similarity`] defines the provider capability the condenser is written against.
//! - [`encoder`] is the BERT sentence encoder implementing it.
//! - [`reranker`] provides cross-encoder passage scoring.

/// BERT backbones (mean-pooled encoder, cross-encoder head).
pub mod bert;
/// Device selection (CPU / CUDA / Metal).
pub mod device;
/// Sentence encoder (embeddings for scoring and the embed request).
pub mod encoder;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Cross-encoder reranker.
pub mod reranker;
/// Provider trait + cosine similarity.
pub mod similarity;
/// Tokenizer loading and batching helpers.
pub mod utils;

pub use device::{DeviceKind, select_device};
pub use encoder::{EncoderConfig, SentenceEncoder};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockSimilarityProvider;
pub use reranker::{RankedPassage, Reranker, RerankerConfig, RerankerError, passthrough};
pub use similarity::{SimilarityProvider, cosine_similarity};
