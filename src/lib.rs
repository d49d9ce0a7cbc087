//! Condense library crate (used by the CLI and integration tests).
//!
//! # Public API Surface
//!
//! ## Condensation
//! - [`split_into_sentences`], [`score_sentences`] - Sentence segmentation and scoring
//! - [`condense_chunk`], [`condense_chunks_batch`] - Query-focused condensation
//! - [`prepare_chunks_for_condensation`], [`apply_condensation_to_results`] - Result merging
//! - [`CondensationConfig`], [`ChunkRecord`], [`CondenseError`]
//!
//! ## Embedding & Reranking
//! - [`SimilarityProvider`] - The capability condensation is written against
//! - [`SentenceEncoder`], [`EncoderConfig`] - BERT sentence embeddings
//! - [`Reranker`], [`RerankerConfig`] - Cross-encoder reranking
//!
//! ## Service
//! - [`Pipeline`] - Embed and condense requests over loaded models
//! - [`Config`], [`ModelCatalog`] - Environment configuration
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod condense;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod pipeline;

pub use condense::{
    ChunkRecord, CondensationConfig, CondenseError, ScoredSentence, TextField,
    apply_condensation_to_results, condense_chunk, condense_chunks_batch, has_reference_marker,
    prepare_chunks_for_condensation, score_sentences, split_into_sentences,
};
pub use config::{Config, ConfigError, ModelCatalog};
pub use constants::{DEFAULT_MAX_CHARS, DEFAULT_TOP_N, REFERENCE_BOOST, TRUNCATION_MARKER};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockSimilarityProvider;
pub use embedding::{
    DeviceKind, EmbeddingError, EncoderConfig, RankedPassage, Reranker, RerankerConfig,
    RerankerError, SentenceEncoder, SimilarityProvider, cosine_similarity,
};
pub use pipeline::{
    CondenseRequest, CondenseResponse, EmbedRequest, EmbedResponse, Pipeline, PipelineError,
    RerankOptions,
};
