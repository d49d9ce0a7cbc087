//! Query-focused passage condensation.
//!
//! A retrieved chunk is split into sentences ([`split_into_sentences`]), each sentence is scored
//! against the query through a [`SimilarityProvider`](crate::embedding::SimilarityProvider)
//! ([`score_sentences`]), and the best ones are kept in reading order under a character budget
//! ([`condense_chunk`]). [`condense_chunks_batch`] does this over caller-shaped JSON records.
//!
//! # Provider Injection
//!
//! Nothing here owns a model. The provider is passed into every call, so the same functions run
//! against the BERT [`SentenceEncoder`](crate::embedding::SentenceEncoder) in production and a
//! scripted provider in tests. All functions are synchronous and keep no state between calls.
//!
//! # Budget Overshoot
//!
//! When even the first selected sentence exceeds `max_chars`, the output is cut to the budget and
//! [`TRUNCATION_MARKER`](crate::constants::TRUNCATION_MARKER) is appended after the cut. Outputs
//! are therefore bounded by `max_chars + 3`, not `max_chars`.

pub mod batch;
pub mod chunk;
pub mod config;
pub mod error;
pub mod record;
pub mod scorer;
pub mod splitter;


pub use batch::{
    apply_condensation_to_results, condense_chunks_batch, prepare_chunks_for_condensation,
};
pub use chunk::condense_chunk;
pub use config::CondensationConfig;
pub use error::CondenseError;
pub use record::{ChunkRecord, TextField};
pub use scorer::{ScoredSentence, has_reference_marker, score_sentences};
pub use splitter::split_into_sentences;
