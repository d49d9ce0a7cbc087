//! Cross-cutting, shared constants.
//!
//! Condensation defaults live here so the per-call [`CondensationConfig`](crate::condense::CondensationConfig),
//! the request payloads in [`crate::pipeline`] and the CLI all agree on them.

/// Number of highest-scoring sentences kept per chunk.
pub const DEFAULT_TOP_N: usize = 6;

/// Character budget for a condensed chunk.
pub const DEFAULT_MAX_CHARS: usize = 1000;

/// Multiplier applied to sentences carrying a citation marker when references are preserved.
pub const REFERENCE_BOOST: f32 = 1.15;

/// Appended after a hard truncation. Its length is the documented overshoot past `max_chars`.
pub const TRUNCATION_MARKER: &str = "...";

/// Model name reported when no catalog overrides it.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Cross-encoder name reported when no catalog overrides it.
pub const DEFAULT_RERANKER_MODEL: &str = "cross-encoder/ms-marco-MiniLM-L-6-v2";

/// Hidden size of the default MiniLM encoder; also the stub encoder's output width.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Token limit shared by the encoder and the cross-encoder.
pub const DEFAULT_MAX_SEQ_LEN: usize = 512;

/// Score assigned to every passage when reranking is disabled.
pub const PASSTHROUGH_SCORE: f32 = 1.0;
