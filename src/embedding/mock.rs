//! Scripted [`SimilarityProvider`] for tests.
//!
//! `embed` (the condenser's query call) always returns `[1, 0]`. `embed_batch` maps each text to
//! `[s, sqrt(1 - s²)]` where `s` is the score of the first registered pattern it contains, so its
//! cosine similarity to the query is exactly `s`.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::embedding::error::EmbeddingError;
use crate::embedding::similarity::SimilarityProvider;

#[derive(Debug, Default)]
pub struct MockSimilarityProvider {
    rules: Vec<(String, f32)>,
    default_score: f32,
    fail: bool,
    embed_calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl MockSimilarityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every call fails with `InferenceFailed`.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Texts containing `pattern` get similarity `score` (clamped to `[-1, 1]`).
    pub fn with_score(mut self, pattern: impl Into<String>, score: f32) -> Self {
        self.rules.push((pattern.into(), score.clamp(-1.0, 1.0)));
        self
    }

    /// Similarity for texts matching no pattern.
    pub fn with_default_score(mut self, score: f32) -> Self {
        self.default_score = score.clamp(-1.0, 1.0);
        self
    }

    /// Number of single-text `embed` calls so far.
    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    /// Number of `embed_batch` calls so far.
    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let score = self
            .rules
            .iter()
            .find(|(pattern, _)| text.contains(pattern.as_str()))
            .map(|(_, score)| *score)
            .unwrap_or(self.default_score);
        vec![score, (1.0 - score * score).max(0.0).sqrt()]
    }

    fn check(&self) -> Result<(), EmbeddingError> {
        if self.fail {
            return Err(EmbeddingError::InferenceFailed {
                reason: "mock provider configured to fail".to_string(),
            });
        }
        Ok(())
    }
}

impl SimilarityProvider for MockSimilarityProvider {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(vec![1.0, 0.0])
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }
}
