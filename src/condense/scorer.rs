use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::constants::REFERENCE_BOOST;
use crate::embedding::similarity::by_score_desc;
use crate::embedding::{EmbeddingError, SimilarityProvider};

use super::error::CondenseError;

/// `[12]`, `(fig. 3)` or `[Smith et al.]`, case-insensitive.
static REFERENCE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[\d+\]|\(fig\.\s*\d+\)|\[[\w\s,]+\s+et\s+al\.\]")
        .expect("reference marker regex")
});

/// A sentence with its query relevance. `index` is its position in the split chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence {
    pub index: usize,
    pub score: f32,
    pub text: String,
}

/// Returns `true` if the sentence carries a citation or figure reference.
pub fn has_reference_marker(sentence: &str) -> bool {
    REFERENCE_MARKER.is_match(sentence)
}

/// Scores each sentence by cosine similarity to `query`, sorted by score descending.
///
/// The query takes one `embed` call and all sentences share one `embed_batch` call. Equal scores
/// keep their input order and NaN scores sort last. An empty `sentences` slice returns without
/// touching the provider.
pub fn score_sentences<S, P>(
    query: &str,
    sentences: &[S],
    provider: &P,
    preserve_references: bool,
) -> Result<Vec<ScoredSentence>, CondenseError>
where
    S: AsRef<str>,
    P: SimilarityProvider + ?Sized,
{
    if sentences.is_empty() {
        return Ok(vec![]);
    }

    let texts: Vec<&str> = sentences.iter().map(AsRef::as_ref).collect();

    let query_embedding = provider.embed(query)?;
    let sentence_embeddings = provider.embed_batch(&texts)?;
    if sentence_embeddings.len() != texts.len() {
        return Err(EmbeddingError::InferenceFailed {
            reason: format!(
                "provider returned {} embeddings for {} sentences",
                sentence_embeddings.len(),
                texts.len()
            ),
        }
        .into());
    }

    let similarities = provider.cosine_similarities(&query_embedding, &sentence_embeddings);
    if similarities.len() != texts.len() {
        return Err(EmbeddingError::InferenceFailed {
            reason: format!(
                "provider returned {} similarities for {} sentences",
                similarities.len(),
                texts.len()
            ),
        }
        .into());
    }

    let mut boosted = 0usize;
    let mut scored: Vec<ScoredSentence> = texts
        .iter()
        .zip(similarities)
        .enumerate()
        .map(|(index, (text, similarity))| {
            let score = if preserve_references && has_reference_marker(text) {
                boosted += 1;
                similarity * REFERENCE_BOOST
            } else {
                similarity
            };
            ScoredSentence {
                index,
                score,
                text: (*text).to_string(),
            }
        })
        .collect();

    // `sort_by` is stable: ties stay in reading order.
    scored.sort_by(|a, b| by_score_desc(a.score, b.score));

    debug!(
        sentences = scored.len(),
        boosted,
        top_score = scored.first().map(|s| s.score),
        "Scored sentences"
    );

    Ok(scored)
}
