//! The embedding capability the condensation core depends on.
//!
//! [`SimilarityProvider`] is always passed explicitly into the condensation functions; nothing in
//! [`crate::condense`] reaches for a global model.

use std::cmp::Ordering;

use super::error::EmbeddingError;

/// Produces embeddings and cosine similarities.
///
/// Implementations must be safe to call from several requests at once.
pub trait SimilarityProvider: Send + Sync {
    /// Embeds a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds many texts in one call. Output order matches input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Cosine similarity between `query` and each candidate, one value per candidate.
    fn cosine_similarities(&self, query: &[f32], candidates: &[Vec<f32>]) -> Vec<f32> {
        candidates
            .iter()
            .map(|candidate| cosine_similarity(query, candidate))
            .collect()
    }
}

impl<P: SimilarityProvider + ?Sized> SimilarityProvider for &P {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts)
    }

    fn cosine_similarities(&self, query: &[f32], candidates: &[Vec<f32>]) -> Vec<f32> {
        (**self).cosine_similarities(query, candidates)
    }
}

/// Cosine similarity; `0.0` for mismatched lengths, empty input or zero vectors.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a_sq, norm_b_sq) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (&av, &bv)| {
            (dot + av * bv, na + av * av, nb + bv * bv)
        });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Scales `vector` to unit length in place (zero vectors are left untouched).
pub fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Comparator for sorting scores high to low. NaN ranks below every number, so the order is
/// total and a stable sort keeps equal scores in input order.
pub(crate) fn by_score_desc(a: f32, b: f32) -> Ordering {
    let rank = |score: f32| if score.is_nan() { f32::NEG_INFINITY } else { score };
    rank(b).partial_cmp(&rank(a)).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let v = vec![0.3, -0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_opposite() {
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_cosine_is_scale_invariant() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 4.0, 6.5];
        let scaled: Vec<f32> = a.iter().map(|x| x * 10.0).collect();
        assert!((cosine_similarity(&a, &b) - cosine_similarity(&scaled, &b)).abs() < 1e-6);
    }

    #[test]
    fn test_normalize() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn test_by_score_desc_puts_nan_last() {
        let mut scores = vec![0.2, f32::NAN, 0.9, -0.5, f32::NAN, 0.2];
        scores.sort_by(|a, b| by_score_desc(*a, *b));

        assert_eq!(&scores[..4], &[0.9, 0.2, 0.2, -0.5]);
        assert!(scores[4..].iter().all(|s| s.is_nan()));
    }

    #[test]
    fn test_by_score_desc_keeps_ties_stable() {
        let mut pairs = vec![(0, 0.5f32), (1, f32::NAN), (2, 0.5), (3, 0.0), (4, -0.0)];
        pairs.sort_by(|a, b| by_score_desc(a.1, b.1));

        let order: Vec<usize> = pairs.iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 2, 3, 4, 1]);
    }
}
