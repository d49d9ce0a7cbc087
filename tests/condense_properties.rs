//! Property tests for sentence scoring and chunk condensation.

use condense::{
    CondensationConfig, MockSimilarityProvider, SentenceEncoder, TRUNCATION_MARKER,
    condense_chunk, score_sentences, split_into_sentences,
};
use proptest::prelude::*;

/// A `!`-terminated sentence that starts with a unique capitalised tag, so the splitter
/// separates it cleanly from its neighbours.
fn arb_sentences(max: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z]{1,8}( [a-z]{1,8}){0,6}", 1..max).prop_map(|bodies| {
        bodies
            .into_iter()
            .enumerate()
            .map(|(i, body)| format!("Item{i} {body}!"))
            .collect()
    })
}

mod prop_identity {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn short_chunks_are_returned_unchanged(
            text in "[A-Za-z .!?\\[\\]0-9]{0,200}",
            slack in 0usize..50,
            top_n in 1usize..10,
        ) {
            let provider = MockSimilarityProvider::new();
            let config = CondensationConfig::new(top_n, text.chars().count() + slack + 1);

            let result = condense_chunk("query", &text, &provider, &config).unwrap();

            prop_assert_eq!(result, text);
            prop_assert_eq!(provider.embed_calls(), 0);
        }
    }
}

mod prop_scoring {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn indices_form_a_permutation(
            sentences in arb_sentences(20),
            query in "[a-z]{1,8}( [a-z]{1,8}){0,4}",
        ) {
            let encoder = SentenceEncoder::stub();

            let scored = score_sentences(&query, &sentences, &encoder, false).unwrap();

            let mut indices: Vec<usize> = scored.iter().map(|s| s.index).collect();
            indices.sort_unstable();
            prop_assert_eq!(indices, (0..sentences.len()).collect::<Vec<_>>());
            for window in scored.windows(2) {
                prop_assert!(window[0].score >= window[1].score);
            }
        }

        #[test]
        fn equal_scores_keep_input_order(
            labels in proptest::collection::vec(0usize..3, 1..20),
        ) {
            let provider = MockSimilarityProvider::new()
                .with_score("alpha", 0.2)
                .with_score("bravo", 0.5)
                .with_score("charlie", 0.8);
            let names = ["alpha", "bravo", "charlie"];
            let sentences: Vec<String> = labels
                .iter()
                .enumerate()
                .map(|(i, &l)| format!("sentence {i} {}", names[l]))
                .collect();

            let scored = score_sentences("q", &sentences, &provider, false).unwrap();

            for window in scored.windows(2) {
                if (window[0].score - window[1].score).abs() < f32::EPSILON {
                    prop_assert!(window[0].index < window[1].index);
                }
            }
        }

        #[test]
        fn reference_boost_scales_marked_sentences(similarity in 0.05f32..0.95) {
            let provider = MockSimilarityProvider::new().with_default_score(similarity);
            let sentences = ["a plain claim", "a cited claim [3]"];

            let plain = score_sentences("q", &sentences, &provider, false).unwrap();
            let boosted = score_sentences("q", &sentences, &provider, true).unwrap();

            let score_of = |scored: &[condense::ScoredSentence], index: usize| {
                scored.iter().find(|s| s.index == index).map(|s| s.score).unwrap()
            };
            prop_assert!(score_of(&boosted, 1) >= score_of(&plain, 1) * 1.15 - 1e-5);
            prop_assert!((score_of(&boosted, 0) - score_of(&plain, 0)).abs() < 1e-6);
        }
    }
}

mod prop_condense {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn output_respects_budget_and_reading_order(
            sentences in arb_sentences(15),
            query in "[a-z]{1,8}( [a-z]{1,8}){0,4}",
            top_n in 1usize..8,
            max_chars in 10usize..300,
        ) {
            let encoder = SentenceEncoder::stub();
            let chunk = sentences.join(" ");
            let config = CondensationConfig::new(top_n, max_chars);

            let result = condense_chunk(&query, &chunk, &encoder, &config).unwrap();

            prop_assert!(result.chars().count() <= max_chars + TRUNCATION_MARKER.len());
            prop_assert!(!result.is_empty());

            if chunk.chars().count() > max_chars && !result.ends_with(TRUNCATION_MARKER) {
                let kept = split_into_sentences(&result);
                prop_assert!(kept.len() <= top_n);
                let positions: Vec<usize> = kept
                    .iter()
                    .map(|s| sentences.iter().position(|orig| orig == s).unwrap())
                    .collect();
                for window in positions.windows(2) {
                    prop_assert!(window[0] < window[1]);
                }
            }
        }
    }
}
