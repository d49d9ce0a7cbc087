use tracing::debug;

use crate::constants::TRUNCATION_MARKER;
use crate::embedding::SimilarityProvider;

use super::config::CondensationConfig;
use super::error::CondenseError;
use super::scorer::{ScoredSentence, score_sentences};
use super::splitter::split_into_sentences;

/// Length in characters (not bytes); every budget in this module is counted this way.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Condenses one chunk to its most query-relevant sentences, kept in reading order.
///
/// Chunks already within `max_chars` come back unchanged without being split or scored. Otherwise
/// the `top_n` best sentences are re-sorted by position and accepted greedily while their summed
/// length (separators excluded) stays within budget; the first one is always accepted. If the
/// joined text still exceeds `max_chars` it is cut back to the last space inside the budget and
/// [`TRUNCATION_MARKER`] is appended, so the result may run `TRUNCATION_MARKER.len()` characters
/// past `max_chars`.
pub fn condense_chunk<P>(
    query: &str,
    chunk_text: &str,
    provider: &P,
    config: &CondensationConfig,
) -> Result<String, CondenseError>
where
    P: SimilarityProvider + ?Sized,
{
    config.validate()?;

    let original_len = char_len(chunk_text);
    if original_len <= config.max_chars {
        return Ok(chunk_text.to_string());
    }

    if query.trim().is_empty() {
        return Err(CondenseError::invalid("query cannot be empty"));
    }

    let sentences = split_into_sentences(chunk_text);
    let scored = score_sentences(query, &sentences, provider, config.preserve_references)?;

    let mut selected: Vec<ScoredSentence> = scored.into_iter().take(config.top_n).collect();
    selected.sort_by_key(|s| s.index);

    let mut accepted: Vec<&str> = Vec::with_capacity(selected.len());
    let mut total_chars = 0usize;
    for sentence in &selected {
        let len = char_len(&sentence.text);
        if total_chars + len > config.max_chars && !accepted.is_empty() {
            break;
        }
        accepted.push(&sentence.text);
        total_chars += len;
    }

    let condensed = truncate_to_budget(accepted.join(" "), config.max_chars);

    debug!(
        sentences = sentences.len(),
        selected = selected.len(),
        accepted = accepted.len(),
        original_len,
        condensed_len = char_len(&condensed),
        "Condensed chunk"
    );

    Ok(condensed)
}

/// Hard cut for text still over budget: keep `max_chars` characters, drop the trailing partial
/// word, append the marker.
fn truncate_to_budget(text: String, max_chars: usize) -> String {
    if char_len(&text) <= max_chars {
        return text;
    }

    let cut = match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text.as_str(),
    };
    let kept = match cut.rfind(' ') {
        Some(space) => &cut[..space],
        None => cut,
    };

    format!("{kept}{TRUNCATION_MARKER}")
}
