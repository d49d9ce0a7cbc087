//! Regex sentence segmentation.
//!
//! A heuristic, not a parser: a boundary is `.`, `!` or `?` followed by whitespace and an ASCII
//! capital. Before splitting, every "word character, period, whitespace, capital" run has its
//! period masked so it cannot end a sentence. Matching is left to right and non-overlapping, so
//! in a chain like `x. Y. Z` only the first period is masked.

use std::sync::LazyLock;

use regex::Regex;

/// Stand-in for a masked period. Private-use code point, restored to `.` after splitting.
const MASKED_PERIOD: char = '\u{E000}';

static ABBREVIATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)\.(\s+[A-Z])").expect("abbreviation regex"));

static BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?](\s+)[A-Z]").expect("sentence boundary regex"));

/// Splits `text` into trimmed, non-empty sentences in reading order.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let masked = ABBREVIATION.replace_all(text, |caps: &regex::Captures<'_>| {
        format!("{}{}{}", &caps[1], MASKED_PERIOD, &caps[2])
    });

    let mut pieces = Vec::new();
    let mut start = 0;
    for caps in BOUNDARY.captures_iter(&masked) {
        if let Some(gap) = caps.get(1) {
            pieces.push(&masked[start..gap.start()]);
            start = gap.end();
        }
    }
    pieces.push(&masked[start..]);

    pieces
        .into_iter()
        .map(|piece| piece.replace(MASKED_PERIOD, ".").trim().to_string())
        .filter(|sentence| !sentence.is_empty())
        .collect()
}
