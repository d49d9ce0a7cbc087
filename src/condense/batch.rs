use serde_json::Value;
use tracing::{debug, info};

use crate::embedding::SimilarityProvider;

use super::chunk::{char_len, condense_chunk};
use super::config::CondensationConfig;
use super::error::CondenseError;
use super::record::{
    CONDENSED_KEY, CONDENSED_LENGTH_KEY, ChunkRecord, INDEX_KEY, ORIGINAL_LENGTH_KEY, SCORE_KEY,
    TextField,
};

/// Score given to prepared chunks whose result record carried none.
const DEFAULT_CHUNK_SCORE: f64 = 1.0;

/// Condenses every record of `chunks`, returning new records in the same order.
///
/// Each output record is a copy of its input. Records without a non-empty `text`, `content` or
/// `page_content` string come back as-is; the others get their text condensed and written to the
/// field it was read from, plus `condensed`, `original_length` and `condensed_length`.
///
/// Stops at the first failing chunk.
pub fn condense_chunks_batch<P>(
    query: &str,
    chunks: &[ChunkRecord],
    provider: &P,
    config: &CondensationConfig,
) -> Result<Vec<ChunkRecord>, CondenseError>
where
    P: SimilarityProvider + ?Sized,
{
    config.validate()?;

    let mut condensed_count = 0usize;
    let mut output = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        let mut record = chunk.clone();

        let Some((field, text)) = chunk.text() else {
            output.push(record);
            continue;
        };

        let condensed = condense_chunk(query, text, provider, config)?;
        write_condensed(&mut record, field, char_len(text), condensed);
        condensed_count += 1;
        output.push(record);
    }

    info!(
        chunks = chunks.len(),
        condensed = condensed_count,
        top_n = config.top_n,
        max_chars = config.max_chars,
        "Batch condensation complete"
    );

    Ok(output)
}

fn write_condensed(record: &mut ChunkRecord, field: TextField, original_len: usize, text: String) {
    let condensed_len = char_len(&text);
    record.set_text(field, text);
    record.insert(CONDENSED_KEY, true);
    record.insert(ORIGINAL_LENGTH_KEY, original_len);
    record.insert(CONDENSED_LENGTH_KEY, condensed_len);
}

/// Projects result records onto `{text, score, index}` for condensation.
///
/// Only records with a `text` key are kept, in order. A missing `score` becomes `1.0`; `index` is
/// copied only when present.
pub fn prepare_chunks_for_condensation(results: &[ChunkRecord]) -> Vec<ChunkRecord> {
    results
        .iter()
        .filter_map(|result| {
            let text = result.get(TextField::Text.key())?;
            let score = result
                .get(SCORE_KEY)
                .cloned()
                .unwrap_or_else(|| Value::from(DEFAULT_CHUNK_SCORE));

            let mut chunk = ChunkRecord::new()
                .with(TextField::Text.key(), text.clone())
                .with(SCORE_KEY, score);
            if let Some(index) = result.index() {
                chunk.insert(INDEX_KEY, index.clone());
            }
            Some(chunk)
        })
        .collect()
}

/// Merges condensed chunks back into `results` in place, joined on `index`.
///
/// Results without a `text` key or without an `index` are skipped. For the others the first
/// condensed chunk with an equal `index` supplies `text` (kept if the chunk has none),
/// `original_length` and `condensed_length` (null if the chunk has none), and `condensed` is set
/// to `true`. Chunks matching no result are ignored.
///
/// The join is a linear scan per result, O(n·m); swapping in a keyed lookup would not change the
/// first-match-wins behavior as long as the lookup keeps the first chunk per index.
pub fn apply_condensation_to_results(results: &mut [ChunkRecord], condensed_chunks: &[ChunkRecord]) {
    let mut applied = 0usize;

    for result in results.iter_mut() {
        if !result.contains_key(TextField::Text.key()) {
            continue;
        }
        let Some(index) = result.index() else {
            continue;
        };
        let Some(chunk) = condensed_chunks
            .iter()
            .find(|chunk| chunk.index() == Some(index))
        else {
            continue;
        };

        let original_len = chunk.get(ORIGINAL_LENGTH_KEY).cloned().unwrap_or(Value::Null);
        let condensed_len = chunk
            .get(CONDENSED_LENGTH_KEY)
            .cloned()
            .unwrap_or(Value::Null);

        if let Some(text) = chunk.get(TextField::Text.key()) {
            result.insert(TextField::Text.key(), text.clone());
        }
        result.insert(CONDENSED_KEY, true);
        result.insert(ORIGINAL_LENGTH_KEY, original_len);
        result.insert(CONDENSED_LENGTH_KEY, condensed_len);
        applied += 1;
    }

    debug!(
        results = results.len(),
        chunks = condensed_chunks.len(),
        applied,
        "Applied condensation to results"
    );
}
