use std::io;
use std::path::Path;

use candle_core::{Device, Tensor};
use tokenizers::{Encoding, PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// Loads `tokenizer.json` from a model directory or an explicit tokenizer path.
pub fn load_tokenizer(model_path: &Path) -> io::Result<Tokenizer> {
    let tokenizer_path = if model_path
        .file_name()
        .is_some_and(|name| name == std::ffi::OsStr::new("tokenizer.json"))
    {
        model_path.to_path_buf()
    } else if model_path.is_dir() {
        model_path.join("tokenizer.json")
    } else {
        model_path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Model path has no parent"))?
            .join("tokenizer.json")
    };

    Tokenizer::from_file(&tokenizer_path).map_err(io::Error::other)
}

/// Loads a tokenizer that truncates to `max_len` tokens and pads each batch to its longest item.
///
/// Batched encoder calls need rectangular input; the attention mask marks the padding.
pub fn load_batch_tokenizer(model_path: &Path, max_len: usize) -> io::Result<Tokenizer> {
    let mut tokenizer = load_tokenizer(model_path)?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };
    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    }));

    Ok(tokenizer)
}

/// Stacks one field of a padded batch of encodings into a `[batch, seq_len]` u32 tensor.
pub fn stack_encodings(
    encodings: &[Encoding],
    device: &Device,
    field: fn(&Encoding) -> &[u32],
) -> candle_core::Result<Tensor> {
    let seq_len = encodings.first().map(|e| field(e).len()).unwrap_or(0);
    let mut flat = Vec::with_capacity(encodings.len() * seq_len);
    for encoding in encodings {
        let values = field(encoding);
        if values.len() != seq_len {
            return Err(candle_core::Error::Msg(format!(
                "ragged batch: expected {} tokens, got {}",
                seq_len,
                values.len()
            )));
        }
        flat.extend_from_slice(values);
    }
    Tensor::from_vec(flat, (encodings.len(), seq_len), device)
}
