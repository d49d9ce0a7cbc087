//! Sentence encoder (BERT + mean pooling), the production [`SimilarityProvider`].
//!
//! Use [`EncoderConfig::stub`] for tests and examples without model files.

/// Encoder configuration.
pub mod config;

#[cfg(test)]
mod tests;

pub use config::EncoderConfig;

use candle_core::Device;
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info, warn};

use crate::embedding::bert::BertEncoder;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::similarity::{SimilarityProvider, normalize};
use crate::embedding::utils::{load_batch_tokenizer, stack_encodings};

enum EncoderBackend {
    Model {
        model: BertEncoder,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub,
}

/// Embedding generator used for sentence scoring and the embed endpoint.
pub struct SentenceEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
    dimensions: usize,
}

impl std::fmt::Debug for SentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("model_name", &self.config.model_name)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl SentenceEncoder {
    /// Loads the encoder (stub mode when `config.model_dir` is `None`).
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let Some(model_dir) = config.model_dir.clone() else {
            warn!(
                model_name = %config.model_name,
                "Sentence encoder running in STUB mode (hashed bag-of-words)"
            );
            let dimensions = config.stub_dim;
            return Ok(Self {
                backend: EncoderBackend::Stub,
                config,
                dimensions,
            });
        };

        let device = select_device(config.device);
        debug!(?device, "Selected compute device for sentence encoder");

        let model =
            BertEncoder::load(&model_dir, &device).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {}", e),
            })?;

        let tokenizer = load_batch_tokenizer(&model_dir, config.max_seq_len).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        let dimensions = model.hidden_size();
        info!(
            model_dir = %model_dir.display(),
            model_name = %config.model_name,
            dimensions,
            max_seq_len = config.max_seq_len,
            "Sentence encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
            dimensions,
        })
    }

    /// Stub encoder with the default config, without going through validation.
    pub fn stub() -> Self {
        let config = EncoderConfig::stub();
        let dimensions = config.stub_dim;
        Self {
            backend: EncoderBackend::Stub,
            config,
            dimensions,
        }
    }

    fn encode_with_model(
        &self,
        texts: &[&str],
        model: &BertEncoder,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encodings = tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::TokenizationFailed {
                reason: e.to_string(),
            })?;

        let input_ids = stack_encodings(&encodings, device, Encoding::get_ids)?;
        let type_ids = stack_encodings(&encodings, device, Encoding::get_type_ids)?;
        let attention_mask = stack_encodings(&encodings, device, Encoding::get_attention_mask)?;

        debug!(
            batch = texts.len(),
            seq_len = encodings.first().map(|e| e.len()).unwrap_or(0),
            "Encoder forward pass"
        );

        let pooled = model
            .forward(&input_ids, &type_ids, &attention_mask)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Encoder forward pass failed: {}", e),
            })?;

        let mut rows = pooled.to_vec2::<f32>()?;
        for row in &mut rows {
            normalize(row);
        }
        Ok(rows)
    }

    /// Feature-hashed bag of lowercase words, so texts sharing vocabulary score as similar.
    fn encode_stub(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = fnv1a(&word.to_lowercase());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize(&mut vector);
        vector
    }

    /// Output embedding width.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl SimilarityProvider for SentenceEncoder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut batch = self.embed_batch(&[text])?;
        batch.pop().ok_or_else(|| EmbeddingError::InferenceFailed {
            reason: "encoder returned no embedding".to_string(),
        })
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let embeddings = match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.encode_with_model(texts, model, tokenizer, device)?,
            EncoderBackend::Stub => texts.iter().map(|t| self.encode_stub(t)).collect(),
        };

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!(
                    "expected {} embeddings, encoder produced {}",
                    texts.len(),
                    embeddings.len()
                ),
            });
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: bad.len(),
            });
        }

        Ok(embeddings)
    }
}

fn fnv1a(text: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    text.bytes()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}
