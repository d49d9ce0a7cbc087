pub mod config;
pub mod error;


pub use config::RerankerConfig;
pub use error::RerankerError;

use std::collections::HashSet;

use candle_core::Device;
use serde::{Deserialize, Serialize};
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info, warn};

use crate::constants::PASSTHROUGH_SCORE;
use crate::embedding::bert::BertClassifier;
use crate::embedding::device::select_device;
use crate::embedding::similarity::by_score_desc;
use crate::embedding::utils::{load_batch_tokenizer, stack_encodings};

/// One passage after (optional) reranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPassage {
    /// Position of the passage in the caller's input list.
    pub index: usize,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

pub struct Reranker {
    device: Device,
    config: RerankerConfig,
    model: Option<(BertClassifier, Tokenizer)>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl Reranker {
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        if let Err(msg) = config.validate() {
            return Err(RerankerError::InvalidConfig { reason: msg });
        }

        let Some(model_dir) = config.model_dir.clone() else {
            warn!(
                model_name = %config.model_name,
                "No reranker model configured, scoring by lexical overlap (stub mode)"
            );
            return Ok(Self {
                device: Device::Cpu,
                config,
                model: None,
            });
        };

        for required in ["config.json", "model.safetensors", "tokenizer.json"] {
            if !model_dir.join(required).exists() {
                return Err(RerankerError::ModelLoadFailed {
                    reason: format!("Missing {} in {}", required, model_dir.display()),
                });
            }
        }

        let device = select_device(config.device);
        debug!(?device, "Selected compute device for reranker");

        let model = BertClassifier::load(&model_dir, &device).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load cross-encoder: {}", e),
            }
        })?;

        let tokenizer = load_batch_tokenizer(&model_dir, config.max_seq_len).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        info!(
            model_dir = %model_dir.display(),
            model_name = %config.model_name,
            "Reranker model loaded"
        );

        Ok(Self {
            device,
            config,
            model: Some((model, tokenizer)),
        })
    }

    pub fn stub() -> Self {
        Self {
            device: Device::Cpu,
            config: RerankerConfig::stub(),
            model: None,
        }
    }

    pub fn score(&self, query: &str, passage: &str) -> Result<f32, RerankerError> {
        let mut scores = self.score_batch(query, &[passage])?;
        scores.pop().ok_or_else(|| RerankerError::InferenceFailed {
            reason: "cross-encoder returned no score".to_string(),
        })
    }

    /// Scores every `(query, passage)` pair in one forward pass. Output order matches `passages`.
    pub fn score_batch(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>, RerankerError> {
        if passages.is_empty() {
            return Ok(vec![]);
        }

        debug!(
            query_len = query.len(),
            num_passages = passages.len(),
            model_loaded = self.is_model_loaded(),
            "Scoring query-passage pairs"
        );

        let Some((model, tokenizer)) = &self.model else {
            return Ok(passages.iter().map(|p| lexical_overlap(query, p)).collect());
        };

        let pairs: Vec<(&str, &str)> = passages.iter().map(|p| (query, *p)).collect();
        let encodings =
            tokenizer
                .encode_batch(pairs, true)
                .map_err(|e| RerankerError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        let input_ids = stack_encodings(&encodings, &self.device, Encoding::get_ids)?;
        let type_ids = stack_encodings(&encodings, &self.device, Encoding::get_type_ids)?;
        let attention_mask =
            stack_encodings(&encodings, &self.device, Encoding::get_attention_mask)?;

        let logits = model
            .forward(&input_ids, &type_ids, Some(&attention_mask))
            .map_err(|e| RerankerError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let scores = logits.flatten_all()?.to_vec1::<f32>()?;
        if scores.len() != passages.len() {
            return Err(RerankerError::InferenceFailed {
                reason: format!("expected {} logits, got {}", passages.len(), scores.len()),
            });
        }
        Ok(scores)
    }

    /// Scores passages against `question`, sorted by score descending (ties keep input order),
    /// then cut to `top_k`.
    pub fn rerank_passages(
        &self,
        question: &str,
        passages: &[String],
        return_text: bool,
        top_k: Option<usize>,
    ) -> Result<Vec<RankedPassage>, RerankerError> {
        let refs: Vec<&str> = passages.iter().map(String::as_str).collect();
        let scores = self.score_batch(question, &refs)?;

        let ranked = rank_passages(passages, scores, return_text, top_k);

        debug!(
            top_score = ranked.first().map(|r| r.score),
            returned = ranked.len(),
            total = passages.len(),
            "Reranking complete"
        );

        Ok(ranked)
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }
}

/// Results for a request that skips reranking: input order, constant score.
pub fn passthrough(
    passages: &[String],
    return_text: bool,
    top_k: Option<usize>,
) -> Vec<RankedPassage> {
    let limit = top_k.unwrap_or(passages.len());
    passages
        .iter()
        .take(limit)
        .enumerate()
        .map(|(index, passage)| RankedPassage {
            index,
            score: PASSTHROUGH_SCORE,
            text: return_text.then(|| passage.clone()),
        })
        .collect()
}

/// Pairs passages with their scores, sorts by score descending (NaN last, ties in input order)
/// and keeps the first `top_k`.
fn rank_passages(
    passages: &[String],
    scores: Vec<f32>,
    return_text: bool,
    top_k: Option<usize>,
) -> Vec<RankedPassage> {
    let mut ranked: Vec<RankedPassage> = passages
        .iter()
        .zip(scores)
        .enumerate()
        .map(|(index, (passage, score))| RankedPassage {
            index,
            score,
            text: return_text.then(|| passage.clone()),
        })
        .collect();

    ranked.sort_by(|a, b| by_score_desc(a.score, b.score));

    if let Some(k) = top_k {
        ranked.truncate(k);
    }
    ranked
}

/// Share of the query's distinct words (three letters or longer) found in the passage.
fn lexical_overlap(query: &str, passage: &str) -> f32 {
    fn words(text: &str) -> HashSet<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= 3)
            .map(str::to_lowercase)
            .collect()
    }

    let query_words = words(query);
    if query_words.is_empty() {
        return 0.0;
    }
    let passage_words = words(passage);
    let hits = query_words.intersection(&passage_words).count();
    hits as f32 / query_words.len() as f32
}
