use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::condense::{ChunkRecord, CondensationConfig};
use crate::embedding::RankedPassage;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub text: Vec<String>,

    /// Must name the loaded encoder when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Overrides the reported `dimensions` only; vectors are not resized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
    pub model: String,
}

/// Reranking options of a [`CondenseRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankOptions {
    /// Must name the loaded reranker when set.
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_true")]
    pub return_text: bool,

    #[serde(default)]
    pub top_k: Option<usize>,
}

impl Default for RerankOptions {
    fn default() -> Self {
        Self {
            model: None,
            return_text: true,
            top_k: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondenseRequest {
    pub question: String,
    pub passages: Vec<String>,

    #[serde(default)]
    pub options: Option<RerankOptions>,

    /// Score with the cross-encoder (`true`, the default) or keep input order.
    #[serde(default = "default_true")]
    pub rerank: bool,

    /// Condense the returned passages when present.
    #[serde(default)]
    pub condense: Option<CondensationConfig>,
}

impl CondenseRequest {
    pub fn new(question: impl Into<String>, passages: Vec<String>) -> Self {
        Self {
            question: question.into(),
            passages,
            options: None,
            rerank: true,
            condense: None,
        }
    }

    pub fn with_options(mut self, options: RerankOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_rerank(mut self, rerank: bool) -> Self {
        self.rerank = rerank;
        self
    }

    pub fn with_condense(mut self, condense: CondensationConfig) -> Self {
        self.condense = Some(condense);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CondenseResponse {
    pub reranked: Vec<ChunkRecord>,

    /// Reranker name, absent when reranking was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reranker: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condensation_applied: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condensation_params: Option<CondensationConfig>,
}

impl CondenseResponse {
    /// Text of each returned passage, in response order. `None` for passages returned without
    /// text.
    pub fn texts(&self) -> Vec<Option<&str>> {
        self.reranked
            .iter()
            .map(|r| r.get("text").and_then(Value::as_str))
            .collect()
    }
}

impl From<RankedPassage> for ChunkRecord {
    fn from(passage: RankedPassage) -> Self {
        let mut record = ChunkRecord::new()
            .with("index", passage.index)
            .with("score", passage.score);
        if let Some(text) = passage.text {
            record.insert("text", text);
        }
        record
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RerankerInfo {
    pub model: String,
    /// `false` when scoring falls back to lexical overlap.
    pub loaded: bool,
}

/// What the service runs with.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub embedding_models: Vec<Value>,
    pub default_model: String,
    pub dimensions: usize,
    pub reranker: RerankerInfo,
    pub status: &'static str,
}
