//! BERT backbones loaded from a Hugging Face style directory
//! (`config.json` + `model.safetensors`).
//!
//! - [`BertEncoder`] produces mean-pooled sentence embeddings (sentence-transformers layout).
//! - [`BertClassifier`] puts the pooler and a single-logit head on the `[CLS]` token
//!   (cross-encoder layout).

use std::path::Path;
use std::sync::Arc;

use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_core::IndexOp;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};

fn read_config(model_dir: &Path) -> Result<Config> {
    let config_content = std::fs::read_to_string(model_dir.join("config.json"))?;
    serde_json::from_str(&config_content)
        .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))
}

fn var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights_path = model_dir.join("model.safetensors");
    // SAFETY: the weights file is treated as read-only for the lifetime of the mapping.
    unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device) }
}

/// Prefix the checkpoint stores its backbone under (`bert`, `roberta` or none).
fn backbone_prefix(vb: &VarBuilder<'static>) -> Option<&'static str> {
    ["bert", "roberta"]
        .into_iter()
        .find(|prefix| vb.contains_tensor(&format!("{prefix}.embeddings.word_embeddings.weight")))
}

fn backbone_vb(vb: &VarBuilder<'static>, prefix: Option<&str>) -> VarBuilder<'static> {
    match prefix {
        Some(prefix) => vb.pp(prefix),
        None => vb.clone(),
    }
}

fn load_backbone(vb: &VarBuilder<'static>, config: &Config) -> Result<BertModel> {
    BertModel::load(backbone_vb(vb, backbone_prefix(vb)), config)
}

struct EncoderInner {
    bert: BertModel,
    hidden_size: usize,
}

/// Sentence encoder: BERT hidden states averaged over non-padding tokens.
#[derive(Clone)]
pub struct BertEncoder(Arc<EncoderInner>);

impl BertEncoder {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config = read_config(model_dir)?;
        let vb = var_builder(model_dir, device)?;
        let bert = load_backbone(&vb, &config)?;

        Ok(Self(Arc::new(EncoderInner {
            bert,
            hidden_size: config.hidden_size,
        })))
    }

    pub fn hidden_size(&self) -> usize {
        self.0.hidden_size
    }

    /// Runs a padded batch and returns `[batch, hidden]` mean-pooled embeddings.
    ///
    /// All three inputs are `[batch, seq_len]`; `attention_mask` is 1 for real tokens.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor> {
        let hidden = self
            .0
            .bert
            .forward(input_ids, token_type_ids, Some(attention_mask))?;

        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9f32, f32::MAX)?;
        summed.broadcast_div(&counts)
    }
}

/// Sequence-classification head: `classifier(tanh(pooler.dense(h[CLS])))`.
struct ClassificationHead {
    pooler: Linear,
    classifier: Linear,
}

impl ClassificationHead {
    /// The pooler sits under the backbone prefix, the classifier at the top level.
    fn load(vb: &VarBuilder<'static>, prefix: Option<&str>, hidden_size: usize) -> Result<Self> {
        let pooler = candle_nn::linear(
            hidden_size,
            hidden_size,
            backbone_vb(vb, prefix).pp("pooler.dense"),
        )?;
        let classifier = candle_nn::linear(hidden_size, 1, vb.pp("classifier"))?;
        Ok(Self { pooler, classifier })
    }

    /// `[batch, hidden]` CLS states to `[batch, 1]` logits.
    fn forward(&self, cls_token: &Tensor) -> Result<Tensor> {
        let pooled = self.pooler.forward(cls_token)?.tanh()?;
        self.classifier.forward(&pooled)
    }
}

struct ClassifierInner {
    bert: BertModel,
    head: ClassificationHead,
}

/// Cross-encoder: one relevance logit per (query, passage) pair.
#[derive(Clone)]
pub struct BertClassifier(Arc<ClassifierInner>);

impl BertClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config = read_config(model_dir)?;
        let vb = var_builder(model_dir, device)?;
        let prefix = backbone_prefix(&vb);
        let bert = BertModel::load(backbone_vb(&vb, prefix), &config)?;
        let head = ClassificationHead::load(&vb, prefix, config.hidden_size)?;

        Ok(Self(Arc::new(ClassifierInner { bert, head })))
    }

    /// Returns `[batch, 1]` logits.
    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let output = self
            .0
            .bert
            .forward(input_ids, token_type_ids, attention_mask)?;
        let cls_token = output.i((.., 0, ..))?;
        self.0.head.forward(&cls_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const CLS: [f32; 2] = [0.5, -1.0];

    /// Writes a two-dimensional head whose pooler weight is `scale * I`.
    fn write_head(pooler_scale: f32) -> TempDir {
        let dir = TempDir::new().unwrap();
        let device = Device::Cpu;
        let tensors: HashMap<String, Tensor> = [
            (
                "bert.pooler.dense.weight",
                Tensor::new(&[[pooler_scale, 0.0f32], [0.0, pooler_scale]], &device),
            ),
            ("bert.pooler.dense.bias", Tensor::new(&[0.0f32, 0.0], &device)),
            ("classifier.weight", Tensor::new(&[[1.0f32, 1.0]], &device)),
            ("classifier.bias", Tensor::new(&[0.25f32], &device)),
        ]
        .into_iter()
        .map(|(name, tensor)| (name.to_string(), tensor.unwrap()))
        .collect();
        candle::safetensors::save(&tensors, dir.path().join("model.safetensors")).unwrap();
        dir
    }

    fn head_score(dir: &TempDir) -> f32 {
        let vb = var_builder(dir.path(), &Device::Cpu).unwrap();
        let head = ClassificationHead::load(&vb, Some("bert"), CLS.len()).unwrap();
        let cls = Tensor::new(&[CLS], &Device::Cpu).unwrap();
        let logits = head.forward(&cls).unwrap();
        assert_eq!(logits.dims(), &[1, 1]);
        logits.flatten_all().unwrap().to_vec1::<f32>().unwrap()[0]
    }

    #[test]
    fn test_head_applies_tanh_pooler_before_classifier() {
        let dir = write_head(1.0);

        let expected = 0.5f32.tanh() + (-1.0f32).tanh() + 0.25;
        assert!((head_score(&dir) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_pooler_weights_change_the_score() {
        let identity = head_score(&write_head(1.0));
        let doubled = head_score(&write_head(2.0));

        let expected = 1.0f32.tanh() + (-2.0f32).tanh() + 0.25;
        assert!((doubled - expected).abs() < 1e-5);
        assert!((identity - doubled).abs() > 1e-3);
    }

    #[test]
    fn test_head_requires_pooler_weights() {
        let dir = TempDir::new().unwrap();
        let device = Device::Cpu;
        let tensors: HashMap<String, Tensor> = HashMap::from([
            (
                "classifier.weight".to_string(),
                Tensor::new(&[[1.0f32, 1.0]], &device).unwrap(),
            ),
            (
                "classifier.bias".to_string(),
                Tensor::new(&[0.0f32], &device).unwrap(),
            ),
        ]);
        candle::safetensors::save(&tensors, dir.path().join("model.safetensors")).unwrap();
        let vb = var_builder(dir.path(), &device).unwrap();

        assert!(ClassificationHead::load(&vb, Some("bert"), 2).is_err());
    }
}
