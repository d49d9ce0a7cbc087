use std::path::PathBuf;

use crate::constants::{DEFAULT_MAX_SEQ_LEN, DEFAULT_RERANKER_MODEL};
use crate::embedding::device::DeviceKind;

#[derive(Debug, Clone)]
pub struct RerankerConfig {
    /// Cross-encoder directory (`config.json`, `model.safetensors`, `tokenizer.json`).
    /// `None` runs the lexical-overlap stub.
    pub model_dir: Option<PathBuf>,

    pub model_name: String,

    pub max_seq_len: usize,

    pub device: DeviceKind,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            model_name: DEFAULT_RERANKER_MODEL.to_string(),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            device: DeviceKind::Cpu,
        }
    }
}

impl RerankerConfig {
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: Some(model_dir.into()),
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    pub fn with_device(mut self, device: DeviceKind) -> Self {
        self.device = device;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_seq_len == 0 {
            return Err("max_seq_len must be greater than zero".to_string());
        }

        if let Some(ref path) = self.model_dir
            && path.as_os_str().is_empty()
        {
            return Err("model_dir cannot be empty when provided".to_string());
        }

        Ok(())
    }
}
