use std::path::PathBuf;

use crate::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL, DEFAULT_MAX_SEQ_LEN};
use crate::embedding::device::DeviceKind;
use crate::embedding::error::EmbeddingError;

#[derive(Debug, Clone)]
/// Configuration for [`SentenceEncoder`](super::SentenceEncoder).
pub struct EncoderConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    /// `None` selects the deterministic stub backend.
    pub model_dir: Option<PathBuf>,
    /// Name reported in responses.
    pub model_name: String,
    /// Max tokens per text; longer inputs are truncated.
    pub max_seq_len: usize,
    /// Output width of the stub backend (a loaded model reports its own hidden size).
    pub stub_dim: usize,
    /// Requested compute backend.
    pub device: DeviceKind,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            model_name: DEFAULT_EMBEDDING_MODEL.to_string(),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            stub_dim: DEFAULT_EMBEDDING_DIM,
            device: DeviceKind::Cpu,
        }
    }
}

impl EncoderConfig {
    /// Config for a model directory, named after the directory.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        let model_dir = model_dir.into();
        let model_name = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());

        Self {
            model_dir: Some(model_dir),
            model_name,
            ..Default::default()
        }
    }

    /// Stub config (no model files; hashed bag-of-words vectors).
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

    pub fn is_stub(&self) -> bool {
        self.model_dir.is_none()
    }

    /// Checks the directory layout for model mode; stub mode only needs non-zero sizes.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }

        let Some(dir) = &self.model_dir else {
            if self.stub_dim == 0 {
                return Err(EmbeddingError::InvalidConfig {
                    reason: "stub_dim must be greater than zero".to_string(),
                });
            }
            return Ok(());
        };

        if dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir cannot be empty when provided".to_string(),
            });
        }

        for required in ["config.json", "model.safetensors", "tokenizer.json"] {
            let path = dir.join(required);
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound { path });
            }
        }

        Ok(())
    }
}
