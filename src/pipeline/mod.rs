//! Request-level orchestration: embed, rerank, condense.
//!
//! A [`Pipeline`] owns the loaded models and turns JSON-shaped requests into responses. The
//! condense request reranks first (or keeps input order), then optionally condenses the returned
//! passages with the sentence encoder as similarity provider.

pub mod error;
pub mod types;


pub use error::{ErrorResponse, PipelineError};
pub use types::{
    CondenseRequest, CondenseResponse, EmbedRequest, EmbedResponse, RerankOptions, RerankerInfo,
    ServiceInfo,
};

use tracing::{debug, info};

use crate::condense::{
    ChunkRecord, apply_condensation_to_results, condense_chunks_batch,
    prepare_chunks_for_condensation,
};
use crate::config::{Config, ModelCatalog};
use crate::embedding::{Reranker, SentenceEncoder, SimilarityProvider, passthrough};

const SERVICE_NAME: &str = "Passage Condensation Service";

#[derive(Debug)]
pub struct Pipeline {
    encoder: SentenceEncoder,
    reranker: Reranker,
    catalog: ModelCatalog,
}

impl Pipeline {
    pub fn new(encoder: SentenceEncoder, reranker: Reranker, catalog: ModelCatalog) -> Self {
        Self {
            encoder,
            reranker,
            catalog,
        }
    }

    /// Loads the catalog and both models as configured.
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let catalog = config.load_catalog();
        let encoder = SentenceEncoder::load(config.encoder_config(&catalog))?;
        let reranker = Reranker::load(config.reranker_config(&catalog))?;

        info!(
            model = %encoder.model_name(),
            dimensions = encoder.dimensions(),
            reranker = %reranker.model_name(),
            reranker_loaded = reranker.is_model_loaded(),
            "Pipeline ready"
        );

        Ok(Self::new(encoder, reranker, catalog))
    }

    /// Stub encoder, stub reranker, default catalog.
    pub fn stub() -> Self {
        Self::new(
            SentenceEncoder::stub(),
            Reranker::stub(),
            ModelCatalog::default(),
        )
    }

    pub fn encoder(&self) -> &SentenceEncoder {
        &self.encoder
    }

    pub fn reranker(&self) -> &Reranker {
        &self.reranker
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse, PipelineError> {
        if request.text.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "text list cannot be empty".to_string(),
            ));
        }
        check_model(request.model.as_deref(), self.encoder.model_name(), "embedding")?;

        let texts: Vec<&str> = request.text.iter().map(String::as_str).collect();
        let embeddings = self.encoder.embed_batch(&texts)?;

        debug!(texts = texts.len(), "Generated embeddings");

        Ok(EmbedResponse {
            embeddings,
            dimensions: request.dimensions.unwrap_or(self.encoder.dimensions()),
            model: self.encoder.model_name().to_string(),
        })
    }

    pub fn condense(&self, request: &CondenseRequest) -> Result<CondenseResponse, PipelineError> {
        if request.question.is_empty() || request.passages.is_empty() {
            return Err(PipelineError::InvalidRequest(
                "question and passages are required".to_string(),
            ));
        }
        if let Some(ref params) = request.condense {
            params
                .validate()
                .map_err(|e| PipelineError::InvalidRequest(e.to_string()))?;
        }

        let options = request.options.clone().unwrap_or_default();

        let (ranked, reranker) = if request.rerank {
            check_model(options.model.as_deref(), self.reranker.model_name(), "reranker")?;
            let ranked = self.reranker.rerank_passages(
                &request.question,
                &request.passages,
                options.return_text,
                options.top_k,
            )?;
            (ranked, Some(self.reranker.model_name().to_string()))
        } else {
            let ranked = passthrough(&request.passages, options.return_text, options.top_k);
            (ranked, None)
        };

        let mut results: Vec<ChunkRecord> = ranked.into_iter().map(ChunkRecord::from).collect();

        let mut condensation_applied = None;
        let mut condensation_params = None;
        if let Some(params) = request.condense {
            let chunks = prepare_chunks_for_condensation(&results);
            if !chunks.is_empty() {
                let condensed =
                    condense_chunks_batch(&request.question, &chunks, &self.encoder, &params)?;
                apply_condensation_to_results(&mut results, &condensed);
                condensation_applied = Some(true);
                condensation_params = Some(params);
            }
        }

        info!(
            passages = request.passages.len(),
            returned = results.len(),
            reranked = reranker.is_some(),
            condensed = condensation_applied.is_some(),
            "Condense request complete"
        );

        Ok(CondenseResponse {
            reranked: results,
            reranker,
            condensation_applied,
            condensation_params,
        })
    }

    pub fn describe(&self) -> ServiceInfo {
        ServiceInfo {
            service: SERVICE_NAME,
            embedding_models: self.catalog.available_models.clone(),
            default_model: self.encoder.model_name().to_string(),
            dimensions: self.encoder.dimensions(),
            reranker: RerankerInfo {
                model: self.reranker.model_name().to_string(),
                loaded: self.reranker.is_model_loaded(),
            },
            status: "ready",
        }
    }
}

/// Models load once at startup, so a request may only name the one that is loaded.
fn check_model(requested: Option<&str>, loaded: &str, role: &str) -> Result<(), PipelineError> {
    match requested {
        Some(name) if name != loaded => Err(PipelineError::InvalidRequest(format!(
            "{role} model '{name}' is not loaded (serving '{loaded}')"
        ))),
        _ => Ok(()),
    }
}
