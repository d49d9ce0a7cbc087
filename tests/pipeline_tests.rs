//! End-to-end tests through the public API with stub models.

use std::io::Write;

use condense::{
    CondensationConfig, CondenseRequest, CondenseResponse, Config, EmbeddingError, EncoderConfig,
    Pipeline, PipelineError, SentenceEncoder, condense_chunk,
};
use serde_json::json;
use tempfile::{NamedTempFile, TempDir};

const ML_FAQ: &str = "What is machine learning? It lets computers learn patterns from data! \
                      How is it trained? Models are fitted on labeled examples! \
                      Why does it fail? Overfitting memorizes noise instead of signal! \
                      What helps? Cross-validation catches overfitting early!";

#[test]
fn test_stub_encoder_condenses_within_budget() {
    let encoder = SentenceEncoder::load(EncoderConfig::stub()).expect("stub encoder loads");
    let config = CondensationConfig::new(3, 120);

    let condensed = condense_chunk("how is overfitting caught", ML_FAQ, &encoder, &config).unwrap();

    assert!(condensed.chars().count() <= 123);
    assert!(condensed.chars().count() < ML_FAQ.chars().count());
}

#[test]
fn test_condense_request_from_json() {
    let pipeline = Pipeline::stub();
    let request: CondenseRequest = serde_json::from_str(
        &json!({
            "question": "How is overfitting caught?",
            "passages": [ML_FAQ, "Python is a popular programming language."],
            "rerank": true,
            "condense": {"top_n": 2, "max_chars": 100, "preserve_references": false},
            "options": {"return_text": true, "top_k": 5}
        })
        .to_string(),
    )
    .unwrap();

    let response = pipeline.condense(&request).unwrap();
    let body = serde_json::to_value(&response).unwrap();

    assert_eq!(body["condensation_applied"], true);
    assert_eq!(body["condensation_params"]["max_chars"], 100);
    assert_eq!(body["reranked"].as_array().unwrap().len(), 2);
    for result in body["reranked"].as_array().unwrap() {
        assert_eq!(result["condensed"], true);
        let len = result["text"].as_str().unwrap().chars().count();
        assert!(len <= 103);
    }

    let round_trip: CondenseResponse = serde_json::from_value(body).unwrap();
    assert_eq!(round_trip, response);
}

#[test]
fn test_pipeline_from_default_config() {
    let pipeline = Pipeline::from_config(&Config::default()).expect("stub pipeline loads");

    assert!(pipeline.encoder().is_stub());
    assert!(!pipeline.reranker().is_model_loaded());
    assert_eq!(pipeline.describe().default_model, "all-MiniLM-L6-v2");
}

#[test]
fn test_pipeline_uses_catalog_names() {
    let mut catalog = NamedTempFile::new().unwrap();
    catalog
        .write_all(
            json!({
                "default_model": "bge-small-en-v1.5",
                "default_reranker": "bge-reranker-base",
                "available_models": [{"name": "bge-small-en-v1.5"}]
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();
    let config = Config {
        catalog_path: Some(catalog.path().to_path_buf()),
        ..Default::default()
    };

    let pipeline = Pipeline::from_config(&config).unwrap();
    let info = pipeline.describe();

    assert_eq!(info.default_model, "bge-small-en-v1.5");
    assert_eq!(info.reranker.model, "bge-reranker-base");
    assert_eq!(info.embedding_models.len(), 1);

    let response = pipeline
        .condense(&CondenseRequest::new("q", vec!["passage".to_string()]))
        .unwrap();
    assert_eq!(response.reranker.as_deref(), Some("bge-reranker-base"));
}

#[test]
fn test_pipeline_rejects_incomplete_model_dir() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        embedder_path: Some(dir.path().to_path_buf()),
        ..Default::default()
    };

    let err = Pipeline::from_config(&config).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Embedding(EmbeddingError::ModelNotFound { .. })
    ));
}

#[test]
fn test_missing_catalog_falls_back_to_defaults() {
    let config = Config {
        catalog_path: Some("/nonexistent/catalog.json".into()),
        ..Default::default()
    };

    config.validate().expect("catalog is not required at startup");
    let pipeline = Pipeline::from_config(&config).expect("pipeline loads without a catalog");

    assert_eq!(pipeline.describe().default_model, "all-MiniLM-L6-v2");
}
