use super::*;
use crate::embedding::device::DeviceKind;
use crate::embedding::similarity::cosine_similarity;
use std::path::PathBuf;

mod config_tests {
    use super::*;

    #[test]
    fn test_encoder_config_default_is_stub() {
        let config = EncoderConfig::default();
        assert!(config.is_stub());
        assert_eq!(config.model_name, "all-MiniLM-L6-v2");
        assert_eq!(config.stub_dim, 384);
        assert_eq!(config.max_seq_len, 512);
        assert_eq!(config.device, DeviceKind::Cpu);
    }

    #[test]
    fn test_encoder_config_new_names_model_after_dir() {
        let config = EncoderConfig::new("/models/all-mpnet-base-v2");
        assert_eq!(
            config.model_dir,
            Some(PathBuf::from("/models/all-mpnet-base-v2"))
        );
        assert_eq!(config.model_name, "all-mpnet-base-v2");
        assert!(!config.is_stub());
    }

    #[test]
    fn test_encoder_config_builders() {
        let config = EncoderConfig::stub()
            .with_model_name("custom")
            .with_device(DeviceKind::Metal);
        assert_eq!(config.model_name, "custom");
        assert_eq!(config.device, DeviceKind::Metal);
    }

    #[test]
    fn test_validate_stub() {
        assert!(EncoderConfig::stub().validate().is_ok());

        let zero = EncoderConfig {
            stub_dim: 0,
            ..EncoderConfig::stub()
        };
        assert!(matches!(
            zero.validate(),
            Err(EmbeddingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_validate_zero_seq_len() {
        let config = EncoderConfig {
            max_seq_len: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EmbeddingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_validate_missing_model_files() {
        let config = EncoderConfig::new("/nonexistent/encoder");
        assert!(matches!(
            config.validate(),
            Err(EmbeddingError::ModelNotFound { .. })
        ));
    }

    #[test]
    fn test_validate_reports_first_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();

        let err = EncoderConfig::new(dir.path()).validate().unwrap_err();
        match err {
            EmbeddingError::ModelNotFound { path } => {
                assert!(path.ends_with("model.safetensors"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

mod stub_tests {
    use super::*;

    #[test]
    fn test_load_stub() {
        let encoder = SentenceEncoder::load(EncoderConfig::stub()).unwrap();
        assert!(encoder.is_stub());
        assert_eq!(encoder.dimensions(), 384);
        assert_eq!(encoder.model_name(), "all-MiniLM-L6-v2");
    }

    #[test]
    fn test_load_missing_model_fails() {
        let result = SentenceEncoder::load(EncoderConfig::new("/nonexistent/encoder"));
        assert!(matches!(result, Err(EmbeddingError::ModelNotFound { .. })));
    }

    #[test]
    fn test_stub_embedding_shape_and_norm() {
        let encoder = SentenceEncoder::stub();
        let embedding = encoder.embed("Machine learning needs data").unwrap();
        assert_eq!(embedding.len(), 384);

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_stub_is_deterministic() {
        let encoder = SentenceEncoder::stub();
        let a = encoder.embed("Neural networks have layers").unwrap();
        let b = encoder.embed("Neural networks have layers").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stub_is_case_insensitive() {
        let encoder = SentenceEncoder::stub();
        let a = encoder.embed("Deep Learning").unwrap();
        let b = encoder.embed("deep learning").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_stub_empty_text_is_zero_vector() {
        let encoder = SentenceEncoder::stub();
        let embedding = encoder.embed("").unwrap();
        assert!(embedding.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_stub_shared_vocabulary_scores_higher() {
        let encoder = SentenceEncoder::stub();
        let query = encoder.embed("machine learning models").unwrap();
        let related = encoder
            .embed("Machine learning models learn from data.")
            .unwrap();
        let unrelated = encoder.embed("The weather in Lisbon is mild.").unwrap();

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_embed_batch_matches_single() {
        let encoder = SentenceEncoder::stub();
        let texts = ["first sentence", "second sentence", "third"];
        let batch = encoder.embed_batch(&texts).unwrap();
        assert_eq!(batch.len(), 3);
        for (text, embedding) in texts.iter().zip(&batch) {
            assert_eq!(&encoder.embed(text).unwrap(), embedding);
        }
    }

    #[test]
    fn test_embed_batch_empty() {
        let encoder = SentenceEncoder::stub();
        assert!(encoder.embed_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_debug_output() {
        let encoder = SentenceEncoder::stub();
        let debug = format!("{:?}", encoder);
        assert!(debug.contains("SentenceEncoder"));
        assert!(debug.contains("Stub"));
        assert!(debug.contains("384"));
    }
}
