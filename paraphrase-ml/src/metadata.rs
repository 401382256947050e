//! Model artifact metadata
//!
//! The export step writes a JSON sidecar next to the model file
//! (`models/mrpc_model.onnx` -> `models/mrpc_model.json`) describing how the
//! artifact was produced. It is optional: without it the engine assumes the
//! reference classifier's defaults.

use anyhow::{bail, Context, Result};
use paraphrase_core::Label;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::tokenizer::{DEFAULT_MAX_LENGTH, DEFAULT_TOKENIZER};

/// Metadata for an exported classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetadata {
    /// Original model name or path (e.g., "google/bert_uncased_L-2_H-128_A-2")
    pub model_name_or_path: String,
    /// Tokenizer the model was trained with
    pub tokenizer_name: String,
    /// Maximum sequence length the model was trained with
    pub max_seq_length: usize,
    /// Number of output labels/classes
    pub num_labels: usize,
    /// Label names in output order
    pub labels: Vec<String>,
    /// Vocabulary size of the training tokenizer
    pub vocab_size: Option<usize>,
    /// SHA-256 fingerprint of the training vocabulary
    pub vocab_fingerprint: Option<String>,
    /// ONNX opset used for export
    pub opset_version: Option<u32>,
    /// Checkpoint the artifact was exported from
    pub exported_from: Option<String>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            model_name_or_path: DEFAULT_TOKENIZER.to_string(),
            tokenizer_name: DEFAULT_TOKENIZER.to_string(),
            max_seq_length: DEFAULT_MAX_LENGTH,
            num_labels: Label::ALL.len(),
            labels: Label::ALL.iter().map(|l| l.as_str().to_string()).collect(),
            vocab_size: None,
            vocab_fingerprint: None,
            opset_version: None,
            exported_from: None,
        }
    }
}

impl ModelMetadata {
    /// Load metadata from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let metadata_path = path.as_ref();
        let contents = std::fs::read_to_string(metadata_path)
            .with_context(|| format!("Failed to read metadata file: {:?}", metadata_path))?;

        let metadata: ModelMetadata = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse metadata JSON: {:?}", metadata_path))?;

        Ok(metadata)
    }

    /// Sidecar path for a model file
    ///
    /// E.g., models/mrpc_model.onnx -> models/mrpc_model.json
    pub fn sidecar_path<P: AsRef<Path>>(model_path: P) -> PathBuf {
        model_path.as_ref().with_extension("json")
    }

    /// Load the sidecar for `model_path`, falling back to defaults when absent
    pub fn load_for<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let metadata_path = Self::sidecar_path(model_path);

        if metadata_path.exists() {
            Self::from_file(&metadata_path).context("Failed to load model metadata")
        } else {
            tracing::warn!(
                "Metadata file not found: {:?}. Using default values.",
                metadata_path
            );
            Ok(Self {
                model_name_or_path: model_path.to_string_lossy().to_string(),
                ..Self::default()
            })
        }
    }

    /// Check the metadata agrees with the fixed label set
    pub fn validate(&self) -> Result<()> {
        if self.num_labels != Label::ALL.len() {
            bail!(
                "Model declares {} labels, expected {}",
                self.num_labels,
                Label::ALL.len()
            );
        }

        if !self.labels.is_empty() {
            let expected: Vec<&str> = Label::ALL.iter().map(|l| l.as_str()).collect();
            if self.labels != expected {
                bail!(
                    "Model label order {:?} does not match {:?}",
                    self.labels,
                    expected
                );
            }
        }

        if self.max_seq_length == 0 {
            bail!("max_seq_length must be greater than 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_serialization() {
        let metadata = ModelMetadata {
            model_name_or_path: "test-model".to_string(),
            vocab_size: Some(30522),
            vocab_fingerprint: Some("abc123".to_string()),
            opset_version: Some(10),
            ..ModelMetadata::default()
        };

        let json = serde_json::to_string_pretty(&metadata).unwrap();
        let parsed: ModelMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, metadata);
        assert_eq!(parsed.max_seq_length, 512);
    }

    #[test]
    fn test_partial_sidecar_uses_defaults() {
        let parsed: ModelMetadata =
            serde_json::from_str(r#"{"vocab_fingerprint": "deadbeef"}"#).unwrap();
        assert_eq!(parsed.num_labels, 2);
        assert_eq!(parsed.labels, vec!["not_paraphrase", "paraphrase"]);
        assert_eq!(parsed.vocab_fingerprint.as_deref(), Some("deadbeef"));
    }

    #[test]
    fn test_sidecar_path() {
        let path = ModelMetadata::sidecar_path("models/mrpc_model.onnx");
        assert_eq!(path, Path::new("models/mrpc_model.json"));
    }

    #[test]
    fn test_load_for_without_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.onnx");

        let metadata = ModelMetadata::load_for(&model).unwrap();
        assert_eq!(metadata.num_labels, 2);
        assert!(metadata.model_name_or_path.ends_with("model.onnx"));
    }

    #[test]
    fn test_load_for_reads_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.onnx");
        std::fs::write(
            dir.path().join("model.json"),
            r#"{"model_name_or_path": "mrpc", "opset_version": 10}"#,
        )
        .unwrap();

        let metadata = ModelMetadata::load_for(&model).unwrap();
        assert_eq!(metadata.model_name_or_path, "mrpc");
        assert_eq!(metadata.opset_version, Some(10));
    }

    #[test]
    fn test_validate() {
        assert!(ModelMetadata::default().validate().is_ok());

        let wrong_count = ModelMetadata {
            num_labels: 3,
            ..ModelMetadata::default()
        };
        assert!(wrong_count.validate().is_err());

        let swapped = ModelMetadata {
            labels: vec!["paraphrase".to_string(), "not_paraphrase".to_string()],
            ..ModelMetadata::default()
        };
        assert!(swapped.validate().is_err());
    }
}
