//! Service configuration
//!
//! Priority: CLI arguments > environment variables > config file > defaults.
//! The file layer is JSON; CLI and environment overrides are applied by the
//! binary through [`ServiceConfig::apply_overrides`].

use anyhow::{Context, Result};
use paraphrase_core::{DetectorConfig, DetectorError};
use paraphrase_ml::{BackendPreference, EngineOptions, DEFAULT_MAX_LENGTH, DEFAULT_TOKENIZER};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "models/mrpc_model.onnx";
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Configuration for the paraphrase service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Exported classifier (`.onnx`, or `.pt` with the `tch-backend` feature)
    pub model_path: PathBuf,
    /// `tokenizer.json` / `vocab.txt` path, or a HuggingFace hub model id
    pub tokenizer: String,
    /// Fixed sequence length for every encoded pair
    pub max_length: usize,
    pub backend: BackendPreference,
    pub intra_threads: Option<usize>,
    /// HTTP listen address
    pub bind: String,
    pub max_input_chars: Option<usize>,
    pub verify_vocabulary: bool,
    /// Refuse to start when `max_length` differs from the artifact's
    /// training sequence length
    pub strict_sequence_length: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            tokenizer: DEFAULT_TOKENIZER.to_string(),
            max_length: DEFAULT_MAX_LENGTH,
            backend: BackendPreference::Auto,
            intra_threads: None,
            bind: DEFAULT_BIND.to_string(),
            max_input_chars: None,
            verify_vocabulary: true,
            strict_sequence_length: false,
        }
    }
}

/// Command-line / environment overrides; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model_path: Option<PathBuf>,
    pub tokenizer: Option<String>,
    pub max_length: Option<usize>,
    pub backend: Option<BackendPreference>,
    pub intra_threads: Option<usize>,
    pub bind: Option<String>,
    pub max_input_chars: Option<usize>,
    pub skip_vocabulary_check: bool,
    pub strict_sequence_length: bool,
}

impl ServiceConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: ServiceConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(model_path) = overrides.model_path {
            self.model_path = model_path;
        }
        if let Some(tokenizer) = overrides.tokenizer {
            self.tokenizer = tokenizer;
        }
        if let Some(max_length) = overrides.max_length {
            self.max_length = max_length;
        }
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if overrides.intra_threads.is_some() {
            self.intra_threads = overrides.intra_threads;
        }
        if let Some(bind) = overrides.bind {
            self.bind = bind;
        }
        if overrides.max_input_chars.is_some() {
            self.max_input_chars = overrides.max_input_chars;
        }
        if overrides.skip_vocabulary_check {
            self.verify_vocabulary = false;
        }
        if overrides.strict_sequence_length {
            self.strict_sequence_length = true;
        }
    }

    /// Check the configuration before any model is loaded
    pub fn validate(&self) -> Result<(), DetectorError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(DetectorError::Config("model_path must not be empty".to_string()));
        }
        if self.tokenizer.trim().is_empty() {
            return Err(DetectorError::Config("tokenizer must not be empty".to_string()));
        }
        // [CLS] + [SEP] + [SEP] leaves no room for content at 3
        if self.max_length <= 3 {
            return Err(DetectorError::Config(format!(
                "max_length must be greater than 3, got {}",
                self.max_length
            )));
        }
        if self.intra_threads == Some(0) {
            return Err(DetectorError::Config(
                "intra_threads must be greater than 0".to_string(),
            ));
        }
        self.bind_addr()?;
        self.detector_config().validate()
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, DetectorError> {
        self.bind
            .parse()
            .map_err(|e| DetectorError::Config(format!("Invalid bind address '{}': {}", self.bind, e)))
    }

    pub fn detector_config(&self) -> DetectorConfig {
        let config = DetectorConfig::new()
            .with_vocabulary_check(self.verify_vocabulary)
            .with_sequence_length_check(self.strict_sequence_length);
        match self.max_input_chars {
            Some(limit) => config.with_max_input_chars(limit),
            None => config,
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        let options = EngineOptions::new().with_backend(self.backend);
        match self.intra_threads {
            Some(threads) => options.with_intra_threads(threads),
            None => options,
        }
    }
}
