//! # paraphrase
//!
//! Sentence-pair paraphrase detection as a library and an HTTP service.
//!
//! Given two sentences, the detector tokenizes them as a BERT pair, runs a
//! frozen binary classifier and returns the winning label
//! (`paraphrase` / `not_paraphrase`) with its softmax confidence.
//!
//! ## Quick Start
//!
//! ```no_run
//! use paraphrase::{build_detector, ServiceConfig};
//!
//! # fn example() -> Result<(), paraphrase::DetectorError> {
//! let config = ServiceConfig::default();
//! let detector = build_detector(&config)?;
//!
//! let prediction = detector.predict(
//!     "The company reported higher profits.",
//!     "The firm announced increased earnings.",
//! )?;
//! println!("{} ({:.4})", prediction.predicted_label, prediction.confidence);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **paraphrase-core**: types, labeling, the `ParaphraseDetector` facade
//! - **paraphrase-ml**: tokenizer adapter, ONNX / TorchScript engines
//! - **paraphrase**: configuration, startup wiring and the HTTP server

pub mod config;
pub mod http;

// Re-export core types
pub use paraphrase_core::{
    DetectorConfig, DetectorError, EncodedPair, InferenceEngine, Label, LabelScore, PairEncoder,
    ParaphraseDetector, Prediction,
};

// Re-export ML backends
pub use paraphrase_ml::{
    load_engine, BackendPreference, EngineOptions, OnnxInferenceEngine, PairTokenizer,
};

pub use config::{ConfigOverrides, ServiceConfig};

use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version
pub fn version() -> &'static str {
    VERSION
}

/// Resolve a tokenizer reference
///
/// An existing `.txt` file is read as a WordPiece vocabulary, any other
/// existing file as `tokenizer.json`. Anything else is treated as a
/// HuggingFace hub model id.
pub fn load_tokenizer(reference: &str, max_length: usize) -> Result<PairTokenizer, DetectorError> {
    let path = Path::new(reference);
    let tokenizer = if path.is_file() {
        if path.extension().is_some_and(|ext| ext == "txt") {
            PairTokenizer::from_vocab_file(path, max_length)
        } else {
            PairTokenizer::from_file(path, max_length)
        }
    } else {
        PairTokenizer::from_pretrained(reference, max_length)
    };

    tokenizer.map_err(|e| DetectorError::ModelLoad(format!("{:#}", e)))
}

/// Load every component and run the startup checks
///
/// Fails fast on invalid configuration, unreadable artifacts, a wrong
/// output width or a vocabulary mismatch. A `max_length` that differs from
/// the artifact's training length is logged, or rejected with
/// `strict_sequence_length`.
pub fn build_detector(config: &ServiceConfig) -> Result<ParaphraseDetector, DetectorError> {
    config.validate()?;

    info!("Loading tokenizer: {}", config.tokenizer);
    let tokenizer = load_tokenizer(&config.tokenizer, config.max_length)?;

    info!("Loading model: {:?}", config.model_path);
    let engine = load_engine(&config.model_path, config.engine_options())?;

    ParaphraseDetector::new(Arc::new(tokenizer), engine, config.detector_config())
}
