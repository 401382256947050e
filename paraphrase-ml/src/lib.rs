//! # paraphrase-ml
//!
//! Tokenization and model execution for the paraphrase detector.
//!
//! This crate supplies the concrete implementations of the
//! [`PairEncoder`](paraphrase_core::PairEncoder) and
//! [`InferenceEngine`](paraphrase_core::InferenceEngine) seams defined in
//! `paraphrase-core`.
//!
//! ## Features
//!
//! - **BERT WordPiece tokenization**: HuggingFace `tokenizers`, pinned to the
//!   `[CLS] a [SEP] b [SEP]` pair template with longest-first truncation and
//!   fixed-length padding
//! - **ONNX Runtime backend**: `ort` session bound once at load time, CUDA
//!   execution provider used opportunistically with CPU fallback
//! - **TorchScript backend** (`tch-backend` feature): tch-rs with
//!   CUDA > MPS > CPU device selection
//! - **Artifact metadata**: optional JSON sidecar carrying label order,
//!   sequence length and a vocabulary fingerprint
//!
//! ## Quick Start
//!
//! ```no_run
//! use paraphrase_core::{DetectorConfig, ParaphraseDetector};
//! use paraphrase_ml::{load_engine, EngineOptions, PairTokenizer, DEFAULT_MAX_LENGTH};
//! use std::sync::Arc;
//!
//! # fn example() -> anyhow::Result<()> {
//! let tokenizer = PairTokenizer::from_file("models/tokenizer.json", DEFAULT_MAX_LENGTH)?;
//! let engine = load_engine("models/mrpc_model.onnx", EngineOptions::default())?;
//!
//! let detector = ParaphraseDetector::new(Arc::new(tokenizer), engine, DetectorConfig::default())?;
//! let prediction = detector.predict("Hello world!", "Hello world!")?;
//! println!("{} ({:.4})", prediction.predicted_label, prediction.confidence);
//! # Ok(())
//! # }
//! ```
//!
//! ## Model Requirements
//!
//! The ONNX graph must expose:
//! - inputs `input_ids` and `attention_mask`, i64 `[batch, sequence_length]`
//!   with both axes dynamic
//! - output `output`, f32 `[batch, 2]`, logits ordered
//!   `[not_paraphrase, paraphrase]`
//!
//! ```text
//! models/
//! ├── mrpc_model.onnx   # exported classifier
//! ├── mrpc_model.json   # optional metadata sidecar
//! └── tokenizer.json    # HuggingFace tokenizer config
//! ```
//!
//! ## Thread Safety
//!
//! Engines hold their runtime session behind a `parking_lot::Mutex` and are
//! shared as `Arc<dyn InferenceEngine>`. Tokenizers are immutable after
//! construction.

pub mod engine;
pub mod metadata;
pub mod onnx_engine;
pub mod options;
pub mod tokenizer;

#[cfg(feature = "tch-backend")]
mod tch_inference;
#[cfg(feature = "tch-backend")]
mod tch_loader;

// Re-export commonly used types
pub use engine::load_engine;
pub use metadata::ModelMetadata;
pub use onnx_engine::{cuda_available, OnnxInferenceEngine};
pub use options::{BackendPreference, EngineOptions, ExecutionBackend};
pub use tokenizer::{PairTokenizer, DEFAULT_MAX_LENGTH, DEFAULT_TOKENIZER};

#[cfg(feature = "tch-backend")]
pub use tch_inference::TchInferenceEngine;
#[cfg(feature = "tch-backend")]
pub use tch_loader::TchModel;
