//! # paraphrase-core
//!
//! Core types and traits for serving a sentence-pair paraphrase classifier.
//!
//! This crate provides the building blocks of the inference pipeline:
//! - **Type System**: `Label`, `LabelScore`, `EncodedPair` and `Prediction`
//! - **Seams**: `PairEncoder` and `InferenceEngine` traits implemented by
//!   the tokenizer and runtime backends
//! - **Labeler**: numerically stable softmax with stable arg-max
//! - **Detector**: the serving facade orchestrating encode → infer → label
//!
//! ## Example
//!
//! ```rust,ignore
//! use paraphrase_core::{DetectorConfig, ParaphraseDetector};
//! use std::sync::Arc;
//!
//! let detector = ParaphraseDetector::new(
//!     Arc::new(tokenizer),
//!     Arc::new(engine),
//!     DetectorConfig::default(),
//! )?;
//!
//! let prediction = detector.predict(
//!     "The firm announced increased earnings.",
//!     "The company reported higher profits.",
//! )?;
//! println!("{} ({:.4})", prediction.predicted_label, prediction.confidence);
//! ```

pub mod config;
pub mod detector;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod labeler;
pub mod types;

// Re-export commonly used types
pub use config::DetectorConfig;
pub use detector::ParaphraseDetector;
pub use encoder::PairEncoder;
pub use engine::InferenceEngine;
pub use error::DetectorError;
pub use types::{EncodedPair, Label, LabelScore, Prediction, RawLogits};
