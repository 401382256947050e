//! Error types for paraphrase detection

use thiserror::Error;

/// Errors raised by the inference pipeline
#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Vocabulary mismatch: tokenizer {tokenizer}, model artifact {artifact}")]
    VocabularyMismatch { tokenizer: String, artifact: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DetectorError {
    /// Whether the failure was caused by the caller's input
    ///
    /// Client errors map to 4xx responses at the HTTP boundary, everything
    /// else is an internal or model fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, DetectorError::Encoding(_) | DetectorError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, DetectorError>;
