//! Configuration types for the detector

use crate::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};

/// Detector configuration
///
/// Controls the request-level guards and the startup compatibility checks
/// applied by `ParaphraseDetector`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Reject sentences longer than this many characters before tokenizing.
    /// `None` disables the check and relies on truncation alone.
    pub max_input_chars: Option<usize>,
    /// Fail construction when the tokenizer and model artifact declare
    /// different vocabulary fingerprints
    pub verify_vocabulary: bool,
    /// Fail construction when the tokenizer's `max_length` differs from the
    /// artifact's training sequence length. Off by default: a mismatch is
    /// only logged.
    pub strict_sequence_length: bool,
}

impl DetectorConfig {
    /// Create configuration with defaults
    pub fn new() -> Self {
        Self {
            max_input_chars: None,
            verify_vocabulary: true,
            strict_sequence_length: false,
        }
    }

    /// Reject inputs longer than `limit` characters
    ///
    /// # Example
    /// ```
    /// use paraphrase_core::DetectorConfig;
    ///
    /// let config = DetectorConfig::new().with_max_input_chars(10_000);
    /// assert_eq!(config.max_input_chars, Some(10_000));
    /// ```
    pub fn with_max_input_chars(mut self, limit: usize) -> Self {
        self.max_input_chars = Some(limit);
        self
    }

    /// Enable or disable the vocabulary fingerprint check
    pub fn with_vocabulary_check(mut self, enabled: bool) -> Self {
        self.verify_vocabulary = enabled;
        self
    }

    /// Turn a sequence length mismatch into a startup error
    pub fn with_sequence_length_check(mut self, strict: bool) -> Self {
        self.strict_sequence_length = strict;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_input_chars == Some(0) {
            return Err(DetectorError::Config(
                "max_input_chars must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::new()
    }
}
