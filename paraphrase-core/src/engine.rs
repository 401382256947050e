//! Inference engine trait
//!
//! This module provides the common interface for executing a frozen
//! sentence-pair classification graph, independent of the runtime that
//! backs it (ONNX Runtime, TorchScript).

use crate::error::Result;
use crate::types::{EncodedPair, RawLogits};

/// Executes a frozen two-input / one-output classification graph
///
/// Implementations bind the graph once at load time and are read-only
/// afterwards, so a single instance can be shared across threads behind an
/// `Arc`.
///
/// ## Contract
/// - Inputs: `input_ids` and `attention_mask`, `[batch, sequence_length]`
/// - Output: `output`, `[batch, num_labels]`
/// - One graph execution per `run` call, no internal batching or splitting
pub trait InferenceEngine: Send + Sync {
    /// Run the graph over a batch of encoded pairs
    ///
    /// # Returns
    /// One logits vector of length `num_labels()` per batch element, in
    /// input order. An empty batch yields an empty result.
    ///
    /// # Errors
    /// `Inference` on ragged batches, output shape mismatches or backend
    /// execution faults.
    fn run(&self, batch: &[EncodedPair]) -> Result<Vec<RawLogits>>;

    /// Width of the output dimension
    fn num_labels(&self) -> usize;

    /// Get the backend name (e.g. "onnx", "tch")
    ///
    /// Useful for logging and monitoring.
    fn backend_name(&self) -> &str;

    /// Get backend-specific information (device, execution provider, etc.)
    fn backend_info(&self) -> String {
        format!("{} backend", self.backend_name())
    }

    /// Fingerprint of the vocabulary the artifact was trained with, if the
    /// artifact declares one
    fn vocab_fingerprint(&self) -> Option<&str> {
        None
    }

    /// Sequence length the artifact was trained with, if known
    fn max_sequence_length(&self) -> Option<usize> {
        None
    }
}
