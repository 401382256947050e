//! Sentence-pair encoder trait

use crate::error::Result;
use crate::types::EncodedPair;

/// Turns two raw sentences into a fixed-length `EncodedPair`
///
/// Implementations must be pure: the same inputs always produce the same
/// pair, and every pair has length `max_length()`.
pub trait PairEncoder: Send + Sync {
    /// Encode a sentence pair
    ///
    /// # Errors
    /// `Encoding` if the vocabulary cannot represent the input.
    fn encode(&self, sentence_a: &str, sentence_b: &str) -> Result<EncodedPair>;

    /// Length of every produced sequence
    fn max_length(&self) -> usize;

    /// Fingerprint of the bound vocabulary, if the encoder can compute one
    fn vocab_fingerprint(&self) -> Option<&str> {
        None
    }
}
