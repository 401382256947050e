//! Serving facade - composes encoding, inference and labeling

use crate::config::DetectorConfig;
use crate::encoder::PairEncoder;
use crate::engine::InferenceEngine;
use crate::error::{DetectorError, Result};
use crate::labeler;
use crate::types::{EncodedPair, Label, Prediction};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Paraphrase detector
///
/// Holds the process-wide encoder and engine, both created once at startup
/// and shared read-only by every request. Each call runs the full
/// encode → infer → label pipeline independently.
pub struct ParaphraseDetector {
    encoder: Arc<dyn PairEncoder>,
    engine: Arc<dyn InferenceEngine>,
    config: DetectorConfig,
}

impl ParaphraseDetector {
    /// Create a detector from already-loaded components
    ///
    /// Startup checks:
    /// - the engine's output width must match the label set
    /// - when both sides declare a vocabulary fingerprint and
    ///   `verify_vocabulary` is on, the fingerprints must agree
    /// - a tokenizer `max_length` other than the artifact's training length
    ///   is logged, or rejected when `strict_sequence_length` is on
    pub fn new(
        encoder: Arc<dyn PairEncoder>,
        engine: Arc<dyn InferenceEngine>,
        config: DetectorConfig,
    ) -> Result<Self> {
        config.validate()?;

        if engine.num_labels() != Label::ALL.len() {
            return Err(DetectorError::ShapeMismatch {
                expected: Label::ALL.len(),
                actual: engine.num_labels(),
            });
        }

        if config.verify_vocabulary {
            match (encoder.vocab_fingerprint(), engine.vocab_fingerprint()) {
                (Some(tokenizer), Some(artifact)) if tokenizer != artifact => {
                    return Err(DetectorError::VocabularyMismatch {
                        tokenizer: tokenizer.to_string(),
                        artifact: artifact.to_string(),
                    });
                }
                (Some(_), Some(_)) => info!("Tokenizer vocabulary matches model artifact"),
                _ => warn!("Vocabulary compatibility not verified: fingerprint unavailable"),
            }
        }

        if let Some(trained) = engine.max_sequence_length() {
            let max_length = encoder.max_length();
            if max_length != trained {
                if config.strict_sequence_length {
                    return Err(DetectorError::Config(format!(
                        "Tokenizer max_length {} does not match the model's max_seq_length {}",
                        max_length, trained
                    )));
                }
                warn!(
                    "Tokenizer max_length {} differs from the model's max_seq_length {}",
                    max_length, trained
                );
            }
        }

        info!(
            "Paraphrase detector ready (backend: {}, max_length: {})",
            engine.backend_info(),
            encoder.max_length()
        );

        Ok(Self {
            encoder,
            engine,
            config,
        })
    }

    /// Classify a single sentence pair
    ///
    /// # Errors
    /// - `InvalidInput` when a sentence exceeds `max_input_chars`
    /// - `Encoding` when the tokenizer rejects the input
    /// - `Inference` / `ShapeMismatch` on engine faults
    #[instrument(skip_all, fields(len_a = sentence_a.len(), len_b = sentence_b.len()))]
    pub fn predict(&self, sentence_a: &str, sentence_b: &str) -> Result<Prediction> {
        self.check_input(sentence_a)?;
        self.check_input(sentence_b)?;

        let pair = self.encoder.encode(sentence_a, sentence_b)?;
        debug!("Encoded pair: {} real tokens", pair.real_tokens());

        let mut logits = self.engine.run(std::slice::from_ref(&pair))?;
        if logits.len() != 1 {
            return Err(DetectorError::Inference(format!(
                "Engine returned {} results for a batch of 1",
                logits.len()
            )));
        }
        let logits = logits.remove(0);

        self.build_prediction(sentence_a, sentence_b, &logits)
    }

    /// Classify several pairs with a single engine call
    #[instrument(skip_all, fields(batch_size = pairs.len()))]
    pub fn predict_batch(&self, pairs: &[(&str, &str)]) -> Result<Vec<Prediction>> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let encoded = pairs
            .iter()
            .map(|(a, b)| {
                self.check_input(a)?;
                self.check_input(b)?;
                self.encoder.encode(a, b)
            })
            .collect::<Result<Vec<EncodedPair>>>()?;

        let logits = self.engine.run(&encoded)?;
        if logits.len() != pairs.len() {
            return Err(DetectorError::Inference(format!(
                "Engine returned {} results for a batch of {}",
                logits.len(),
                pairs.len()
            )));
        }

        pairs
            .iter()
            .zip(logits.iter())
            .map(|((a, b), l)| self.build_prediction(a, b, l))
            .collect()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn encoder(&self) -> &Arc<dyn PairEncoder> {
        &self.encoder
    }

    pub fn engine(&self) -> &Arc<dyn InferenceEngine> {
        &self.engine
    }

    fn check_input(&self, sentence: &str) -> Result<()> {
        if let Some(limit) = self.config.max_input_chars {
            let chars = sentence.chars().count();
            if chars > limit {
                return Err(DetectorError::InvalidInput(format!(
                    "sentence has {} characters, limit is {}",
                    chars, limit
                )));
            }
        }
        Ok(())
    }

    fn build_prediction(
        &self,
        sentence_a: &str,
        sentence_b: &str,
        logits: &[f32],
    ) -> Result<Prediction> {
        let scores = labeler::label(logits, &Label::ALL)?;
        let best = labeler::predicted(&scores).ok_or(DetectorError::ShapeMismatch {
            expected: Label::ALL.len(),
            actual: 0,
        })?;

        debug!(
            "logits={:?}, predicted={} ({:.4})",
            logits, best.label, best.score
        );

        Ok(Prediction {
            sentence1: sentence_a.to_string(),
            sentence2: sentence_b.to_string(),
            predicted_label: best.label,
            confidence: best.score,
            scores,
        })
    }
}
