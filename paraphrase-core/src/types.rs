//! Core type definitions for paraphrase detection
//!
//! This module defines the values that flow through the inference pipeline:
//! - The fixed label set and per-label scores
//! - Encoded sentence pairs handed to the inference engine
//! - The prediction returned to callers of the facade

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw, unnormalized model scores for a single batch element
pub type RawLogits = Vec<f32>;

/// Classification label
///
/// The declaration order is the model's output order and also the
/// tie-break order: on exactly equal scores the earlier label wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// The sentences do not express the same meaning (output index 0)
    NotParaphrase,
    /// The sentences express the same meaning (output index 1)
    Paraphrase,
}

impl Label {
    /// All labels in output-index order
    pub const ALL: [Label; 2] = [Label::NotParaphrase, Label::Paraphrase];

    /// Wire name of the label
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::NotParaphrase => "not_paraphrase",
            Label::Paraphrase => "paraphrase",
        }
    }

    /// Position of the label in the model output
    pub fn index(&self) -> usize {
        match self {
            Label::NotParaphrase => 0,
            Label::Paraphrase => 1,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability assigned to one label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: Label,
    pub score: f32,
}

impl LabelScore {
    pub fn new(label: Label, score: f32) -> Self {
        Self { label, score }
    }
}

/// A tokenized sentence pair ready for inference
///
/// Both sequences always have the same length (the tokenizer's
/// `max_length`). Real tokens carry mask 1 and padding carries mask 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPair {
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
}

impl EncodedPair {
    /// Build a pair, returning `None` when the two sequences differ in length
    pub fn new(input_ids: Vec<i64>, attention_mask: Vec<i64>) -> Option<Self> {
        if input_ids.len() != attention_mask.len() {
            return None;
        }
        Some(Self {
            input_ids,
            attention_mask,
        })
    }

    pub fn input_ids(&self) -> &[i64] {
        &self.input_ids
    }

    pub fn attention_mask(&self) -> &[i64] {
        &self.attention_mask
    }

    /// Sequence length (identical for ids and mask)
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Number of non-padding positions
    pub fn real_tokens(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m != 0).count()
    }
}

/// Result of classifying one sentence pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub sentence1: String,
    pub sentence2: String,
    pub predicted_label: Label,
    pub confidence: f32,
    /// Full distribution, one entry per label in `Label::ALL` order
    pub scores: Vec<LabelScore>,
}

impl Prediction {
    /// Score of a specific label
    pub fn score_of(&self, label: Label) -> Option<f32> {
        self.scores
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.score)
    }

    pub fn is_paraphrase(&self) -> bool {
        self.predicted_label == Label::Paraphrase
    }
}
