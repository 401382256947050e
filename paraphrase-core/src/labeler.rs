//! Score normalization and labeling
//!
//! Converts raw logits into a probability distribution over the fixed label
//! set and picks the predicted label.

use crate::error::{DetectorError, Result};
use crate::types::{Label, LabelScore};

/// Numerically stable softmax
///
/// The maximum logit is subtracted before exponentiating so large logits
/// cannot overflow. Accumulation happens in `f64`.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    if logits.is_empty() {
        return Vec::new();
    }

    let max = logits
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max) as f64;
    let exps: Vec<f64> = logits.iter().map(|&x| (x as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();

    exps.into_iter().map(|e| (e / sum) as f32).collect()
}

/// Pair each probability with its positional label
///
/// # Errors
/// - `ShapeMismatch` if `logits.len() != label_set.len()`
/// - `Inference` if any logit is NaN or infinite
pub fn label(logits: &[f32], label_set: &[Label]) -> Result<Vec<LabelScore>> {
    if logits.len() != label_set.len() {
        return Err(DetectorError::ShapeMismatch {
            expected: label_set.len(),
            actual: logits.len(),
        });
    }

    if let Some(bad) = logits.iter().find(|x| !x.is_finite()) {
        return Err(DetectorError::Inference(format!(
            "Model produced a non-finite logit: {}",
            bad
        )));
    }

    Ok(softmax(logits)
        .into_iter()
        .zip(label_set.iter())
        .map(|(score, &label)| LabelScore::new(label, score))
        .collect())
}

/// Entry with the maximum score
///
/// Exact ties resolve to the earliest entry, so with `Label::ALL` ordering a
/// 0.5/0.5 split predicts `not_paraphrase`.
pub fn predicted(scores: &[LabelScore]) -> Option<LabelScore> {
    let mut best: Option<LabelScore> = None;
    for &entry in scores {
        match best {
            Some(current) if entry.score <= current.score => {}
            _ => best = Some(entry),
        }
    }
    best
}
