/// Property-based tests for paraphrase-core
///
/// These tests use proptest to generate random inputs and verify invariants.
use paraphrase_core::{
    error::Result,
    labeler::{label, predicted, softmax},
    DetectorConfig, EncodedPair, InferenceEngine, Label, PairEncoder, ParaphraseDetector,
    RawLogits,
};
use proptest::prelude::*;
use std::sync::Arc;

const MAX_LENGTH: usize = 32;

/// Character-level encoder: `[CLS] a [SEP] b [SEP]`, longest side truncated first
struct CharEncoder;

impl PairEncoder for CharEncoder {
    fn encode(&self, sentence_a: &str, sentence_b: &str) -> Result<EncodedPair> {
        let mut a: Vec<i64> = sentence_a.chars().map(|c| c as i64 + 1000).collect();
        let mut b: Vec<i64> = sentence_b.chars().map(|c| c as i64 + 1000).collect();

        let budget = MAX_LENGTH - 3;
        while a.len() + b.len() > budget {
            if a.len() > b.len() {
                a.pop();
            } else {
                b.pop();
            }
        }

        let mut ids = vec![101];
        ids.extend(a);
        ids.push(102);
        ids.extend(b);
        ids.push(102);

        let mut mask = vec![1i64; ids.len()];
        ids.resize(MAX_LENGTH, 0);
        mask.resize(MAX_LENGTH, 0);

        Ok(EncodedPair::new(ids, mask).unwrap())
    }

    fn max_length(&self) -> usize {
        MAX_LENGTH
    }
}

/// Scores "paraphrase" when both segments carry the same ids
struct SegmentMatchEngine;

impl InferenceEngine for SegmentMatchEngine {
    fn run(&self, batch: &[EncodedPair]) -> Result<Vec<RawLogits>> {
        Ok(batch
            .iter()
            .map(|pair| {
                let real = &pair.input_ids()[..pair.real_tokens()];
                let mut segments = real.split(|&id| id == 101 || id == 102).filter(|s| !s.is_empty());
                let first = segments.next();
                let second = segments.next();
                if first == second {
                    vec![-2.0, 2.0]
                } else {
                    vec![2.0, -2.0]
                }
            })
            .collect())
    }

    fn num_labels(&self) -> usize {
        2
    }

    fn backend_name(&self) -> &str {
        "segment-match"
    }
}

fn detector() -> ParaphraseDetector {
    ParaphraseDetector::new(
        Arc::new(CharEncoder),
        Arc::new(SegmentMatchEngine),
        DetectorConfig::default(),
    )
    .unwrap()
}

/// Strategy to generate finite logits across a wide range
fn logit_strategy() -> impl Strategy<Value = f32> {
    -1.0e4f32..1.0e4f32
}

proptest! {
    /// Softmax over any finite logits is a probability distribution
    #[test]
    fn test_softmax_is_distribution(logits in prop::collection::vec(logit_strategy(), 1..8)) {
        let probs = softmax(&logits);
        prop_assert_eq!(probs.len(), logits.len());
        prop_assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        prop_assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    /// Labeling always yields one entry per label, summing to 1
    #[test]
    fn test_label_invariants(a in logit_strategy(), b in logit_strategy()) {
        let scores = label(&[a, b], &Label::ALL).unwrap();
        prop_assert_eq!(scores.len(), 2);
        prop_assert_eq!(scores[0].label, Label::NotParaphrase);
        prop_assert_eq!(scores[1].label, Label::Paraphrase);

        let total: f32 = scores.iter().map(|s| s.score).sum();
        prop_assert!((total - 1.0).abs() <= 1e-6);
    }

    /// The predicted entry dominates every other entry
    #[test]
    fn test_predicted_is_max(a in logit_strategy(), b in logit_strategy()) {
        let scores = label(&[a, b], &Label::ALL).unwrap();
        let best = predicted(&scores).unwrap();
        prop_assert!(scores.iter().all(|s| s.score <= best.score));
    }

    /// Equal logits always resolve to the first label
    #[test]
    fn test_equal_logits_tie_break(x in logit_strategy()) {
        let scores = label(&[x, x], &Label::ALL).unwrap();
        prop_assert_eq!(predicted(&scores).unwrap().label, Label::NotParaphrase);
    }

    /// Prediction never panics and always returns a full distribution
    #[test]
    fn test_predict_never_panics(a in ".*", b in ".*") {
        let detector = detector();
        let prediction = detector.predict(&a, &b).unwrap();

        prop_assert_eq!(prediction.scores.len(), 2);
        let total: f32 = prediction.scores.iter().map(|s| s.score).sum();
        prop_assert!((total - 1.0).abs() <= 1e-6);
        prop_assert!(prediction.confidence >= 0.5);
    }

    /// Prediction is idempotent for identical inputs
    #[test]
    fn test_predict_is_deterministic(a in "[a-z ]{0,40}", b in "[a-z ]{0,40}") {
        let detector = detector();
        let first = detector.predict(&a, &b).unwrap();
        let second = detector.predict(&a, &b).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Identical short sentences are paraphrases under the segment-match double
    #[test]
    fn test_identical_sentences(s in "[a-z]{1,10}") {
        let prediction = detector().predict(&s, &s).unwrap();
        prop_assert_eq!(prediction.predicted_label, Label::Paraphrase);
        prop_assert!(prediction.confidence > 0.5);
    }
}

/// Additional unit tests for edge cases
#[cfg(test)]
mod edge_case_tests {
    use super::*;

    #[test]
    fn test_empty_sentences() {
        let prediction = detector().predict("", "").unwrap();
        assert_eq!(prediction.scores.len(), 2);
    }

    #[test]
    fn test_special_characters_handling() {
        let special = [
            "\n\r\t",
            "\u{0000}",
            "emoji 😀🚀🔥",
            "<script>alert('xss')</script>",
            "'; DROP TABLE users; --",
        ];

        let detector = detector();
        for content in special {
            assert!(detector.predict(content, "plain text").is_ok());
        }
    }

    #[test]
    fn test_long_input_is_truncated_not_rejected() {
        let long = "a".repeat(10_000);
        let pair = CharEncoder.encode(&long, &long).unwrap();
        assert_eq!(pair.len(), MAX_LENGTH);
        assert_eq!(pair.real_tokens(), MAX_LENGTH);
        assert!(detector().predict(&long, "b").is_ok());
    }
}
