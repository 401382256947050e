//! Sentence-pair tokenization on top of HuggingFace `tokenizers`
//!
//! Wraps a BERT-style WordPiece tokenizer and pins it to the policy the
//! classifier was trained with:
//! - pair template `[CLS] a [SEP] b [SEP]`
//! - longest-first truncation of the combined sequence to `max_length`
//! - right padding with `[PAD]` to exactly `max_length`

use anyhow::{anyhow, bail, Context, Result};
use paraphrase_core::{DetectorError, EncodedPair, PairEncoder};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{
    AddedToken, PaddingDirection, PaddingParams, PaddingStrategy, Tokenizer, TruncationDirection,
    TruncationParams, TruncationStrategy,
};

/// Vocabulary the reference classifier was fine-tuned from
pub const DEFAULT_TOKENIZER: &str = "google/bert_uncased_L-2_H-128_A-2";

/// Fixed sequence length fed to the model
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// `[CLS]` plus two `[SEP]` tokens
const PAIR_SPECIAL_TOKENS: usize = 3;

const PAD_TOKEN: &str = "[PAD]";
const UNK_TOKEN: &str = "[UNK]";
const CLS_TOKEN: &str = "[CLS]";
const SEP_TOKEN: &str = "[SEP]";
const MASK_TOKEN: &str = "[MASK]";

/// Fixed-length sentence-pair tokenizer
#[derive(Debug, Clone)]
pub struct PairTokenizer {
    tokenizer: Tokenizer,
    max_length: usize,
    pad_id: u32,
    fingerprint: String,
}

impl PairTokenizer {
    /// Load a `tokenizer.json` file
    pub fn from_file<P: AsRef<Path>>(path: P, max_length: usize) -> Result<Self> {
        let path = path.as_ref();
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {:?}: {}", path, e))?;
        Self::from_tokenizer(tokenizer, max_length)
    }

    /// Build an uncased BERT WordPiece tokenizer from a `vocab.txt` file
    pub fn from_vocab_file<P: AsRef<Path>>(path: P, max_length: usize) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Vocabulary path is not valid UTF-8: {:?}", path))?;

        let model = WordPiece::from_file(path_str)
            .unk_token(UNK_TOKEN.to_string())
            .build()
            .map_err(|e| anyhow!("Failed to load vocabulary from {:?}: {}", path, e))?;

        let mut tokenizer = Tokenizer::new(model);
        tokenizer.with_normalizer(Some(BertNormalizer::new(true, true, None, true)));
        tokenizer.with_pre_tokenizer(Some(BertPreTokenizer));

        let cls_id = tokenizer
            .token_to_id(CLS_TOKEN)
            .ok_or_else(|| anyhow!("Vocabulary has no {} token", CLS_TOKEN))?;
        let sep_id = tokenizer
            .token_to_id(SEP_TOKEN)
            .ok_or_else(|| anyhow!("Vocabulary has no {} token", SEP_TOKEN))?;
        tokenizer.with_post_processor(Some(BertProcessing::new(
            (SEP_TOKEN.to_string(), sep_id),
            (CLS_TOKEN.to_string(), cls_id),
        )));

        let specials: Vec<AddedToken> = [PAD_TOKEN, UNK_TOKEN, CLS_TOKEN, SEP_TOKEN, MASK_TOKEN]
            .iter()
            .filter(|t| tokenizer.token_to_id(t).is_some())
            .map(|t| AddedToken::from(t.to_string(), true))
            .collect();
        tokenizer.add_special_tokens(&specials);

        Self::from_tokenizer(tokenizer, max_length)
    }

    /// Fetch the tokenizer for `model_name` from the HuggingFace hub
    ///
    /// Prefers `tokenizer.json`; repositories that only ship a WordPiece
    /// `vocab.txt` (such as the original BERT checkpoints) fall back to it.
    pub fn from_pretrained(model_name: &str, max_length: usize) -> Result<Self> {
        tracing::info!("Fetching tokenizer for {} from the HuggingFace hub", model_name);

        let api = hf_hub::api::sync::Api::new()
            .context("Failed to initialise HuggingFace hub client")?;
        let repo = api.model(model_name.to_string());

        match repo.get("tokenizer.json") {
            Ok(path) => Self::from_file(path, max_length),
            Err(e) => {
                tracing::warn!(
                    "tokenizer.json unavailable for {} ({}), falling back to vocab.txt",
                    model_name,
                    e
                );
                let vocab = repo
                    .get("vocab.txt")
                    .with_context(|| format!("Failed to fetch vocabulary for {}", model_name))?;
                Self::from_vocab_file(vocab, max_length)
            }
        }
    }

    /// Pin a prepared tokenizer to the fixed-length pair policy
    pub fn from_tokenizer(mut tokenizer: Tokenizer, max_length: usize) -> Result<Self> {
        if max_length <= PAIR_SPECIAL_TOKENS {
            bail!(
                "max_length must exceed {} to fit a sentence pair, got {}",
                PAIR_SPECIAL_TOKENS,
                max_length
            );
        }

        let (pad_token, pad_id) = match tokenizer.get_padding() {
            Some(params) => (params.pad_token.clone(), params.pad_id),
            None => {
                let id = tokenizer
                    .token_to_id(PAD_TOKEN)
                    .ok_or_else(|| anyhow!("Vocabulary has no {} token", PAD_TOKEN))?;
                (PAD_TOKEN.to_string(), id)
            }
        };

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                strategy: TruncationStrategy::LongestFirst,
                stride: 0,
                direction: TruncationDirection::Right,
            }))
            .map_err(|e| anyhow!("Invalid truncation settings: {}", e))?;

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(max_length),
            direction: PaddingDirection::Right,
            pad_to_multiple_of: None,
            pad_id,
            pad_type_id: 0,
            pad_token,
        }));

        let fingerprint = vocab_fingerprint(&tokenizer);

        tracing::debug!(
            "Tokenizer ready: vocab_size={}, max_length={}, pad_id={}",
            tokenizer.get_vocab_size(true),
            max_length,
            pad_id
        );

        Ok(Self {
            tokenizer,
            max_length,
            pad_id,
            fingerprint,
        })
    }

    /// Encode a sentence pair into fixed-length ids and mask
    pub fn encode_pair(&self, sentence_a: &str, sentence_b: &str) -> Result<EncodedPair> {
        let encoding = self
            .tokenizer
            .encode((sentence_a, sentence_b), true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| x as i64)
            .collect();

        if input_ids.len() != self.max_length {
            bail!(
                "Encoded length {} differs from max_length {}",
                input_ids.len(),
                self.max_length
            );
        }

        EncodedPair::new(input_ids, attention_mask)
            .ok_or_else(|| anyhow!("Tokenizer produced ids and mask of different lengths"))
    }

    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    /// Underlying HuggingFace tokenizer
    pub fn inner(&self) -> &Tokenizer {
        &self.tokenizer
    }
}

impl PairEncoder for PairTokenizer {
    fn encode(&self, sentence_a: &str, sentence_b: &str) -> paraphrase_core::error::Result<EncodedPair> {
        self.encode_pair(sentence_a, sentence_b)
            .map_err(|e| DetectorError::Encoding(format!("{:#}", e)))
    }

    fn max_length(&self) -> usize {
        self.max_length
    }

    fn vocab_fingerprint(&self) -> Option<&str> {
        Some(&self.fingerprint)
    }
}

/// SHA-256 over the vocabulary, ordered by id
///
/// Model export writes the same value into the artifact's metadata sidecar
/// so the pairing can be verified at startup.
pub fn vocab_fingerprint(tokenizer: &Tokenizer) -> String {
    let mut vocab: Vec<(String, u32)> = tokenizer.get_vocab(true).into_iter().collect();
    vocab.sort_unstable_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let mut hasher = Sha256::new();
    for (token, id) in &vocab {
        hasher.update(id.to_le_bytes());
        hasher.update(token.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_vocab(tokens: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for token in tokens {
            writeln!(file, "{}", token).unwrap();
        }
        file
    }

    fn small_vocab() -> tempfile::NamedTempFile {
        write_vocab(&[
            "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "hello", "world", "!", "the", "dog",
        ])
    }

    #[test]
    fn test_rejects_tiny_max_length() {
        let vocab = small_vocab();
        let err = PairTokenizer::from_vocab_file(vocab.path(), 3).unwrap_err();
        assert!(err.to_string().contains("max_length"));
    }

    #[test]
    fn test_missing_pad_token() {
        let vocab = write_vocab(&["[UNK]", "[CLS]", "[SEP]", "hello"]);
        let err = PairTokenizer::from_vocab_file(vocab.path(), 16).unwrap_err();
        assert!(err.to_string().contains("[PAD]"));
    }

    #[test]
    fn test_pair_template() {
        let vocab = small_vocab();
        let tokenizer = PairTokenizer::from_vocab_file(vocab.path(), 12).unwrap();
        let pair = tokenizer.encode_pair("Hello world!", "the dog").unwrap();

        // [CLS] hello world ! [SEP] the dog [SEP] [PAD] [PAD] [PAD] [PAD]
        assert_eq!(
            pair.input_ids(),
            &[2, 5, 6, 7, 3, 8, 9, 3, 0, 0, 0, 0]
        );
        assert_eq!(pair.attention_mask(), &[1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0]);
        assert_eq!(tokenizer.pad_id(), 0);
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let vocab = small_vocab();
        let tokenizer = PairTokenizer::from_vocab_file(vocab.path(), 8).unwrap();
        let pair = tokenizer.encode_pair("zebra", "").unwrap();

        assert_eq!(pair.input_ids()[..4], [2, 1, 3, 3]);
        assert_eq!(pair.real_tokens(), 4);
    }

    #[test]
    fn test_fingerprint_tracks_vocabulary() {
        let a = small_vocab();
        let b = write_vocab(&["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "hello", "cat"]);

        let first = PairTokenizer::from_vocab_file(a.path(), 16).unwrap();
        let again = PairTokenizer::from_vocab_file(a.path(), 32).unwrap();
        let other = PairTokenizer::from_vocab_file(b.path(), 16).unwrap();

        assert_eq!(first.vocab_fingerprint(), again.vocab_fingerprint());
        assert_ne!(first.vocab_fingerprint(), other.vocab_fingerprint());
        assert_eq!(first.vocab_fingerprint().unwrap().len(), 64);
    }
}
