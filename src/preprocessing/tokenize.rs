use burn::data::dataset::Dataset;
use derive_new::new;

use crate::datasets::{DatasetSplit, Sentiment};

use super::{Encoder, Padding, TokenizerPolicy};

/// Skipped examples logged individually before switching to a summary
const MAX_SKIP_WARNINGS: usize = 5;

/// One example ready for a model: ids, attention mask and the untouched label
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TokenizedExample {
    /// Token ids, including special tokens and (for fixed padding) pad tokens
    pub input_ids: Vec<u32>,

    /// 1 for real tokens, 0 for padding
    pub attention_mask: Vec<u32>,

    /// The gold label of the source example
    pub label: Sentiment,
}

/// A tokenized split, index-aligned with the non-skipped source examples
#[derive(Debug, Clone)]
pub struct TokenizedSplit {
    /// The source split name
    pub name: String,

    /// Tokenized examples, in source order
    pub examples: Vec<TokenizedExample>,

    /// Number of source examples that could not be tokenized
    pub skipped: usize,

    /// Padding strategy used to produce the examples
    pub padding: Padding,

    /// The pad token id, needed to collate dynamically padded batches
    pub pad_token_id: u32,
}

impl TokenizedSplit {
    /// Number of tokenized examples
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// True if every example was skipped (or the source was empty)
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Gold labels, in example order
    pub fn labels(&self) -> Vec<Sentiment> {
        self.examples.iter().map(|e| e.label).collect()
    }
}

impl Dataset<TokenizedExample> for TokenizedSplit {
    fn get(&self, index: usize) -> Option<TokenizedExample> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}

/// A malformed example, skipped during preprocessing
#[derive(thiserror::Error, Debug)]
pub enum TokenizationError {
    /// The source text could not be decoded
    #[error("example {index} is not valid UTF-8 text")]
    NotText {
        /// Index in the source split
        index: usize,
    },

    /// Empty or whitespace-only text
    #[error("example {index} has empty text")]
    EmptyText {
        /// Index in the source split
        index: usize,
    },

    /// The tokenizer rejected the text
    #[error("example {index} could not be encoded: {reason}")]
    Encoder {
        /// Index in the source split
        index: usize,
        /// The tokenizer message
        reason: String,
    },
}

/// Tokenize every example of a split according to a model's policy
pub fn tokenize(
    split: &DatasetSplit,
    encoder: &dyn Encoder,
    policy: &TokenizerPolicy,
) -> TokenizedSplit {
    let max_length = policy.resolve_max_length(encoder.model_max_length());
    let pad_token_id = encoder.pad_token_id();

    let mut examples = Vec::with_capacity(split.examples.len());
    let mut skipped = 0;

    for (index, example) in split.iter().enumerate() {
        match tokenize_one(index, example.text.as_deref(), encoder, max_length) {
            Ok(mut input_ids) => {
                let mut attention_mask = vec![1; input_ids.len()];

                if policy.padding == Padding::MaxLength {
                    input_ids.resize(max_length, pad_token_id);
                    attention_mask.resize(max_length, 0);
                }

                examples.push(TokenizedExample::new(
                    input_ids,
                    attention_mask,
                    example.label,
                ));
            }
            Err(err) => {
                skipped += 1;

                if skipped <= MAX_SKIP_WARNINGS {
                    log::warn!("Skipping {} example: {}", split.name, err);
                }
            }
        }
    }

    if skipped > 0 {
        log::warn!(
            "Skipped {} of {} {} examples",
            skipped,
            split.examples.len(),
            split.name
        );
    }

    TokenizedSplit {
        name: split.name.clone(),
        examples,
        skipped,
        padding: policy.padding,
        pad_token_id,
    }
}

fn tokenize_one(
    index: usize,
    text: Option<&str>,
    encoder: &dyn Encoder,
    max_length: usize,
) -> Result<Vec<u32>, TokenizationError> {
    let text = text.ok_or(TokenizationError::NotText { index })?;

    if text.trim().is_empty() {
        return Err(TokenizationError::EmptyText { index });
    }

    let mut ids = encoder
        .encode(text, max_length)
        .map_err(|e| TokenizationError::Encoder {
            index,
            reason: e.to_string(),
        })?;

    ids.truncate(max_length);

    Ok(ids)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::datasets::Example;

    use super::*;

    /// Whitespace tokenizer wrapping words in CLS (1) / SEP (2), with pad id 0
    struct WordEncoder;

    impl Encoder for WordEncoder {
        fn encode(&self, text: &str, max_length: usize) -> anyhow::Result<Vec<u32>> {
            if text.contains('\u{fffd}') {
                return Err(anyhow!("unknown character"));
            }

            let words = text
                .split_whitespace()
                .map(|w| 3 + w.len() as u32)
                .take(max_length.saturating_sub(2));

            Ok(std::iter::once(1).chain(words).chain([2]).collect())
        }

        fn pad_token_id(&self) -> u32 {
            0
        }

        fn model_max_length(&self) -> usize {
            16
        }
    }

    fn split(texts: &[&str]) -> DatasetSplit {
        DatasetSplit::new(
            "train".to_string(),
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| Example::new(t.to_string(), Sentiment::ALL[i % 3]))
                .collect(),
        )
    }

    #[test]
    fn pads_to_fixed_length() {
        let policy = TokenizerPolicy::default().with_max_length(Some(64));
        let tokenized = tokenize(
            &split(&["a short tweet", "another one with more words"]),
            &WordEncoder,
            &policy,
        );

        for example in &tokenized.examples {
            assert_eq!(example.input_ids.len(), 64);
            assert_eq!(example.attention_mask.len(), 64);

            let real = example.input_ids.iter().filter(|id| **id != 0).count();
            let ones = example.attention_mask.iter().filter(|m| **m == 1).count();
            assert_eq!(ones, real);
        }
    }

    #[test]
    fn uses_model_default_length() {
        let tokenized = tokenize(&split(&["hi"]), &WordEncoder, &TokenizerPolicy::default());

        assert_eq!(tokenized.examples[0].input_ids.len(), 16);
    }

    #[test]
    fn truncation_keeps_labels_aligned() {
        let long = "w ".repeat(100);
        let policy = TokenizerPolicy::default().with_max_length(Some(8));
        let tokenized = tokenize(&split(&[&long, "ok", &long]), &WordEncoder, &policy);

        assert_eq!(
            tokenized.labels(),
            vec![Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive]
        );
        assert_eq!(tokenized.examples[0].input_ids.last(), Some(&2));
        assert!(tokenized.examples.iter().all(|e| e.input_ids.len() == 8));
    }

    #[test]
    fn skips_empty_and_unencodable_text() {
        let tokenized = tokenize(
            &split(&["fine", "", "   ", "bad \u{fffd}", "also fine"]),
            &WordEncoder,
            &TokenizerPolicy::default(),
        );

        assert_eq!(tokenized.skipped, 3);
        assert_eq!(tokenized.len(), 5 - tokenized.skipped);
        assert_eq!(
            tokenized.labels(),
            vec![Sentiment::Negative, Sentiment::Neutral]
        );
    }

    #[test]
    fn skips_undecodable_text() {
        let mut source = split(&["fine", "x", "also fine"]);
        source.examples[1] = Example::undecodable(Sentiment::Positive);

        let tokenized = tokenize(&source, &WordEncoder, &TokenizerPolicy::default());

        assert_eq!(tokenized.skipped, 1);
        assert_eq!(
            tokenized.labels(),
            vec![Sentiment::Negative, Sentiment::Positive]
        );
    }

    #[test]
    fn items_are_read_through_the_dataset_interface() {
        let tokenized = tokenize(&split(&["a", "b c"]), &WordEncoder, &TokenizerPolicy::default());

        assert_eq!(Dataset::len(&tokenized), 2);
        assert_eq!(tokenized.get(1), Some(tokenized.examples[1].clone()));
        assert_eq!(tokenized.get(2), None);
    }

    #[test]
    fn dynamic_padding_defers_length_uniformity() {
        let policy = TokenizerPolicy::default().with_padding(Padding::Dynamic);
        let tokenized = tokenize(&split(&["one", "one two three"]), &WordEncoder, &policy);

        let lengths: Vec<_> = tokenized
            .examples
            .iter()
            .map(|e| e.input_ids.len())
            .collect();
        assert_eq!(lengths, vec![3, 5]);
        assert!(tokenized
            .examples
            .iter()
            .all(|e| e.attention_mask.iter().all(|m| *m == 1)));
    }
}
