use burn::data::dataloader;
use derive_new::new;

use crate::datasets::Sentiment;

use super::TokenizedExample;

/// Collates tokenized examples into host-side mini-batches
#[derive(Debug, Clone, Copy, new)]
pub struct Batcher {
    /// ID of the padding token
    pad_token_id: u32,
}

impl dataloader::batcher::Batcher<TokenizedExample, Batch> for Batcher {
    fn batch(&self, items: Vec<TokenizedExample>) -> Batch {
        Batch::collate(&items, self.pad_token_id)
    }
}

/// A collated mini-batch with uniform sequence length
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Batch {
    /// Token ids: [batch_size, seq_length]
    pub input_ids: Vec<Vec<u32>>,

    /// Attention mask: [batch_size, seq_length]
    pub attention_mask: Vec<Vec<u32>>,

    /// Gold labels: [batch_size]
    pub labels: Vec<Sentiment>,
}

impl Batch {
    /// Collate examples, padding each one to the longest sequence in the batch. Examples that
    /// were padded at tokenization time already share a length and are left untouched.
    pub fn collate<'a>(
        examples: impl IntoIterator<Item = &'a TokenizedExample>,
        pad_token_id: u32,
    ) -> Self {
        let examples: Vec<_> = examples.into_iter().collect();
        let seq_length = examples
            .iter()
            .map(|e| e.input_ids.len())
            .max()
            .unwrap_or(0);

        let mut batch = Batch {
            input_ids: Vec::with_capacity(examples.len()),
            attention_mask: Vec::with_capacity(examples.len()),
            labels: Vec::with_capacity(examples.len()),
        };

        for example in examples {
            let mut input_ids = example.input_ids.clone();
            let mut attention_mask = example.attention_mask.clone();

            input_ids.resize(seq_length, pad_token_id);
            attention_mask.resize(seq_length, 0);

            batch.input_ids.push(input_ids);
            batch.attention_mask.push(attention_mask);
            batch.labels.push(example.label);
        }

        batch
    }

    /// Number of examples in the batch
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True for a batch without examples
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The shared sequence length
    pub fn seq_length(&self) -> usize {
        self.input_ids.first().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use burn::data::dataloader::batcher::Batcher as _;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn pads_to_longest_sequence() {
        let examples = vec![
            TokenizedExample::new(vec![1, 7, 2], vec![1, 1, 1], Sentiment::Positive),
            TokenizedExample::new(vec![1, 7, 8, 9, 2], vec![1; 5], Sentiment::Negative),
        ];

        let batch = Batch::collate(&examples, 0);

        assert_eq!(batch.seq_length(), 5);
        assert_eq!(batch.input_ids[0], vec![1, 7, 2, 0, 0]);
        assert_eq!(batch.attention_mask[0], vec![1, 1, 1, 0, 0]);
        assert_eq!(batch.labels, vec![Sentiment::Positive, Sentiment::Negative]);
    }

    #[test]
    fn batcher_pads_with_its_token() {
        let items = vec![
            TokenizedExample::new(vec![0, 7, 2], vec![1, 1, 1], Sentiment::Neutral),
            TokenizedExample::new(vec![0, 2], vec![1, 1], Sentiment::Positive),
        ];

        let batch = Batcher::new(1).batch(items);

        assert_eq!(batch.input_ids[1], vec![0, 2, 1]);
        assert_eq!(batch.attention_mask[1], vec![1, 1, 0]);
    }

    #[test]
    fn empty_batches_have_no_length() {
        let batch = Batch::collate(std::iter::empty(), 0);

        assert!(batch.is_empty());
        assert_eq!(batch.seq_length(), 0);
    }
}
