use bert_burn::data::BertInferenceBatch;
use burn::tensor::{backend::Backend, Int, Tensor};
use derive_new::new;

use crate::{preprocessing::Batch, utils::tensors};

/// Struct for training batch for sequence classification
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Bert Model input
    pub input: BertInferenceBatch<B>,

    /// Class ids for the batch
    pub targets: Tensor<B, 1, Int>,
}

/// Move a collated host batch onto a device
///
/// The padding mask is true for padded positions, derived from the attention mask.
pub fn to_device<B: Backend>(batch: &Batch, device: &B::Device) -> Train<B> {
    let seq_length = batch.seq_length();

    let tokens = tensors::from_rows::<B>(&batch.input_ids, seq_length, device);
    let mask_pad = tensors::from_rows::<B>(&batch.attention_mask, seq_length, device).equal_elem(0);

    let class_ids: Vec<i64> = batch.labels.iter().map(|l| l.index() as i64).collect();
    let targets = tensors::from_values::<B>(&class_ids, device);

    Train::new(BertInferenceBatch { tokens, mask_pad }, targets)
}

#[cfg(test)]
mod tests {
    use burn::backend::{libtorch::LibTorchDevice, LibTorch};
    use pretty_assertions::assert_eq;

    use crate::{
        datasets::Sentiment,
        preprocessing::{Batch, TokenizedExample},
    };

    use super::*;

    #[test]
    fn builds_tokens_mask_and_targets() {
        let examples = vec![
            TokenizedExample::new(vec![1, 7, 2], vec![1, 1, 1], Sentiment::Positive),
            TokenizedExample::new(vec![1, 2], vec![1, 1], Sentiment::Negative),
        ];
        let batch = Batch::collate(&examples, 0);

        let train = to_device::<LibTorch>(&batch, &LibTorchDevice::Cpu);

        assert_eq!(train.input.tokens.dims(), [2, 3]);
        assert_eq!(
            train.input.tokens.into_data().convert::<i64>().value,
            vec![1, 7, 2, 1, 2, 0]
        );
        assert_eq!(
            train.input.mask_pad.into_data().value,
            vec![false, false, false, false, false, true]
        );
        assert_eq!(train.targets.into_data().convert::<i64>().value, vec![2, 0]);
    }
}
