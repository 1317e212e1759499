use std::path::Path;

use burn::LearningRate;
use derive_new::new;

use crate::{datasets::Sentiment, preprocessing::Batch};

/// The result of a forward pass without gradient tracking
#[derive(Debug, Clone, PartialEq, new)]
pub struct Forward {
    /// Mean cross-entropy loss of the batch
    pub loss: f64,

    /// Class logits: [batch_size, num_labels]
    pub logits: Vec<Vec<f32>>,
}

impl Forward {
    /// The highest-scoring class of each row; ties resolve to the lowest class id
    pub fn predictions(&self) -> anyhow::Result<Vec<Sentiment>> {
        self.logits
            .iter()
            .map(|row| {
                let index = row
                    .iter()
                    .enumerate()
                    .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
                        Some((_, max)) if max >= v => best,
                        _ => Some((i, v)),
                    })
                    .map(|(i, _)| i)
                    .ok_or_else(|| anyhow!("empty logits row"))?;

                Ok(Sentiment::try_from(index)?)
            })
            .collect()
    }
}

/// A sequence classifier together with its optimizer state
///
/// This is the black-box boundary around the training backend: the harness only sees batch
/// losses and logits.
pub trait Classifier: Send {
    /// Run forward and backward passes, apply one optimizer step, and return the batch loss
    fn train_step(&mut self, batch: &Batch, learning_rate: LearningRate) -> anyhow::Result<f64>;

    /// Run an inference forward pass
    fn forward(&self, batch: &Batch) -> anyhow::Result<Forward>;

    /// Persist the trained weights and configuration under `dir`
    fn save(&self, dir: &Path) -> anyhow::Result<()>;
}
