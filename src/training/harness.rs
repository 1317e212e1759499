use std::time::Instant;

use burn::{
    backend::LibTorch,
    data::{dataloader::batcher::Batcher as _, dataset::Dataset},
    lr_scheduler::{
        linear::{LinearLrScheduler, LinearLrSchedulerConfig},
        LrScheduler,
    },
    LearningRate,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    datasets::Sentiment,
    metrics::{self, MetricComputationError},
    preprocessing::{Batcher, TokenizedSplit},
};

use super::{Classifier, EpochLog, TrainingConfig};

/// Gold and predicted labels for a tokenized split, index-aligned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Gold labels
    pub y_true: Vec<Sentiment>,

    /// Predicted labels
    pub y_pred: Vec<Sentiment>,
}

/// Training Error
#[derive(thiserror::Error, Debug)]
pub enum TrainingError {
    /// A non-finite loss was observed
    #[error("training diverged at step {step}: loss is {loss}")]
    Diverged {
        /// Optimizer steps completed when the loss was observed
        step: usize,
        /// The offending loss value
        loss: f64,
    },

    /// The run exceeded its time budget
    #[error("training exceeded its {0}s timeout")]
    TimedOut(u64),

    /// Nothing to train or evaluate on
    #[error("split {0} has no examples")]
    EmptySplit(String),

    /// The learning rate is outside of (0, 1]
    #[error("learning rate {0} must be greater than 0 and at most 1")]
    InvalidLearningRate(LearningRate),

    /// Validation metrics could not be computed
    #[error(transparent)]
    Metrics(#[from] MetricComputationError),

    /// The model backend failed
    #[error("backend failure: {0}")]
    Backend(anyhow::Error),
}

/// Fine-tune `classifier` on `train`, evaluating on `validation` after every epoch
///
/// The learning rate decays linearly from `learning_rate` to zero over the whole run, stepping
/// before each optimizer step. Training losses are logged every `logging_steps` optimizer steps
/// as the mean over the interval. Before each evaluation a partial interval is flushed when
/// needed, so the log
/// always holds at least as many training-loss entries as evaluation entries.
pub fn fit(
    classifier: &mut dyn Classifier,
    train: &TokenizedSplit,
    validation: &TokenizedSplit,
    config: &TrainingConfig,
) -> Result<EpochLog, TrainingError> {
    for split in [train, validation] {
        if split.is_empty() {
            return Err(TrainingError::EmptySplit(split.name.clone()));
        }
    }

    if !(config.learning_rate > 0.0 && config.learning_rate <= 1.0) {
        return Err(TrainingError::InvalidLearningRate(config.learning_rate));
    }

    let batch_size = config.train_batch_size.max(1);
    let logging_steps = config.logging_steps.max(1);
    let steps_per_epoch = train.len().div_ceil(batch_size);
    let batcher = Batcher::new(train.pad_token_id);
    let mut scheduler =
        LinearLrSchedulerConfig::new(config.learning_rate, 0.0, steps_per_epoch * config.epochs)
            .init();

    let started = Instant::now();
    let mut log = EpochLog::default();
    let mut interval = Interval::default();
    let mut indices: Vec<usize> = (0..train.len()).collect();
    let mut step = 0;

    for epoch in 0..config.epochs {
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(epoch as u64));
        indices.shuffle(&mut rng);

        for chunk in indices.chunks(batch_size) {
            if let Some(limit) = config.timeout_secs {
                if started.elapsed().as_secs() >= limit {
                    return Err(TrainingError::TimedOut(limit));
                }
            }

            let items = chunk.iter().filter_map(|&i| train.get(i)).collect();
            let batch = batcher.batch(items);
            let learning_rate = next_learning_rate(&mut scheduler);

            let loss = classifier
                .train_step(&batch, learning_rate)
                .map_err(TrainingError::Backend)?;
            step += 1;

            if !loss.is_finite() {
                return Err(TrainingError::Diverged { step, loss });
            }

            interval.add(loss, learning_rate);

            if step % logging_steps == 0 {
                interval.flush(&mut log, step, step as f64 / steps_per_epoch as f64);
            }
        }

        if log.train_losses().len() <= log.eval_losses().len() {
            interval.flush(&mut log, step, step as f64 / steps_per_epoch as f64);
        }

        let (eval_loss, y_pred) = run_inference(classifier, validation, config.eval_batch_size)?;
        if !eval_loss.is_finite() {
            return Err(TrainingError::Diverged {
                step,
                loss: eval_loss,
            });
        }

        let metrics = metrics::evaluate(&validation.labels(), &y_pred)?;

        log.push_eval(
            step,
            (epoch + 1) as f64,
            eval_loss,
            metrics.accuracy,
            metrics.weighted_f1,
        );

        log::info!(
            "Epoch {}/{}: eval_loss = {:.4}, accuracy = {:.4}, f1 = {:.4}",
            epoch + 1,
            config.epochs,
            eval_loss,
            metrics.accuracy,
            metrics.weighted_f1
        );
    }

    Ok(log)
}

/// Predict labels for every example of a tokenized split
pub fn predict(
    classifier: &dyn Classifier,
    split: &TokenizedSplit,
    eval_batch_size: usize,
) -> Result<PredictionResult, TrainingError> {
    if split.is_empty() {
        return Err(TrainingError::EmptySplit(split.name.clone()));
    }

    let (loss, y_pred) = run_inference(classifier, split, eval_batch_size)?;
    log::info!("{} loss = {:.4}", split.name, loss);

    Ok(PredictionResult {
        y_true: split.labels(),
        y_pred,
    })
}

/// Mean per-example loss and predictions over a split, in split order
fn run_inference(
    classifier: &dyn Classifier,
    split: &TokenizedSplit,
    batch_size: usize,
) -> Result<(f64, Vec<Sentiment>), TrainingError> {
    let batch_size = batch_size.max(1);
    let batcher = Batcher::new(split.pad_token_id);
    let mut loss_sum = 0.0;
    let mut y_pred = Vec::with_capacity(split.len());

    for start in (0..split.len()).step_by(batch_size) {
        let end = (start + batch_size).min(split.len());
        let items = (start..end).filter_map(|i| split.get(i)).collect();
        let batch = batcher.batch(items);
        let forward = classifier.forward(&batch).map_err(TrainingError::Backend)?;

        loss_sum += forward.loss * batch.len() as f64;
        y_pred.extend(forward.predictions().map_err(TrainingError::Backend)?);
    }

    if y_pred.len() != split.len() {
        return Err(TrainingError::Backend(anyhow!(
            "expected {} predictions for {}, got {}",
            split.len(),
            split.name,
            y_pred.len()
        )));
    }

    Ok((loss_sum / split.len() as f64, y_pred))
}

/// Advance the schedule by one optimizer step
///
/// The scheduler keeps no tensors, so the backend named for its record type is arbitrary.
fn next_learning_rate(scheduler: &mut LinearLrScheduler) -> LearningRate {
    LrScheduler::<LibTorch>::step(scheduler)
}

/// Losses accumulated since the last training-loss entry
#[derive(Default)]
struct Interval {
    sum: f64,
    count: usize,
    learning_rate: LearningRate,
}

impl Interval {
    fn add(&mut self, loss: f64, learning_rate: LearningRate) {
        self.sum += loss;
        self.count += 1;
        self.learning_rate = learning_rate;
    }

    fn flush(&mut self, log: &mut EpochLog, step: usize, epoch: f64) {
        if self.count == 0 {
            return;
        }

        log.push_train(step, epoch, self.sum / self.count as f64, self.learning_rate);
        *self = Interval::default();
    }
}
