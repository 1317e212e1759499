use std::path::Path;

use burn::LearningRate;
use pretty_assertions::assert_eq;

use crate::{
    datasets::Sentiment,
    preprocessing::{Batch, Padding, TokenizedExample, TokenizedSplit},
};

use super::*;

/// Predicts the gold label and reports a scripted loss per step
struct EchoClassifier {
    /// Loss returned by the n-th training step (the last value repeats)
    losses: Vec<f64>,
    /// Learning rate and batch size seen at each training step
    steps: Vec<(LearningRate, usize)>,
    /// First label of every training batch, to observe the shuffle order
    first_labels: Vec<Sentiment>,
}

impl EchoClassifier {
    fn new(losses: Vec<f64>) -> Self {
        Self {
            losses,
            steps: Vec::new(),
            first_labels: Vec::new(),
        }
    }
}

impl Classifier for EchoClassifier {
    fn train_step(&mut self, batch: &Batch, learning_rate: LearningRate) -> anyhow::Result<f64> {
        let loss = self
            .losses
            .get(self.steps.len())
            .or(self.losses.last())
            .copied()
            .unwrap_or(0.5);

        self.steps.push((learning_rate, batch.len()));
        self.first_labels.push(batch.labels[0]);

        Ok(loss)
    }

    fn forward(&self, batch: &Batch) -> anyhow::Result<Forward> {
        let logits = batch
            .labels
            .iter()
            .map(|label| {
                let mut row = vec![0.0; 3];
                row[label.index()] = 1.0;
                row
            })
            .collect();

        Ok(Forward::new(0.25, logits))
    }

    fn save(&self, _dir: &Path) -> anyhow::Result<()> {
        Ok(())
    }
}

fn tokenized(name: &str, n: usize) -> TokenizedSplit {
    TokenizedSplit {
        name: name.to_string(),
        examples: (0..n)
            .map(|i| {
                TokenizedExample::new(
                    vec![1, 10 + i as u32, 2],
                    vec![1, 1, 1],
                    Sentiment::ALL[i % 3],
                )
            })
            .collect(),
        skipped: 0,
        padding: Padding::MaxLength,
        pad_token_id: 0,
    }
}

#[test]
fn runs_every_epoch_in_mini_batches() {
    let mut classifier = EchoClassifier::new(vec![0.5]);
    let config = TrainingConfig::default()
        .with_train_batch_size(4)
        .with_logging_steps(2);

    let log = fit(
        &mut classifier,
        &tokenized("train", 30),
        &tokenized("validation", 9),
        &config,
    )
    .unwrap();

    // 30 examples in batches of 4: 7 full batches and one of 2, three times
    assert_eq!(classifier.steps.len(), 24);
    assert_eq!(classifier.steps[7].1, 2);
    assert_eq!(log.train_losses().len(), 12);
    assert_eq!(log.eval_losses(), vec![0.25, 0.25, 0.25]);

    let last = log.entries().last().unwrap();
    assert_eq!(last.step, 24);
    assert_eq!(last.eval_accuracy, Some(1.0));
    assert_eq!(last.eval_f1, Some(1.0));
}

#[test]
fn logs_thirty_train_entries_for_three_epochs() {
    let mut classifier = EchoClassifier::new(vec![0.5]);
    let config = TrainingConfig::default().with_train_batch_size(1);

    let log = fit(
        &mut classifier,
        &tokenized("train", 100),
        &tokenized("validation", 3),
        &config,
    )
    .unwrap();

    assert_eq!(log.train_losses().len(), 30);
    assert_eq!(log.eval_losses().len(), 3);

    let curves = log.loss_curves();
    assert_eq!(curves.train.len(), 3);
    assert_eq!(curves.eval.len(), 3);
}

#[test]
fn train_entries_never_trail_eval_entries() {
    let mut classifier = EchoClassifier::new(vec![0.75, 0.25, 0.5]);
    let config = TrainingConfig::default()
        .with_train_batch_size(8)
        .with_logging_steps(50);

    let log = fit(
        &mut classifier,
        &tokenized("train", 16),
        &tokenized("validation", 4),
        &config,
    )
    .unwrap();

    assert_eq!(log.eval_losses().len(), 3);
    assert!(log.train_losses().len() >= log.eval_losses().len());
    assert_eq!(log.train_losses()[0], 0.5);
}

#[test]
fn fails_fast_on_non_finite_loss() {
    let mut classifier = EchoClassifier::new(vec![0.5, 0.4, f64::NAN, 0.3]);

    let err = fit(
        &mut classifier,
        &tokenized("train", 16),
        &tokenized("validation", 4),
        &TrainingConfig::default().with_train_batch_size(2),
    )
    .unwrap_err();

    assert!(matches!(err, TrainingError::Diverged { step: 3, .. }));
    assert_eq!(classifier.steps.len(), 3);
}

#[test]
fn learning_rate_decays_linearly() {
    let mut classifier = EchoClassifier::new(vec![0.5]);
    let config = TrainingConfig::default()
        .with_epochs(1)
        .with_train_batch_size(1);

    fit(
        &mut classifier,
        &tokenized("train", 4),
        &tokenized("validation", 1),
        &config,
    )
    .unwrap();

    // The schedule steps before every optimizer step and reaches zero on the last one
    let expected = [0.75, 0.5, 0.25, 0.0].map(|fraction| 2e-5 * fraction);
    let rates: Vec<_> = classifier.steps.iter().map(|(lr, _)| *lr).collect();

    assert_eq!(rates.len(), expected.len());
    for (rate, expected) in rates.iter().zip(expected) {
        assert!((rate - expected).abs() < 1e-12, "{rate} != {expected}");
    }
}

#[test]
fn rejects_learning_rates_outside_the_unit_interval() {
    for learning_rate in [0.0, -1e-5, 1.5, f64::NAN] {
        let mut classifier = EchoClassifier::new(vec![0.5]);

        let err = fit(
            &mut classifier,
            &tokenized("train", 4),
            &tokenized("validation", 1),
            &TrainingConfig::default().with_learning_rate(learning_rate),
        )
        .unwrap_err();

        assert!(matches!(err, TrainingError::InvalidLearningRate(_)));
        assert!(classifier.steps.is_empty());
    }
}

#[test]
fn shuffle_is_seeded() {
    let run = || {
        let mut classifier = EchoClassifier::new(vec![0.5]);
        fit(
            &mut classifier,
            &tokenized("train", 24),
            &tokenized("validation", 3),
            &TrainingConfig::default().with_train_batch_size(1),
        )
        .unwrap();
        classifier.first_labels
    };

    assert_eq!(run(), run());
}

#[test]
fn honours_the_timeout() {
    let mut classifier = EchoClassifier::new(vec![0.5]);

    let err = fit(
        &mut classifier,
        &tokenized("train", 4),
        &tokenized("validation", 1),
        &TrainingConfig::default().with_timeout_secs(Some(0)),
    )
    .unwrap_err();

    assert!(matches!(err, TrainingError::TimedOut(0)));
    assert!(classifier.steps.is_empty());
}

#[test]
fn rejects_empty_splits() {
    let mut classifier = EchoClassifier::new(vec![0.5]);

    let err = fit(
        &mut classifier,
        &tokenized("train", 4),
        &tokenized("validation", 0),
        &TrainingConfig::default(),
    )
    .unwrap_err();

    assert!(matches!(err, TrainingError::EmptySplit(name) if name == "validation"));
}

#[test]
fn predictions_are_aligned_with_the_split() {
    let classifier = EchoClassifier::new(vec![0.5]);
    let test = tokenized("test", 70);

    let predictions = predict(&classifier, &test, 32).unwrap();

    assert_eq!(predictions.y_true.len(), 70);
    assert_eq!(predictions.y_true, test.labels());
    assert_eq!(predictions.y_pred, predictions.y_true);
}
