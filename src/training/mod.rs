/// Fine-tuning hyperparameters
pub mod config;

/// Classifier abstraction over the training backend
pub mod classifier;

/// Epoch log and loss curves
pub mod epoch_log;

/// The fit / predict loop
pub mod harness;

#[cfg(test)]
mod tests;

pub use classifier::{Classifier, Forward};
pub use config::TrainingConfig;
pub use epoch_log::{EpochLog, LogEntry, LossCurves};
pub use harness::{fit, predict, PredictionResult, TrainingError};
