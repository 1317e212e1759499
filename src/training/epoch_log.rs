use serde::{Deserialize, Serialize};

/// One logging event: either a training-loss interval or an evaluation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Optimizer steps completed when the entry was logged
    pub step: usize,

    /// Fractional epoch at the time of logging
    pub epoch: f64,

    /// Mean training loss over the logging interval
    pub train_loss: Option<f64>,

    /// Learning rate of the last step in the interval
    pub learning_rate: Option<f64>,

    /// Mean validation loss
    pub eval_loss: Option<f64>,

    /// Validation accuracy
    pub eval_accuracy: Option<f64>,

    /// Validation weighted F1
    pub eval_f1: Option<f64>,
}

/// Train and eval loss series, aligned by position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LossCurves {
    /// Training losses, truncated to the number of evaluation entries
    pub train: Vec<f64>,

    /// Evaluation losses, one per epoch
    pub eval: Vec<f64>,
}

/// Ordered log of a fine-tuning run, used to reconstruct loss curves
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochLog {
    entries: Vec<LogEntry>,
}

impl EpochLog {
    /// Append a training-loss entry
    pub fn push_train(&mut self, step: usize, epoch: f64, loss: f64, learning_rate: f64) {
        self.entries.push(LogEntry {
            step,
            epoch,
            train_loss: Some(loss),
            learning_rate: Some(learning_rate),
            ..Default::default()
        });
    }

    /// Append an evaluation entry
    pub fn push_eval(&mut self, step: usize, epoch: f64, loss: f64, accuracy: f64, f1: f64) {
        self.entries.push(LogEntry {
            step,
            epoch,
            eval_loss: Some(loss),
            eval_accuracy: Some(accuracy),
            eval_f1: Some(f1),
            ..Default::default()
        });
    }

    /// All entries, in logging order
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Training losses, in logging order
    pub fn train_losses(&self) -> Vec<f64> {
        self.entries.iter().filter_map(|e| e.train_loss).collect()
    }

    /// Evaluation losses, in logging order
    pub fn eval_losses(&self) -> Vec<f64> {
        self.entries.iter().filter_map(|e| e.eval_loss).collect()
    }

    /// Loss series for plotting. Alignment is positional: the i-th training entry is paired
    /// with the i-th evaluation entry, regardless of the steps at which they were logged.
    pub fn loss_curves(&self) -> LossCurves {
        let eval = self.eval_losses();
        let mut train = self.train_losses();
        train.truncate(eval.len());

        LossCurves { train, eval }
    }
}
