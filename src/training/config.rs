use burn::LearningRate;
use serde::{Deserialize, Serialize};

/// Fine-tuning hyperparameters; any knob not listed here keeps the backend default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of passes over the training split
    pub epochs: usize,

    /// Training mini-batch size
    pub train_batch_size: usize,

    /// Validation and test mini-batch size
    pub eval_batch_size: usize,

    /// Initial learning rate, decayed linearly to zero
    pub learning_rate: LearningRate,

    /// AdamW decoupled weight decay
    pub weight_decay: f32,

    /// Optimizer steps between training-loss log entries
    pub logging_steps: usize,

    /// Dropout applied to the encoder and the classification head
    pub hidden_dropout_prob: f64,

    /// Adam epsilon
    pub adam_epsilon: f32,

    /// Seed for the per-epoch shuffle
    pub seed: u64,

    /// Abort the run once training exceeds this many seconds
    pub timeout_secs: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 3,
            train_batch_size: 16,
            eval_batch_size: 32,
            learning_rate: 2e-5,
            weight_decay: 0.01,
            logging_steps: 10,
            hidden_dropout_prob: 0.1,
            adam_epsilon: 1e-8,
            seed: 42,
            timeout_secs: None,
        }
    }
}

impl TrainingConfig {
    /// Set the number of epochs
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set the training batch size
    pub fn with_train_batch_size(mut self, train_batch_size: usize) -> Self {
        self.train_batch_size = train_batch_size;
        self
    }

    /// Set the evaluation batch size
    pub fn with_eval_batch_size(mut self, eval_batch_size: usize) -> Self {
        self.eval_batch_size = eval_batch_size;
        self
    }

    /// Set the peak learning rate
    pub fn with_learning_rate(mut self, learning_rate: LearningRate) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set the logging cadence
    pub fn with_logging_steps(mut self, logging_steps: usize) -> Self {
        self.logging_steps = logging_steps;
        self
    }

    /// Set the run timeout
    pub fn with_timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
