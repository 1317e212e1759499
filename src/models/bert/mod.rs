/// The classifier configuration
pub mod config;

/// BERT for sequence classification
pub mod model;

/// Host batch to tensor conversion
pub mod batcher;

/// The training-loop adapter
pub mod classifier;

/// Hub-backed tokenizers and models
pub mod provider;

pub use classifier::BertClassifier;
pub use config::Config;
pub use model::{Model, ModelRecord};
pub use provider::BertProvider;
