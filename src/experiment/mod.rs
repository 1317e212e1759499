//! Experiment orchestration
//!
//! A [`Runner`] takes every configured model through the same sequence: tokenize the shared
//! dataset, fine-tune, predict on the test split, compute metrics and write reports. Each model
//! yields exactly one [`ResultBundle`], in configuration order.

/// Model and experiment configuration
pub mod config;

/// Built-in model presets
pub mod presets;

/// Tokenizer and model loading
pub mod provider;

/// Result bundles
pub mod result;

/// The sequential experiment runner
pub mod runner;

pub use config::{ConfigError, ExperimentConfig, ModelConfig, ModelEntry};
pub use provider::ModelProvider;
pub use result::{Evaluation, Outcome, ResultBundle, RunError, SkipCounts, Status, Summary};
pub use runner::Runner;
