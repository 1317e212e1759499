//! # Sentiment Bench
#![forbid(unsafe_code)]

/// Datasets
pub mod datasets;

/// Text preprocessing
pub mod preprocessing;

/// Fine-tuning harness
pub mod training;

/// Classification metrics
pub mod metrics;

/// Charts and text reports
pub mod reports;

/// Experiment orchestration
pub mod experiment;

/// Model backends
pub mod models;

/// Utilities
pub mod utils;

/// CLI indexes and utilities
pub mod cli;

/// Error macros
#[macro_use]
extern crate anyhow;
