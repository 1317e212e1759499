//! Classification metrics for the three sentiment classes
//!
//! Everything here is a pure function of `(y_true, y_pred)`, so the engine can be tested
//! without a model or a rendering backend.

/// Confusion matrix
pub mod confusion;

/// Metric bundle and the `evaluate` entry point
pub mod bundle;

/// Text classification report
pub mod report;


pub use bundle::{evaluate, Averages, MetricBundle, MetricComputationError, PerClass};
pub use confusion::ConfusionMatrix;
pub use report::classification_report;
