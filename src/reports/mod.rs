//! Charts and text reports for finished runs
//!
//! Rendering is split from output: the functions in [`charts`] turn already-computed results
//! into [`Artifact`]s, and a [`Sink`] decides where those end up.

use std::path::PathBuf;

use derive_new::new;

/// SVG charts rendered from templates
pub mod charts;

/// Artifact destinations
pub mod sink;

/// Per-run and cross-run reporting
pub mod reporter;

pub use charts::{
    render_class_metrics, render_confusion_matrix, render_loss_curves,
    render_prediction_distribution,
};
pub use reporter::{comparison_table, Reporter};
pub use sink::{FileSink, Sink};

/// A named report output
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Artifact {
    /// File name, relative to the run's output directory
    pub file_name: String,

    /// File contents
    pub contents: String,
}

/// Report Error
#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    /// A chart template failed to parse or render
    #[error("template error: {0}")]
    Template(#[from] liquid::Error),

    /// The result summary could not be serialized
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// An artifact could not be written
    #[error("unable to write {}: {source}", .path.display())]
    Io {
        /// The destination path
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },
}
