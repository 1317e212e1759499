use std::fmt::Write;

use crate::{
    experiment::{Evaluation, ResultBundle},
    metrics::classification_report,
};

use super::{charts, Artifact, ReportError, Sink};

/// File name of the text classification report
pub static REPORT_FILE: &str = "classification_report.txt";

/// File name of the JSON result summary
pub static SUMMARY_FILE: &str = "result.json";

/// Renders the artifacts of finished runs and hands them to a sink
pub struct Reporter {
    sink: Box<dyn Sink>,
}

impl Reporter {
    /// Create a new Reporter writing to the given sink
    pub fn new(sink: Box<dyn Sink>) -> Self {
        Self { sink }
    }

    /// Write the report, charts and summary of one run
    ///
    /// Failed runs only get a summary. Bundles are read, never modified.
    pub fn report(&self, bundle: &ResultBundle) -> Result<(), ReportError> {
        let mut artifacts = Vec::with_capacity(6);

        if let Some(evaluation) = bundle.evaluation() {
            let report = classification_report(&evaluation.metrics);
            log::info!(
                "Classification report for {}:\n{}",
                bundle.model_label,
                report
            );

            artifacts.push(Artifact::new(REPORT_FILE.to_string(), report));
            artifacts.extend(render_charts(evaluation, &bundle.model_label)?);
        }

        artifacts.push(Artifact::new(
            SUMMARY_FILE.to_string(),
            serde_json::to_string_pretty(&bundle.summary())?,
        ));

        for artifact in &artifacts {
            self.sink.write(&bundle.model_label, artifact)?;
        }

        Ok(())
    }
}

fn render_charts(evaluation: &Evaluation, model_label: &str) -> Result<Vec<Artifact>, ReportError> {
    Ok(vec![
        charts::render_confusion_matrix(&evaluation.metrics.confusion_matrix, model_label)?,
        charts::render_loss_curves(&evaluation.epoch_log, model_label)?,
        charts::render_class_metrics(&evaluation.metrics.per_class, model_label)?,
        charts::render_prediction_distribution(&evaluation.predictions.y_pred, model_label)?,
    ])
}

/// A plain-text summary of every run: accuracy, weighted F1 and status
pub fn comparison_table(results: &[ResultBundle]) -> String {
    let width = results
        .iter()
        .map(|r| r.model_label.len())
        .chain(Some("Model".len()))
        .max()
        .unwrap_or_default();

    let mut table = format!(
        "{:<width$}  {:>8}  {:>11}  {}\n",
        "Model", "Accuracy", "Weighted F1", "Status"
    );

    for result in results {
        let (accuracy, f1) = match result.evaluation() {
            Some(evaluation) => (
                format!("{:.4}", evaluation.metrics.accuracy),
                format!("{:.4}", evaluation.metrics.weighted_f1),
            ),
            None => ("-".to_string(), "-".to_string()),
        };

        // Writing to a String cannot fail
        let _ = writeln!(
            table,
            "{:<width$}  {:>8}  {:>11}  {}",
            result.model_label,
            accuracy,
            f1,
            result.status()
        );
    }

    table
}
