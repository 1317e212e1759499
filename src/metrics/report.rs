//! scikit-learn style classification report

use crate::datasets::Sentiment;

use super::{Averages, MetricBundle};

/// Width of the row-name column, long enough for "weighted avg"
const NAME_WIDTH: usize = 12;

/// Format per-class precision/recall/F1/support plus accuracy and averages as a table
pub fn classification_report(metrics: &MetricBundle) -> String {
    let total = metrics.total();
    let mut report = format!(
        "{:>NAME_WIDTH$}  {:>9} {:>9} {:>9} {:>9}\n\n",
        "", "precision", "recall", "f1-score", "support"
    );

    for label in Sentiment::ALL {
        let class = label.index();

        report.push_str(&row(
            label.name(),
            metrics.per_class.precision[class],
            metrics.per_class.recall[class],
            metrics.per_class.f1[class],
            metrics.support(label),
        ));
    }

    report.push('\n');
    report.push_str(&format!(
        "{:>NAME_WIDTH$}  {:>9} {:>9} {:>9.2} {:>9}\n",
        "accuracy", "", "", metrics.accuracy, total
    ));
    report.push_str(&average_row("macro avg", &metrics.macro_avg, total));
    report.push_str(&average_row("weighted avg", &metrics.weighted_avg, total));

    report
}

fn row(name: &str, precision: f64, recall: f64, f1: f64, support: usize) -> String {
    format!("{name:>NAME_WIDTH$}  {precision:>9.2} {recall:>9.2} {f1:>9.2} {support:>9}\n")
}

fn average_row(name: &str, averages: &Averages, support: usize) -> String {
    row(
        name,
        averages.precision,
        averages.recall,
        averages.f1,
        support,
    )
}
