use serde::{Deserialize, Serialize};

use crate::datasets::{Sentiment, NUM_LABELS};

use super::ConfusionMatrix;

/// Per-class precision, recall and F1, indexed by class id
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerClass {
    /// Precision per class
    pub precision: [f64; NUM_LABELS],

    /// Recall per class
    pub recall: [f64; NUM_LABELS],

    /// F1 per class
    pub f1: [f64; NUM_LABELS],
}

/// Averaged precision, recall and F1
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    /// Averaged precision
    pub precision: f64,

    /// Averaged recall
    pub recall: f64,

    /// Averaged F1
    pub f1: f64,
}

/// Every metric derived from one set of predictions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricBundle {
    /// Fraction of exact matches
    pub accuracy: f64,

    /// Per-class F1 weighted by class support
    pub weighted_f1: f64,

    /// Per-class scores
    pub per_class: PerClass,

    /// Unweighted mean over classes
    pub macro_avg: Averages,

    /// Support-weighted mean over classes
    pub weighted_avg: Averages,

    /// Rows are true labels, columns are predicted labels
    pub confusion_matrix: ConfusionMatrix,
}

impl MetricBundle {
    /// Number of true instances of a class
    pub fn support(&self, label: Sentiment) -> usize {
        self.confusion_matrix.support(label.index())
    }

    /// Number of evaluated samples
    pub fn total(&self) -> usize {
        self.confusion_matrix.total()
    }
}

/// Inconsistent inputs to the metrics engine
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricComputationError {
    /// `y_true` and `y_pred` differ in length
    #[error("y_true has {y_true} labels but y_pred has {y_pred}")]
    LengthMismatch {
        /// Length of the gold labels
        y_true: usize,
        /// Length of the predictions
        y_pred: usize,
    },
}

/// Compute all metrics for aligned gold and predicted labels
///
/// Any ratio with a zero denominator is 0, so classes missing from `y_true` (or from
/// `y_pred`) score 0 instead of failing.
pub fn evaluate(
    y_true: &[Sentiment],
    y_pred: &[Sentiment],
) -> Result<MetricBundle, MetricComputationError> {
    if y_true.len() != y_pred.len() {
        return Err(MetricComputationError::LengthMismatch {
            y_true: y_true.len(),
            y_pred: y_pred.len(),
        });
    }

    let confusion_matrix = ConfusionMatrix::from_labels(y_true, y_pred);
    let mut per_class = PerClass::default();

    for class in 0..NUM_LABELS {
        let tp = confusion_matrix.true_positives(class) as f64;
        let fp = confusion_matrix.false_positives(class) as f64;
        let fn_ = confusion_matrix.false_negatives(class) as f64;

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);

        per_class.precision[class] = precision;
        per_class.recall[class] = recall;
        per_class.f1[class] = ratio(2.0 * precision * recall, precision + recall);
    }

    let support: Vec<f64> = (0..NUM_LABELS)
        .map(|class| confusion_matrix.support(class) as f64)
        .collect();

    let macro_avg = Averages {
        precision: mean(&per_class.precision, None),
        recall: mean(&per_class.recall, None),
        f1: mean(&per_class.f1, None),
    };

    let weighted_avg = Averages {
        precision: mean(&per_class.precision, Some(&support)),
        recall: mean(&per_class.recall, Some(&support)),
        f1: mean(&per_class.f1, Some(&support)),
    };

    Ok(MetricBundle {
        accuracy: confusion_matrix.accuracy(),
        weighted_f1: weighted_avg.f1,
        per_class,
        macro_avg,
        weighted_avg,
        confusion_matrix,
    })
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

fn mean(values: &[f64], weights: Option<&[f64]>) -> f64 {
    match weights {
        Some(weights) => ratio(
            values.iter().zip(weights).map(|(v, w)| v * w).sum(),
            weights.iter().sum(),
        ),
        None => ratio(values.iter().sum(), values.len() as f64),
    }
}
