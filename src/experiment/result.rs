use serde::{Deserialize, Serialize};

use crate::{
    metrics::{MetricBundle, MetricComputationError},
    training::{EpochLog, PredictionResult, TrainingError},
};

/// Run Error
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    /// The tokenizer or model could not be loaded
    #[error("provider failure: {0}")]
    Provider(anyhow::Error),

    /// Every example of a split was skipped during preprocessing
    #[error("no {split} example could be tokenized ({skipped} skipped)")]
    Tokenization {
        /// The split name
        split: String,
        /// Number of skipped examples
        skipped: usize,
    },

    /// Fine-tuning or prediction failed
    #[error(transparent)]
    Training(#[from] TrainingError),

    /// Test metrics could not be computed
    #[error(transparent)]
    Metrics(#[from] MetricComputationError),

    /// The model backend panicked
    #[error("model run panicked: {0}")]
    Panicked(String),
}

/// Examples dropped by the preprocessor, per split
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipCounts {
    /// Skipped training examples
    pub train: usize,

    /// Skipped validation examples
    pub validation: usize,

    /// Skipped test examples
    pub test: usize,
}

impl SkipCounts {
    /// Skipped examples across all splits
    pub fn total(&self) -> usize {
        self.train + self.validation + self.test
    }
}

/// Everything a successful run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Test-set metrics
    pub metrics: MetricBundle,

    /// The training log
    pub epoch_log: EpochLog,

    /// Test-set labels and predictions
    pub predictions: PredictionResult,
}

/// How a run ended
#[derive(Debug)]
pub enum Outcome {
    /// The model was trained and evaluated
    Succeeded(Evaluation),

    /// The run stopped early
    Failed(RunError),
}

/// Run status, as shown in summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// See [`Outcome::Succeeded`]
    Succeeded,

    /// See [`Outcome::Failed`]
    Failed,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Succeeded => write!(f, "succeeded"),
            Status::Failed => write!(f, "failed"),
        }
    }
}

/// The result of one model run
#[derive(Debug)]
pub struct ResultBundle {
    /// Label used for output paths and report titles
    pub model_label: String,

    /// The pretrained model identifier
    pub identifier: String,

    /// Examples dropped during preprocessing
    pub skipped: SkipCounts,

    /// Evaluation or failure
    pub outcome: Outcome,
}

impl ResultBundle {
    /// A bundle for a run that completed
    pub fn succeeded(
        model_label: impl Into<String>,
        identifier: impl Into<String>,
        skipped: SkipCounts,
        evaluation: Evaluation,
    ) -> Self {
        Self {
            model_label: model_label.into(),
            identifier: identifier.into(),
            skipped,
            outcome: Outcome::Succeeded(evaluation),
        }
    }

    /// A bundle for a run that stopped early
    pub fn failed(
        model_label: impl Into<String>,
        identifier: impl Into<String>,
        skipped: SkipCounts,
        error: RunError,
    ) -> Self {
        Self {
            model_label: model_label.into(),
            identifier: identifier.into(),
            skipped,
            outcome: Outcome::Failed(error),
        }
    }

    /// Whether the run succeeded
    pub fn status(&self) -> Status {
        match self.outcome {
            Outcome::Succeeded(_) => Status::Succeeded,
            Outcome::Failed(_) => Status::Failed,
        }
    }

    /// The evaluation, if the run succeeded
    pub fn evaluation(&self) -> Option<&Evaluation> {
        match &self.outcome {
            Outcome::Succeeded(evaluation) => Some(evaluation),
            Outcome::Failed(_) => None,
        }
    }

    /// The failure, if the run stopped early
    pub fn error(&self) -> Option<&RunError> {
        match &self.outcome {
            Outcome::Succeeded(_) => None,
            Outcome::Failed(error) => Some(error),
        }
    }

    /// The JSON summary persisted next to the charts
    pub fn summary(&self) -> Summary<'_> {
        Summary {
            model_label: &self.model_label,
            identifier: &self.identifier,
            status: self.status(),
            skipped: self.skipped,
            error: self.error().map(|e| e.to_string()),
            evaluation: self.evaluation(),
        }
    }
}

/// Serializable view of a [`ResultBundle`]
#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    /// See [`ResultBundle::model_label`]
    pub model_label: &'a str,
    /// See [`ResultBundle::identifier`]
    pub identifier: &'a str,
    /// Run status
    pub status: Status,
    /// See [`ResultBundle::skipped`]
    pub skipped: SkipCounts,
    /// The failure message, for failed runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Metrics, log and predictions, for successful runs
    #[serde(flatten)]
    pub evaluation: Option<&'a Evaluation>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        datasets::Sentiment::{Negative, Positive},
        metrics::evaluate,
    };

    use super::*;

    fn evaluation() -> Evaluation {
        let y_true = vec![Negative, Positive];
        let y_pred = vec![Negative, Negative];

        Evaluation {
            metrics: evaluate(&y_true, &y_pred).unwrap(),
            epoch_log: EpochLog::default(),
            predictions: PredictionResult { y_true, y_pred },
        }
    }

    #[test]
    fn status_follows_the_outcome() {
        let ok = ResultBundle::succeeded(
            "bert-base",
            "bert-base-uncased",
            SkipCounts::default(),
            evaluation(),
        );
        let failed = ResultBundle::failed(
            "roberta-base",
            "roberta-base",
            SkipCounts::default(),
            RunError::Training(TrainingError::TimedOut(60)),
        );

        assert_eq!(ok.status(), Status::Succeeded);
        assert!(ok.error().is_none());
        assert_eq!(failed.status(), Status::Failed);
        assert!(failed.evaluation().is_none());
    }

    #[test]
    fn summary_flattens_the_evaluation() {
        let skipped = SkipCounts {
            train: 2,
            validation: 0,
            test: 1,
        };
        let bundle =
            ResultBundle::succeeded("bert-base", "bert-base-uncased", skipped, evaluation());

        let json = serde_json::to_value(bundle.summary()).unwrap();

        assert_eq!(json["status"], "succeeded");
        assert_eq!(json["skipped"]["train"], 2);
        assert_eq!(json["metrics"]["accuracy"], 0.5);
        assert!(json.get("error").is_none());
        assert_eq!(skipped.total(), 3);
    }

    #[test]
    fn summary_carries_the_failure() {
        let bundle = ResultBundle::failed(
            "bertweet-base",
            "vinai/bertweet-base",
            SkipCounts::default(),
            RunError::Tokenization {
                split: "test".to_string(),
                skipped: 4,
            },
        );

        let json = serde_json::to_value(bundle.summary()).unwrap();

        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "no test example could be tokenized (4 skipped)");
        assert!(json.get("metrics").is_none());
    }
}
