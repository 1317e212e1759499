//! Confusion matrix over the three sentiment classes

use serde::{Deserialize, Serialize};

use crate::datasets::{Sentiment, NUM_LABELS};

/// Confusion matrix: `matrix[true][predicted]`, both ordered Negative, Neutral, Positive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfusionMatrix {
    matrix: [[usize; NUM_LABELS]; NUM_LABELS],
}

impl ConfusionMatrix {
    /// Count label pairs. Callers guarantee equal lengths.
    pub fn from_labels(y_true: &[Sentiment], y_pred: &[Sentiment]) -> Self {
        let mut matrix = [[0; NUM_LABELS]; NUM_LABELS];

        for (truth, pred) in y_true.iter().zip(y_pred) {
            matrix[truth.index()][pred.index()] += 1;
        }

        Self { matrix }
    }

    /// The raw rows
    pub fn rows(&self) -> &[[usize; NUM_LABELS]; NUM_LABELS] {
        &self.matrix
    }

    /// Count of samples with the given true and predicted labels
    pub fn get(&self, truth: Sentiment, predicted: Sentiment) -> usize {
        self.matrix[truth.index()][predicted.index()]
    }

    /// Correct predictions for a class
    pub fn true_positives(&self, class: usize) -> usize {
        self.matrix[class][class]
    }

    /// Predicted as `class` but labelled otherwise
    pub fn false_positives(&self, class: usize) -> usize {
        (0..NUM_LABELS)
            .filter(|&i| i != class)
            .map(|i| self.matrix[i][class])
            .sum()
    }

    /// Labelled `class` but predicted otherwise
    pub fn false_negatives(&self, class: usize) -> usize {
        (0..NUM_LABELS)
            .filter(|&j| j != class)
            .map(|j| self.matrix[class][j])
            .sum()
    }

    /// Number of true instances of a class
    pub fn support(&self, class: usize) -> usize {
        self.matrix[class].iter().sum()
    }

    /// Number of predictions of a class
    pub fn predicted(&self, class: usize) -> usize {
        self.matrix.iter().map(|row| row[class]).sum()
    }

    /// Total number of samples
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// The largest cell value
    pub fn max(&self) -> usize {
        self.matrix.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Fraction of samples on the diagonal, 0 for an empty matrix
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }

        let correct: usize = (0..NUM_LABELS).map(|i| self.matrix[i][i]).sum();
        correct as f64 / total as f64
    }
}
