use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The number of sentiment classes
pub const NUM_LABELS: usize = 3;

/// A three-way sentiment label
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    /// Label 0
    Negative,

    /// Label 1
    Neutral,

    /// Label 2
    Positive,
}

impl Sentiment {
    /// All labels, in class id order
    pub const ALL: [Sentiment; NUM_LABELS] =
        [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    /// The class id of this label
    pub fn index(self) -> usize {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Neutral => 1,
            Sentiment::Positive => 2,
        }
    }

    /// The display name used in reports
    pub fn name(self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }
}

impl TryFrom<usize> for Sentiment {
    type Error = LabelError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Sentiment::ALL
            .get(value)
            .copied()
            .ok_or(LabelError::OutOfRange(value as i64))
    }
}

impl TryFrom<i64> for Sentiment {
    type Error = LabelError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .map_err(|_| LabelError::OutOfRange(value))
            .and_then(Sentiment::try_from)
    }
}

impl TryFrom<&str> for Sentiment {
    type Error = LabelError;

    /// Parse a label as it appears in dataset files ("0", "1" or "2")
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();

        trimmed
            .parse::<i64>()
            .map_err(|_| LabelError::Invalid(trimmed.to_string()))
            .and_then(Sentiment::try_from)
    }
}

impl Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A labelled text example
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    /// The text to classify, or `None` when the source bytes are not valid UTF-8
    pub text: Option<String>,

    /// The gold label
    pub label: Sentiment,
}

impl Example {
    /// A labelled example with readable text
    pub fn new(text: impl Into<String>, label: Sentiment) -> Self {
        Self {
            text: Some(text.into()),
            label,
        }
    }

    /// A labelled example whose text could not be decoded
    pub fn undecodable(label: Sentiment) -> Self {
        Self { text: None, label }
    }
}

/// Label Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LabelError {
    /// The label is an integer outside of 0..=2
    #[error("label {0} is outside of the sentiment label space 0..=2")]
    OutOfRange(i64),

    /// The label is not an integer at all
    #[error("label {0:?} is not an integer")]
    Invalid(String),

    /// The label line is not valid UTF-8
    #[error("label is not valid UTF-8")]
    NotText,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn converts_class_ids() {
        assert_eq!(Sentiment::try_from(0usize), Ok(Sentiment::Negative));
        assert_eq!(Sentiment::try_from(2i64), Ok(Sentiment::Positive));
        assert_eq!(Sentiment::try_from(3usize), Err(LabelError::OutOfRange(3)));
        assert_eq!(Sentiment::try_from(-1i64), Err(LabelError::OutOfRange(-1)));
    }

    #[test]
    fn parses_labels_from_text() {
        assert_eq!(Sentiment::try_from(" 1\n"), Ok(Sentiment::Neutral));
        assert_eq!(
            Sentiment::try_from("positive"),
            Err(LabelError::Invalid("positive".to_string()))
        );
    }

    #[test]
    fn index_round_trips_through_all() {
        for (i, label) in Sentiment::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
        }
    }
}
