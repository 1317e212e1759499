use std::path::PathBuf;

use async_trait::async_trait;
use burn::data::dataset::Dataset;
use derive_new::new;

/// Sentiment labels and examples
pub mod sentiment;

/// The TweetEval sentiment dataset
pub mod tweet_eval;

pub use sentiment::{Example, LabelError, Sentiment, NUM_LABELS};

/// The training split name
pub static TRAIN: &str = "train";

/// The validation split name
pub static VALIDATION: &str = "validation";

/// The test split name
pub static TEST: &str = "test";

/// A provider of three-way split sentiment corpora
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    /// Load the train, validation and test splits of a dataset configuration
    async fn load(&self, name: &str, config: &str) -> Result<DatasetSplits, DataLoadError>;
}

/// A named, ordered sequence of examples
#[derive(Debug, Clone, new)]
pub struct DatasetSplit {
    /// The split name (e.g., "train")
    pub name: String,

    /// Examples, in file order
    pub examples: Vec<Example>,
}

impl Dataset<Example> for DatasetSplit {
    fn get(&self, index: usize) -> Option<Example> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}

/// The three splits shared read-only by every model run
#[derive(Debug, Clone)]
pub struct DatasetSplits {
    /// Training split
    pub train: DatasetSplit,

    /// Validation split, evaluated once per epoch
    pub validation: DatasetSplit,

    /// Held-out test split
    pub test: DatasetSplit,
}

impl DatasetSplits {
    /// Bundle three splits, rejecting any that is empty
    pub fn new(
        train: DatasetSplit,
        validation: DatasetSplit,
        test: DatasetSplit,
    ) -> Result<Self, DataLoadError> {
        for split in [&train, &validation, &test] {
            if split.is_empty() {
                return Err(DataLoadError::Empty(split.name.clone()));
            }
        }

        Ok(Self {
            train,
            validation,
            test,
        })
    }

    /// Iterate over the splits in train, validation, test order
    pub fn iter(&self) -> impl Iterator<Item = &DatasetSplit> {
        [&self.train, &self.validation, &self.test].into_iter()
    }
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DataLoadError {
    /// No dataset found for the given name
    #[error("no dataset found for {0}")]
    Unknown(String),

    /// None of the supported file layouts exist for a split
    #[error("split {split} not found under {}", .dir.display())]
    Missing {
        /// The split name
        split: String,
        /// The directory that was searched
        dir: PathBuf,
    },

    /// A split file could not be read
    #[error("unable to read {}: {source}", .path.display())]
    Io {
        /// The offending file
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// A split file is not valid CSV
    #[error("malformed csv in {}: {reason}", .path.display())]
    Csv {
        /// The offending file
        path: PathBuf,
        /// The parser message
        reason: String,
    },

    /// A label outside of the sentiment label space
    #[error("bad label in split {split} at row {row}: {source}")]
    Label {
        /// The split name
        split: String,
        /// Zero-based row index
        row: usize,
        /// The conversion error
        source: LabelError,
    },

    /// Text and label files of a split have different lengths
    #[error("split {split} has {texts} texts but {labels} labels")]
    Misaligned {
        /// The split name
        split: String,
        /// Number of text lines
        texts: usize,
        /// Number of label lines
        labels: usize,
    },

    /// A split without any examples
    #[error("split {0} is empty")]
    Empty(String),
}
