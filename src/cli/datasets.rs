use std::{fmt::Display, path::PathBuf};

use crate::datasets::{tweet_eval, DatasetProvider};

/// The Dataset enum
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Dataset {
    /// TweetEval
    TweetEval,
}

impl Dataset {
    /// The provider that loads this dataset from the given data directory
    pub fn provider(&self, data_dir: PathBuf) -> Box<dyn DatasetProvider> {
        match self {
            Dataset::TweetEval => Box::new(tweet_eval::TweetEval::new(data_dir)),
        }
    }
}

impl TryFrom<&str> for Dataset {
    type Error = DatasetError;

    /// Try to convert a string to a Dataset
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.to_lowercase() == tweet_eval::DATASET {
            Ok(Dataset::TweetEval)
        } else {
            Err(Self::Error::Unknown(value.to_string()))
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dataset::TweetEval => tweet_eval::DATASET,
        };

        write!(f, "{}", name)
    }
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// No dataset found for the given string
    #[error("no dataset found for {0}")]
    Unknown(String),
}
