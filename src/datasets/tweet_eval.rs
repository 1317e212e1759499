use std::{
    fmt,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use burn::data::dataset::Dataset as _;
use derive_new::new;
use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer,
};

use crate::utils::files::read_file;

use super::{
    DataLoadError, DatasetProvider, DatasetSplit, DatasetSplits, Example, LabelError, Sentiment,
    TEST, TRAIN, VALIDATION,
};

/// The name of the TweetEval dataset
pub static DATASET: &str = "tweet_eval";

/// The sentiment configuration of TweetEval
pub static SENTIMENT: &str = "sentiment";

/// A raw CSV row, before label validation
#[derive(Clone, Debug, Deserialize)]
struct Row {
    /// The tweet text, `None` if it is not valid UTF-8
    #[serde(deserialize_with = "text_or_none")]
    text: Option<String>,

    /// The integer class id
    label: i64,
}

/// Loads TweetEval splits from `<data_dir>/datasets/<name>/<config>`
///
/// Each split is read from `<split>.csv` (with `text` and `label` columns) when present,
/// otherwise from the line-aligned `<split>_text.txt` and `<split>_labels.txt` files of the
/// original TweetEval distribution (where the validation split is named `val`).
#[derive(Debug, Clone, new)]
pub struct TweetEval {
    /// The top-level data directory
    data_dir: PathBuf,
}

#[async_trait]
impl DatasetProvider for TweetEval {
    async fn load(&self, name: &str, config: &str) -> Result<DatasetSplits, DataLoadError> {
        if name != DATASET {
            return Err(DataLoadError::Unknown(name.to_string()));
        }

        let dir = self.data_dir.join("datasets").join(name).join(config);

        let train = load_split(&dir, TRAIN, &[TRAIN]).await?;
        let validation = load_split(&dir, VALIDATION, &[VALIDATION, "val"]).await?;
        let test = load_split(&dir, TEST, &[TEST]).await?;

        log::info!(
            "Loaded {}/{}: {} train, {} validation, {} test examples",
            name,
            config,
            train.len(),
            validation.len(),
            test.len()
        );

        DatasetSplits::new(train, validation, test)
    }
}

async fn load_split(
    dir: &Path,
    split: &str,
    stems: &[&str],
) -> Result<DatasetSplit, DataLoadError> {
    for stem in stems {
        let csv_path = dir.join(format!("{stem}.csv"));
        if csv_path.is_file() {
            return load_csv(&csv_path, split);
        }

        let text_path = dir.join(format!("{stem}_text.txt"));
        let labels_path = dir.join(format!("{stem}_labels.txt"));
        if text_path.is_file() && labels_path.is_file() {
            return load_text_files(&text_path, &labels_path, split).await;
        }
    }

    Err(DataLoadError::Missing {
        split: split.to_string(),
        dir: dir.to_path_buf(),
    })
}

fn load_csv(path: &Path, split: &str) -> Result<DatasetSplit, DataLoadError> {
    let csv_error = |e: csv::Error| DataLoadError::Csv {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    // Byte records, so that one undecodable tweet does not fail the whole file
    let mut reader = csv::ReaderBuilder::new()
        .from_path(path)
        .map_err(csv_error)?;
    let headers = reader.byte_headers().map_err(csv_error)?.clone();

    let mut examples = Vec::new();
    for (row, record) in reader.byte_records().enumerate() {
        let Row { text, label } = record
            .and_then(|record| record.deserialize(Some(&headers)))
            .map_err(csv_error)?;

        let label = Sentiment::try_from(label).map_err(|source| DataLoadError::Label {
            split: split.to_string(),
            row,
            source,
        })?;

        examples.push(Example { text, label });
    }

    Ok(DatasetSplit::new(split.to_string(), examples))
}

async fn load_text_files(
    text_path: &Path,
    labels_path: &Path,
    split: &str,
) -> Result<DatasetSplit, DataLoadError> {
    let texts = read_file(text_path)
        .await
        .map_err(|source| DataLoadError::Io {
            path: text_path.to_path_buf(),
            source,
        })?;

    let labels = read_file(labels_path)
        .await
        .map_err(|source| DataLoadError::Io {
            path: labels_path.to_path_buf(),
            source,
        })?;

    if texts.len() != labels.len() {
        return Err(DataLoadError::Misaligned {
            split: split.to_string(),
            texts: texts.len(),
            labels: labels.len(),
        });
    }

    let examples = texts
        .into_iter()
        .zip(labels.iter())
        .enumerate()
        .map(|(row, (text, label))| {
            label
                .as_deref()
                .ok_or(LabelError::NotText)
                .and_then(Sentiment::try_from)
                .map(|label| Example { text, label })
                .map_err(|source| DataLoadError::Label {
                    split: split.to_string(),
                    row,
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DatasetSplit::new(split.to_string(), examples))
}

/// Read a CSV field as text, mapping undecodable bytes to `None`
fn text_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    struct Text;

    impl<'de> Visitor<'de> for Text {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a text field")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
            Ok(std::str::from_utf8(v).ok().map(str::to_string))
        }
    }

    deserializer.deserialize_bytes(Text)
}
