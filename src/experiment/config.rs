use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    datasets::tweet_eval,
    preprocessing::TokenizerPolicy,
    training::TrainingConfig,
};

use super::presets;

/// Everything needed to run one model through the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Pretrained model identifier on the Hub (e.g., "bert-base-uncased")
    pub identifier: String,

    /// Label used for report titles and output paths (e.g., "bert-base")
    pub output_label: String,

    /// Tokenization policy
    #[serde(default)]
    pub tokenizer: TokenizerPolicy,

    /// Fine-tuning hyperparameters
    #[serde(default)]
    pub training: TrainingConfig,

    /// Keep the trained weights under `<output_dir>/<output_label>/model`
    #[serde(default)]
    pub retain_artifacts: bool,
}

impl ModelConfig {
    /// Create a config with default tokenizer and training settings
    pub fn new(identifier: impl Into<String>, output_label: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            output_label: output_label.into(),
            tokenizer: TokenizerPolicy::default(),
            training: TrainingConfig::default(),
            retain_artifacts: false,
        }
    }

    /// Set the tokenization policy
    pub fn with_tokenizer(mut self, tokenizer: TokenizerPolicy) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Set the training hyperparameters
    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    /// Keep or drop the trained weights
    pub fn with_retain_artifacts(mut self, retain_artifacts: bool) -> Self {
        self.retain_artifacts = retain_artifacts;
        self
    }
}

/// A model as listed in an experiment file: a preset name or a full definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelEntry {
    /// A built-in preset, by identifier or output label
    Preset(String),

    /// A model definition. Omitted fields fall back to the matching preset, if any, and
    /// then to the experiment defaults.
    Custom {
        /// See [`ModelConfig::identifier`]
        identifier: String,
        /// See [`ModelConfig::output_label`]
        output_label: Option<String>,
        /// See [`ModelConfig::tokenizer`]
        tokenizer: Option<TokenizerPolicy>,
        /// See [`ModelConfig::training`]
        training: Option<TrainingConfig>,
        /// See [`ModelConfig::retain_artifacts`]
        #[serde(default)]
        retain_artifacts: bool,
    },
}

/// A benchmark definition, usually read from a YAML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Dataset name
    pub dataset: String,

    /// Dataset configuration
    pub dataset_config: String,

    /// The top-level data directory
    pub data_dir: PathBuf,

    /// Where reports are written
    pub output_dir: PathBuf,

    /// Training defaults shared by every model without its own `training` block
    pub training: TrainingConfig,

    /// Models to run, in order. Empty means the built-in presets.
    pub models: Vec<ModelEntry>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            dataset: tweet_eval::DATASET.to_string(),
            dataset_config: tweet_eval::SENTIMENT.to_string(),
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("results"),
            training: TrainingConfig::default(),
            models: Vec::new(),
        }
    }
}

impl ExperimentConfig {
    /// Read an experiment file
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_yaml(&contents)
    }

    /// Parse an experiment definition
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        // An empty document is a valid, all-defaults experiment
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(contents)?)
    }

    /// Resolve the model list into full configs, in order
    pub fn model_configs(&self) -> Result<Vec<ModelConfig>, ConfigError> {
        if self.models.is_empty() {
            return Ok(presets::defaults()
                .into_iter()
                .map(|config| config.with_training(self.training.clone()))
                .collect());
        }

        self.models.iter().map(|entry| self.resolve(entry)).collect()
    }

    fn resolve(&self, entry: &ModelEntry) -> Result<ModelConfig, ConfigError> {
        match entry {
            ModelEntry::Preset(name) => presets::preset(name)
                .map(|config| config.with_training(self.training.clone()))
                .ok_or_else(|| ConfigError::UnknownModel(name.clone())),

            ModelEntry::Custom {
                identifier,
                output_label,
                tokenizer,
                training,
                retain_artifacts,
            } => {
                let base = presets::preset(identifier).unwrap_or_else(|| {
                    ModelConfig::new(identifier, presets::label_for(identifier))
                });

                Ok(ModelConfig {
                    identifier: identifier.clone(),
                    output_label: output_label.clone().unwrap_or(base.output_label),
                    tokenizer: tokenizer.clone().unwrap_or(base.tokenizer),
                    training: training.clone().unwrap_or_else(|| self.training.clone()),
                    retain_artifacts: *retain_artifacts,
                })
            }
        }
    }
}

/// Configuration Error
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The experiment file could not be read
    #[error("unable to read {}: {source}", .path.display())]
    Io {
        /// The file path
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// The experiment file is not valid YAML for an experiment
    #[error("invalid experiment file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A preset name that does not exist
    #[error("no model preset found for {0}")]
    UnknownModel(String),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::preprocessing::Padding;

    use super::*;

    #[test]
    fn empty_file_runs_the_presets() {
        let config = ExperimentConfig::from_yaml("").unwrap();

        assert_eq!(config.dataset, "tweet_eval");
        assert_eq!(config.dataset_config, "sentiment");
        assert_eq!(config.output_dir, PathBuf::from("results"));

        let labels: Vec<_> = config
            .model_configs()
            .unwrap()
            .into_iter()
            .map(|m| m.output_label)
            .collect();
        assert_eq!(labels, vec!["bert-base", "roberta-base", "bertweet-base"]);
    }

    #[test]
    fn parses_presets_and_custom_models() {
        let config = ExperimentConfig::from_yaml(
            r#"
output_dir: out
training:
  epochs: 1
  train_batch_size: 8
models:
  - roberta-base
  - identifier: vinai/bertweet-base
    retain_artifacts: true
  - identifier: distilroberta-base
    tokenizer:
      max_length: 128
      padding: dynamic
    training:
      learning_rate: 0.00005
"#,
        )
        .unwrap();

        let models = config.model_configs().unwrap();

        assert_eq!(models.len(), 3);
        assert_eq!(models[0].identifier, "roberta-base");
        assert_eq!(models[0].training.epochs, 1);
        assert_eq!(models[0].training.train_batch_size, 8);
        assert_eq!(models[0].training.eval_batch_size, 32);

        assert_eq!(models[1].output_label, "bertweet-base");
        assert!(!models[1].tokenizer.use_fast);
        assert_eq!(models[1].tokenizer.max_length, Some(64));
        assert!(models[1].retain_artifacts);

        assert_eq!(models[2].output_label, "distilroberta-base");
        assert_eq!(models[2].tokenizer.max_length, Some(128));
        assert_eq!(models[2].tokenizer.padding, Padding::Dynamic);
        assert!(models[2].tokenizer.use_fast);
        assert_eq!(models[2].training.learning_rate, 5e-5);
        assert_eq!(models[2].training.epochs, 3);
    }

    #[test]
    fn parses_the_demo_experiment() {
        let config =
            ExperimentConfig::from_yaml(include_str!("../../demos/experiment.yaml")).unwrap();
        let models = config.model_configs().unwrap();

        assert_eq!(models.len(), 3);
        assert_eq!(models[0].training, TrainingConfig::default());
        assert!(models[2].retain_artifacts);
        assert!(!models[2].tokenizer.use_fast);
    }

    #[test]
    fn rejects_unknown_presets() {
        let config = ExperimentConfig::from_yaml("models: [gpt-2]").unwrap();

        assert!(matches!(
            config.model_configs(),
            Err(ConfigError::UnknownModel(name)) if name == "gpt-2"
        ));
    }

    #[test]
    fn rejects_malformed_files() {
        assert!(matches!(
            ExperimentConfig::from_yaml("models: 3"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
