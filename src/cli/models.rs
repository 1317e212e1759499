use std::fmt::Display;

use crate::experiment::{presets, ModelConfig};

/// A model preset selected on the command line
#[derive(Debug, Clone, PartialEq)]
pub struct Model(ModelConfig);

impl Model {
    /// The preset's configuration
    pub fn config(&self) -> &ModelConfig {
        &self.0
    }
}

impl TryFrom<&str> for Model {
    type Error = ModelError;

    /// Look up a preset by identifier or output label
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        presets::preset(value)
            .map(Model)
            .ok_or_else(|| ModelError::Unknown(value.to_string()))
    }
}

impl From<Model> for ModelConfig {
    fn from(model: Model) -> Self {
        model.0
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.identifier)
    }
}

/// Model Error
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// No model found for the given string
    #[error("no model found for {0}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_presets() {
        let model = Model::try_from("bertweet-base").unwrap();

        assert_eq!(model.to_string(), "vinai/bertweet-base");
        assert_eq!(model.config().tokenizer.max_length, Some(64));
        assert!(matches!(Model::try_from("gpt-2"), Err(ModelError::Unknown(_))));
    }
}
