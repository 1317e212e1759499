use std::path::PathBuf;

use hf_hub::api::tokio::{Api, ApiRepo};

/// A model repository on the Hugging Face Hub
pub struct HubModel {
    name: String,
    repo: ApiRepo,
}

impl HubModel {
    /// Connect to the Hub for the given model
    pub fn new(model_name: &str) -> anyhow::Result<Self> {
        let api = Api::new()?;

        Ok(Self {
            name: model_name.to_string(),
            repo: api.model(model_name.to_string()),
        })
    }

    /// Download a file from the model repository
    /// If file exists in cache, it will not be downloaded again
    pub async fn get(&self, file_name: &str) -> anyhow::Result<PathBuf> {
        self.repo
            .get(file_name)
            .await
            .map_err(|e| anyhow!("Failed to download {} from {}: {}", file_name, self.name, e))
    }

    /// Download a file if the repository publishes one
    pub async fn get_optional(&self, file_name: &str) -> Option<PathBuf> {
        match self.get(file_name).await {
            Ok(path) => Some(path),
            Err(err) => {
                log::debug!("{}", err);
                None
            }
        }
    }

    /// Download model config and weights
    pub async fn config_and_weights(&self) -> anyhow::Result<(PathBuf, PathBuf)> {
        let config_file = self.get("config.json").await?;
        let model_file = self.get("model.safetensors").await?;

        Ok((config_file, model_file))
    }
}
