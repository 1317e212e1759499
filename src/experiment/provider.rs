use async_trait::async_trait;

use crate::{preprocessing::Encoder, training::Classifier};

use super::ModelConfig;

/// Loads tokenizers and freshly initialized classifiers for pretrained models
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Load the tokenizer published with a model
    ///
    /// With `use_fast` unset, a locally converted tokenizer takes precedence when one exists.
    async fn load_tokenizer(
        &self,
        identifier: &str,
        use_fast: bool,
    ) -> anyhow::Result<Box<dyn Encoder>>;

    /// Load pretrained weights with a new classification head of `num_labels` outputs
    async fn load_model(
        &self,
        config: &ModelConfig,
        num_labels: usize,
    ) -> anyhow::Result<Box<dyn Classifier>>;
}
