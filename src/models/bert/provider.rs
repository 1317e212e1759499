use std::path::PathBuf;

use async_trait::async_trait;
use bert_burn::model::{BertModel, BertModelConfig};
use burn::{
    module::Module,
    optim::AdamWConfig,
    tensor::backend::{AutodiffBackend, Backend},
};

use crate::{
    experiment::{ModelConfig, ModelProvider},
    preprocessing::{fairseq, Encoder, FairseqBpe, PretrainedTokenizer},
    training::Classifier,
    utils::hugging_face::HubModel,
};

use super::{BertClassifier, Config, Model};

/// Longest sequence the position embeddings are sized for
const MAX_SEQ_LEN: usize = 512;

/// Loads BERT-family checkpoints and tokenizers from the Hugging Face Hub
pub struct BertProvider<B: AutodiffBackend> {
    /// The top-level data directory, searched for converted tokenizers
    data_dir: PathBuf,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    device: B::Device,
}

impl<B: AutodiffBackend> BertProvider<B> {
    /// Create a new provider
    pub fn new(data_dir: PathBuf, device: B::Device) -> Self {
        Self { data_dir, device }
    }

    /// Where a locally converted tokenizer for `identifier` is expected
    pub fn converted_tokenizer(&self, identifier: &str) -> PathBuf {
        self.data_dir
            .join("tokenizers")
            .join(identifier)
            .join("tokenizer.json")
    }
}

#[async_trait]
impl<B: AutodiffBackend> ModelProvider for BertProvider<B>
where
    i64: From<<B as Backend>::IntElem>,
{
    async fn load_tokenizer(
        &self,
        identifier: &str,
        use_fast: bool,
    ) -> anyhow::Result<Box<dyn Encoder>> {
        let hub = HubModel::new(identifier)?;
        let config_file = hub.get_optional("tokenizer_config.json").await;

        if use_fast {
            let tokenizer_file = hub.get("tokenizer.json").await?;
            let tokenizer =
                PretrainedTokenizer::from_files(&tokenizer_file, config_file.as_deref())?;

            return Ok(Box::new(tokenizer));
        }

        let converted = self.converted_tokenizer(identifier);
        if converted.exists() {
            log::info!("Using converted tokenizer at {}", converted.display());
            let tokenizer = PretrainedTokenizer::from_files(&converted, config_file.as_deref())?;

            return Ok(Box::new(tokenizer));
        }

        let mut files = Vec::with_capacity(2);
        for name in [fairseq::VOCAB_FILE, fairseq::CODES_FILE] {
            files.push(hub.get(name).await.map_err(|e| {
                anyhow!(
                    "{} needs {} (or a converted tokenizer at {}): {}",
                    identifier,
                    name,
                    converted.display(),
                    e
                )
            })?);
        }

        log::info!("Building {} tokenizer from its fairseq BPE vocabulary", identifier);
        let tokenizer = FairseqBpe::from_files(&files[0], &files[1], config_file.as_deref())?;

        Ok(Box::new(tokenizer))
    }

    async fn load_model(
        &self,
        config: &ModelConfig,
        num_labels: usize,
    ) -> anyhow::Result<Box<dyn Classifier>> {
        if num_labels == 0 {
            return Err(anyhow!("Classes are not defined in the model configuration"));
        }

        let hub = HubModel::new(&config.identifier)?;
        let (config_file, model_file) = hub.config_and_weights().await?;

        let mut bert_config = BertModelConfig::load(config_file)
            .map_err(|e| anyhow!("Unable to load Hugging Face Config file: {}", e))?;

        bert_config.max_seq_len = Some(MAX_SEQ_LEN.min(bert_config.max_position_embeddings));
        bert_config.hidden_dropout_prob = config.training.hidden_dropout_prob;
        bert_config.with_pooling_layer = Some(true);

        let model_config = Config::new(bert_config.clone(), num_labels)
            .with_classifier_dropout(config.training.hidden_dropout_prob);

        log::info!("Loading {} weights...", config.identifier);

        let mut model = model_config.init::<B>(&self.device);
        model.model = model.model.load_record(BertModel::from_safetensors(
            model_file,
            &self.device,
            bert_config,
        ));

        let optimizer = AdamWConfig::new()
            .with_weight_decay(config.training.weight_decay)
            .with_epsilon(config.training.adam_epsilon)
            .init::<B, Model<B>>();

        Ok(Box::new(BertClassifier::new(
            model,
            optimizer,
            model_config,
            self.device.clone(),
        )))
    }
}
