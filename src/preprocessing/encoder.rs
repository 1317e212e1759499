use std::path::Path;

use serde_json::Value;
use tokenizers::{utils::truncation::TruncationDirection, PostProcessor, Tokenizer};

/// The fallback when a tokenizer does not declare its own `model_max_length`
pub const DEFAULT_MODEL_MAX_LENGTH: usize = 512;

/// Sentinel values above this are treated as "no limit declared"
const MAX_DECLARED_LENGTH: f64 = 1_000_000.0;

/// Pad tokens tried when the tokenizer config does not name one
const PAD_TOKENS: &[&str] = &["[PAD]", "<pad>"];

/// Text to token id conversion for one model family
pub trait Encoder: Send + Sync {
    /// Encode text with the model's special tokens, keeping at most `max_length` ids. Special
    /// tokens survive truncation.
    fn encode(&self, text: &str, max_length: usize) -> anyhow::Result<Vec<u32>>;

    /// The id used to pad sequences
    fn pad_token_id(&self) -> u32;

    /// The sequence length used when a policy does not set one
    fn model_max_length(&self) -> usize;
}

/// A pretrained tokenizer loaded from `tokenizer.json`
#[derive(Clone)]
pub struct PretrainedTokenizer {
    tokenizer: Tokenizer,
    pad_token_id: u32,
    model_max_length: usize,
}

impl PretrainedTokenizer {
    /// Load a tokenizer and, when available, its `tokenizer_config.json`
    pub fn from_files(tokenizer_file: &Path, config_file: Option<&Path>) -> anyhow::Result<Self> {
        let tokenizer = Tokenizer::from_file(tokenizer_file)
            .map_err(|e| anyhow!("Unable to load tokenizer file: {}", e))?;

        Self::new(tokenizer, config_file)
    }

    /// Wrap an in-memory tokenizer, reading pad token and length limit from `config_file`
    pub fn new(mut tokenizer: Tokenizer, config_file: Option<&Path>) -> anyhow::Result<Self> {
        // Truncation and padding are applied by the preprocessing policy instead
        tokenizer
            .with_truncation(None)
            .map_err(|e| anyhow!("Unable to disable truncation: {}", e))?;
        tokenizer.with_padding(None);

        let config = match config_file {
            Some(path) => serde_json::from_str::<Value>(&std::fs::read_to_string(path)?)?,
            None => Value::Null,
        };

        let pad_token_id = pad_token(&config)
            .and_then(|token| tokenizer.token_to_id(&token))
            .or_else(|| PAD_TOKENS.iter().find_map(|t| tokenizer.token_to_id(t)))
            .ok_or_else(|| anyhow!("Unable to determine the padding token"))?;

        let model_max_length = config
            .get("model_max_length")
            .and_then(Value::as_f64)
            .filter(|n| *n >= 1.0 && *n <= MAX_DECLARED_LENGTH)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MODEL_MAX_LENGTH);

        Ok(Self {
            tokenizer,
            pad_token_id,
            model_max_length,
        })
    }
}

impl Encoder for PretrainedTokenizer {
    fn encode(&self, text: &str, max_length: usize) -> anyhow::Result<Vec<u32>> {
        let mut encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| anyhow!("unable to encode: {}", e))?;

        let special = self
            .tokenizer
            .get_post_processor()
            .map_or(0, |p| p.added_tokens(false));

        encoding.truncate(
            max_length.saturating_sub(special),
            0,
            TruncationDirection::Right,
        );

        let encoding = self
            .tokenizer
            .post_process(encoding, None, true)
            .map_err(|e| anyhow!("unable to add special tokens: {}", e))?;

        Ok(encoding.get_ids().to_vec())
    }

    fn pad_token_id(&self) -> u32 {
        self.pad_token_id
    }

    fn model_max_length(&self) -> usize {
        self.model_max_length
    }
}

/// `pad_token` is either a plain string or an added-token object with a `content` field
fn pad_token(config: &Value) -> Option<String> {
    match config.get("pad_token")? {
        Value::String(token) => Some(token.clone()),
        Value::Object(token) => token.get("content")?.as_str().map(str::to_string),
        _ => None,
    }
}
