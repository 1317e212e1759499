use serde::{Deserialize, Serialize};

/// How tokenized sequences are padded
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Padding {
    /// Pad every sequence to the policy's max length at tokenization time
    #[default]
    MaxLength,

    /// Keep natural lengths and pad to the longest sequence of each batch
    Dynamic,
}

/// Per-model-family tokenization policy
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerPolicy {
    /// Prefer the fast (Rust-native) tokenizer artifacts published with the model
    pub use_fast: bool,

    /// Maximum sequence length, including special tokens. `None` uses the tokenizer's
    /// `model_max_length`.
    pub max_length: Option<usize>,

    /// Padding strategy
    pub padding: Padding,
}

impl Default for TokenizerPolicy {
    fn default() -> Self {
        Self {
            use_fast: true,
            max_length: None,
            padding: Padding::MaxLength,
        }
    }
}

impl TokenizerPolicy {
    /// Set whether the fast tokenizer should be used
    pub fn with_use_fast(mut self, use_fast: bool) -> Self {
        self.use_fast = use_fast;
        self
    }

    /// Set an explicit maximum sequence length
    pub fn with_max_length(mut self, max_length: Option<usize>) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the padding strategy
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Resolve the effective max length against the tokenizer's model default
    pub fn resolve_max_length(&self, model_max_length: usize) -> usize {
        self.max_length.unwrap_or(model_max_length)
    }
}
