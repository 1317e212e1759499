use lazy_static::lazy_static;

use crate::preprocessing::TokenizerPolicy;

use super::ModelConfig;

/// bert-base-uncased
pub static BERT_BASE_UNCASED: &str = "bert-base-uncased";

/// roberta-base
pub static ROBERTA_BASE: &str = "roberta-base";

/// vinai/bertweet-base
pub static BERTWEET_BASE: &str = "vinai/bertweet-base";

lazy_static! {
    static ref PRESETS: Vec<ModelConfig> = vec![
        ModelConfig::new(BERT_BASE_UNCASED, "bert-base"),
        ModelConfig::new(ROBERTA_BASE, "roberta-base"),
        // BERTweet ships a BPE vocabulary without a fast tokenizer
        ModelConfig::new(BERTWEET_BASE, "bertweet-base").with_tokenizer(
            TokenizerPolicy::default()
                .with_use_fast(false)
                .with_max_length(Some(64))
        ),
    ];
}

/// The default benchmark line-up, in run order
pub fn defaults() -> Vec<ModelConfig> {
    PRESETS.clone()
}

/// Look up a preset by identifier or output label
pub fn preset(name: &str) -> Option<ModelConfig> {
    let name = name.trim();

    PRESETS
        .iter()
        .find(|p| {
            p.identifier.eq_ignore_ascii_case(name) || p.output_label.eq_ignore_ascii_case(name)
        })
        .cloned()
}

/// The output label for an identifier without a preset: its last path segment
pub fn label_for(identifier: &str) -> String {
    identifier
        .rsplit('/')
        .next()
        .unwrap_or(identifier)
        .to_string()
}
