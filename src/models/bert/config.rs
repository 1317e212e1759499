use bert_burn::model::BertModelConfig;
use burn::{
    nn::{DropoutConfig, LinearConfig},
    tensor::backend::Backend,
};

use super::model::Model;

/// The Model Configuration, saved next to retained weights
#[derive(burn::config::Config)]
pub struct Config {
    /// The base BERT config
    pub model: BertModelConfig,

    /// Total number of classes
    pub n_classes: usize,

    /// Dropout applied to the pooled output before the classification head
    #[config(default = 0.1)]
    pub classifier_dropout: f64,
}

impl Config {
    /// Initializes a Bert model with default weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        Model {
            model: self.model.init(device),
            dropout: DropoutConfig::new(self.classifier_dropout).init(),
            output: LinearConfig::new(self.model.hidden_size, self.n_classes).init(device),
            n_classes: self.n_classes,
        }
    }
}
