use bert_burn::{
    data::BertInferenceBatch,
    model::{BertModel, BertModelOutput},
};
use burn::{
    module::Module,
    nn::{loss::CrossEntropyLossConfig, Dropout, Linear},
    tensor::{backend::Backend, Int, Tensor},
    train::ClassificationOutput,
};

/// BERT for sequence classification
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// The base BERT model
    pub model: BertModel<B>,

    /// Dropout on the pooled output
    pub dropout: Dropout,

    /// Linear layer for sequence classification
    pub output: Linear<B>,

    /// Total number of classes
    pub n_classes: usize,
}

/// Define model behavior
impl<B: Backend> Model<B> {
    /// Defines forward pass with cross-entropy loss against `targets`
    pub fn forward(
        &self,
        input: BertInferenceBatch<B>,
        targets: Tensor<B, 1, Int>,
    ) -> ClassificationOutput<B>
    where
        i64: From<<B as Backend>::IntElem>,
    {
        let output = self.logits(input);
        let targets = targets.to_device(&output.device());

        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), targets.clone());

        ClassificationOutput {
            loss,
            output,
            targets,
        }
    }

    /// Class logits: [batch_size, n_classes]
    pub fn logits(&self, input: BertInferenceBatch<B>) -> Tensor<B, 2> {
        let [batch_size, _seq_length] = input.tokens.dims();

        let BertModelOutput {
            pooled_output,
            hidden_states,
        } = self.model.forward(input);

        let pooled = self.dropout.forward(pooled_output.unwrap_or(hidden_states));

        self.output
            .forward(pooled)
            .slice([0..batch_size, 0..1])
            .reshape([batch_size, self.n_classes])
    }
}
