use std::{fs, path::Path};

use burn::{
    config::Config as _,
    module::{AutodiffModule, Module},
    optim::{GradientsParams, Optimizer},
    record::{CompactRecorder, Recorder},
    tensor::{
        backend::{AutodiffBackend, Backend},
        ElementConversion,
    },
    LearningRate,
};

use crate::{
    preprocessing::Batch,
    training::{Classifier, Forward},
};

use super::{batcher, Config, Model};

/// A [`Model`] and its optimizer, driven one batch at a time by the training harness
pub struct BertClassifier<B: AutodiffBackend, O> {
    model: Model<B>,
    optimizer: O,
    config: Config,
    device: B::Device,
}

impl<B, O> BertClassifier<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<Model<B>, B>,
{
    /// Create a new classifier from an initialized model
    pub fn new(model: Model<B>, optimizer: O, config: Config, device: B::Device) -> Self {
        Self {
            model,
            optimizer,
            config,
            device,
        }
    }
}

impl<B, O> Classifier for BertClassifier<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<Model<B>, B>,
    i64: From<<B as Backend>::IntElem>,
{
    fn train_step(&mut self, batch: &Batch, learning_rate: LearningRate) -> anyhow::Result<f64> {
        let item = batcher::to_device::<B>(batch, &self.device);

        let output = self.model.forward(item.input, item.targets);
        let loss = output.loss.clone().into_scalar().elem::<f64>();

        let grads = output.loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = self.optimizer.step(learning_rate, self.model.clone(), grads);

        Ok(loss)
    }

    fn forward(&self, batch: &Batch) -> anyhow::Result<Forward> {
        let model = self.model.valid();
        let item = batcher::to_device::<B::InnerBackend>(batch, &self.device);

        let output = model.forward(item.input, item.targets);
        let loss = output.loss.into_scalar().elem::<f64>();

        let [_, n_classes] = output.output.dims();
        let logits = output
            .output
            .into_data()
            .convert::<f32>()
            .value
            .chunks(n_classes)
            .map(<[f32]>::to_vec)
            .collect();

        Ok(Forward::new(loss, logits))
    }

    fn save(&self, dir: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(dir)?;

        self.config.save(dir.join("config.json"))?;

        CompactRecorder::new()
            .record(self.model.clone().into_record(), dir.join("model"))
            .map_err(|e| anyhow!("Unable to save trained model weights: {:?}", e))?;

        Ok(())
    }
}
