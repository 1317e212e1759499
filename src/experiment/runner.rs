use std::{any::Any, panic::AssertUnwindSafe, path::PathBuf};

use derive_new::new;
use futures::FutureExt;
use tokio::task;

use crate::{
    datasets::{DatasetSplits, NUM_LABELS},
    metrics,
    preprocessing::tokenize,
    reports::Reporter,
    training::{self, TrainingError},
};

use super::{Evaluation, ModelConfig, ModelProvider, ResultBundle, RunError, SkipCounts};

/// Directory, under a model's output directory, holding retained weights
pub static MODEL_DIR: &str = "model";

/// Runs each configured model against a shared dataset, one after another
#[derive(new)]
pub struct Runner<P: ModelProvider> {
    provider: P,
    reporter: Reporter,
    output_dir: PathBuf,
}

impl<P: ModelProvider> Runner<P> {
    /// Produce one result bundle per config, in config order
    ///
    /// A failing model is recorded as a failed bundle and the next model runs regardless. This
    /// includes a model run that panics.
    pub async fn run(
        &self,
        dataset: &DatasetSplits,
        configs: &[ModelConfig],
    ) -> Vec<ResultBundle> {
        let mut results = Vec::with_capacity(configs.len());

        for (i, config) in configs.iter().enumerate() {
            log::info!(
                "[{}/{}] Running {} ({})",
                i + 1,
                configs.len(),
                config.output_label,
                config.identifier
            );

            let bundle = self.run_one(dataset, config).await;

            match bundle.error() {
                Some(err) => log::error!("{} failed: {}", config.output_label, err),
                None => log::info!("{} finished", config.output_label),
            }

            if let Err(err) = self.reporter.report(&bundle) {
                log::error!("Unable to write reports for {}: {}", config.output_label, err);
            }

            results.push(bundle);
        }

        results
    }

    async fn run_one(&self, dataset: &DatasetSplits, config: &ModelConfig) -> ResultBundle {
        let mut skipped = SkipCounts::default();

        let result = AssertUnwindSafe(self.evaluate(dataset, config, &mut skipped))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(RunError::Panicked(panic_message(payload))));

        match result {
            Ok(evaluation) => ResultBundle::succeeded(
                &config.output_label,
                &config.identifier,
                skipped,
                evaluation,
            ),
            Err(err) => {
                ResultBundle::failed(&config.output_label, &config.identifier, skipped, err)
            }
        }
    }

    async fn evaluate(
        &self,
        dataset: &DatasetSplits,
        config: &ModelConfig,
        skipped: &mut SkipCounts,
    ) -> Result<Evaluation, RunError> {
        let encoder = self
            .provider
            .load_tokenizer(&config.identifier, config.tokenizer.use_fast)
            .await
            .map_err(RunError::Provider)?;

        let train = tokenize(&dataset.train, encoder.as_ref(), &config.tokenizer);
        let validation = tokenize(&dataset.validation, encoder.as_ref(), &config.tokenizer);
        let test = tokenize(&dataset.test, encoder.as_ref(), &config.tokenizer);
        drop(encoder);

        *skipped = SkipCounts {
            train: train.skipped,
            validation: validation.skipped,
            test: test.skipped,
        };

        for split in [&train, &validation, &test] {
            if split.is_empty() {
                return Err(RunError::Tokenization {
                    split: split.name.clone(),
                    skipped: split.skipped,
                });
            }
        }

        let mut classifier = self
            .provider
            .load_model(config, NUM_LABELS)
            .await
            .map_err(RunError::Provider)?;

        let retain = config
            .retain_artifacts
            .then(|| self.output_dir.join(&config.output_label).join(MODEL_DIR));
        let label = config.output_label.clone();
        let training_config = config.training.clone();

        // Training and inference block on the backend, so they run off the async executor
        let (epoch_log, predictions) = task::spawn_blocking(move || {
            let epoch_log =
                training::fit(classifier.as_mut(), &train, &validation, &training_config)?;
            let predictions = training::predict(
                classifier.as_ref(),
                &test,
                training_config.eval_batch_size,
            )?;

            if let Some(dir) = retain {
                match classifier.save(&dir) {
                    Ok(()) => log::info!("Saved {} to {}", label, dir.display()),
                    Err(err) => log::error!("Unable to save {}: {}", label, err),
                }
            }

            Ok::<_, TrainingError>((epoch_log, predictions))
        })
        .await
        .map_err(|err| match err.try_into_panic() {
            Ok(payload) => RunError::Panicked(panic_message(payload)),
            Err(err) => RunError::Panicked(err.to_string()),
        })??;

        let metrics = metrics::evaluate(&predictions.y_true, &predictions.y_pred)?;

        log::info!(
            "{}: test accuracy = {:.4}, weighted F1 = {:.4}",
            config.output_label,
            metrics.accuracy,
            metrics.weighted_f1
        );

        Ok(Evaluation {
            metrics,
            epoch_log,
            predictions,
        })
    }
}

/// The message of a panic payload, when it carries one
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => message.to_string(),
            Err(_) => "unknown panic payload".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::panic;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reads_panic_messages() {
        let formatted = panic::catch_unwind(|| panic!("step {} failed", 3)).unwrap_err();
        let literal = panic::catch_unwind(|| panic!("out of memory")).unwrap_err();
        let other = panic::catch_unwind(|| panic::panic_any(7)).unwrap_err();

        assert_eq!(panic_message(formatted), "step 3 failed");
        assert_eq!(panic_message(literal), "out of memory");
        assert_eq!(panic_message(other), "unknown panic payload");
    }
}
