//! Command line tool to fine-tune and compare sentiment classifiers

use std::path::PathBuf;

use anyhow::anyhow;
use burn::backend::{libtorch::LibTorchDevice, Autodiff, LibTorch};
use pico_args::Arguments;
use sentiment_bench::{
    cli::{Dataset, Model},
    experiment::{ExperimentConfig, ModelConfig, Runner, Status},
    models::bert::BertProvider,
    reports::{comparison_table, FileSink, Reporter},
};

const HELP: &str = "\
Usage: benchmark [OPTIONS]

Options:
  -h, --help           Print help
  -c, --config         A YAML experiment file
  -m, --model          A model preset to run, repeatable (e.g., 'bert-base-uncased')
  -d, --data-dir       The path to the top-level data directory (defaults to 'data')
  -o, --output-dir     Where reports are written (defaults to 'results')
  -n, --num-epochs     Number of epochs to train for
  -b, --batch-size     Training batch size
  --cpu                Train on the CPU even when CUDA is available
";

type Backend = Autodiff<LibTorch>;

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    models: Vec<String>,
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    num_epochs: Option<usize>,
    batch_size: Option<usize>,
    cpu: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            config: pargs.opt_value_from_str(["-c", "--config"])?,
            models: pargs.values_from_str(["-m", "--model"])?,
            data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
            output_dir: pargs.opt_value_from_str(["-o", "--output-dir"])?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            cpu: pargs.contains("--cpu"),
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            return Err(anyhow!("Unexpected arguments: {:?}", remaining));
        }

        Ok(Some(args))
    }

    /// Resolve the model list, applying command-line overrides
    fn model_configs(&self, experiment: &ExperimentConfig) -> anyhow::Result<Vec<ModelConfig>> {
        let mut configs = if self.models.is_empty() {
            experiment.model_configs()?
        } else {
            self.models
                .iter()
                .map(|name| {
                    let model = Model::try_from(name.as_str())?;
                    Ok(ModelConfig::from(model).with_training(experiment.training.clone()))
                })
                .collect::<anyhow::Result<Vec<_>>>()?
        };

        for config in &mut configs {
            if let Some(num_epochs) = self.num_epochs {
                config.training.epochs = num_epochs;
            }

            if let Some(batch_size) = self.batch_size {
                config.training.train_batch_size = batch_size;
            }
        }

        Ok(configs)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let mut experiment = match &args.config {
        Some(path) => ExperimentConfig::load(path).await?,
        None => ExperimentConfig::default(),
    };

    if let Some(data_dir) = args.data_dir.clone() {
        experiment.data_dir = data_dir;
    }

    if let Some(output_dir) = args.output_dir.clone() {
        experiment.output_dir = output_dir;
    }

    let models = args.model_configs(&experiment)?;

    let device = if args.cpu || !tch::Cuda::is_available() {
        LibTorchDevice::Cpu
    } else {
        LibTorchDevice::Cuda(0)
    };

    log::info!("Using device {:?}", device);

    // A dataset that cannot be loaded aborts the whole benchmark
    let dataset = Dataset::try_from(experiment.dataset.as_str())?
        .provider(experiment.data_dir.clone())
        .load(&experiment.dataset, &experiment.dataset_config)
        .await?;

    let runner = Runner::new(
        BertProvider::<Backend>::new(experiment.data_dir.clone(), device),
        Reporter::new(Box::new(FileSink::new(experiment.output_dir.clone()))),
        experiment.output_dir.clone(),
    );

    let results = runner.run(&dataset, &models).await;

    println!("{}", comparison_table(&results));

    if results.iter().all(|r| r.status() == Status::Failed) {
        return Err(anyhow!("Every model run failed"));
    }

    Ok(())
}
