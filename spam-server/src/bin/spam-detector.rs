//! CLI for training, querying and serving the spam classifier
//!
//! # Usage
//!
//! ```bash
//! # Train from a CSV dataset and write the model artifact
//! spam-detector train --dataset spam_dataset.csv --output spam_model.json --verbose
//!
//! # Classify a message with a saved model
//! spam-detector predict --model spam_model.json "Congratulations! You've won a free vacation!"
//!
//! # Start the HTTP API
//! spam-detector --config spam.toml serve
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use spam_core::{Dataset, Label, ModelArtifact};
use spam_server::{
    load_or_train, train_with_holdout, ApiServer, AppConfig, AppState, LoggingConfig, ModelHandle,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spam-detector", version)]
#[command(about = "Naive Bayes spam classifier", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Listen address (overrides config)
        #[arg(long)]
        listen: Option<String>,
        /// Model artifact to load (overrides config)
        #[arg(long)]
        model: Option<PathBuf>,
        /// Dataset to train from when the artifact is missing (overrides config)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Train a model from a CSV dataset
    Train {
        /// `email,label` CSV file
        #[arg(short, long)]
        dataset: PathBuf,
        /// Where to write the JSON artifact
        #[arg(short, long)]
        output: PathBuf,
        /// Fraction held out for evaluation (overrides config)
        #[arg(long)]
        test_size: Option<f64>,
        /// Also report metrics on the tail of the training split
        #[arg(short, long)]
        verbose: bool,
    },
    /// Classify one message
    Predict {
        /// JSON model artifact
        #[arg(short, long)]
        model: PathBuf,
        /// Message text
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging);

    match cli.command {
        Commands::Serve {
            listen,
            model,
            dataset,
        } => {
            if let Some(listen) = listen {
                config.server.listen_addr = listen;
            }
            if let Some(model) = model {
                config.model.artifact_path = Some(model);
            }
            if let Some(dataset) = dataset {
                config.model.dataset_path = Some(dataset);
            }
            config.validate()?;

            info!("Starting spam-detector v{}", env!("CARGO_PKG_VERSION"));

            let handle = match load_or_train(&config.model)? {
                Some(artifact) => ModelHandle::with_model(artifact),
                None => ModelHandle::new(),
            };
            let state = AppState::from_config(&config.model, handle);
            ApiServer::new(state, config.server.listen_addr.clone())
                .run()
                .await?;
        }
        Commands::Train {
            dataset,
            output,
            test_size,
            verbose,
        } => {
            if let Some(test_size) = test_size {
                config.model.test_size = test_size;
            }
            config.validate()?;

            let dataset = Dataset::from_csv_path(&dataset)
                .with_context(|| format!("Failed to load dataset {}", dataset.display()))?;
            let model = train_with_holdout(&dataset, config.model.test_size, verbose)?;
            model.artifact.save_json(&output)?;

            let metrics = &model.evaluation;
            println!("Trained on {} emails", model.report.total_samples);
            println!("  Vocabulary: {} tokens", model.report.vocab_size);
            println!(
                "  Held-out accuracy: {:.4} ({} emails)",
                metrics.accuracy, metrics.samples
            );
            for (label, class) in metrics.per_label.iter() {
                println!(
                    "  {:<8} precision {:.4}  recall {:.4}  f1 {:.4}  support {}",
                    label, class.precision, class.recall, class.f1, class.support
                );
            }
            println!("✓ Model written to {}", output.display());
        }
        Commands::Predict { model, text } => {
            let artifact = ModelArtifact::load_json(&model)
                .with_context(|| format!("Failed to load model {}", model.display()))?;
            let text = text.join(" ");
            let prediction = artifact.predict(&text)?;
            let threshold = config.model.spam_threshold;

            println!("Label: {}", prediction.label);
            println!("  spam:     {:.4}", prediction.probability(Label::Spam));
            println!("  not_spam: {:.4}", prediction.probability(Label::NotSpam));
            if threshold.is_spam(&prediction) {
                println!("Spam detected! (P(spam) > {})", threshold.value());
            } else {
                println!("Not spam. (P(spam) <= {})", threshold.value());
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => Ok(AppConfig::from_file(path)?),
        None => Ok(AppConfig::default()),
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter_directives().into());
    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
