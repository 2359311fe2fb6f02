//! Dataset-driven training and startup model loading

use spam_core::{train_artifact, Dataset, Label, ModelArtifact, TrainingReport, ValidationMetrics};
use tracing::{info, warn};

use crate::config::ModelConfig;
use crate::error::Result;

/// Artifact trained on the head of a dataset and scored on its tail
#[derive(Debug, Clone)]
pub struct EvaluatedModel {
    pub artifact: ModelArtifact,
    pub report: TrainingReport,
    pub evaluation: ValidationMetrics,
}

/// Split `dataset`, train on the first part and evaluate on the held-out part
pub fn train_with_holdout(dataset: &Dataset, test_size: f64, verbose: bool) -> Result<EvaluatedModel> {
    let (train, test) = dataset.train_test_split(test_size)?;
    info!(
        "Training on {} emails, holding out {} for evaluation",
        train.len(),
        test.len()
    );

    let (artifact, report) = train_artifact(train.emails(), train.labels(), verbose)?;

    let predicted = artifact
        .predict_batch(test.emails())?
        .into_iter()
        .map(|prediction| prediction.label)
        .collect::<Vec<Label>>();
    let evaluation = ValidationMetrics::from_predictions(test.labels(), &predicted);
    evaluation.log();

    Ok(EvaluatedModel {
        artifact,
        report,
        evaluation,
    })
}

/// Model to serve at startup
///
/// Loads the configured artifact when it exists, otherwise trains one from
/// the configured dataset (persisting it when enabled). Returns `None` when
/// neither is available; the service then starts untrained.
pub fn load_or_train(config: &ModelConfig) -> Result<Option<ModelArtifact>> {
    if let Some(path) = config.artifact_path.as_deref().filter(|p| p.exists()) {
        return Ok(Some(ModelArtifact::load_json(path)?));
    }

    let Some(dataset_path) = config.dataset_path.as_deref().filter(|p| p.exists()) else {
        warn!("No model artifact or dataset found, starting without a model");
        return Ok(None);
    };

    let dataset = Dataset::from_csv_path(dataset_path)?;
    let model = train_with_holdout(&dataset, config.test_size, false)?;

    if config.persist_on_train {
        if let Some(path) = &config.artifact_path {
            model.artifact.save_json(path)?;
        }
    }

    Ok(Some(model.artifact))
}
