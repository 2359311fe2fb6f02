//! API request handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use spam_core::{train_artifact, Dataset, Label, SpamError};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// Predict request body
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub email_text: String,
}

/// Predict response
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Most probable label
    pub label: Label,
    /// Threshold decision on `spam_probability`
    pub is_spam: bool,
    pub spam_probability: f64,
    pub not_spam_probability: f64,
    pub message: String,
}

/// Train request body
#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    pub emails: Vec<String>,
    pub labels: Vec<String>,
    /// Include held-out metrics in the report
    #[serde(default)]
    pub verbose: bool,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocab_size: Option<usize>,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    pub fn new(msg: &str) -> Self {
        Self {
            error: msg.to_string(),
        }
    }
}

/// Status code for a classifier error
pub fn status_for(err: &SpamError) -> StatusCode {
    match err {
        SpamError::UnknownLabel(_) => StatusCode::BAD_REQUEST,
        SpamError::EmptyVocabulary
        | SpamError::InsufficientData(_)
        | SpamError::DimensionMismatch { .. }
        | SpamError::InvalidDataset(_)
        | SpamError::InvalidThreshold(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SpamError::NotFitted
        | SpamError::NotTrained
        | SpamError::InvalidArtifact(_)
        | SpamError::Io(_)
        | SpamError::Json(_)
        | SpamError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &SpamError) -> (StatusCode, Json<ApiError>) {
    let status = status_for(err);
    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Rejected request: {}", err);
    }
    (status, Json(ApiError::new(&err.to_string())))
}

/// POST /predict - Classify an email
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PredictRequest>,
) -> impl IntoResponse {
    let Some(model) = state.model.current().await else {
        return error_response(&SpamError::NotTrained).into_response();
    };

    match model.predict(&req.email_text) {
        Ok(prediction) => {
            let is_spam = state.threshold.is_spam(&prediction);
            debug!(
                "Predicted {} (P(spam) = {:.4}, flagged: {})",
                prediction.label,
                prediction.spam_probability(),
                is_spam
            );
            let message = if is_spam { "Spam detected!" } else { "Not spam." };
            (
                StatusCode::OK,
                Json(PredictResponse {
                    label: prediction.label,
                    is_spam,
                    spam_probability: prediction.probability(Label::Spam),
                    not_spam_probability: prediction.probability(Label::NotSpam),
                    message: message.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => error_response(&e).into_response(),
    }
}

/// POST /train - Train a new model and swap it in
pub async fn train(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TrainRequest>,
) -> impl IntoResponse {
    // Held through persist and install: the file on disk always matches the live model
    let _guard = state.train_lock.lock().await;

    let persist_path = state.persist_path.clone();
    let trained = tokio::task::spawn_blocking(move || {
        let dataset = Dataset::from_raw_labels(req.emails, &req.labels)?;
        let (artifact, report) = train_artifact(dataset.emails(), dataset.labels(), req.verbose)?;

        // Persist before swapping so a failed write leaves the service unchanged
        if let Some(path) = &persist_path {
            artifact.save_json(path)?;
        }
        Ok::<_, SpamError>((artifact, report))
    })
    .await;

    let (artifact, report) = match trained {
        Ok(Ok(trained)) => trained,
        Ok(Err(e)) => return error_response(&e).into_response(),
        Err(e) => {
            error!("Training task failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new("Training task failed")),
            )
                .into_response();
        }
    };

    state.model.install(artifact).await;
    info!(
        "Retrained on {} emails ({} spam, {} not_spam)",
        report.total_samples, report.class_counts.spam, report.class_counts.not_spam
    );

    (StatusCode::OK, Json(report)).into_response()
}

/// GET /health - Service health
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let model = state.model.current().await;
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            model_loaded: model.is_some(),
            vocab_size: model.map(|m| m.vocab_size()),
        }),
    )
}
