//! Error types for spam-core

use thiserror::Error;

/// Result type alias for spam-core operations
pub type Result<T> = std::result::Result<T, SpamError>;

/// Spam detection error types
///
/// Every variant except the IO/serialization wrappers is a local usage error:
/// the caller has to fix its input or call order, retrying cannot help.
#[derive(Error, Debug)]
pub enum SpamError {
    /// `fit` was given a corpus with no token left after normalization
    #[error("Empty vocabulary: no tokens left after normalization")]
    EmptyVocabulary,

    /// `transform` called before `fit`
    #[error("Vectorizer is not fitted")]
    NotFitted,

    /// `predict` called before `train`
    #[error("Classifier is not trained")]
    NotTrained,

    /// Missing labels, mismatched lengths, or a class with no examples
    #[error("Insufficient training data: {0}")]
    InsufficientData(String),

    /// Document vector width does not match the vocabulary
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Label outside the `spam` / `not_spam` alphabet
    #[error("Unknown label: {0:?}")]
    UnknownLabel(String),

    /// Malformed dataset row
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Persisted model that violates the model invariants
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// Probability threshold outside `[0, 1]`
    #[error("Invalid threshold: {0} (expected a value in [0, 1])")]
    InvalidThreshold(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
