//! spam-core: bag-of-words spam classification
//!
//! A count vectorizer and a multinomial Naive Bayes classifier with Laplace
//! smoothing, plus the pieces needed around them: CSV datasets, JSON model
//! artifacts and validation metrics.
//!
//! # Example
//!
//! ```
//! use spam_core::{Label, SpamDetector};
//!
//! let mut detector = SpamDetector::new();
//! detector
//!     .train(
//!         &["free money now", "project meeting notes"],
//!         &[Label::Spam, Label::NotSpam],
//!         false,
//!     )
//!     .unwrap();
//!
//! let prediction = detector.predict("free money").unwrap();
//! assert_eq!(prediction.label, Label::Spam);
//! ```
//!
//! # Modules
//!
//! - [`preprocess`]: text normalization
//! - [`vectorizer`]: vocabulary and count vectors
//! - [`classifier`]: Naive Bayes training and inference
//! - [`model`]: trained artifact and persistence
//! - [`dataset`]: labelled CSV datasets
//! - [`detector`]: end-to-end text classification

pub mod classifier;
pub mod dataset;
pub mod detector;
pub mod error;
pub mod metrics;
pub mod model;
pub mod preprocess;
pub mod types;
pub mod vectorizer;

pub use classifier::{ClassStatistics, NaiveBayes, TrainingReport};
pub use dataset::Dataset;
pub use detector::{train_artifact, SpamDetector};
pub use error::{Result, SpamError};
pub use metrics::{ClassMetrics, ConfusionMatrix, ValidationMetrics};
pub use model::ModelArtifact;
pub use preprocess::normalize;
pub use types::{Label, LabelMap, Prediction, SpamThreshold, DEFAULT_SPAM_THRESHOLD};
pub use vectorizer::{DocumentVector, Vectorizer, Vocabulary};
