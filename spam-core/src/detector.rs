//! Spam detector: vectorizer and classifier wired together

use tracing::debug;

use crate::classifier::{NaiveBayes, TrainingReport};
use crate::dataset::Dataset;
use crate::error::{Result, SpamError};
use crate::model::ModelArtifact;
use crate::types::{Label, Prediction};
use crate::vectorizer::Vectorizer;

/// Raw text in, label distribution out
#[derive(Debug, Clone, Default)]
pub struct SpamDetector {
    vectorizer: Vectorizer,
    classifier: NaiveBayes,
}

impl SpamDetector {
    /// Create an untrained detector
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a trained detector from a persisted artifact
    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        let (vocabulary, statistics) = artifact.into_parts();
        Self {
            vectorizer: Vectorizer::from_vocabulary(vocabulary),
            classifier: NaiveBayes::Trained(statistics),
        }
    }

    /// Fit the vocabulary on `emails` and train the classifier.
    ///
    /// The new vectorizer and classifier are built separately and only replace
    /// the current ones once both succeeded.
    pub fn train<S: AsRef<str>>(
        &mut self,
        emails: &[S],
        labels: &[Label],
        verbose: bool,
    ) -> Result<TrainingReport> {
        if emails.len() != labels.len() {
            return Err(SpamError::InsufficientData(format!(
                "{} emails but {} labels",
                emails.len(),
                labels.len()
            )));
        }

        let mut vectorizer = Vectorizer::new();
        let vectors = vectorizer.fit_transform(emails)?;

        let mut classifier = NaiveBayes::new();
        let report = classifier.train(&vectors, labels, verbose)?;

        self.vectorizer = vectorizer;
        self.classifier = classifier;
        Ok(report)
    }

    pub fn train_dataset(&mut self, dataset: &Dataset, verbose: bool) -> Result<TrainingReport> {
        self.train(dataset.emails(), dataset.labels(), verbose)
    }

    /// Score raw text
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        if !self.classifier.is_trained() {
            return Err(SpamError::NotTrained);
        }
        let vector = self.vectorizer.transform_one(text)?;
        debug!(
            "Vectorized message: {} known tokens",
            vector.iter().map(|&c| c as usize).sum::<usize>()
        );
        self.classifier.predict(&vector)
    }

    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Prediction>> {
        texts.iter().map(|text| self.predict(text.as_ref())).collect()
    }

    pub fn is_trained(&self) -> bool {
        self.classifier.is_trained() && self.vectorizer.is_fitted()
    }

    pub fn vectorizer(&self) -> &Vectorizer {
        &self.vectorizer
    }

    pub fn classifier(&self) -> &NaiveBayes {
        &self.classifier
    }

    /// Export the trained state
    pub fn artifact(&self) -> Result<ModelArtifact> {
        let statistics = self.classifier.statistics()?.clone();
        let vocabulary = self
            .vectorizer
            .vocabulary()
            .ok_or(SpamError::NotFitted)?
            .clone();
        ModelArtifact::new(vocabulary, statistics)
    }

    pub fn into_artifact(self) -> Result<ModelArtifact> {
        let statistics = match self.classifier {
            NaiveBayes::Trained(statistics) => statistics,
            NaiveBayes::Untrained => return Err(SpamError::NotTrained),
        };
        let vocabulary = self
            .vectorizer
            .into_vocabulary()
            .ok_or(SpamError::NotFitted)?;
        ModelArtifact::new(vocabulary, statistics)
    }
}

/// Train a fresh model and return it as an artifact
pub fn train_artifact<S: AsRef<str>>(
    emails: &[S],
    labels: &[Label],
    verbose: bool,
) -> Result<(ModelArtifact, TrainingReport)> {
    let mut detector = SpamDetector::new();
    let report = detector.train(emails, labels, verbose)?;
    Ok((detector.into_artifact()?, report))
}
