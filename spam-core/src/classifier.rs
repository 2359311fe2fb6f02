//! Multinomial Naive Bayes classifier
//!
//! Learns class priors and Laplace-smoothed per-token log-likelihoods from
//! count vectors, then scores new vectors with a log-sum-exp normalized
//! posterior.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SpamError};
use crate::metrics::ValidationMetrics;
use crate::types::{Label, LabelMap, Prediction};

/// Fraction of examples held out for verbose validation
pub const VALIDATION_FRACTION: f64 = 0.2;

/// Tolerance used when checking that priors sum to one
const PRIOR_SUM_TOLERANCE: f64 = 1e-9;

/// Fitted parameters of a trained classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStatistics {
    /// Fraction of training documents per class
    priors: LabelMap<f64>,
    /// `ln P(token_i | class)` for every vocabulary index
    token_log_likelihood: LabelMap<Vec<f64>>,
}

impl ClassStatistics {
    /// Estimate priors and smoothed likelihoods
    pub fn fit(vectors: &[Vec<u32>], labels: &[Label]) -> Result<Self> {
        let vocab_size = check_training_input(vectors, labels)?;

        let mut documents = LabelMap::<usize>::default();
        let mut token_counts = LabelMap::from_fn(|_| vec![0u64; vocab_size]);

        for (vector, &label) in vectors.iter().zip(labels) {
            documents[label] += 1;
            let aggregate = &mut token_counts[label];
            for (slot, &count) in aggregate.iter_mut().zip(vector) {
                *slot += u64::from(count);
            }
        }

        let total = labels.len() as f64;
        let priors = documents.map(|&count| count as f64 / total);

        let token_log_likelihood = token_counts.map(|counts| {
            let total_tokens: u64 = counts.iter().sum();
            let denominator = (total_tokens + vocab_size as u64) as f64;
            counts
                .iter()
                .map(|&count| ((count + 1) as f64 / denominator).ln())
                .collect::<Vec<f64>>()
        });

        Ok(Self {
            priors,
            token_log_likelihood,
        })
    }

    /// Number of features every scored vector must have
    pub fn vocab_size(&self) -> usize {
        self.token_log_likelihood.spam.len()
    }

    pub fn prior(&self, label: Label) -> f64 {
        self.priors[label]
    }

    pub fn priors(&self) -> &LabelMap<f64> {
        &self.priors
    }

    pub fn log_likelihoods(&self, label: Label) -> &[f64] {
        &self.token_log_likelihood[label]
    }

    /// Joint log-score `ln P(class) + Σ count_i · ln P(token_i | class)`
    pub fn log_scores(&self, vector: &[u32]) -> Result<LabelMap<f64>> {
        if vector.len() != self.vocab_size() {
            return Err(SpamError::DimensionMismatch {
                expected: self.vocab_size(),
                actual: vector.len(),
            });
        }

        Ok(LabelMap::from_fn(|label| {
            let likelihoods = &self.token_log_likelihood[label];
            let evidence: f64 = vector
                .iter()
                .zip(likelihoods)
                .filter(|(&count, _)| count > 0)
                .map(|(&count, &log_p)| f64::from(count) * log_p)
                .sum();
            self.priors[label].ln() + evidence
        }))
    }

    /// Score `vector` and pick the most probable class
    pub fn predict(&self, vector: &[u32]) -> Result<Prediction> {
        let scores = self.log_scores(vector)?;
        Ok(Prediction {
            label: argmax(&scores),
            distribution: softmax(&scores),
        })
    }

    /// Check the invariants a trained model always satisfies
    pub fn validate(&self, vocab_size: usize) -> Result<()> {
        let mut prior_sum = 0.0;
        for (label, &prior) in self.priors.iter() {
            if !(prior > 0.0 && prior <= 1.0) {
                return Err(SpamError::InvalidArtifact(format!(
                    "prior for {} is {}, expected a value in (0, 1]",
                    label, prior
                )));
            }
            prior_sum += prior;
        }
        if (prior_sum - 1.0).abs() > PRIOR_SUM_TOLERANCE {
            return Err(SpamError::InvalidArtifact(format!(
                "priors sum to {}, expected 1",
                prior_sum
            )));
        }

        for (label, likelihoods) in self.token_log_likelihood.iter() {
            if likelihoods.len() != vocab_size {
                return Err(SpamError::InvalidArtifact(format!(
                    "{} has {} likelihoods for a vocabulary of {}",
                    label,
                    likelihoods.len(),
                    vocab_size
                )));
            }
            if let Some(idx) = likelihoods.iter().position(|p| !p.is_finite() || *p > 0.0) {
                return Err(SpamError::InvalidArtifact(format!(
                    "{} likelihood at index {} is {}",
                    label, idx, likelihoods[idx]
                )));
            }
        }

        Ok(())
    }
}

/// Validate training input and return the shared vector width
fn check_training_input(vectors: &[Vec<u32>], labels: &[Label]) -> Result<usize> {
    if vectors.len() != labels.len() {
        return Err(SpamError::InsufficientData(format!(
            "{} document vectors but {} labels",
            vectors.len(),
            labels.len()
        )));
    }

    for label in Label::ALL {
        if !labels.contains(&label) {
            return Err(SpamError::InsufficientData(format!(
                "no training examples labelled {}",
                label
            )));
        }
    }

    let vocab_size = vectors[0].len();
    if vocab_size == 0 {
        return Err(SpamError::InsufficientData(
            "document vectors have no features".to_string(),
        ));
    }
    if let Some((idx, vector)) = vectors
        .iter()
        .enumerate()
        .find(|(_, v)| v.len() != vocab_size)
    {
        return Err(SpamError::InsufficientData(format!(
            "document vector {} has {} features, expected {}",
            idx,
            vector.len(),
            vocab_size
        )));
    }

    Ok(vocab_size)
}

/// Highest-scoring label; ties go to the label that comes first in [`Label::ALL`]
fn argmax(scores: &LabelMap<f64>) -> Label {
    let mut best = Label::ALL[0];
    for (label, &score) in scores.iter().skip(1) {
        if score > scores[best] {
            best = label;
        }
    }
    best
}

/// Log-sum-exp normalization of joint log-scores into probabilities
fn softmax(scores: &LabelMap<f64>) -> LabelMap<f64> {
    let max = scores.values().copied().fold(f64::NEG_INFINITY, f64::max);
    let shifted = scores.map(|&score| (score - max).exp());
    let sum: f64 = shifted.values().sum();
    shifted.map(|&value| value / sum)
}

/// Summary returned by [`NaiveBayes::train`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub total_samples: usize,
    pub class_counts: LabelMap<usize>,
    pub vocab_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationMetrics>,
}

/// Classifier lifecycle: untrained until a successful `train`
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NaiveBayes {
    #[default]
    Untrained,
    Trained(ClassStatistics),
}

impl NaiveBayes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit priors and likelihoods, replacing any earlier model.
    ///
    /// With `verbose`, the last [`VALIDATION_FRACTION`] of the examples is
    /// re-scored with the fitted parameters and the metrics are logged. This
    /// never changes the parameters. On error the classifier is left as it was.
    pub fn train(
        &mut self,
        vectors: &[Vec<u32>],
        labels: &[Label],
        verbose: bool,
    ) -> Result<TrainingReport> {
        let statistics = ClassStatistics::fit(vectors, labels)?;

        let mut class_counts = LabelMap::<usize>::default();
        for &label in labels {
            class_counts[label] += 1;
        }

        let validation = if verbose {
            validate_holdout(&statistics, vectors, labels)?
        } else {
            None
        };

        let report = TrainingReport {
            total_samples: labels.len(),
            class_counts,
            vocab_size: statistics.vocab_size(),
            validation,
        };

        info!(
            "Trained on {} samples ({} spam, {} not_spam), {} features",
            report.total_samples,
            report.class_counts.spam,
            report.class_counts.not_spam,
            report.vocab_size
        );
        if let Some(metrics) = &report.validation {
            metrics.log();
        }

        *self = NaiveBayes::Trained(statistics);
        Ok(report)
    }

    pub fn predict(&self, vector: &[u32]) -> Result<Prediction> {
        self.statistics()?.predict(vector)
    }

    pub fn log_scores(&self, vector: &[u32]) -> Result<LabelMap<f64>> {
        self.statistics()?.log_scores(vector)
    }

    pub fn statistics(&self) -> Result<&ClassStatistics> {
        match self {
            NaiveBayes::Trained(statistics) => Ok(statistics),
            NaiveBayes::Untrained => Err(SpamError::NotTrained),
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self, NaiveBayes::Trained(_))
    }
}

/// Score the tail slice of the training data
fn validate_holdout(
    statistics: &ClassStatistics,
    vectors: &[Vec<u32>],
    labels: &[Label],
) -> Result<Option<ValidationMetrics>> {
    let total = labels.len();
    if total < 2 {
        return Ok(None);
    }

    let held_out = ((total as f64 * VALIDATION_FRACTION).ceil() as usize).clamp(1, total - 1);
    let start = total - held_out;
    debug!("Validating on examples {}..{}", start, total);

    let mut predicted = Vec::with_capacity(held_out);
    for vector in &vectors[start..] {
        predicted.push(statistics.predict(vector)?.label);
    }

    Ok(Some(ValidationMetrics::from_predictions(
        &labels[start..],
        &predicted,
    )))
}
