//! Validation metrics for verbose training runs

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{Label, LabelMap};

/// Counts of (actual, predicted) label pairs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// `counts[actual][predicted]`, indexed by [`Label::index`]
    counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, actual: Label, predicted: Label) {
        self.counts[actual.index()][predicted.index()] += 1;
    }

    pub fn count(&self, actual: Label, predicted: Label) -> usize {
        self.counts[actual.index()][predicted.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        Label::ALL.iter().map(|&l| self.count(l, l)).sum()
    }

    /// Number of examples whose true label is `label`
    pub fn support(&self, label: Label) -> usize {
        Label::ALL.iter().map(|&p| self.count(label, p)).sum()
    }

    /// Number of examples predicted as `label`
    pub fn predicted(&self, label: Label) -> usize {
        Label::ALL.iter().map(|&a| self.count(a, label)).sum()
    }
}

/// Precision / recall summary for one label
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Metrics computed on a held-out slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    pub samples: usize,
    pub accuracy: f64,
    pub per_label: LabelMap<ClassMetrics>,
    pub confusion: ConfusionMatrix,
}

/// `num / den`, or 0 when the ratio is undefined
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ValidationMetrics {
    /// Compare paired true and predicted labels
    ///
    /// Extra elements of the longer slice are ignored.
    pub fn from_predictions(actual: &[Label], predicted: &[Label]) -> Self {
        let mut confusion = ConfusionMatrix::new();
        for (&a, &p) in actual.iter().zip(predicted) {
            confusion.record(a, p);
        }
        Self::from_confusion(confusion)
    }

    pub fn from_confusion(confusion: ConfusionMatrix) -> Self {
        let per_label = LabelMap::from_fn(|label| {
            let true_positives = confusion.count(label, label);
            let precision = ratio(true_positives, confusion.predicted(label));
            let recall = ratio(true_positives, confusion.support(label));
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            ClassMetrics {
                precision,
                recall,
                f1,
                support: confusion.support(label),
            }
        });

        Self {
            samples: confusion.total(),
            accuracy: ratio(confusion.correct(), confusion.total()),
            per_label,
            confusion,
        }
    }

    /// Emit the report through `tracing`
    pub fn log(&self) {
        info!("Validation samples: {}", self.samples);
        info!("Accuracy: {:.2}%", self.accuracy * 100.0);
        for (label, metrics) in self.per_label.iter() {
            info!(
                "{}: precision {:.2}%, recall {:.2}%, f1 {:.3}, support {}",
                label,
                metrics.precision * 100.0,
                metrics.recall * 100.0,
                metrics.f1,
                metrics.support
            );
        }
        info!(
            "Confusion matrix (rows actual, cols predicted, order not_spam/spam): {:?}",
            self.confusion.counts
        );
    }
}
