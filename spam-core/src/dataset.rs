//! Labelled email datasets
//!
//! Loads `email,label` CSV files such as `spam_dataset.csv` and provides a
//! deterministic train/test split.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::error::{Result, SpamError};
use crate::types::{Label, LabelMap};

/// One CSV row as written by the dataset tooling
#[derive(Debug, Clone, Deserialize)]
struct EmailRecord {
    email: String,
    label: String,
}

/// Parallel lists of email texts and their labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    emails: Vec<String>,
    labels: Vec<Label>,
}

impl Dataset {
    pub fn new(emails: Vec<String>, labels: Vec<Label>) -> Result<Self> {
        if emails.len() != labels.len() {
            return Err(SpamError::InsufficientData(format!(
                "{} emails but {} labels",
                emails.len(),
                labels.len()
            )));
        }
        Ok(Self { emails, labels })
    }

    /// Parse label strings, failing on anything outside `spam` / `not_spam`
    pub fn from_raw_labels<S: AsRef<str>>(emails: Vec<String>, labels: &[S]) -> Result<Self> {
        let labels = labels
            .iter()
            .map(|label| label.as_ref().parse())
            .collect::<Result<Vec<Label>>>()?;
        Self::new(emails, labels)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_csv_reader(file)?;
        let counts = dataset.label_counts();
        info!(
            "Loaded {} emails from {} ({} spam, {} not_spam)",
            dataset.len(),
            path.display(),
            counts.spam,
            counts.not_spam
        );
        Ok(dataset)
    }

    /// Read a headed `email,label` CSV
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut dataset = Self::default();

        // Line numbers are 1-based and count the header
        for (row, record) in reader.deserialize::<EmailRecord>().enumerate() {
            let record = record?;
            let label = record.label.parse::<Label>().map_err(|_| {
                SpamError::InvalidDataset(format!(
                    "line {}: unknown label {:?}",
                    row + 2,
                    record.label
                ))
            })?;
            dataset.push(record.email, label);
        }

        Ok(dataset)
    }

    pub fn push(&mut self, email: impl Into<String>, label: Label) {
        self.emails.push(email.into());
        self.labels.push(label);
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label_counts(&self) -> LabelMap<usize> {
        let mut counts = LabelMap::default();
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }

    /// Split off the last `test_size` fraction as a test set.
    ///
    /// No shuffling: the same input always gives the same split. When the
    /// dataset has at least two rows both halves are non-empty.
    pub fn train_test_split(&self, test_size: f64) -> Result<(Dataset, Dataset)> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(SpamError::InsufficientData(format!(
                "test size {} must be strictly between 0 and 1",
                test_size
            )));
        }
        if self.len() < 2 {
            return Err(SpamError::InsufficientData(format!(
                "cannot split {} rows into train and test sets",
                self.len()
            )));
        }

        let test_len = ((self.len() as f64 * test_size).ceil() as usize).clamp(1, self.len() - 1);
        let split = self.len() - test_len;

        let train = Dataset {
            emails: self.emails[..split].to_vec(),
            labels: self.labels[..split].to_vec(),
        };
        let test = Dataset {
            emails: self.emails[split..].to_vec(),
            labels: self.labels[split..].to_vec(),
        };
        Ok((train, test))
    }
}
