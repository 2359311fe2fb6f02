//! Label and prediction types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::error::{Result, SpamError};

/// Default probability above which callers treat a message as spam
pub const DEFAULT_SPAM_THRESHOLD: f64 = 0.7;

/// Message class
///
/// Variants are declared in alphabetical order of their wire names. That order
/// is also the tie-break order: on equal scores the earlier label wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    /// Legitimate message
    NotSpam,
    /// Unsolicited message
    Spam,
}

impl Label {
    /// All labels in tie-break order
    pub const ALL: [Label; 2] = [Label::NotSpam, Label::Spam];

    /// Position of the label in per-class arrays
    pub fn index(self) -> usize {
        match self {
            Label::NotSpam => 0,
            Label::Spam => 1,
        }
    }

    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Label::NotSpam => "not_spam",
            Label::Spam => "spam",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Label {
    type Err = SpamError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "spam" => Ok(Label::Spam),
            "not_spam" => Ok(Label::NotSpam),
            other => Err(SpamError::UnknownLabel(other.to_string())),
        }
    }
}

/// Fixed-size map with one slot per [`Label`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMap<T> {
    pub not_spam: T,
    pub spam: T,
}

impl<T> LabelMap<T> {
    pub fn new(not_spam: T, spam: T) -> Self {
        Self { not_spam, spam }
    }

    /// Build a map by evaluating `f` once per label, in label order
    pub fn from_fn(mut f: impl FnMut(Label) -> T) -> Self {
        let not_spam = f(Label::NotSpam);
        let spam = f(Label::Spam);
        Self { not_spam, spam }
    }

    pub fn get(&self, label: Label) -> &T {
        match label {
            Label::NotSpam => &self.not_spam,
            Label::Spam => &self.spam,
        }
    }

    pub fn get_mut(&mut self, label: Label) -> &mut T {
        match label {
            Label::NotSpam => &mut self.not_spam,
            Label::Spam => &mut self.spam,
        }
    }

    /// Iterate `(label, value)` pairs in label order
    pub fn iter(&self) -> impl Iterator<Item = (Label, &T)> + '_ {
        Label::ALL.into_iter().map(move |label| (label, self.get(label)))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(_, value)| value)
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> LabelMap<U> {
        LabelMap::from_fn(|label| f(self.get(label)))
    }
}

impl<T> Index<Label> for LabelMap<T> {
    type Output = T;

    fn index(&self, label: Label) -> &T {
        self.get(label)
    }
}

impl<T> IndexMut<Label> for LabelMap<T> {
    fn index_mut(&mut self, label: Label) -> &mut T {
        self.get_mut(label)
    }
}

/// Outcome of scoring one document
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Most probable class
    pub label: Label,
    /// Posterior probability of each class, summing to 1
    pub distribution: LabelMap<f64>,
}

impl Prediction {
    pub fn probability(&self, label: Label) -> f64 {
        self.distribution[label]
    }

    pub fn spam_probability(&self) -> f64 {
        self.distribution.spam
    }
}

/// Caller-side decision policy layered on top of a [`Prediction`]
///
/// The classifier always returns the full distribution; whether a message is
/// flagged is decided here, not by the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SpamThreshold(f64);

impl SpamThreshold {
    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SpamError::InvalidThreshold(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Flag a message when `P(spam)` is strictly above the threshold
    pub fn is_spam(self, prediction: &Prediction) -> bool {
        prediction.spam_probability() > self.0
    }
}

impl Default for SpamThreshold {
    fn default() -> Self {
        Self(DEFAULT_SPAM_THRESHOLD)
    }
}

impl TryFrom<f64> for SpamThreshold {
    type Error = SpamError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SpamThreshold> for f64 {
    fn from(threshold: SpamThreshold) -> f64 {
        threshold.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse() {
        assert_eq!("spam".parse::<Label>().unwrap(), Label::Spam);
        assert_eq!("not_spam".parse::<Label>().unwrap(), Label::NotSpam);
        assert!(matches!(" spam ".parse::<Label>(), Err(SpamError::UnknownLabel(_))));
        assert!("Spam".parse::<Label>().is_err());
        assert!(matches!("ham".parse::<Label>(), Err(SpamError::UnknownLabel(l)) if l == "ham"));
        assert!("Spam".parse::<Label>().is_err());
    }

    #[test]
    fn test_label_order_is_alphabetical() {
        let mut names: Vec<&str> = Label::ALL.iter().map(|l| l.as_str()).collect();
        let declared = names.clone();
        names.sort();
        assert_eq!(names, declared);
        assert!(Label::NotSpam < Label::Spam);
    }

    #[test]
    fn test_label_serde_names() {
        assert_eq!(serde_json::to_string(&Label::NotSpam).unwrap(), "\"not_spam\"");
        let label: Label = serde_json::from_str("\"spam\"").unwrap();
        assert_eq!(label, Label::Spam);
    }

    #[test]
    fn test_label_map_indexing() {
        let mut counts = LabelMap::<usize>::default();
        counts[Label::Spam] += 2;
        counts[Label::NotSpam] += 1;
        assert_eq!(counts.spam, 2);
        assert_eq!(counts.values().sum::<usize>(), 3);
        let labels: Vec<Label> = counts.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, Label::ALL.to_vec());
    }

    #[test]
    fn test_threshold_policy() {
        let prediction = Prediction {
            label: Label::Spam,
            distribution: LabelMap::new(0.35, 0.65),
        };
        assert!(!SpamThreshold::default().is_spam(&prediction));
        assert!(SpamThreshold::new(0.5).unwrap().is_spam(&prediction));
        assert!(SpamThreshold::new(1.5).is_err());
        assert!(SpamThreshold::new(f64::NAN).is_err());
    }
}
