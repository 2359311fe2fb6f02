//! Bag-of-words vectorizer
//!
//! Turns raw text into fixed-width token count vectors over a vocabulary that
//! is learned once by [`Vectorizer::fit`] and frozen afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Result, SpamError};
use crate::preprocess::{normalize, tokenize};

/// Token counts of one document, indexed by vocabulary position
pub type DocumentVector = Vec<u32>;

/// Frozen token -> index mapping
///
/// Indices are the positions in `terms`, so they are always contiguous in
/// `[0, len)`. Serialized as the ordered term list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Collect distinct tokens across `documents` in first-seen order
    pub fn build<S: AsRef<str>>(documents: &[S]) -> Result<Self> {
        let mut terms = Vec::new();
        let mut index = HashMap::new();

        for document in documents {
            let normalized = normalize(document.as_ref());
            for token in tokenize(&normalized) {
                if !index.contains_key(token) {
                    index.insert(token.to_string(), terms.len());
                    terms.push(token.to_string());
                }
            }
        }

        if terms.is_empty() {
            return Err(SpamError::EmptyVocabulary);
        }

        Ok(Self { terms, index })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Index of a normalized token
    pub fn get(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Token stored at `index`
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Count vocabulary tokens in raw `text`; unknown tokens are dropped
    pub fn count(&self, text: &str) -> DocumentVector {
        let mut vector = vec![0u32; self.terms.len()];
        let normalized = normalize(text);

        for token in tokenize(&normalized) {
            if let Some(idx) = self.get(token) {
                vector[idx] += 1;
            }
        }

        vector
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = SpamError;

    fn try_from(terms: Vec<String>) -> Result<Self> {
        if terms.is_empty() {
            return Err(SpamError::EmptyVocabulary);
        }

        let mut index = HashMap::with_capacity(terms.len());
        for (idx, term) in terms.iter().enumerate() {
            if term.is_empty() || normalize(term) != *term || term.contains(char::is_whitespace) {
                return Err(SpamError::InvalidArtifact(format!(
                    "vocabulary term {:?} at index {} is not a normalized token",
                    term, idx
                )));
            }
            if index.insert(term.clone(), idx).is_some() {
                return Err(SpamError::InvalidArtifact(format!(
                    "duplicate vocabulary term {:?}",
                    term
                )));
            }
        }

        Ok(Self { terms, index })
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.terms
    }
}

/// Text to count-vector transformer
#[derive(Debug, Clone, Default)]
pub struct Vectorizer {
    vocabulary: Option<Vocabulary>,
}

impl Vectorizer {
    /// Create an unfitted vectorizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vectorizer over an existing vocabulary
    pub fn from_vocabulary(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary: Some(vocabulary),
        }
    }

    /// Learn the vocabulary of `documents`, replacing any previous one.
    ///
    /// On error the previous vocabulary is kept.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<&Vocabulary> {
        let vocabulary = Vocabulary::build(documents)?;
        debug!(
            "Fitted vocabulary of {} tokens from {} documents",
            vocabulary.len(),
            documents.len()
        );
        Ok(&*self.vocabulary.insert(vocabulary))
    }

    /// Count vocabulary tokens in each document
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<DocumentVector>> {
        let vocabulary = self.vocabulary.as_ref().ok_or(SpamError::NotFitted)?;
        Ok(documents
            .iter()
            .map(|document| vocabulary.count(document.as_ref()))
            .collect())
    }

    /// Count vocabulary tokens in a single document
    pub fn transform_one(&self, document: &str) -> Result<DocumentVector> {
        let vocabulary = self.vocabulary.as_ref().ok_or(SpamError::NotFitted)?;
        Ok(vocabulary.count(document))
    }

    /// `fit` followed by `transform` on the same corpus
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Vec<DocumentVector>> {
        self.fit(documents)?;
        self.transform(documents)
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    /// Width of produced vectors (0 before fitting)
    pub fn vocab_size(&self) -> usize {
        self.vocabulary.as_ref().map_or(0, Vocabulary::len)
    }

    pub fn into_vocabulary(self) -> Option<Vocabulary> {
        self.vocabulary
    }
}
