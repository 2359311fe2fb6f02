//! Trained model artifact and its JSON persistence

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::classifier::ClassStatistics;
use crate::error::{Result, SpamError};
use crate::types::Prediction;
use crate::vectorizer::{DocumentVector, Vocabulary};

/// On-disk format version written by [`ModelArtifact::save_json`]
pub const ARTIFACT_VERSION: u32 = 1;

/// Complete state of a trained model: vocabulary plus class statistics
///
/// Immutable once built. Retraining produces a new artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    version: u32,
    vocabulary: Vocabulary,
    statistics: ClassStatistics,
}

impl ModelArtifact {
    /// Pair a vocabulary with statistics of the same width
    pub fn new(vocabulary: Vocabulary, statistics: ClassStatistics) -> Result<Self> {
        let artifact = Self {
            version: ARTIFACT_VERSION,
            vocabulary,
            statistics,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != ARTIFACT_VERSION {
            return Err(SpamError::InvalidArtifact(format!(
                "unsupported version {} (expected {})",
                self.version, ARTIFACT_VERSION
            )));
        }
        self.statistics.validate(self.vocabulary.len())
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn statistics(&self) -> &ClassStatistics {
        &self.statistics
    }

    pub fn vocab_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn into_parts(self) -> (Vocabulary, ClassStatistics) {
        (self.vocabulary, self.statistics)
    }

    /// Normalize and count `text` over the frozen vocabulary
    pub fn vectorize(&self, text: &str) -> DocumentVector {
        self.vocabulary.count(text)
    }

    /// Score raw text
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        self.statistics.predict(&self.vectorize(text))
    }

    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Prediction>> {
        texts.iter().map(|text| self.predict(text.as_ref())).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a JSON artifact
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Write the artifact as JSON, creating parent directories as needed
    ///
    /// The JSON goes to a temporary file next to `path` and is then renamed
    /// over it, so readers see either the old artifact or the new one.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = temp_path_for(path)?;
        std::fs::write(&tmp_path, self.to_json()?)?;
        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        info!(
            "Saved model artifact ({} tokens) to {}",
            self.vocab_size(),
            path.display()
        );
        Ok(())
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let artifact = Self::from_json(&content)?;
        info!(
            "Loaded model artifact ({} tokens) from {}",
            artifact.vocab_size(),
            path.display()
        );
        Ok(artifact)
    }
}

/// Sibling of `path` used as the write target before the rename
fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{} is not a file path", path.display()),
        )
    })?;
    let mut tmp_name = OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(format!(".{}.tmp", std::process::id()));
    Ok(path.with_file_name(tmp_name))
}
