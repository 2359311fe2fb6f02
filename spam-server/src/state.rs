//! Shared state for the HTTP service

use spam_core::{ModelArtifact, SpamThreshold};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::config::ModelConfig;

/// Reference to the live model
///
/// Readers take a snapshot of the `Arc` and predict without holding the lock.
/// Retraining builds a new artifact elsewhere and swaps it in with [`install`].
///
/// [`install`]: ModelHandle::install
#[derive(Debug, Default)]
pub struct ModelHandle {
    current: RwLock<Option<Arc<ModelArtifact>>>,
}

impl ModelHandle {
    /// Handle with no model; predictions fail until one is installed
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(artifact: ModelArtifact) -> Self {
        Self {
            current: RwLock::new(Some(Arc::new(artifact))),
        }
    }

    pub async fn current(&self) -> Option<Arc<ModelArtifact>> {
        self.current.read().await.clone()
    }

    /// Replace the live model, returning the previous one
    pub async fn install(&self, artifact: ModelArtifact) -> Option<Arc<ModelArtifact>> {
        let vocab_size = artifact.vocab_size();
        let previous = self.current.write().await.replace(Arc::new(artifact));
        info!("Installed model with {} vocabulary tokens", vocab_size);
        previous
    }

    pub async fn is_loaded(&self) -> bool {
        self.current.read().await.is_some()
    }
}

/// Shared application state
pub struct AppState {
    pub model: ModelHandle,
    pub threshold: SpamThreshold,
    /// Where `/train` writes the new artifact, if anywhere
    pub persist_path: Option<PathBuf>,
    /// Serializes retraining from train through install
    pub train_lock: Mutex<()>,
}

impl AppState {
    pub fn new(model: ModelHandle, threshold: SpamThreshold) -> Self {
        Self {
            model,
            threshold,
            persist_path: None,
            train_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &ModelConfig, model: ModelHandle) -> Self {
        let persist_path = if config.persist_on_train {
            config.artifact_path.clone()
        } else {
            None
        };
        Self {
            model,
            threshold: config.spam_threshold,
            persist_path,
            train_lock: Mutex::new(()),
        }
    }

    pub fn with_persist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spam_core::{train_artifact, Label};

    fn artifact(spam_text: &str) -> ModelArtifact {
        train_artifact(
            &[spam_text, "project meeting notes"],
            &[Label::Spam, Label::NotSpam],
            false,
        )
        .unwrap()
        .0
    }

    #[tokio::test]
    async fn test_empty_handle() {
        let handle = ModelHandle::new();
        assert!(!handle.is_loaded().await);
        assert!(handle.current().await.is_none());
    }

    #[tokio::test]
    async fn test_install_swaps_model() {
        let handle = ModelHandle::with_model(artifact("free money now"));
        let snapshot = handle.current().await.unwrap();

        let previous = handle.install(artifact("claim your prize today")).await;
        assert!(Arc::ptr_eq(&previous.unwrap(), &snapshot));

        // The old snapshot stays usable after the swap
        assert_eq!(snapshot.predict("free money").unwrap().label, Label::Spam);
        let current = handle.current().await.unwrap();
        assert!(!Arc::ptr_eq(&current, &snapshot));
        assert!(current.vocabulary().get("prize").is_some());
    }

    #[test]
    fn test_from_config_persist_path() {
        let mut config = ModelConfig::default();
        let state = AppState::from_config(&config, ModelHandle::new());
        assert_eq!(state.persist_path, Some(PathBuf::from("spam_model.json")));

        config.persist_on_train = false;
        let state = AppState::from_config(&config, ModelHandle::new());
        assert!(state.persist_path.is_none());
    }
}
