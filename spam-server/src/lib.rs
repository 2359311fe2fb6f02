//! spam-server: HTTP service and tooling around spam-core
//!
//! Serves a trained [`spam_core::ModelArtifact`] over a small JSON API and
//! retrains it on demand. The live model sits behind a [`ModelHandle`] that
//! is swapped whole, so predictions never wait on training.

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod training;

pub use api::{router, ApiServer};
pub use config::{AppConfig, LoggingConfig, ModelConfig, ServerConfig};
pub use error::{Result, ServerError};
pub use state::{AppState, ModelHandle};
pub use training::{load_or_train, train_with_holdout, EvaluatedModel};
