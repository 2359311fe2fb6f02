//! Configuration for spam-server

use serde::{Deserialize, Serialize};
use spam_core::classifier::VALIDATION_FRACTION;
use spam_core::SpamThreshold;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Result, ServerError};

/// Main service configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,
    /// Model loading, training and decision policy
    #[serde(default)]
    pub model: ModelConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Listen address for the HTTP API (e.g., "127.0.0.1:5001")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Model configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// JSON artifact loaded at startup and written after training
    #[serde(default = "default_artifact_path")]
    pub artifact_path: Option<PathBuf>,
    /// `email,label` CSV used when no artifact exists yet
    #[serde(default = "default_dataset_path")]
    pub dataset_path: Option<PathBuf>,
    /// `P(spam)` above which a message is flagged
    #[serde(default)]
    pub spam_threshold: SpamThreshold,
    /// Fraction of the dataset held out for evaluation
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Write the artifact to `artifact_path` after `/train`
    #[serde(default = "default_persist_on_train")]
    pub persist_on_train: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_listen_addr() -> String {
    "127.0.0.1:5001".to_string()
}

fn default_artifact_path() -> Option<PathBuf> {
    Some(PathBuf::from("spam_model.json"))
}

fn default_dataset_path() -> Option<PathBuf> {
    Some(PathBuf::from("spam_dataset.csv"))
}

fn default_test_size() -> f64 {
    VALIDATION_FRACTION
}

fn default_persist_on_train() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            dataset_path: default_dataset_path(),
            spam_threshold: SpamThreshold::default(),
            test_size: default_test_size(),
            persist_on_train: default_persist_on_train(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ServerError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Create a default development configuration
    pub fn development() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: default_log_format(),
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.server.listen_addr.parse::<SocketAddr>().map_err(|e| {
            ServerError::Config(format!(
                "Invalid listen address '{}': {}",
                self.server.listen_addr, e
            ))
        })?;

        if !(self.model.test_size > 0.0 && self.model.test_size < 1.0) {
            return Err(ServerError::Config(format!(
                "test_size must be strictly between 0 and 1, got {}",
                self.model.test_size
            )));
        }

        match self.logging.format.as_str() {
            "text" | "json" => Ok(()),
            other => Err(ServerError::Config(format!(
                "Unknown log format '{}' (expected \"text\" or \"json\")",
                other
            ))),
        }
    }
}

impl LoggingConfig {
    /// Default `EnvFilter` directives when `RUST_LOG` is unset
    pub fn filter_directives(&self) -> String {
        format!(
            "spam_server={level},spam_core={level},tower_http={level}",
            level = self.level
        )
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}
