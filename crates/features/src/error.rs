use context_corpus::CorpusError;
use std::time::Duration;
use thiserror::Error;

/// Result type for feature discovery
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors surfaced by the discovery engine and its collaborators
#[derive(Error, Debug)]
pub enum FeatureError {
    /// Corpus could not be read or is malformed
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file is not valid TOML
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Oracle backend failed to answer
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// Oracle backend did not answer in time
    #[error("Oracle call timed out after {0:?}")]
    OracleTimeout(Duration),

    /// Top-down discovery needs an embedder for feature names
    #[error("Top-down discovery requires an embedder")]
    MissingEmbedder,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl FeatureError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an oracle unavailable error
    pub fn oracle(msg: impl Into<String>) -> Self {
        Self::OracleUnavailable(msg.into())
    }
}
