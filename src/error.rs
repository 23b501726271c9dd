//! Error types for the suggestion engine.

use thiserror::Error;

/// Errors raised while refreshing suggestions for a document.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Document not found: {0}")]
    DocumentNotFound(i32),

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Matcher worker error: {0}")]
    Worker(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for SuggestError {
    fn from(e: ConfigError) -> Self {
        SuggestError::Config(e.to_string())
    }
}
