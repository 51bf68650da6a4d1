//! Error types for the Beer Game crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeerGameError {
    /// Configuration validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Action outside the learner's action space
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BeerGameError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        BeerGameError::Config(message.into())
    }

    /// Creates an invalid-action error.
    pub fn invalid_action(message: impl Into<String>) -> Self {
        BeerGameError::InvalidAction(message.into())
    }
}
