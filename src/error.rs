//! Error types for DermaVision
//!
//! Structured errors are defined with thiserror; the binary propagates them
//! through anyhow. Validation errors carry the exact message shown to the
//! user, so their `Display` is the bare message.

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for DermaVision operations
#[derive(Error, Debug)]
pub enum DermaError {
    /// User input rejected (missing file, bad extension, empty field)
    #[error("{0}")]
    Validation(String),

    /// Image decoding, preprocessing or the forward pass failed
    #[error("Prediction error: {0}")]
    Prediction(String),

    /// Model artifact could not be loaded
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Feedback store encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Page rendering error
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for DermaVision operations
pub type Result<T> = std::result::Result<T, DermaError>;

impl DermaError {
    /// Whether this error was caused by the requester's input
    pub fn is_validation(&self) -> bool {
        matches!(self, DermaError::Validation(_))
    }
}
