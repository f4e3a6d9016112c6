//! Core error types for gymtrack-core.
//!
//! Engine computations are pure, so the only failures they report are
//! validation errors. Configuration and document storage add I/O and
//! parse failures on top.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for gymtrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored document is not a JSON object
    #[error("Document at {path} is not a JSON object")]
    MalformedDocument { path: PathBuf },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config directory could not be resolved or created
    #[error("Failed to prepare config directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors.
///
/// Raised for caller-supplied values the engine refuses to compute with.
/// A missing precondition (e.g. no weight history yet) is not an error;
/// those operations return `None` instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Invalid numeric or textual input
    #[error("Invalid value for '{field}': {message}")]
    InvalidInput { field: String, message: String },

    /// Text that is not a `YYYY-MM-DD` calendar day
    #[error("Invalid calendar day '{0}', expected YYYY-MM-DD")]
    InvalidDay(String),

    /// Text that is not an `HH:MM` time of day
    #[error("Invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),
}

impl ValidationError {
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
