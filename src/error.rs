//! Error types for Staffroom
//!
//! This module defines the error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Staffroom operations
///
/// Request failures never escape the chat controller; they are logged and
/// rendered. The remaining variants surface from configuration loading and
/// terminal setup.
#[derive(Error, Debug)]
pub enum StaffroomError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failures and non-success HTTP statuses
    #[error("HTTP error: {0}")]
    Http(String),

    /// A response body that could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Input rejected before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Terminal line editor errors
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Result type alias for Staffroom operations
///
/// Uses `anyhow::Error` so callers can attach context while still being able
/// to downcast to [`StaffroomError`].
pub type Result<T> = anyhow::Result<T>;
