//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while installing the log subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log configuration is invalid (bad level or directive).
    #[error("logging configuration error: {0}")]
    ConfigError(String),

    /// A global subscriber could not be installed, usually because one
    /// already exists in this process.
    #[error("logging initialization error: {0}")]
    InitError(String),

    /// The log directory could not be created.
    #[error("log directory error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
