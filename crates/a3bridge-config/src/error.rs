//! Errors raised while loading `a3bridge.toml`.

use std::io;

use thiserror::Error;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read a3bridge config at {path}: {source}")]
    ReadError {
        /// Path of the unreadable file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The config file (or the embedded defaults) is not valid TOML for
    /// [`BridgeConfig`](crate::BridgeConfig).
    #[error("failed to parse a3bridge config at {path}: {source}")]
    ParseError {
        /// Path of the file, or `<embedded defaults>`.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A value is outside its accepted range.
    #[error("invalid value for '{field}': {message}")]
    ValidationError {
        /// Dotted key of the offending field, e.g. `dispatch.max_background`.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// An `A3BRIDGE_*` override could not be parsed.
    #[error("environment variable '{var_name}': {message}")]
    EnvError {
        /// Name of the environment variable.
        var_name: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
