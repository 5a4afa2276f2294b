//! Runtime error types.

use a3bridge_core::RegistryError;
use thiserror::Error;

/// Errors raised while building or configuring a [`Bridge`](crate::Bridge).
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The background runtime could not be started.
    #[error("failed to start background runtime: {0}")]
    ExecutorStartup(#[from] std::io::Error),

    /// A dispatch setting is out of range.
    #[error("invalid setting {field}: {message}")]
    InvalidSettings {
        /// Name of the offending setting.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// A registration was rejected.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
