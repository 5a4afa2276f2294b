//! Error types for registration, dispatch, and host callbacks.

use std::fmt;

use thiserror::Error;

/// Errors raised while registering commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A registration for this command already exists.
    #[error("command already registered: {command}")]
    DuplicateCommand {
        /// The command name.
        command: String,
    },

    /// The command name is empty.
    #[error("command name must not be empty")]
    EmptyCommand,

    /// The registration has neither a raw nor an args handler.
    #[error("command {command} has no handler")]
    MissingHandler {
        /// The command name.
        command: String,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Which host entry point a call arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    /// Single string call (`callExtension "cmd"`).
    Raw,
    /// Command plus argument vector (`callExtension ["cmd", [...]]`).
    Args,
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => f.write_str("raw"),
            Self::Args => f.write_str("args"),
        }
    }
}

/// Errors that end a dispatched call.
///
/// The `Display` text is the message placed in the reply sent to the host,
/// so it never repeats the command name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No registration matches the command.
    #[error("command not registered")]
    CommandNotRegistered {
        /// The command as received.
        command: String,
    },

    /// The registration has no handler for the call shape used.
    #[error("function not set")]
    HandlerNotSet {
        /// The resolved command name.
        command: String,
        /// The entry point the call arrived through.
        shape: CallShape,
    },

    /// The handler returned an error.
    #[error("{message}")]
    HandlerExecution {
        /// The resolved command name.
        command: String,
        /// The handler's error text, including its cause chain.
        message: String,
    },

    /// The handler panicked.
    #[error("handler panicked: {message}")]
    HandlerPanicked {
        /// The resolved command name.
        command: String,
        /// The panic payload, when it was a string.
        message: String,
    },

    /// A foreground handler did not finish within the reply deadline.
    #[error("deadline elapsed after {elapsed_ms}ms")]
    DeadlineElapsed {
        /// The resolved command name.
        command: String,
        /// The configured deadline in milliseconds.
        elapsed_ms: u64,
    },

    /// The handler never ran to completion: the bridge shut down first or
    /// its task was cancelled.
    #[error("handler aborted")]
    Aborted {
        /// The resolved command name.
        command: String,
    },
}

impl DispatchError {
    /// The command this error belongs to.
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::CommandNotRegistered { command }
            | Self::HandlerNotSet { command, .. }
            | Self::HandlerExecution { command, .. }
            | Self::HandlerPanicked { command, .. }
            | Self::DeadlineElapsed { command, .. }
            | Self::Aborted { command } => command,
        }
    }

    /// Wrap a handler error, keeping its full cause chain in the message.
    #[must_use]
    pub fn from_handler_error(command: impl Into<String>, error: &anyhow::Error) -> Self {
        Self::HandlerExecution {
            command: command.into(),
            message: format!("{error:#}"),
        }
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors raised when pushing results back through the host callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    /// The host has not registered a callback yet.
    #[error("callback function not set")]
    NotRegistered,

    /// The host callback returned a negative status.
    #[error("host rejected callback with status {status}")]
    Rejected {
        /// Status code returned by the host.
        status: i32,
    },
}

/// Result type for callback operations.
pub type CallbackResult<T> = Result<T, CallbackError>;
