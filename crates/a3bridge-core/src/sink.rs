//! Out-of-band channel for dispatch failures.
//!
//! Background handlers have no way to put an error into the host's reply,
//! so every dispatch failure is also sent here. The application may
//! register a channel to receive them; failures are always logged.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::DispatchError;

/// One reported failure: the command and the error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// The command the failure belongs to.
    pub command: String,
    /// Display text of the error.
    pub message: String,
}

impl ErrorRecord {
    /// Create a record.
    #[must_use]
    pub fn new(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            message: message.into(),
        }
    }

    /// The record as the two-element `[command, message]` pair.
    #[must_use]
    pub fn to_pair(&self) -> [String; 2] {
        [self.command.clone(), self.message.clone()]
    }
}

impl From<&DispatchError> for ErrorRecord {
    fn from(error: &DispatchError) -> Self {
        Self::new(error.command(), error.to_string())
    }
}

/// Receives dispatch failures. Cloning shares the registered channel.
#[derive(Clone, Default)]
pub struct ErrorSink {
    channel: Arc<RwLock<Option<mpsc::UnboundedSender<ErrorRecord>>>>,
}

impl ErrorSink {
    /// Create a sink with no channel registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sender` as the destination, replacing any previous one.
    pub fn register(&self, sender: mpsc::UnboundedSender<ErrorRecord>) {
        *self.channel.write().unwrap_or_else(PoisonError::into_inner) = Some(sender);
    }

    /// Create a new channel, register its sender, and return the receiver.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ErrorRecord> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.register(tx);
        rx
    }

    /// Whether a channel is registered.
    #[must_use]
    pub fn has_channel(&self) -> bool {
        self.channel
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Report a dispatch failure.
    pub fn report(&self, error: &DispatchError) {
        self.emit(ErrorRecord::from(error));
    }

    /// Log `record` and forward it to the registered channel, if any.
    ///
    /// Never blocks. A closed channel is dropped so later reports skip it.
    pub fn emit(&self, record: ErrorRecord) {
        warn!(command = %record.command, error = %record.message, "command failed");

        let sender = self
            .channel
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(sender) = sender else {
            return;
        };
        if sender.send(record).is_err() {
            debug!("error channel receiver dropped, unregistering");
            let mut channel = self.channel.write().unwrap_or_else(PoisonError::into_inner);
            if channel.as_ref().is_some_and(|current| current.same_channel(&sender)) {
                channel.take();
            }
        }
    }
}

impl fmt::Debug for ErrorSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorSink")
            .field("has_channel", &self.has_channel())
            .finish()
    }
}
