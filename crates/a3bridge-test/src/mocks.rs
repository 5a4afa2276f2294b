//! Stand-ins for the host side of the bridge.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use a3bridge_core::{ErrorRecord, NativeCallback};
use tokio::sync::mpsc;

/// One callback invocation as the host would have received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Push {
    /// Extension name.
    pub name: String,
    /// Function name.
    pub function: String,
    /// Payload text.
    pub data: String,
}

/// Host callback that records every push.
///
/// Clones share the same record, so keep one and install the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingCallback {
    pushes: Arc<Mutex<Vec<Push>>>,
    status: i32,
}

impl RecordingCallback {
    /// A callback that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `status` from every invocation. Negative values are rejections.
    #[must_use]
    pub fn with_status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    /// Everything pushed so far, in order.
    #[must_use]
    pub fn pushes(&self) -> Vec<Push> {
        self.pushes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of pushes so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pushes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Poll until at least `count` pushes arrived or `timeout` passed.
    #[must_use]
    pub fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Push> {
        let start = Instant::now();
        while self.count() < count && start.elapsed() < timeout {
            std::thread::sleep(Duration::from_millis(5));
        }
        self.pushes()
    }
}

impl NativeCallback for RecordingCallback {
    fn invoke(&self, name: &str, function: &str, data: &str) -> i32 {
        self.pushes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Push {
                name: name.to_owned(),
                function: function.to_owned(),
                data: data.to_owned(),
            });
        self.status
    }
}

/// Receiving end of an error channel.
#[derive(Debug)]
pub struct ErrorCollector {
    rx: mpsc::UnboundedReceiver<ErrorRecord>,
}

impl ErrorCollector {
    /// Wrap a receiver from `ErrorSink::subscribe` or `Bridge::error_channel`.
    #[must_use]
    pub fn new(rx: mpsc::UnboundedReceiver<ErrorRecord>) -> Self {
        Self { rx }
    }

    /// Everything already received.
    pub fn drain(&mut self) -> Vec<ErrorRecord> {
        let mut records = Vec::new();
        while let Ok(record) = self.rx.try_recv() {
            records.push(record);
        }
        records
    }

    /// Wait up to `timeout` for the next record.
    pub async fn next(&mut self, timeout: Duration) -> Option<ErrorRecord> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .ok()
            .flatten()
    }
}
