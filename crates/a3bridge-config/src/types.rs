//! Configuration types.
//!
//! Every section implements [`Default`] with the same values as the
//! embedded `defaults.toml`, so a bare `[section]` header works.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for an extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Extension identity.
    pub extension: ExtensionSection,
    /// Dispatcher behaviour.
    pub dispatch: DispatchSection,
    /// Logging output.
    pub logging: LoggingSection,
}

/// `[extension]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionSection {
    /// Name passed as the first argument of host callbacks.
    pub name: String,
    /// Text returned for the version query.
    pub version: String,
}

impl Default for ExtensionSection {
    fn default() -> Self {
        Self {
            name: "a3bridge".to_owned(),
            version: "No version set".to_owned(),
        }
    }
}

/// `[dispatch]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSection {
    /// Longest the host thread waits for a foreground handler, in
    /// milliseconds. `0` or absent disables the deadline.
    pub reply_deadline_ms: Option<u64>,
    /// Most background handlers running at once. Absent means unbounded.
    pub max_background: Option<usize>,
    /// Reply capacity for calls made from Rust instead of the host.
    pub default_reply_capacity: usize,
    /// Worker threads for the background runtime. Absent uses tokio's
    /// default (one per core).
    pub worker_threads: Option<usize>,
}

impl DispatchSection {
    /// The reply deadline, if enabled.
    #[must_use]
    pub fn reply_deadline(&self) -> Option<Duration> {
        self.reply_deadline_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            reply_deadline_ms: None,
            max_background: None,
            default_reply_capacity: 10_240,
            worker_threads: None,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Output format: `pretty`, `compact`, `json`, or `full`.
    pub format: String,
    /// Where logs go: `file`, `stdout`, or `stderr`. The host discards
    /// standard streams, so extensions normally log to a file.
    pub target: String,
    /// Directory for log files, relative to the host working directory.
    pub directory: String,
    /// Log file name prefix.
    pub file_prefix: String,
    /// File rotation: `never`, `hourly`, or `daily`.
    pub rotation: String,
    /// Extra filter directives (e.g. `["a3bridge_runtime=debug"]`).
    pub directives: Vec<String>,
    /// Prefix each line with the time it was written.
    pub timestamps: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            target: "file".to_owned(),
            directory: "a3bridge_logs".to_owned(),
            file_prefix: "a3bridge".to_owned(),
            rotation: "daily".to_owned(),
            directives: Vec::new(),
            timestamps: true,
        }
    }
}
