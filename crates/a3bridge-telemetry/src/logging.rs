//! Logging configuration and setup.
//!
//! The host discards an extension's standard streams, so the default
//! target is a rolling file under the host working directory.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{TelemetryError, TelemetryResult};

fn install_failed(err: impl std::fmt::Display) -> TelemetryError {
    TelemetryError::InitError(err.to_string())
}

/// File rotation strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRotation {
    /// Start a new file every day.
    #[default]
    Daily,
    /// Start a new file every hour.
    Hourly,
    /// Keep appending to one file.
    Never,
}

impl FileRotation {
    fn to_rotation(self) -> Rotation {
        match self {
            Self::Daily => Rotation::DAILY,
            Self::Hourly => Rotation::HOURLY,
            Self::Never => Rotation::NEVER,
        }
    }
}

/// Line layout of emitted events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line human-readable format.
    Pretty,
    /// Compact single-line format.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
    /// Single-line format with all fields.
    Full,
}

/// Destination for emitted events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Standard output; only visible when run outside the host.
    Stdout,
    /// Standard error.
    Stderr,
    /// Log to rolling files in this directory.
    File(PathBuf),
}

impl Default for LogTarget {
    fn default() -> Self {
        Self::File(PathBuf::from("a3bridge_logs"))
    }
}

/// File logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLogConfig {
    /// File name prefix; `a3bridge` produces `a3bridge.2026-01-15.log`.
    #[serde(default = "default_file_prefix")]
    pub prefix: String,
    /// Rotation strategy.
    #[serde(default)]
    pub rotation: FileRotation,
}

fn default_file_prefix() -> String {
    "a3bridge".to_owned()
}

impl Default for FileLogConfig {
    fn default() -> Self {
        Self {
            prefix: default_file_prefix(),
            rotation: FileRotation::default(),
        }
    }
}

/// Subscriber settings for the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Base level, `info` unless configured.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Line layout.
    #[serde(default)]
    pub format: LogFormat,
    /// Where lines are written.
    #[serde(default)]
    pub target: LogTarget,
    /// File naming and rotation, used when the target is a file.
    #[serde(default)]
    pub file: FileLogConfig,
    /// Prefix each event with its wall-clock time.
    #[serde(default = "default_timestamps")]
    pub timestamps: bool,
    /// Source file and line on each event.
    #[serde(default)]
    pub file_info: bool,
    /// Whether to include thread names. Useful for telling host-thread
    /// calls from background handlers.
    #[serde(default)]
    pub thread_names: bool,
    /// Whether to use ANSI colors. Ignored for JSON and file output.
    #[serde(default)]
    pub ansi: bool,
    /// Per-target overrides layered on top of `level`.
    #[serde(default)]
    pub directives: Vec<String>,
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_timestamps() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            target: LogTarget::default(),
            file: FileLogConfig::default(),
            timestamps: true,
            file_info: false,
            thread_names: false,
            ansi: false,
            directives: Vec::new(),
        }
    }
}

impl LogConfig {
    /// Defaults with `level` as the base filter.
    #[must_use]
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// Replace the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Replace the output destination.
    #[must_use]
    pub fn with_target(mut self, target: LogTarget) -> Self {
        self.target = target;
        self
    }

    /// Log to rolling files in `directory` named after `prefix`.
    #[must_use]
    pub fn with_file_logging(
        mut self,
        directory: impl Into<PathBuf>,
        prefix: impl Into<String>,
        rotation: FileRotation,
    ) -> Self {
        self.target = LogTarget::File(directory.into());
        self.file.prefix = prefix.into();
        self.file.rotation = rotation;
        self.ansi = false;
        self
    }

    /// Append a per-target directive such as `a3bridge_ffi=trace`.
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Leave the time off each line.
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    /// Record source file and line on every event.
    #[must_use]
    pub fn with_file_info(mut self) -> Self {
        self.file_info = true;
        self
    }

    /// Record the emitting thread's name.
    #[must_use]
    pub fn with_thread_names(mut self) -> Self {
        self.thread_names = true;
        self
    }

    /// Level plus every override directive, parsed into one filter.
    fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        let mut filter = EnvFilter::try_new(&self.level)
            .map_err(|e| TelemetryError::ConfigError(e.to_string()))?;

        for directive in &self.directives {
            filter = filter.add_directive(directive.parse().map_err(
                |e: tracing_subscriber::filter::ParseError| {
                    TelemetryError::ConfigError(format!("directive '{directive}': {e}"))
                },
            )?);
        }

        Ok(filter)
    }
}

/// Install the global subscriber described by `config`.
///
/// Can succeed once per process; later calls return
/// [`TelemetryError::InitError`].
///
/// # Errors
///
/// Returns an error if the level or a directive is invalid, the log
/// directory cannot be created, or a subscriber is already installed.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.env_filter()?;

    match &config.target {
        LogTarget::Stdout => install(filter, config, config.ansi, std::io::stdout),
        LogTarget::Stderr => install(filter, config, config.ansi, std::io::stderr),
        LogTarget::File(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::builder()
                .rotation(config.file.rotation.to_rotation())
                .filename_prefix(&config.file.prefix)
                .filename_suffix("log")
                .build(dir)
                .map_err(install_failed)?;
            install(filter, config, false, appender)
        },
    }
}

fn install<W>(filter: EnvFilter, config: &LogConfig, ansi: bool, writer: W) -> TelemetryResult<()>
where
    W: for<'a> fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    let layer = fmt::layer()
        .with_writer(writer)
        .with_file(config.file_info)
        .with_line_number(config.file_info)
        .with_thread_names(config.thread_names);

    // `without_time` changes the layer's type, so each format finishes in
    // its own branch.
    macro_rules! finish {
        ($layer:expr) => {
            if config.timestamps {
                registry.with($layer).try_init()
            } else {
                registry.with($layer.without_time()).try_init()
            }
        };
    }

    match config.format {
        LogFormat::Json => finish!(layer.json()),
        LogFormat::Pretty => finish!(layer.pretty().with_ansi(ansi)),
        LogFormat::Compact => finish!(layer.compact().with_ansi(ansi)),
        LogFormat::Full => finish!(layer.with_ansi(ansi)),
    }
    .map_err(install_failed)
}

#[cfg(feature = "config")]
impl From<&a3bridge_config::LoggingSection> for LogConfig {
    fn from(section: &a3bridge_config::LoggingSection) -> Self {
        let format = match section.format.as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            "full" => LogFormat::Full,
            _ => LogFormat::Compact,
        };
        let rotation = match section.rotation.as_str() {
            "hourly" => FileRotation::Hourly,
            "never" => FileRotation::Never,
            _ => FileRotation::Daily,
        };
        let target = match section.target.as_str() {
            "stdout" => LogTarget::Stdout,
            "stderr" => LogTarget::Stderr,
            _ => LogTarget::File(PathBuf::from(&section.directory)),
        };

        Self {
            level: section.level.clone(),
            format,
            ansi: !matches!(target, LogTarget::File(_)),
            target,
            file: FileLogConfig {
                prefix: section.file_prefix.clone(),
                rotation,
            },
            timestamps: section.timestamps,
            file_info: false,
            thread_names: true,
            directives: section.directives.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_logs_compact_to_files() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.target, LogTarget::File(PathBuf::from("a3bridge_logs")));
        assert_eq!(config.file.prefix, "a3bridge");
        assert!(config.timestamps);
        assert!(!config.ansi);
    }

    #[test]
    fn builder_chain_overrides_defaults() {
        let config = LogConfig::new("debug")
            .with_format(LogFormat::Json)
            .with_file_info()
            .with_thread_names()
            .without_timestamps()
            .with_directive("a3bridge_runtime=trace");

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.file_info);
        assert!(config.thread_names);
        assert!(!config.timestamps);
        assert_eq!(config.directives, vec!["a3bridge_runtime=trace"]);
    }

    #[test]
    fn serializes_with_lowercase_names() {
        let config = LogConfig::new("warn").with_target(LogTarget::Stderr);

        let encoded = serde_json::to_string(&config).unwrap();
        assert!(encoded.contains("\"level\":\"warn\""));
        assert!(encoded.contains("\"format\":\"compact\""));
        assert!(encoded.contains("\"target\":\"stderr\""));

        let parsed: LogConfig = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn level_and_directives_parse() {
        let config = LogConfig::new("debug").with_directive("a3bridge_core=trace");
        assert!(config.env_filter().is_ok());
    }

    #[test]
    fn malformed_directive_is_a_config_error() {
        let config = LogConfig::new("debug").with_directive("[invalid=syntax");
        assert!(matches!(config.env_filter(), Err(TelemetryError::ConfigError(_))));
    }

    #[test]
    fn file_target_creates_directory_and_installs_once() {
        let scratch = tempfile::tempdir().unwrap();
        let logs = scratch.path().join("nested").join("logs");
        let config = LogConfig::new("info").with_file_logging(&logs, "test", FileRotation::Never);

        setup_logging(&config).unwrap();
        assert!(logs.is_dir());

        let again = setup_logging(&LogConfig::new("info").with_target(LogTarget::Stdout));
        assert!(matches!(again, Err(TelemetryError::InitError(_))));
    }

    #[cfg(feature = "config")]
    #[test]
    fn converts_logging_section() {
        let mut section = a3bridge_config::LoggingSection::default();
        section.level = "debug".into();
        section.format = "json".into();
        section.rotation = "hourly".into();
        section.directives = vec!["a3bridge_ffi=trace".into()];
        section.timestamps = false;

        let config = LogConfig::from(&section);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file.rotation, FileRotation::Hourly);
        assert_eq!(config.target, LogTarget::File(PathBuf::from("a3bridge_logs")));
        assert_eq!(config.directives, vec!["a3bridge_ffi=trace"]);
        assert!(!config.timestamps);

        section.target = "stdout".into();
        let config = LogConfig::from(&section);
        assert_eq!(config.target, LogTarget::Stdout);
        assert!(config.ansi);
    }
}
