//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::BridgeConfig;

/// Longest accepted reply deadline. The host's main thread is blocked for
/// the whole wait.
pub const MAX_REPLY_DEADLINE_MS: u64 = 60_000;

/// Smallest useful reply capacity: one byte of text plus the terminator.
pub const MIN_REPLY_CAPACITY: usize = 2;

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns the first [`ConfigError::ValidationError`] found.
pub fn validate(config: &BridgeConfig) -> ConfigResult<()> {
    validate_extension(config)?;
    validate_dispatch(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message,
    }
}

fn validate_extension(config: &BridgeConfig) -> ConfigResult<()> {
    let name = &config.extension.name;
    if name.trim().is_empty() {
        return Err(invalid("extension.name", "must not be empty".to_owned()));
    }
    if name.contains('\0') || config.extension.version.contains('\0') {
        return Err(invalid(
            "extension",
            "name and version must not contain NUL bytes".to_owned(),
        ));
    }
    Ok(())
}

fn validate_dispatch(config: &BridgeConfig) -> ConfigResult<()> {
    let d = &config.dispatch;

    if let Some(ms) = d.reply_deadline_ms.filter(|ms| *ms > MAX_REPLY_DEADLINE_MS) {
        return Err(invalid(
            "dispatch.reply_deadline_ms",
            format!("{ms} exceeds the maximum of {MAX_REPLY_DEADLINE_MS}"),
        ));
    }

    if d.max_background == Some(0) {
        return Err(invalid(
            "dispatch.max_background",
            "must be at least 1; omit it for no limit".to_owned(),
        ));
    }

    if d.worker_threads == Some(0) {
        return Err(invalid(
            "dispatch.worker_threads",
            "must be at least 1; omit it for the default".to_owned(),
        ));
    }

    if d.default_reply_capacity < MIN_REPLY_CAPACITY {
        return Err(invalid(
            "dispatch.default_reply_capacity",
            format!(
                "{} is below the minimum of {MIN_REPLY_CAPACITY}",
                d.default_reply_capacity
            ),
        ));
    }

    Ok(())
}

fn one_of(field: &str, value: &str, valid: &[&str]) -> ConfigResult<()> {
    if valid.contains(&value) {
        return Ok(());
    }
    Err(invalid(
        field,
        format!("unsupported value '{value}'; expected one of: {}", valid.join(", ")),
    ))
}

fn validate_logging(config: &BridgeConfig) -> ConfigResult<()> {
    let l = &config.logging;
    one_of("logging.level", &l.level, &["trace", "debug", "info", "warn", "error"])?;
    one_of("logging.format", &l.format, &["pretty", "compact", "json", "full"])?;
    one_of("logging.target", &l.target, &["file", "stdout", "stderr"])?;
    one_of("logging.rotation", &l.rotation, &["never", "hourly", "daily"])?;

    if l.target == "file" && (l.directory.is_empty() || l.file_prefix.is_empty()) {
        return Err(invalid(
            "logging.directory",
            "file logging needs a directory and a file_prefix".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        validate(&BridgeConfig::default()).unwrap();
    }

    #[test]
    fn rejects_empty_name() {
        let mut config = BridgeConfig::default();
        config.extension.name = "  ".into();
        assert_eq!(field_of(validate(&config)), "extension.name");
    }

    #[test]
    fn rejects_out_of_range_dispatch_values() {
        let mut config = BridgeConfig::default();
        config.dispatch.reply_deadline_ms = Some(MAX_REPLY_DEADLINE_MS + 1);
        assert_eq!(field_of(validate(&config)), "dispatch.reply_deadline_ms");

        let mut config = BridgeConfig::default();
        config.dispatch.max_background = Some(0);
        assert_eq!(field_of(validate(&config)), "dispatch.max_background");

        let mut config = BridgeConfig::default();
        config.dispatch.default_reply_capacity = 1;
        assert_eq!(field_of(validate(&config)), "dispatch.default_reply_capacity");
    }

    #[test]
    fn rejects_unknown_logging_values() {
        let mut config = BridgeConfig::default();
        config.logging.level = "verbose".into();
        assert_eq!(field_of(validate(&config)), "logging.level");

        let mut config = BridgeConfig::default();
        config.logging.target = "syslog".into();
        assert_eq!(field_of(validate(&config)), "logging.target");
    }

    #[test]
    fn stdout_target_does_not_need_directory() {
        let mut config = BridgeConfig::default();
        config.logging.target = "stdout".into();
        config.logging.directory.clear();
        validate(&config).unwrap();
    }
}
