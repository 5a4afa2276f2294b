//! `A3BRIDGE_*` environment overrides.
//!
//! Overrides are applied after the file layers and before validation, so a
//! bad value from the environment is reported like any other.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};
use crate::types::BridgeConfig;

/// Overrides `logging.level`.
pub const ENV_LOG_LEVEL: &str = "A3BRIDGE_LOG_LEVEL";
/// Overrides `dispatch.reply_deadline_ms`.
pub const ENV_REPLY_DEADLINE_MS: &str = "A3BRIDGE_REPLY_DEADLINE_MS";
/// Overrides `dispatch.max_background`.
pub const ENV_MAX_BACKGROUND: &str = "A3BRIDGE_MAX_BACKGROUND";

/// Read an override from the process environment. Unset, empty, and
/// non-unicode values count as absent.
#[must_use]
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Apply overrides found through `lookup`. Returns how many were applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] when a numeric override does not parse.
pub fn apply_env_overrides(
    config: &mut BridgeConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<usize> {
    let mut applied: usize = 0;

    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        config.logging.level = level.trim().to_ascii_lowercase();
        applied = applied.saturating_add(1);
    }
    if let Some(raw) = lookup(ENV_REPLY_DEADLINE_MS) {
        config.dispatch.reply_deadline_ms = Some(parse_var(ENV_REPLY_DEADLINE_MS, &raw)?);
        applied = applied.saturating_add(1);
    }
    if let Some(raw) = lookup(ENV_MAX_BACKGROUND) {
        config.dispatch.max_background = Some(parse_var(ENV_MAX_BACKGROUND, &raw)?);
        applied = applied.saturating_add(1);
    }

    Ok(applied)
}

fn parse_var<T>(var_name: &str, raw: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::EnvError {
        var_name: var_name.to_owned(),
        message: format!("'{raw}' is not a valid number: {e}"),
    })
}
