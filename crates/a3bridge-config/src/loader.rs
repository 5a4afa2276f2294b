//! Config file discovery and layered loading.
//!
//! Layers, lowest precedence first:
//! 1. Embedded `defaults.toml`
//! 2. `a3bridge.toml` in the host working directory (or an explicit file)
//! 3. `A3BRIDGE_*` environment overrides
//!
//! The merged result is validated before it is returned.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_overrides, process_env};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::deep_merge;
use crate::types::BridgeConfig;
use crate::validate;

/// Baseline layer compiled into the extension.
const EMBEDDED_DEFAULTS: &str = include_str!("defaults.toml");

/// File name looked up in the host working directory.
pub const CONFIG_FILE_NAME: &str = "a3bridge.toml";

/// Files larger than this are rejected before parsing.
const CONFIG_SIZE_LIMIT: u64 = 1_048_576;

/// Load configuration from `dir/a3bridge.toml`, or from the host working
/// directory when `dir` is `None`. A missing file is not an error.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is unreadable or malformed, an
/// environment override does not parse, or validation fails.
pub fn load(dir: Option<&Path>) -> ConfigResult<BridgeConfig> {
    load_with_env(dir, process_env)
}

/// [`load`] with a custom environment lookup.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env(
    dir: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<BridgeConfig> {
    let file = dir
        .map(Path::to_path_buf)
        .or_else(host_directory)
        .map(|dir| dir.join(CONFIG_FILE_NAME));
    resolve(file.as_deref(), false, lookup)
}

/// Load configuration from an explicit file layered over the defaults.
///
/// # Errors
///
/// Unlike [`load`], a missing file is a [`ConfigError::ReadError`].
pub fn load_file(path: &Path) -> ConfigResult<BridgeConfig> {
    resolve(Some(path), true, process_env)
}

/// The embedded defaults, validated.
///
/// # Errors
///
/// Only fails if the embedded defaults themselves are broken.
pub fn defaults() -> ConfigResult<BridgeConfig> {
    let config: BridgeConfig = defaults_tree()?
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Directory the host process runs from.
#[must_use]
pub fn host_directory() -> Option<PathBuf> {
    match std::env::current_dir() {
        Ok(dir) => Some(dir),
        Err(e) => {
            debug!(error = %e, "could not determine host working directory");
            None
        },
    }
}

fn defaults_tree() -> ConfigResult<toml::Value> {
    toml::from_str(EMBEDDED_DEFAULTS).map_err(|e| ConfigError::ParseError {
        path: "<embedded defaults>".to_owned(),
        source: e,
    })
}

fn resolve(
    file: Option<&Path>,
    required: bool,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<BridgeConfig> {
    let mut merged = defaults_tree()?;

    if let Some(path) = file {
        match read_overlay(path)? {
            Some(overlay) => {
                deep_merge(&mut merged, &overlay);
                info!(path = %path.display(), "loaded extension config");
            },
            None if required => {
                return Err(ConfigError::ReadError {
                    path: path.display().to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            },
            None => {},
        }
    }

    let mut config: BridgeConfig =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: file.map_or_else(
                    || "<merged config>".to_owned(),
                    |p| p.display().to_string(),
                ),
                source: e,
            })?;

    let overrides = apply_env_overrides(&mut config, lookup)?;
    if overrides > 0 {
        debug!(count = overrides, "applied environment overrides");
    }

    validate::validate(&config)?;
    Ok(config)
}

/// Parse the overlay at `path`; `Ok(None)` when there is no such file.
fn read_overlay(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if u64::try_from(text.len()).unwrap_or(u64::MAX) > CONFIG_SIZE_LIMIT {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {CONFIG_SIZE_LIMIT} byte limit",
                text.len()
            ),
        });
    }

    let value: toml::Value = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(Some(value))
}
