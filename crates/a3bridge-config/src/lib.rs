//! a3bridge Config - layered TOML configuration for extensions.
//!
//! Configuration is resolved from embedded defaults, an optional
//! `a3bridge.toml` in the host working directory, and `A3BRIDGE_*`
//! environment variables, then validated. This crate has no dependencies
//! on other a3bridge crates; the runtime converts it into its own types.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

/// Environment variable overrides.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Merging of TOML layers.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::CONFIG_FILE_NAME;
pub use types::{BridgeConfig, DispatchSection, ExtensionSection, LoggingSection};

impl BridgeConfig {
    /// Load configuration from `dir` (or the host working directory).
    ///
    /// See [`loader::load`] for the layering.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a layer is malformed or the result fails
    /// validation.
    pub fn load(dir: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(dir)
    }

    /// Load configuration from an explicit file over the defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is missing, malformed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
