//! Template extension.
//!
//! Copy this crate to start a new extension. It loads `a3bridge.toml` from
//! the host working directory, logs to a rolling file, and registers the
//! example commands in [`commands`]. From SQF:
//!
//! ```sqf
//! "a3bridge" callExtension "test|one|two";
//! "a3bridge" callExtension ["testAsync", ["payload"]];
//! "a3bridge" callExtension ["returnJSONFromHashMap", [str createHashMapFromArray [["a", 1]]]];
//! addMissionEventHandler ["ExtensionCallback", {
//!     params ["_name", "_function", "_data"];
//! }];
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod commands;

use a3bridge_config::BridgeConfig;
use a3bridge_runtime::Bridge;
use a3bridge_telemetry::{LogConfig, setup_logging};
use tracing::{error, warn};

/// Load configuration, start logging, and build the bridge.
///
/// # Errors
///
/// Fails if the configuration is invalid, the background runtime cannot
/// start, or a command cannot be registered.
pub fn init() -> anyhow::Result<Bridge> {
    let config = BridgeConfig::load(None)?;
    if let Err(e) = setup_logging(&LogConfig::from(&config.logging)) {
        // Only reachable if a subscriber is already installed.
        warn!(error = %e, "logging not initialised");
    }
    build_bridge(&config)
}

/// Build the bridge for `config` with the example commands registered.
///
/// # Errors
///
/// See [`init`].
pub fn build_bridge(config: &BridgeConfig) -> anyhow::Result<Bridge> {
    let bridge = Bridge::from_config(config)?;
    commands::register(&bridge)?;

    let mut errors = bridge.error_channel();
    bridge.executor().handle().spawn(async move {
        while let Some(record) = errors.recv().await {
            error!(command = %record.command, message = %record.message, "command failed");
        }
    });

    Ok(bridge)
}

a3bridge_ffi::export_extension!(init);
