//! a3bridge Telemetry - logging for extensions loaded by the Arma 3 host.
//!
//! # Example
//!
//! ```rust,no_run
//! use a3bridge_telemetry::{FileRotation, LogConfig, setup_logging};
//!
//! # fn main() -> Result<(), a3bridge_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_file_logging("a3bridge_logs", "my_extension", FileRotation::Daily)
//!     .with_directive("a3bridge_runtime=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("extension loaded");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_logging};
