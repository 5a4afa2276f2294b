//! a3bridge Runtime - dispatching host calls to registered handlers.
//!
//! A [`Bridge`] owns one extension's command registry, call context, host
//! callback, error sink, and background executor. The FFI layer forwards
//! every host entry point to it:
//!
//! ```no_run
//! use a3bridge_runtime::Bridge;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bridge = Bridge::builder().extension_name("myExt").build()?;
//! bridge
//!     .new_registration("hello")
//!     .handler(|_, _| Ok(r#"["hi"]"#.to_owned()))
//!     .register()?;
//!
//! let dispatch = bridge.call("hello", 1024);
//! assert_eq!(dispatch.reply().as_str(), r#"["hi"]"#);
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

pub mod bridge;
pub mod config_bridge;
pub mod dispatcher;
pub mod error;
pub mod executor;

pub use bridge::{
    Bridge, BridgeBuilder, DEFAULT_EXTENSION_NAME, DEFAULT_REPLY_CAPACITY, DEFAULT_VERSION,
    DispatchSettings,
};
pub use dispatcher::{Dispatch, TIMESTAMP_COMMAND};
pub use error::{RuntimeError, RuntimeResult};
pub use executor::{BackgroundExecutor, BackgroundTask, Job, ReplyGate, run_guarded};

// Re-exported so extensions only need this crate.
pub use a3bridge_config::BridgeConfig;
pub use a3bridge_core::{
    CallContext, DispatchError, ErrorRecord, Invocation, NativeCallback, Registration, Reply,
};
