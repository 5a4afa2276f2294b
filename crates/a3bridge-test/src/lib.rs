//! a3bridge Test - Shared test utilities for a3bridge extensions.
//!
//! This crate provides stand-ins for the host and fixtures that can be used
//! across a3bridge crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! a3bridge-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use a3bridge_test::RecordingCallback;
//!
//! let callback = RecordingCallback::new();
//! bridge.register_callback(callback.clone());
//! // ... dispatch a background command ...
//! assert_eq!(callback.pushes()[0].function, "done");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
