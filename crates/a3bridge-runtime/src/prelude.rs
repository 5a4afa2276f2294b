//! Prelude module - commonly used types for convenient import.
//!
//! Use `use a3bridge_runtime::prelude::*;` in extension crates.

pub use a3bridge_core::prelude::*;

pub use crate::{Bridge, BridgeBuilder, BridgeConfig, Dispatch, DispatchSettings, RuntimeError};
