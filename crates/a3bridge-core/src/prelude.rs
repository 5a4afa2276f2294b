//! Prelude module - commonly used types for convenient import.
//!
//! Use `use a3bridge_core::prelude::*;` when writing command handlers.

// Errors
pub use crate::{CallbackError, DispatchError, RegistryError, RegistryResult};

// Registration
pub use crate::{CommandRegistry, Registration, RegistrationBuilder};

// Handler inputs
pub use crate::{CallContext, Invocation};

// Host feedback
pub use crate::{CallbackSlot, ErrorRecord, ErrorSink, NativeCallback, Reply};
