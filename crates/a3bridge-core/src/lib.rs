//! a3bridge Core - shared types for routing Arma 3 extension calls.
//!
//! This crate provides:
//! - [`CallContext`] and [`ContextHolder`] for caller metadata
//! - [`Registration`], its builder, and the [`CommandRegistry`]
//! - [`Invocation`], the per-call state handed to handlers
//! - [`CallbackSlot`] for pushing results back to the host
//! - [`ErrorSink`] for out-of-band failure reporting
//! - [`Reply`], bounded to the host's output buffer
//! - Error types for all of the above

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod callback;
pub mod context;
pub mod error;
pub mod invocation;
pub mod registration;
pub mod registry;
pub mod reply;
pub mod sink;
pub mod time;

pub use callback::{CallbackSlot, NativeCallback, escape_callback_value, format_callback_payload};
pub use context::{CallContext, ContextHolder};
pub use error::{
    CallShape, CallbackError, CallbackResult, DispatchError, DispatchResult, RegistryError,
    RegistryResult,
};
pub use invocation::Invocation;
pub use registration::{
    ArgsHandler, Handlers, RawHandler, Registrar, Registration, RegistrationBuilder,
};
pub use registry::{COMMAND_SEPARATOR, CommandRegistry};
pub use reply::Reply;
pub use sink::{ErrorRecord, ErrorSink};
pub use time::{timestamp_nanos, timestamp_string};
