//! The process-wide extension state behind the exported entry points.

use std::panic::{self, AssertUnwindSafe};

use a3bridge_runtime::{Bridge, Reply};
use a3bridge_sqf::SqfValue;
use tracing::{debug, error};

/// A [`Bridge`], or the reason it could not be built.
///
/// The host loads the library once and has no way to see a load failure,
/// so a failed initialisation is kept and every call answers with it.
#[derive(Debug)]
pub struct Extension {
    bridge: Result<Bridge, String>,
}

impl Extension {
    /// Run `init` and keep its result. Errors and panics are captured.
    pub fn new<F>(init: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<Bridge>,
    {
        let bridge = match panic::catch_unwind(AssertUnwindSafe(init)) {
            Ok(Ok(bridge)) => {
                debug!(extension = bridge.extension_name(), "extension loaded");
                Ok(bridge)
            },
            Ok(Err(e)) => {
                let message = format!("{e:#}");
                error!(error = %message, "extension failed to initialise");
                Err(message)
            },
            Err(_) => {
                error!("extension initialisation panicked");
                Err("initialisation panicked".to_owned())
            },
        };
        Self { bridge }
    }

    /// Wrap an already built bridge.
    #[must_use]
    pub fn from_bridge(bridge: Bridge) -> Self {
        Self { bridge: Ok(bridge) }
    }

    /// The bridge, if initialisation succeeded.
    #[must_use]
    pub fn bridge(&self) -> Option<&Bridge> {
        self.bridge.as_ref().ok()
    }

    /// Why initialisation failed, if it did.
    #[must_use]
    pub fn init_error(&self) -> Option<&str> {
        self.bridge.as_ref().err().map(String::as_str)
    }

    /// Answer the version query into `buffer`.
    pub fn version_into(&self, buffer: &mut [u8]) {
        let reply = match &self.bridge {
            Ok(bridge) => bridge.version_reply(buffer.len()),
            Err(message) => Reply::bounded(not_loaded(message), buffer.len()),
        };
        reply.write_to(buffer);
    }

    /// Dispatch a single-string call, writing the reply into `buffer`.
    ///
    /// Returns `false` if the call failed synchronously.
    pub fn call_into(&self, text: &str, buffer: &mut [u8]) -> bool {
        match &self.bridge {
            Ok(bridge) => {
                let dispatch = bridge.call(text, buffer.len());
                dispatch.write_reply(buffer);
                // Dropping the dispatch lets any background handler start.
                !dispatch.is_failure()
            },
            Err(message) => {
                failure_reply(text, message, buffer);
                false
            },
        }
    }

    /// Dispatch a call with arguments, writing the reply into `buffer`.
    ///
    /// Returns `false` if the call failed synchronously.
    pub fn call_with_args_into(&self, command: &str, args: Vec<String>, buffer: &mut [u8]) -> bool {
        match &self.bridge {
            Ok(bridge) => {
                let dispatch = bridge.call_with_args(command, args, buffer.len());
                dispatch.write_reply(buffer);
                !dispatch.is_failure()
            },
            Err(message) => {
                failure_reply(command, message, buffer);
                false
            },
        }
    }

    /// Replace the call context from the host's arguments.
    pub fn set_context(&self, args: &[String]) {
        if let Ok(bridge) = &self.bridge {
            bridge.set_context_args(args);
        }
    }

    /// Install or clear the host callback.
    pub fn set_callback(&self, callback: Option<crate::HostCallback>) {
        let Ok(bridge) = &self.bridge else {
            return;
        };
        match callback {
            Some(callback) => bridge.register_callback(callback),
            None => bridge.callbacks().clear(),
        }
    }
}

fn not_loaded(message: &str) -> String {
    format!("extension not loaded: {message}")
}

fn failure_reply(command: &str, message: &str, buffer: &mut [u8]) {
    let shape = SqfValue::Array(vec![SqfValue::from(command), SqfValue::from(not_loaded(message))]);
    Reply::bounded(a3bridge_sqf::encode(&shape), buffer.len()).write_to(buffer);
}
