//! What a handler sees about the call it is serving.

use tokio_util::sync::CancellationToken;

use crate::callback::CallbackSlot;
use crate::context::CallContext;
use crate::error::CallbackResult;

/// Per-call state passed to every handler.
///
/// The context is a snapshot taken when the call was dispatched, so a
/// background handler keeps seeing its own caller even if the host sets a
/// new context for the next call.
#[derive(Debug, Clone)]
pub struct Invocation {
    command: String,
    extension_name: String,
    context: CallContext,
    cancellation: CancellationToken,
    callbacks: CallbackSlot,
}

impl Invocation {
    /// Create an invocation for `command` with an empty context and no
    /// callback.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            extension_name: String::new(),
            context: CallContext::default(),
            cancellation: CancellationToken::new(),
            callbacks: CallbackSlot::new(),
        }
    }

    /// Set the extension name used as the callback `name` argument.
    #[must_use]
    pub fn with_extension_name(mut self, name: impl Into<String>) -> Self {
        self.extension_name = name.into();
        self
    }

    /// Set the context snapshot.
    #[must_use]
    pub fn with_context(mut self, context: CallContext) -> Self {
        self.context = context;
        self
    }

    /// Set the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Share the given callback slot.
    #[must_use]
    pub fn with_callbacks(mut self, callbacks: CallbackSlot) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// The registered command being served.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Name of the extension, as configured.
    #[must_use]
    pub fn extension_name(&self) -> &str {
        &self.extension_name
    }

    /// Caller metadata captured at dispatch time.
    #[must_use]
    pub fn context(&self) -> &CallContext {
        &self.context
    }

    /// Token cancelled when the reply deadline passes or the bridge shuts
    /// down. Long-running handlers should check it.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Shorthand for `self.cancellation().is_cancelled()`.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// The host callback slot.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackSlot {
        &self.callbacks
    }

    /// Push `values` to the host under `function_name`, using the
    /// extension name as the callback `name`.
    ///
    /// # Errors
    ///
    /// See [`CallbackSlot::push`].
    pub fn push_result<S: AsRef<str>>(
        &self,
        function_name: &str,
        values: &[S],
    ) -> CallbackResult<()> {
        self.callbacks.push(&self.extension_name, function_name, values)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::CallbackError;

    #[test]
    fn push_result_uses_extension_name() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let slot = CallbackSlot::new();
        let recorder = Arc::clone(&seen);
        slot.install(move |name: &str, function: &str, data: &str| {
            recorder
                .lock()
                .unwrap()
                .push(format!("{name}|{function}|{data}"));
            0
        });

        let invocation = Invocation::new("testAsync")
            .with_extension_name("myExt")
            .with_callbacks(slot);
        invocation.push_result("done", &["1"]).unwrap();

        assert_eq!(seen.lock().unwrap().as_slice(), [r#"myExt|done|["1"]"#]);
    }

    #[test]
    fn push_result_without_callback_fails() {
        let invocation = Invocation::new("x");
        assert_eq!(invocation.push_result("f", &["v"]), Err(CallbackError::NotRegistered));
    }

    #[test]
    fn cancellation_is_observable() {
        let invocation = Invocation::new("x");
        assert!(!invocation.is_cancelled());
        invocation.cancellation().cancel();
        assert!(invocation.is_cancelled());
    }
}
