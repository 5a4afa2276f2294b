//! The host callback used to push results after the synchronous reply.
//!
//! The host installs one callback (`RVExtensionRegisterCallback`). Pushes
//! from background handlers go through [`CallbackSlot::push`], which
//! escapes each value and joins them into one array literal.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::{CallbackError, CallbackResult};

/// A callback that delivers `(name, function, data)` to the host.
///
/// The return value is the host's status code; negative values mean the
/// host rejected the push (its callback queue is full).
pub trait NativeCallback: Send + Sync {
    /// Deliver one push to the host.
    fn invoke(&self, name: &str, function: &str, data: &str) -> i32;
}

impl<F> NativeCallback for F
where
    F: Fn(&str, &str, &str) -> i32 + Send + Sync,
{
    fn invoke(&self, name: &str, function: &str, data: &str) -> i32 {
        self(name, function, data)
    }
}

/// Shared slot holding the active host callback. Cloning shares the slot.
#[derive(Clone, Default)]
pub struct CallbackSlot {
    current: Arc<RwLock<Option<Arc<dyn NativeCallback>>>>,
}

impl CallbackSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback`, replacing any previous one.
    pub fn install(&self, callback: impl NativeCallback + 'static) {
        self.install_arc(Arc::new(callback));
    }

    /// Install an already shared callback, replacing any previous one.
    pub fn install_arc(&self, callback: Arc<dyn NativeCallback>) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.replace(callback).is_some() {
            debug!("replaced previously registered host callback");
        }
    }

    /// Remove the active callback.
    pub fn clear(&self) {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Whether a callback is installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Push `values` to the host as `["v1","v2",...]`.
    ///
    /// The slot lock is released before the host is called, so pushes from
    /// several threads do not serialize on it.
    ///
    /// # Errors
    ///
    /// - [`CallbackError::NotRegistered`] if no callback is installed.
    /// - [`CallbackError::Rejected`] if the host returns a negative status.
    pub fn push<S: AsRef<str>>(
        &self,
        extension_name: &str,
        function_name: &str,
        values: &[S],
    ) -> CallbackResult<()> {
        let callback = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CallbackError::NotRegistered)?;

        let payload = format_callback_payload(values);
        let status = callback.invoke(extension_name, function_name, &payload);
        if status < 0 {
            return Err(CallbackError::Rejected { status });
        }
        debug!(
            extension = extension_name,
            function = function_name,
            bytes = payload.len(),
            "pushed result to host"
        );
        Ok(())
    }
}

impl fmt::Debug for CallbackSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSlot")
            .field("installed", &self.is_installed())
            .finish()
    }
}

/// Escape one value for a callback payload.
///
/// Quotes of both kinds are doubled and square brackets become round ones
/// so the value cannot break the surrounding array literal.
#[must_use]
pub fn escape_callback_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\"\""),
            '\'' => out.push_str("''"),
            '[' => out.push('('),
            ']' => out.push(')'),
            other => out.push(other),
        }
    }
    out
}

/// Join escaped values into the payload literal `["a","b"]`.
#[must_use]
pub fn format_callback_payload<S: AsRef<str>>(values: &[S]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|value| format!("\"{}\"", escape_callback_value(value.as_ref())))
        .collect();
    format!("[{}]", quoted.join(","))
}
