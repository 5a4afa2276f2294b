//! Metadata describing who issued the current host call.

use std::sync::{PoisonError, RwLock};

use a3bridge_sqf::SqfValue;

/// Caller metadata supplied by the host before each call.
///
/// Every field is an opaque string; the host sends them in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Steam id of the calling player, `"0"` for the server itself.
    pub caller_id: String,
    /// Script file the call originated from.
    pub file_source: String,
    /// Mission name.
    pub session_name: String,
    /// Server name.
    pub server_name: String,
}

impl CallContext {
    /// Build a context from explicit fields.
    #[must_use]
    pub fn new(
        caller_id: impl Into<String>,
        file_source: impl Into<String>,
        session_name: impl Into<String>,
        server_name: impl Into<String>,
    ) -> Self {
        Self {
            caller_id: caller_id.into(),
            file_source: file_source.into(),
            session_name: session_name.into(),
            server_name: server_name.into(),
        }
    }

    /// Build a context from the host's argument vector.
    ///
    /// Missing trailing fields become empty strings; extra fields are ignored.
    #[must_use]
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        let field = |index: usize| {
            args.get(index)
                .map(|value| value.as_ref().to_owned())
                .unwrap_or_default()
        };
        Self {
            caller_id: field(0),
            file_source: field(1),
            session_name: field(2),
            server_name: field(3),
        }
    }

    /// The context as an SQF array in host order.
    #[must_use]
    pub fn to_sqf(&self) -> SqfValue {
        SqfValue::Array(vec![
            SqfValue::from(self.caller_id.as_str()),
            SqfValue::from(self.file_source.as_str()),
            SqfValue::from(self.session_name.as_str()),
            SqfValue::from(self.server_name.as_str()),
        ])
    }
}

/// Holds the most recent [`CallContext`].
///
/// Writes replace the whole context; readers always see a consistent
/// snapshot, never a mix of two updates.
#[derive(Debug, Default)]
pub struct ContextHolder {
    current: RwLock<CallContext>,
}

impl ContextHolder {
    /// Create a holder with an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current context.
    pub fn set(&self, context: CallContext) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = context;
    }

    /// Copy of the current context.
    #[must_use]
    pub fn snapshot(&self) -> CallContext {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
