//! The [`Bridge`]: one extension's registry, context, callback, and
//! executor.
//!
//! An extension builds a single `Bridge` at load time and every host entry
//! point forwards to it. Nothing here is global; tests build as many as they
//! like.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use a3bridge_core::{
    CallContext, CallbackResult, CallbackSlot, CommandRegistry, ContextHolder, ErrorRecord,
    ErrorSink, NativeCallback, Registration, RegistrationBuilder, RegistryResult, Reply,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::RuntimeResult;
use crate::executor::BackgroundExecutor;

/// Default extension name.
pub const DEFAULT_EXTENSION_NAME: &str = "a3bridge";

/// Version reported before one is configured.
pub const DEFAULT_VERSION: &str = "No version set";

/// Reply capacity used for calls made from Rust.
pub const DEFAULT_REPLY_CAPACITY: usize = 10_240;

/// Dispatcher tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Longest the host thread waits for a foreground handler.
    pub reply_deadline: Option<Duration>,
    /// Most background handlers running at once.
    pub max_background: Option<usize>,
    /// Worker threads for an owned runtime.
    pub worker_threads: Option<usize>,
    /// Capacity for [`Bridge::execute`] and [`Bridge::execute_with_args`].
    pub default_reply_capacity: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            reply_deadline: None,
            max_background: None,
            worker_threads: None,
            default_reply_capacity: DEFAULT_REPLY_CAPACITY,
        }
    }
}

/// Builder for a [`Bridge`].
#[derive(Debug, Default)]
#[must_use]
pub struct BridgeBuilder {
    extension_name: Option<String>,
    version: Option<String>,
    settings: DispatchSettings,
    handle: Option<Handle>,
}

impl BridgeBuilder {
    /// Start with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name passed as the first argument of host callbacks.
    pub fn extension_name(mut self, name: impl Into<String>) -> Self {
        self.extension_name = Some(name.into());
        self
    }

    /// Text returned for the version query.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Replace all dispatch settings.
    pub fn settings(mut self, settings: DispatchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Wait at most `deadline` for foreground handlers.
    pub fn reply_deadline(mut self, deadline: Duration) -> Self {
        self.settings.reply_deadline = Some(deadline);
        self
    }

    /// Bound concurrently running background handlers.
    pub fn max_background(mut self, max: usize) -> Self {
        self.settings.max_background = Some(max);
        self
    }

    /// Spawn handlers on an existing runtime instead of starting one.
    pub fn runtime_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Build the bridge.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidSettings`](crate::RuntimeError) if
    /// `worker_threads` or `max_background` is zero, or
    /// [`RuntimeError::ExecutorStartup`](crate::RuntimeError) if no handle
    /// was given and a runtime cannot be started.
    pub fn build(self) -> RuntimeResult<Bridge> {
        let executor = match self.handle {
            Some(handle) => BackgroundExecutor::with_handle(handle, self.settings.max_background)?,
            None => BackgroundExecutor::new(
                self.settings.worker_threads,
                self.settings.max_background,
            )?,
        };
        let extension_name = self
            .extension_name
            .unwrap_or_else(|| DEFAULT_EXTENSION_NAME.to_owned());

        info!(
            extension = %extension_name,
            reply_deadline = ?self.settings.reply_deadline,
            max_background = ?self.settings.max_background,
            "bridge initialised"
        );

        Ok(Bridge {
            extension_name,
            version: RwLock::new(self.version.unwrap_or_else(|| DEFAULT_VERSION.to_owned())),
            registry: CommandRegistry::new(),
            context: ContextHolder::new(),
            errors: ErrorSink::new(),
            callbacks: CallbackSlot::new(),
            executor,
            settings: self.settings,
            shutdown: CancellationToken::new(),
        })
    }
}

/// Owns everything one extension needs to serve host calls.
#[derive(Debug)]
pub struct Bridge {
    pub(crate) extension_name: String,
    version: RwLock<String>,
    pub(crate) registry: CommandRegistry,
    pub(crate) context: ContextHolder,
    pub(crate) errors: ErrorSink,
    pub(crate) callbacks: CallbackSlot,
    pub(crate) executor: BackgroundExecutor,
    pub(crate) settings: DispatchSettings,
    pub(crate) shutdown: CancellationToken,
}

impl Bridge {
    /// Start building a bridge.
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::new()
    }

    /// The extension name.
    #[must_use]
    pub fn extension_name(&self) -> &str {
        &self.extension_name
    }

    /// Dispatcher settings in effect.
    #[must_use]
    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// The background executor.
    #[must_use]
    pub fn executor(&self) -> &BackgroundExecutor {
        &self.executor
    }

    // -- Version ------------------------------------------------------------

    /// The configured version text.
    #[must_use]
    pub fn version(&self) -> String {
        self.version
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the version text.
    pub fn set_version(&self, version: impl Into<String>) {
        *self.version.write().unwrap_or_else(PoisonError::into_inner) = version.into();
    }

    /// The version as a reply for a buffer of `capacity` bytes.
    #[must_use]
    pub fn version_reply(&self, capacity: usize) -> Reply {
        Reply::bounded(self.version(), capacity)
    }

    // -- Call context -------------------------------------------------------

    /// Replace the call context.
    pub fn set_context(&self, context: CallContext) {
        self.context.set(context);
    }

    /// Replace the call context from the host's argument vector.
    pub fn set_context_args<S: AsRef<str>>(&self, args: &[S]) {
        let context = CallContext::from_args(args);
        debug!(caller_id = %context.caller_id, "call context updated");
        self.context.set(context);
    }

    /// Snapshot of the current call context.
    #[must_use]
    pub fn context(&self) -> CallContext {
        self.context.snapshot()
    }

    // -- Registration -------------------------------------------------------

    /// The command registry.
    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Start a registration that submits to this bridge.
    pub fn new_registration(
        &self,
        command: impl Into<String>,
    ) -> RegistrationBuilder<&CommandRegistry> {
        self.registry.registration(command)
    }

    /// Add a finished registration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCommand`](a3bridge_core::RegistryError)
    /// if the command is taken.
    pub fn register(&self, registration: Registration) -> RegistryResult<()> {
        self.registry.register(registration)
    }

    // -- Error sink ---------------------------------------------------------

    /// The error sink.
    #[must_use]
    pub fn error_sink(&self) -> &ErrorSink {
        &self.errors
    }

    /// Send dispatch failures to `sender`, replacing any previous channel.
    pub fn register_error_channel(&self, sender: mpsc::UnboundedSender<ErrorRecord>) {
        self.errors.register(sender);
    }

    /// Create and register an error channel, returning its receiver.
    #[must_use]
    pub fn error_channel(&self) -> mpsc::UnboundedReceiver<ErrorRecord> {
        self.errors.subscribe()
    }

    // -- Host callback ------------------------------------------------------

    /// The host callback slot.
    #[must_use]
    pub fn callbacks(&self) -> &CallbackSlot {
        &self.callbacks
    }

    /// Install the host callback. The last one installed wins.
    pub fn register_callback(&self, callback: impl NativeCallback + 'static) {
        self.callbacks.install(callback);
        debug!("host callback registered");
    }

    /// Push `values` to the host under this extension's name.
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

    // -- Lifecycle ----------------------------------------------------------

    /// Cancel every outstanding invocation token. Queued background
    /// handlers that have not started are skipped.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!(extension = %self.extension_name, "bridge shutting down");
            self.shutdown.cancel();
        }
    }

    /// Whether [`shutdown`](Self::shutdown) has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for Bridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}
