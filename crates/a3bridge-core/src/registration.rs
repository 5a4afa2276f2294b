//! Command registrations and their builder.

use std::fmt;
use std::sync::Arc;

use crate::error::{RegistryError, RegistryResult};
use crate::invocation::Invocation;

/// Handler for the single-string call path.
///
/// Receives the full text the host sent, including anything after the
/// first `|`.
pub type RawHandler = Arc<dyn Fn(&Invocation, &str) -> anyhow::Result<String> + Send + Sync>;

/// Handler for the command plus argument vector call path.
///
/// The last argument is always the receipt timestamp appended by the
/// dispatcher.
pub type ArgsHandler =
    Arc<dyn Fn(&Invocation, &[String]) -> anyhow::Result<String> + Send + Sync>;

/// The handlers attached to a registration. At least one is always present.
#[derive(Clone)]
pub enum Handlers {
    /// Only the single-string path is handled.
    Raw(RawHandler),
    /// Only the argument vector path is handled.
    Args(ArgsHandler),
    /// Both paths are handled.
    Both {
        /// Single-string handler.
        raw: RawHandler,
        /// Argument vector handler.
        args: ArgsHandler,
    },
}

impl Handlers {
    fn from_parts(raw: Option<RawHandler>, args: Option<ArgsHandler>) -> Option<Self> {
        match (raw, args) {
            (Some(raw), Some(args)) => Some(Self::Both { raw, args }),
            (Some(raw), None) => Some(Self::Raw(raw)),
            (None, Some(args)) => Some(Self::Args(args)),
            (None, None) => None,
        }
    }

    /// The single-string handler, if set.
    #[must_use]
    pub fn raw(&self) -> Option<&RawHandler> {
        match self {
            Self::Raw(raw) | Self::Both { raw, .. } => Some(raw),
            Self::Args(_) => None,
        }
    }

    /// The argument vector handler, if set.
    #[must_use]
    pub fn args(&self) -> Option<&ArgsHandler> {
        match self {
            Self::Args(args) | Self::Both { args, .. } => Some(args),
            Self::Raw(_) => None,
        }
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Raw(_) => "Raw",
            Self::Args(_) => "Args",
            Self::Both { .. } => "Both",
        };
        f.write_str(name)
    }
}

/// An immutable command registration.
#[derive(Debug, Clone)]
pub struct Registration {
    command: String,
    default_response: String,
    run_in_background: bool,
    handlers: Handlers,
}

impl Registration {
    /// Start building a registration for `command`.
    #[must_use]
    pub fn builder(command: impl Into<String>) -> RegistrationBuilder {
        RegistrationBuilder::new(command)
    }

    /// The command name.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Reply sent immediately when the handler runs in the background.
    #[must_use]
    pub fn default_response(&self) -> &str {
        &self.default_response
    }

    /// Whether the handler runs after the reply instead of producing it.
    #[must_use]
    pub fn run_in_background(&self) -> bool {
        self.run_in_background
    }

    /// The attached handlers.
    #[must_use]
    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }
}

/// Destination that accepts finished registrations.
pub trait Registrar {
    /// Add `registration`.
    ///
    /// # Errors
    ///
    /// Implementations reject duplicates with
    /// [`RegistryError::DuplicateCommand`].
    fn add(&self, registration: Registration) -> RegistryResult<()>;
}

/// Chainable builder for a [`Registration`].
///
/// `R` is the registrar that [`register`](Self::register) submits to; a
/// builder created with [`RegistrationBuilder::new`] has none and can only
/// [`build`](Self::build).
#[must_use]
pub struct RegistrationBuilder<R = ()> {
    registrar: R,
    command: String,
    default_response: Option<String>,
    run_in_background: bool,
    raw: Option<RawHandler>,
    args: Option<ArgsHandler>,
}

impl RegistrationBuilder {
    /// Start a registration for `command`.
    ///
    /// The default response is `["Command <command> called"]` and the
    /// handler runs in the foreground.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            registrar: (),
            command: command.into(),
            default_response: None,
            run_in_background: false,
            raw: None,
            args: None,
        }
    }
}

impl<R> RegistrationBuilder<R> {
    /// Attach a registrar so the builder can [`register`](Self::register).
    pub fn with_registrar<T: Registrar>(self, registrar: T) -> RegistrationBuilder<T> {
        RegistrationBuilder {
            registrar,
            command: self.command,
            default_response: self.default_response,
            run_in_background: self.run_in_background,
            raw: self.raw,
            args: self.args,
        }
    }

    /// Set the reply sent when the handler runs in the background.
    pub fn default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = Some(response.into());
        self
    }

    /// Run the handler after the reply instead of producing it.
    pub fn run_in_background(mut self, background: bool) -> Self {
        self.run_in_background = background;
        self
    }

    /// Set the single-string handler.
    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Invocation, &str) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        self.raw = Some(Arc::new(handler));
        self
    }

    /// Set the argument vector handler.
    pub fn args_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Invocation, &[String]) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        self.args = Some(Arc::new(handler));
        self
    }

    /// Finish the registration without submitting it.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::EmptyCommand`] if the command name is empty.
    /// - [`RegistryError::MissingHandler`] if no handler was set.
    pub fn build(self) -> RegistryResult<Registration> {
        self.into_parts().1
    }

    fn into_parts(self) -> (R, RegistryResult<Registration>) {
        let Self {
            registrar,
            command,
            default_response,
            run_in_background,
            raw,
            args,
        } = self;

        if command.is_empty() {
            return (registrar, Err(RegistryError::EmptyCommand));
        }
        let Some(handlers) = Handlers::from_parts(raw, args) else {
            return (registrar, Err(RegistryError::MissingHandler { command }));
        };
        let default_response =
            default_response.unwrap_or_else(|| format!("[\"Command {command} called\"]"));

        (
            registrar,
            Ok(Registration {
                command,
                default_response,
                run_in_background,
                handlers,
            }),
        )
    }
}

impl<R: Registrar> RegistrationBuilder<R> {
    /// Finish the registration and submit it to the attached registrar.
    ///
    /// # Errors
    ///
    /// Any error from [`build`](Self::build), or
    /// [`RegistryError::DuplicateCommand`] from the registrar.
    pub fn register(self) -> RegistryResult<()> {
        let (registrar, registration) = self.into_parts();
        registrar.add(registration?)
    }
}

impl<R> fmt::Debug for RegistrationBuilder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationBuilder")
            .field("command", &self.command)
            .field("default_response", &self.default_response)
            .field("run_in_background", &self.run_in_background)
            .field("raw", &self.raw.is_some())
            .field("args", &self.args.is_some())
            .finish_non_exhaustive()
    }
}
