//! Command registry.
//!
//! Maps command names to their [`Registration`]. Lookups take a shared
//! lock, so dispatch never waits on other dispatches, only on concurrent
//! registration.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::error::{RegistryError, RegistryResult};
use crate::registration::{Registrar, Registration, RegistrationBuilder};

/// Separator between a command name and inline data on the single-string
/// call path.
pub const COMMAND_SEPARATOR: char = '|';

/// Thread-safe registry of commands.
#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, Arc<Registration>>>,
}

impl CommandRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a registration that submits to this registry.
    pub fn registration(&self, command: impl Into<String>) -> RegistrationBuilder<&Self> {
        RegistrationBuilder::new(command).with_registrar(self)
    }

    /// Add a registration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateCommand`] if the command is already
    /// registered; the existing registration is kept.
    pub fn register(&self, registration: Registration) -> RegistryResult<()> {
        let mut commands = self.commands.write().unwrap_or_else(PoisonError::into_inner);
        if commands.contains_key(registration.command()) {
            return Err(RegistryError::DuplicateCommand {
                command: registration.command().to_owned(),
            });
        }

        info!(
            command = registration.command(),
            background = registration.run_in_background(),
            handlers = ?registration.handlers(),
            "registered command"
        );
        commands.insert(registration.command().to_owned(), Arc::new(registration));
        Ok(())
    }

    /// Exact-match lookup.
    #[must_use]
    pub fn lookup(&self, command: &str) -> Option<Arc<Registration>> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(command)
            .cloned()
    }

    /// Lookup by the text before the first `|`.
    ///
    /// Returns `None` when `text` has no separator.
    #[must_use]
    pub fn lookup_by_prefix(&self, text: &str) -> Option<Arc<Registration>> {
        let (prefix, _) = text.split_once(COMMAND_SEPARATOR)?;
        self.lookup(prefix)
    }

    /// Resolve single-string call text: exact match first, then prefix.
    #[must_use]
    pub fn resolve(&self, text: &str) -> Option<Arc<Registration>> {
        self.lookup(text).or_else(|| self.lookup_by_prefix(text))
    }

    /// Whether `command` is registered.
    #[must_use]
    pub fn contains(&self, command: &str) -> bool {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(command)
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no commands are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered command names, sorted.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

impl Registrar for &CommandRegistry {
    fn add(&self, registration: Registration) -> RegistryResult<()> {
        self.register(registration)
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(command: &str) -> Registration {
        Registration::builder(command)
            .handler(|_, data| Ok(data.to_owned()))
            .build()
            .unwrap()
    }

    #[test]
    fn register_and_lookup() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());

        registry.register(echo("test")).unwrap();
        assert!(registry.contains("test"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("test").unwrap().command(), "test");
        assert!(registry.lookup("other").is_none());
    }

    #[test]
    fn duplicate_is_rejected_and_original_kept() {
        let registry = CommandRegistry::new();
        registry
            .registration("test")
            .default_response("first")
            .handler(|_, _| Ok(String::new()))
            .register()
            .unwrap();

        let err = registry
            .registration("test")
            .default_response("second")
            .handler(|_, _| Ok(String::new()))
            .register()
            .unwrap_err();

        assert_eq!(
            err,
            RegistryError::DuplicateCommand {
                command: "test".into()
            }
        );
        assert_eq!(registry.lookup("test").unwrap().default_response(), "first");
    }

    #[test]
    fn prefix_lookup_splits_on_first_separator() {
        let registry = CommandRegistry::new();
        registry.register(echo("test")).unwrap();

        assert_eq!(registry.lookup_by_prefix("test|a|b").unwrap().command(), "test");
        assert!(registry.lookup_by_prefix("test").is_none());
        assert!(registry.lookup_by_prefix("nope|test").is_none());
    }

    #[test]
    fn resolve_prefers_exact_match() {
        let registry = CommandRegistry::new();
        registry.register(echo("a")).unwrap();
        registry.register(echo("a|b")).unwrap();

        assert_eq!(registry.resolve("a|b").unwrap().command(), "a|b");
        assert_eq!(registry.resolve("a|c").unwrap().command(), "a");
        assert!(registry.resolve("b").is_none());
    }

    #[test]
    fn commands_are_sorted() {
        let registry = CommandRegistry::new();
        registry.register(echo("zeta")).unwrap();
        registry.register(echo("alpha")).unwrap();
        assert_eq!(registry.commands(), ["alpha", "zeta"]);
    }
}
