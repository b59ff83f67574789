//! Typed, registered view over process environment: knows which names it is
//! allowed to answer for, but always reads live process environment rather
//! than a snapshot, since placeholder resolution and command substitution
//! need up-to-the-call values.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::ConfigError;

/// Reads environment variables with missing-key diagnostics and a record of
/// which names the caller has declared it cares about.
///
/// Every key returned by a successful [`EnvAccessor::read`] is added to
/// `registered`; `has` additionally considers any key already set in
/// process env, so registration is a convenience for diagnostics and
/// `keys()`, not a gate on lookups.
#[derive(Default, Clone)]
pub struct EnvAccessor {
    registered: BTreeSet<String>,
}

impl EnvAccessor {
    /// Creates an accessor with no keys registered yet.
    pub fn new() -> Self {
        EnvAccessor::default()
    }

    /// Registers `names` as known keys. Idempotent.
    pub fn register<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.registered.insert(name.into());
        }
    }

    /// Reads `name`, falling back to `default` when unset, else raising
    /// [`ConfigError::MissingEnv`].
    pub fn read(&mut self, name: &str, default: Option<&str>) -> Result<String, ConfigError> {
        self.registered.insert(name.to_string());
        match std::env::var(name) {
            Ok(value) => Ok(value),
            Err(_) => default.map(str::to_string).ok_or_else(|| ConfigError::MissingEnv {
                name: name.to_string(),
            }),
        }
    }

    /// Reads `name`, returning `None` instead of raising when unset.
    pub fn optional(&mut self, name: &str) -> Option<String> {
        self.registered.insert(name.to_string());
        std::env::var(name).ok()
    }

    /// Returns `true` if `name` is registered or currently set in process
    /// environment.
    pub fn has(&self, name: &str) -> bool {
        self.registered.contains(name) || std::env::var(name).is_ok()
    }

    /// Returns the union of registered names and the current process
    /// environment's keys.
    pub fn keys(&self) -> BTreeSet<String> {
        let mut keys = self.registered.clone();
        keys.extend(std::env::vars().map(|(k, _)| k));
        keys
    }

    /// The names explicitly registered via [`Self::register`] or a prior
    /// successful read — distinct from [`Self::keys`], which also includes
    /// every ambient process-env key.
    pub fn registered(&self) -> &BTreeSet<String> {
        &self.registered
    }
}

impl fmt::Debug for EnvAccessor {
    /// Lists registered key names only; values are never echoed; many of
    /// them carry credentials.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvAccessor")
            .field("registered", &self.registered)
            .finish()
    }
}
