//! Process-wide provider lookup.
//!
//! The registry is populated exactly once, either explicitly through
//! [`install`] at startup or implicitly with just the built-in
//! [`TomlConfiguration`] on the first [`get_provider`] call.  It is
//! read-only afterwards, so lookups need no locking.

use std::any::{type_name, Any};
use std::sync::OnceLock;

use tracing::debug;

use crate::configuration::TomlConfiguration;
use crate::error::ConfigError;

type Provider = Box<dyn Any + Send + Sync>;

static PROVIDERS: OnceLock<Vec<Provider>> = OnceLock::new();

fn builtin() -> Vec<Provider> {
    vec![Box::new(TomlConfiguration::new())]
}

/// Registers `extra` providers after the built-in ones.
///
/// # Errors
///
/// [`ConfigError::RegistryInitialized`] if the registry was already
/// populated by an earlier `install` or `get_provider` call.
pub fn install(extra: Vec<Provider>) -> Result<(), ConfigError> {
    let mut providers = builtin();
    let count = extra.len();
    providers.extend(extra);
    PROVIDERS
        .set(providers)
        .map_err(|_| ConfigError::RegistryInitialized)?;
    debug!(extra = count, "provider registry installed");
    Ok(())
}

/// Returns the first registered provider of type `P`.
///
/// # Errors
///
/// [`ConfigError::ProviderNotFound`] naming `P` when none is registered.
pub fn get_provider<P: Any>() -> Result<&'static P, ConfigError> {
    PROVIDERS
        .get_or_init(builtin)
        .iter()
        .find_map(|provider| provider.downcast_ref::<P>())
        .ok_or(ConfigError::ProviderNotFound(type_name::<P>()))
}
