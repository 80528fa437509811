//! Error type for loading and saving TOML configuration.

use std::path::PathBuf;

use confmap_core::MappingError;
use thiserror::Error;

/// Everything that can stop a load or save.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to a caller-supplied stream failed.
    #[error("config stream error: {0}")]
    Stream(#[source] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value could not be rendered as TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The value tree holds something TOML cannot express, such as a null
    /// inside an array.
    #[error("{path} cannot be written as TOML")]
    Unrepresentable { path: String },

    /// The content parsed but does not fit the config type.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// [`crate::registry::get_provider`] found no provider of the requested type.
    #[error("provider not found: {0}")]
    ProviderNotFound(&'static str),

    /// [`crate::registry::install`] was called after the registry was populated.
    #[error("the provider registry is already initialized")]
    RegistryInitialized,
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}
