//! The facade application code loads and saves configuration through.
//!
//! A provider implements the five format-specific operations; the file
//! helpers (`load_file`, `save_file`, `load_file_or_default`, ...) are
//! provided methods built on top of them and on the provider's
//! [`FileStore`].
//!
//! # Two ways to supply defaults
//!
//! | Caller has                     | Method                         | Merge            |
//! |--------------------------------|--------------------------------|------------------|
//! | a default *instance*           | [`load_with_defaults`]         | entry defaults   |
//! | a default *source* (text)      | [`load_with_default_source`]   | tree merge       |
//!
//! [`load_with_defaults`]: ConfigurationProvider::load_with_defaults
//! [`load_with_default_source`]: ConfigurationProvider::load_with_default_source

use std::io::{Read, Write};
use std::path::Path;

use confmap_core::{Config, Value};
use tracing::debug;

use crate::error::ConfigError;
use crate::store::FileStore;

/// How the file helpers touch the file system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOptions {
    /// Create missing parent directories before saving.
    pub create_parent_dirs: bool,
    /// Leave a file alone when its contents already equal the rendered text,
    /// so its modification time only changes on real edits.
    pub skip_unchanged_writes: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            create_parent_dirs: true,
            skip_unchanged_writes: true,
        }
    }
}

/// Loads and saves config objects in one text format.
///
/// Every load builds a fresh instance and returns it only when the whole
/// document mapped successfully.
pub trait ConfigurationProvider: Send + Sync {
    /// Where the file helpers read and write.
    fn files(&self) -> &dyn FileStore;

    fn file_options(&self) -> FileOptions {
        FileOptions::default()
    }

    /// Parses `reader`, maps it onto a fresh `T`, then copies the entry
    /// defaults recorded in `defaults` into the result.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Stream`], [`ConfigError::Parse`], or [`ConfigError::Mapping`].
    fn load_with_defaults<T: Config>(&self, reader: &mut dyn Read, defaults: &T) -> Result<T, ConfigError>;

    /// Parses `reader` and `defaults`, fills keys missing from the first with
    /// the second, and maps the merged tree onto a fresh `T`.
    ///
    /// # Errors
    ///
    /// Same as [`load_with_defaults`](Self::load_with_defaults).
    fn load_with_default_source<T: Config>(
        &self,
        reader: &mut dyn Read,
        defaults: &mut dyn Read,
    ) -> Result<T, ConfigError>;

    /// Writes `config` as text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Stream`], [`ConfigError::Mapping`] for unusable
    /// schemas, or a serialization error.
    fn save<T: Config>(&self, config: &T, writer: &mut dyn Write) -> Result<(), ConfigError>;

    /// Structural form of `config`, for embedding in another format.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Mapping`] for unusable schemas.
    fn serialize<T: Config>(&self, config: &T) -> Result<Value, ConfigError>;

    /// Maps `value` onto an existing `config` in place.  Entries keep their
    /// identity and listeners.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Mapping`].  Fields mapped before the failing one keep
    /// their new values.
    fn deserialize<T: Config>(&self, config: &mut T, value: &Value) -> Result<(), ConfigError>;

    // ── Provided ──────────────────────────────────────────────────────────────

    /// [`load_with_defaults`](Self::load_with_defaults) against `T::default()`.
    ///
    /// # Errors
    ///
    /// Same as [`load_with_defaults`](Self::load_with_defaults).
    fn load<T: Config>(&self, reader: &mut dyn Read) -> Result<T, ConfigError> {
        self.load_with_defaults(reader, &T::default())
    }

    /// Loads `path` against `T::default()`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`load`](Self::load).
    fn load_file<T: Config>(&self, path: &Path) -> Result<T, ConfigError> {
        self.load_file_with_defaults(path, &T::default())
    }

    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`load_with_defaults`](Self::load_with_defaults).
    fn load_file_with_defaults<T: Config>(&self, path: &Path, defaults: &T) -> Result<T, ConfigError> {
        let bytes = self
            .files()
            .read(path)
            .map_err(|source| ConfigError::io(path, source))?;
        debug!(path = %path.display(), "loading config file");
        self.load_with_defaults(&mut bytes.as_slice(), defaults)
    }

    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`load_with_default_source`](Self::load_with_default_source).
    fn load_file_with_default_source<T: Config>(
        &self,
        path: &Path,
        defaults: &mut dyn Read,
    ) -> Result<T, ConfigError> {
        let bytes = self
            .files()
            .read(path)
            .map_err(|source| ConfigError::io(path, source))?;
        debug!(path = %path.display(), "loading config file with default source");
        self.load_with_default_source(&mut bytes.as_slice(), defaults)
    }

    /// Loads `path` if it exists.  Otherwise returns `T::default()`, first
    /// saving it to `path` when `save_default` is set.
    ///
    /// # Errors
    ///
    /// Same as [`load_file`](Self::load_file) and [`save_file`](Self::save_file).
    fn load_file_or_default<T: Config>(&self, path: &Path, save_default: bool) -> Result<T, ConfigError> {
        if self.files().exists(path) {
            return self.load_file(path);
        }

        debug!(path = %path.display(), save_default, "config file missing, using defaults");
        let config = T::default();
        if save_default {
            self.save_file(&config, path)?;
        }
        Ok(config)
    }

    /// Renders `config` and writes it to `path`.
    ///
    /// The text is rendered completely before the file is touched, so a
    /// mapping failure never leaves a truncated file behind.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] for file-system failures, otherwise as
    /// [`save`](Self::save).
    fn save_file<T: Config>(&self, config: &T, path: &Path) -> Result<(), ConfigError> {
        let mut rendered = Vec::new();
        self.save(config, &mut rendered)?;

        let options = self.file_options();
        let files = self.files();

        if options.create_parent_dirs {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                if !files.exists(dir) {
                    files
                        .create_dir_all(dir)
                        .map_err(|source| ConfigError::io(dir, source))?;
                }
            }
        }

        if options.skip_unchanged_writes && files.exists(path) {
            let existing = files
                .read(path)
                .map_err(|source| ConfigError::io(path, source))?;
            if existing == rendered {
                debug!(path = %path.display(), "config file unchanged, skipping write");
                return Ok(());
            }
        }

        files
            .write(path, &rendered)
            .map_err(|source| ConfigError::io(path, source))?;
        debug!(path = %path.display(), bytes = rendered.len(), "saved config file");
        Ok(())
    }
}
