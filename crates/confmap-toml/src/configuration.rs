//! [`TomlConfiguration`]: the TOML [`ConfigurationProvider`].

use std::fmt;
use std::io::{Read, Write};

use confmap_core::error::ConversionError;
use confmap_core::mapping;
use confmap_core::{Config, MappingError, Value};
use tracing::debug;

use crate::error::ConfigError;
use crate::parse::parse;
use crate::provider::{ConfigurationProvider, FileOptions};
use crate::store::{FileStore, LocalFileStore};
use crate::writer;

/// Loads and saves config objects as TOML.
///
/// # Examples
///
/// ```rust
/// use confmap_core::{static_schema, Config, Schema};
/// use confmap_toml::{ConfigurationProvider, TomlConfiguration};
///
/// #[derive(Debug, Default)]
/// struct Server {
///     port: i32,
/// }
///
/// impl Config for Server {
///     fn schema() -> &'static Schema<Self> {
///         static_schema!(Server, {
///             Schema::<Self>::builder()
///                 .field("port", |c| &c.port, |c| &mut c.port)
///                 .build()
///         })
///     }
/// }
///
/// let toml = TomlConfiguration::new();
/// let server: Server = toml.load(&mut "port = 8080".as_bytes()).unwrap();
/// assert_eq!(server.port, 8080);
///
/// let mut out = Vec::new();
/// toml.save(&server, &mut out).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "port = 8080\n");
/// ```
pub struct TomlConfiguration {
    store: Box<dyn FileStore>,
    options: FileOptions,
}

impl TomlConfiguration {
    /// Local file system, default [`FileOptions`].
    pub fn new() -> Self {
        Self::with_options(FileOptions::default())
    }

    pub fn with_options(options: FileOptions) -> Self {
        Self {
            store: Box::new(LocalFileStore),
            options,
        }
    }

    /// Replaces the file store, e.g. with an in-memory one in tests.
    pub fn with_store(mut self, store: impl FileStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }
}

impl Default for TomlConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TomlConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TomlConfiguration")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn read_text(reader: &mut dyn Read) -> Result<String, ConfigError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(ConfigError::Stream)?;
    Ok(text)
}

impl ConfigurationProvider for TomlConfiguration {
    fn files(&self) -> &dyn FileStore {
        self.store.as_ref()
    }

    fn file_options(&self) -> FileOptions {
        self.options
    }

    fn load_with_defaults<T: Config>(&self, reader: &mut dyn Read, defaults: &T) -> Result<T, ConfigError> {
        let table = parse(&read_text(reader)?)?;
        let mut config: T = mapping::from_table(&table)?;
        mapping::copy_defaults(&mut config, defaults);
        debug!(config = T::schema().type_name(), keys = table.len(), "loaded config");
        Ok(config)
    }

    fn load_with_default_source<T: Config>(
        &self,
        reader: &mut dyn Read,
        defaults: &mut dyn Read,
    ) -> Result<T, ConfigError> {
        let mut table = parse(&read_text(reader)?)?;
        let default_table = parse(&read_text(defaults)?)?;
        mapping::merge_defaults(&mut table, &default_table);
        let config = mapping::from_table(&table)?;
        debug!(
            config = T::schema().type_name(),
            keys = table.len(),
            "loaded config merged with default source"
        );
        Ok(config)
    }

    fn save<T: Config>(&self, config: &T, out: &mut dyn Write) -> Result<(), ConfigError> {
        let text = writer::to_string(config)?;
        out.write_all(text.as_bytes()).map_err(ConfigError::Stream)?;
        out.flush().map_err(ConfigError::Stream)?;
        debug!(config = T::schema().type_name(), bytes = text.len(), "saved config");
        Ok(())
    }

    fn serialize<T: Config>(&self, config: &T) -> Result<Value, ConfigError> {
        Ok(Value::Table(mapping::to_table(config)?))
    }

    fn deserialize<T: Config>(&self, config: &mut T, value: &Value) -> Result<(), ConfigError> {
        let schema = T::schema();
        let table = value.as_table().ok_or_else(|| MappingError::Conversion {
            path: schema.type_name().to_owned(),
            source: ConversionError::mismatch("table", value),
        })?;
        mapping::fill(config, table)?;
        debug!(config = schema.type_name(), "deserialized config in place");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::Path;

    use confmap_core::{static_schema, Schema};

    use super::*;
    use crate::store::MockFileStore;

    #[derive(Debug, PartialEq)]
    struct Server {
        port: i32,
    }

    impl Default for Server {
        fn default() -> Self {
            Self { port: 8080 }
        }
    }

    impl Config for Server {
        fn schema() -> &'static Schema<Self> {
            static_schema!(Server, {
                Schema::<Self>::builder()
                    .field("port", |c| &c.port, |c| &mut c.port)
                    .build()
            })
        }
    }

    const RENDERED: &[u8] = b"port = 8080\n";

    #[test]
    fn test_save_file_creates_missing_parent_and_writes() {
        // Arrange
        let mut store = MockFileStore::new();
        store.expect_exists().returning(|_| false);
        store
            .expect_create_dir_all()
            .withf(|dir| dir == Path::new("conf"))
            .times(1)
            .returning(|_| Ok(()));
        store
            .expect_write()
            .withf(|path, contents| path == Path::new("conf/app.toml") && contents == RENDERED)
            .times(1)
            .returning(|_, _| Ok(()));
        let toml = TomlConfiguration::new().with_store(store);

        // Act
        let result = toml.save_file(&Server::default(), Path::new("conf/app.toml"));

        // Assert
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_file_skips_unchanged_content() {
        // Arrange
        let mut store = MockFileStore::new();
        store.expect_exists().returning(|_| true);
        store.expect_read().returning(|_| Ok(RENDERED.to_vec()));
        store.expect_write().times(0);
        let toml = TomlConfiguration::new().with_store(store);

        // Act
        let result = toml.save_file(&Server::default(), Path::new("conf/app.toml"));

        // Assert
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_file_rewrites_when_skipping_disabled() {
        let mut store = MockFileStore::new();
        store.expect_exists().returning(|_| true);
        store.expect_read().times(0);
        store.expect_write().times(1).returning(|_, _| Ok(()));
        let options = FileOptions {
            create_parent_dirs: false,
            skip_unchanged_writes: false,
        };
        let toml = TomlConfiguration::with_options(options).with_store(store);

        let result = toml.save_file(&Server::default(), Path::new("app.toml"));

        assert!(result.is_ok());
    }

    #[test]
    fn test_load_file_or_default_saves_default_when_missing() {
        // Arrange
        let mut store = MockFileStore::new();
        store.expect_exists().returning(|_| false);
        store
            .expect_write()
            .withf(|_, contents| contents == RENDERED)
            .times(1)
            .returning(|_, _| Ok(()));
        let toml = TomlConfiguration::new().with_store(store);

        // Act
        let config: Server = toml
            .load_file_or_default(Path::new("app.toml"), true)
            .expect("load");

        // Assert
        assert_eq!(config, Server::default());
    }

    #[test]
    fn test_load_file_or_default_reads_existing_file() {
        let mut store = MockFileStore::new();
        store.expect_exists().returning(|_| true);
        store
            .expect_read()
            .returning(|_| Ok(b"port = 9000\n".to_vec()));
        store.expect_write().times(0);
        let toml = TomlConfiguration::new().with_store(store);

        let config: Server = toml
            .load_file_or_default(Path::new("app.toml"), true)
            .expect("load");

        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_load_file_read_failure_is_io_error_with_path() {
        // Arrange
        let mut store = MockFileStore::new();
        store
            .expect_read()
            .returning(|_| Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")));
        let toml = TomlConfiguration::new().with_store(store);

        // Act
        let err = toml.load_file::<Server>(Path::new("locked.toml")).unwrap_err();

        // Assert
        match err {
            ConfigError::Io { path, source } => {
                assert_eq!(path, Path::new("locked.toml"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_deserialize_rejects_non_table() {
        let toml = TomlConfiguration::new();
        let mut server = Server::default();

        let err = toml.deserialize(&mut server, &Value::Integer(1)).unwrap_err();

        assert_eq!(err.to_string(), "Server: expected table, found integer");
    }
}
