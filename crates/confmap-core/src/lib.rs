//! # confmap-core
//!
//! Schema-driven mapping between strongly-typed configuration objects and a
//! generic value tree.
//!
//! This crate has no file-system or text-format dependencies: it knows how to
//! turn a config object into a [`Value`] tree (and back), how to merge
//! defaults, and how mutable config entries behave.  The `confmap-toml` crate
//! wires it to TOML text and files.
//!
//! # Architecture overview (for beginners)
//!
//! Application code ships a *default* configuration alongside a user-editable
//! file.  Loading must fill in whatever the user left out, reject values that
//! do not fit the declared field types, and writing must produce a readable,
//! commented file without losing the user's edits.
//!
//! - **`value`** – The [`Value`] tree: null, bool, integer, float, string,
//!   array, and ordered table.  Also the [`ToValue`] / [`FromValue`]
//!   conversion traits that narrow 64-bit tree values into field types.
//!
//! - **`schema`** – Per-type metadata.  Rust has no runtime reflection, so each
//!   config type registers its fields once (see [`Config`] and
//!   [`SchemaBuilder`]) with their paths, comments, validators, and
//!   processors.
//!
//! - **`entry`** – [`ConfigEntry`]: a mutable value with a default, optional
//!   bounds, and change listeners.
//!
//! - **`mapping`** – The deserializer (tree → object), the structural
//!   serializer (object → tree), and the two default-merging strategies.
//!
//! # Example
//!
//! ```rust
//! use confmap_core::{static_schema, Config, Schema, Value};
//!
//! #[derive(Debug, Default)]
//! struct ServerConfig {
//!     port: i32,
//!     name: String,
//! }
//!
//! impl Config for ServerConfig {
//!     fn schema() -> &'static Schema<Self> {
//!         static_schema!(ServerConfig, {
//!             Schema::<Self>::builder()
//!                 .field("port", |c| &c.port, |c| &mut c.port)
//!                 .comment("TCP port to listen on")
//!                 .field("name", |c| &c.name, |c| &mut c.name)
//!                 .build()
//!         })
//!     }
//! }
//!
//! let mut table = confmap_core::Table::new();
//! table.insert("port".into(), Value::Integer(8080));
//!
//! let mut config = ServerConfig::default();
//! confmap_core::mapping::fill(&mut config, &table).unwrap();
//! assert_eq!(config.port, 8080);
//! ```

pub mod entry;
pub mod error;
pub mod mapping;
pub mod schema;
pub mod value;

pub use entry::{
    BooleanConfigEntry, ConfigEntry, DoubleConfigEntry, EntryValue, EnumConfigEntry,
    IntConfigEntry, ListenerId, LongConfigEntry, Step, StringConfigEntry,
};
pub use error::{ConversionError, MappingError};
pub use mapping::{ConfigObject, FieldView, Node};
pub use schema::{Config, FieldDescriptor, Processor, Schema, SchemaBuilder, Validator};
pub use value::convert::{ConfigEnum, FromValue, Shape, ToValue};
pub use value::{Table, Value, ValueKind};

/// Builds a schema once and returns a `'static` reference to it.
///
/// Wraps the `OnceLock` that every [`Config::schema`] implementation needs.
/// The first argument is the concrete config type (a `static` item cannot
/// name `Self`); the second is the expression that builds the schema.
///
/// ```rust
/// use confmap_core::{static_schema, Config, Schema};
///
/// #[derive(Default)]
/// struct Limits {
///     max: i64,
/// }
///
/// impl Config for Limits {
///     fn schema() -> &'static Schema<Self> {
///         static_schema!(Limits, {
///             Schema::<Self>::builder()
///                 .field("max", |c| &c.max, |c| &mut c.max)
///                 .build()
///         })
///     }
/// }
///
/// assert_eq!(Limits::schema().fields().count(), 1);
/// ```
#[macro_export]
macro_rules! static_schema {
    ($ty:ty, $build:expr) => {{
        static SCHEMA: ::std::sync::OnceLock<$crate::Schema<$ty>> = ::std::sync::OnceLock::new();
        SCHEMA.get_or_init(|| $build)
    }};
}
