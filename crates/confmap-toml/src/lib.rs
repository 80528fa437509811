//! # confmap-toml
//!
//! TOML front end for `confmap-core`.
//!
//! # Architecture overview (for beginners)
//!
//! ```text
//!   text ──parse──► Table ──mapping::fill──► T
//!                     ▲                      │
//!        merge_defaults (default source)     │ copy_defaults (default instance)
//!                                            ▼
//!   text ◄──────────── TomlWriter ◄──────── T
//! ```
//!
//! - **`parse`** – TOML text to the core value tree, via the `toml` crate.
//! - **`writer`** – [`TomlWriter`]: walks a config object in schema order and
//!   writes commented, sectioned TOML.
//! - **`provider`** – [`ConfigurationProvider`]: the load/save facade, plus
//!   file helpers built on a [`FileStore`].
//! - **`configuration`** – [`TomlConfiguration`], the TOML provider.
//! - **`registry`** – process-wide provider lookup, populated once at startup.

pub mod configuration;
pub mod error;
pub mod parse;
pub mod provider;
pub mod registry;
pub mod store;
pub mod writer;

pub use configuration::TomlConfiguration;
pub use error::ConfigError;
pub use parse::parse;
pub use provider::{ConfigurationProvider, FileOptions};
pub use store::{FileStore, LocalFileStore};
pub use writer::{render_value, table_to_string, to_string, TomlWriter};
