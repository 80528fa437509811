//! Table → config object.
//!
//! For each participating field, in schema order:
//!
//! 1. Keys missing from the table are skipped; the field keeps its value.
//! 2. [`ConfigEntry`](crate::ConfigEntry) fields load in place and skip
//!    steps 3 and 4.
//! 3. The validator, if any, must accept the raw value.
//! 4. The processor chain rewrites the raw value.
//! 5. The result is converted to the field type.  Sections that already
//!    exist are filled in place, recursively; a `None` optional section or
//!    a new section map key starts from `Default`.  Maps merge key by key,
//!    so keys the table lacks stay.
//!
//! The first failure aborts the fill.  The target may already hold some new
//! values at that point, so callers that need all-or-nothing behavior fill a
//! fresh instance and discard it on error, as [`from_table`] does.

use std::borrow::Cow;

use tracing::trace;

use crate::error::MappingError;
use crate::schema::Config;
use crate::value::Table;

/// Fills `target` from `table`.
///
/// # Errors
///
/// - [`MappingError::Schema`] if `T` or a nested type has an unusable schema.
/// - [`MappingError::Validation`] if a validator rejects a raw value.
/// - [`MappingError::Conversion`] if a value does not fit its field type.
pub fn fill<T: Config>(target: &mut T, table: &Table) -> Result<(), MappingError> {
    fill_at(target, table, "")
}

/// Builds a new `T` from its defaults and `table`.
///
/// # Errors
///
/// Same as [`fill`].
pub fn from_table<T: Config>(table: &Table) -> Result<T, MappingError> {
    let mut target = T::default();
    fill(&mut target, table)?;
    Ok(target)
}

/// [`fill`] for a table nested at dotted path `parent` (empty at the root).
pub(crate) fn fill_at<T: Config>(
    target: &mut T,
    table: &Table,
    parent: &str,
) -> Result<(), MappingError> {
    let schema = T::schema();
    schema.validate()?;

    for field in schema.fields() {
        let path = if parent.is_empty() {
            Cow::Borrowed(field.path())
        } else {
            Cow::Owned(format!("{parent}.{}", field.path()))
        };

        let Some(raw) = table.get(field.path()) else {
            trace!(config = schema.type_name(), path = %path, "key absent, keeping current value");
            continue;
        };

        if field.is_entry() {
            field.access.load(target, raw, &path)?;
            continue;
        }

        if let Some(validator) = field.validator() {
            if !validator.validate(raw) {
                return Err(MappingError::Validation {
                    path: path.into_owned(),
                    value: raw.clone(),
                    allowed: validator.allowed_values().to_vec(),
                });
            }
        }

        if field.processors().is_empty() {
            field.access.load(target, raw, &path)?;
        } else {
            let processed = field.process(raw.clone());
            field.access.load(target, &processed, &path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use indexmap::IndexMap;

    use super::*;
    use crate::entry::{EnumConfigEntry, IntConfigEntry};
    use crate::error::ConversionError;
    use crate::schema::Schema;
    use crate::value::Value;
    use crate::{config_enum, static_schema};

    config_enum! {
        enum Mode {
            Development => "DEVELOPMENT",
            Production => "PRODUCTION",
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Backend {
        host: String,
        weight: i32,
    }

    impl Config for Backend {
        fn schema() -> &'static Schema<Self> {
            static_schema!(Backend, {
                Schema::<Self>::builder()
                    .field("host", |c| &c.host, |c| &mut c.host)
                    .field("weight", |c| &c.weight, |c| &mut c.weight)
                    .build()
            })
        }
    }

    #[derive(Debug)]
    struct Server {
        port: i32,
        name: String,
        tag: String,
        volume: IntConfigEntry,
        mode: EnumConfigEntry<Mode>,
        primary: Backend,
        fallback: Option<Backend>,
        pool: IndexMap<String, Backend>,
    }

    impl Default for Server {
        fn default() -> Self {
            Self {
                port: 0,
                name: String::new(),
                tag: String::new(),
                volume: IntConfigEntry::new(50),
                mode: EnumConfigEntry::new(Mode::Development),
                primary: Backend::default(),
                fallback: None,
                pool: IndexMap::new(),
            }
        }
    }

    impl Config for Server {
        fn schema() -> &'static Schema<Self> {
            static_schema!(Server, {
                Schema::<Self>::builder()
                    .field("port", |c| &c.port, |c| &mut c.port)
                    .field("name", |c| &c.name, |c| &mut c.name)
                    .validator(
                        |v| matches!(v.as_str(), Some("alpha" | "beta")),
                        &["alpha", "beta"],
                    )
                    .field("tag", |c| &c.tag, |c| &mut c.tag)
                    .processor(|v| match v {
                        Value::String(s) => Value::String(s.to_uppercase()),
                        other => other,
                    })
                    .entry("volume", |c| &c.volume, |c| &mut c.volume)
                    .validator(|_| false, &["never consulted for entries"])
                    .entry("mode", |c| &c.mode, |c| &mut c.mode)
                    .section("primary", |c| &c.primary, |c| &mut c.primary)
                    .optional_section("fallback", |c| &c.fallback, |c| &mut c.fallback)
                    .section_map("pool", |c| &c.pool, |c| &mut c.pool)
                    .build()
            })
        }
    }

    fn backend_table(host: &str, weight: i64) -> Table {
        let mut table = Table::new();
        table.insert("host".into(), Value::from(host));
        table.insert("weight".into(), Value::Integer(weight));
        table
    }

    #[test]
    fn test_fill_sets_present_keys_and_keeps_absent_ones() {
        // Arrange
        let mut server = Server {
            name: "beta".into(),
            ..Server::default()
        };
        let mut table = Table::new();
        table.insert("port".into(), Value::Integer(8080));

        // Act
        fill(&mut server, &table).expect("fill");

        // Assert
        assert_eq!(server.port, 8080);
        assert_eq!(server.name, "beta");
    }

    #[test]
    fn test_validator_failure_reports_path_value_and_hint() {
        let mut table = Table::new();
        table.insert("name".into(), Value::from("gamma"));

        let err = from_table::<Server>(&table).unwrap_err();

        assert_eq!(
            err,
            MappingError::Validation {
                path: "name".into(),
                value: Value::from("gamma"),
                allowed: vec!["alpha".into(), "beta".into()],
            }
        );
    }

    #[test]
    fn test_processor_rewrites_raw_value() {
        let mut table = Table::new();
        table.insert("tag".into(), Value::from("edge"));

        let server: Server = from_table(&table).expect("fill");

        assert_eq!(server.tag, "EDGE");
    }

    #[test]
    fn test_entry_loads_in_place_and_skips_validator() {
        // Arrange
        let mut server = Server::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        server
            .volume
            .add_change_listener(move |v| sink.lock().unwrap().push(*v));
        let mut table = Table::new();
        table.insert("volume".into(), Value::Integer(7));

        // Act
        fill(&mut server, &table).expect("fill");

        // Assert
        assert_eq!(*server.volume.value(), 7);
        assert_eq!(*seen.lock().unwrap(), vec![7]);
        assert_eq!(server.volume.listener_count(), 1);
    }

    #[test]
    fn test_unknown_enum_constant_in_entry_faults() {
        let mut table = Table::new();
        table.insert("mode".into(), Value::from("INVALID_VALUE"));

        let err = from_table::<Server>(&table).unwrap_err();

        assert_eq!(err.path(), Some("mode"));
        assert!(matches!(
            err,
            MappingError::Conversion {
                source: ConversionError::UnknownVariant { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_sections_fill_in_place() {
        // Arrange
        let mut server = Server::default();
        server.primary.weight = 99;
        let mut primary = Table::new();
        primary.insert("host".into(), Value::from("db1"));
        let mut table = Table::new();
        table.insert("primary".into(), Value::Table(primary));

        // Act
        fill(&mut server, &table).expect("fill");

        // Assert
        assert_eq!(
            server.primary,
            Backend {
                host: "db1".into(),
                weight: 99
            }
        );
    }

    #[test]
    fn test_present_optional_section_fills_in_place_and_null_clears_it() {
        // Arrange
        let mut server = Server {
            fallback: Some(Backend {
                host: "spare".into(),
                weight: 5,
            }),
            ..Server::default()
        };
        let mut fallback = Table::new();
        fallback.insert("weight".into(), Value::Integer(6));
        let mut table = Table::new();
        table.insert("fallback".into(), Value::Table(fallback));

        // Act
        fill(&mut server, &table).expect("fill");
        let filled = server.fallback.clone();
        table.insert("fallback".into(), Value::Null);
        fill(&mut server, &table).expect("fill null");

        // Assert
        assert_eq!(
            filled,
            Some(Backend {
                host: "spare".into(),
                weight: 6
            })
        );
        assert!(server.fallback.is_none());
    }

    #[test]
    fn test_section_map_merges_keys_and_fills_existing_in_place() {
        // Arrange
        let mut server = Server::default();
        server.pool.insert(
            "east".into(),
            Backend {
                host: "e0".into(),
                weight: 1,
            },
        );
        server.pool.insert(
            "north".into(),
            Backend {
                host: "n0".into(),
                weight: 4,
            },
        );
        let mut east = Table::new();
        east.insert("weight".into(), Value::Integer(2));
        let mut pool = Table::new();
        pool.insert("east".into(), Value::Table(east));
        pool.insert("west".into(), Value::Table(backend_table("w1", 3)));
        let mut table = Table::new();
        table.insert("pool".into(), Value::Table(pool));

        // Act
        fill(&mut server, &table).expect("fill");

        // Assert
        let keys: Vec<&str> = server.pool.keys().map(String::as_str).collect();
        assert_eq!(keys, ["east", "north", "west"]);
        assert_eq!(server.pool["east"].host, "e0");
        assert_eq!(server.pool["east"].weight, 2);
        assert_eq!(server.pool["north"].weight, 4);
        assert_eq!(server.pool["west"].host, "w1");
    }

    #[test]
    fn test_optional_section_and_section_map() {
        // Arrange
        let mut pool = Table::new();
        pool.insert("east".into(), Value::Table(backend_table("e1", 2)));
        pool.insert("west".into(), Value::Table(backend_table("w1", 3)));
        let mut table = Table::new();
        table.insert("fallback".into(), Value::Table(backend_table("spare", 1)));
        table.insert("pool".into(), Value::Table(pool));

        // Act
        let server: Server = from_table(&table).expect("fill");

        // Assert
        assert_eq!(server.fallback.map(|b| b.host), Some("spare".to_string()));
        let keys: Vec<&str> = server.pool.keys().map(String::as_str).collect();
        assert_eq!(keys, ["east", "west"]);
        assert_eq!(server.pool["west"].weight, 3);
    }

    #[test]
    fn test_nested_conversion_error_carries_full_path() {
        let mut bad = backend_table("w1", 3);
        bad.insert("weight".into(), Value::from("heavy"));
        let mut pool = Table::new();
        pool.insert("west".into(), Value::Table(bad));
        let mut table = Table::new();
        table.insert("pool".into(), Value::Table(pool));

        let err = from_table::<Server>(&table).unwrap_err();

        assert_eq!(err.path(), Some("pool.west.weight"));
    }

    #[test]
    fn test_section_given_scalar_is_conversion_error() {
        let mut table = Table::new();
        table.insert("primary".into(), Value::Integer(1));

        let err = from_table::<Server>(&table).unwrap_err();

        assert_eq!(err.to_string(), "primary: expected table, found integer");
    }
}
