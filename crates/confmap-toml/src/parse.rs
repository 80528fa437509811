//! TOML text → value tree.

use confmap_core::{Table, Value};

use crate::error::ConfigError;

/// Parses a TOML document into a [`Table`], keeping key order.
///
/// Datetimes have no counterpart in the value tree and are returned as
/// strings in their RFC 3339 form.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if `text` is not valid TOML.
pub fn parse(text: &str) -> Result<Table, ConfigError> {
    let document: toml::Table = text.parse()?;
    Ok(from_toml_table(document))
}

fn from_toml_table(table: toml::Table) -> Table {
    table
        .into_iter()
        .map(|(key, value)| (key, from_toml(value)))
        .collect()
}

fn from_toml(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(n) => Value::Integer(n),
        toml::Value::Float(n) => Value::Float(n),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => Value::Table(from_toml_table(table)),
    }
}

/// Value tree → TOML value.  `path` names the value in error messages.
///
/// Nulls inside tables are dropped; nulls inside arrays cannot be written.
pub(crate) fn to_toml(value: &Value, path: &str) -> Result<toml::Value, ConfigError> {
    Ok(match value {
        Value::Null => {
            return Err(ConfigError::Unrepresentable {
                path: path.to_owned(),
            })
        }
        Value::Bool(b) => toml::Value::Boolean(*b),
        Value::Integer(n) => toml::Value::Integer(*n),
        Value::Float(n) => toml::Value::Float(*n),
        Value::String(s) => toml::Value::String(s.clone()),
        Value::Array(items) => toml::Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| to_toml(item, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        Value::Table(table) => {
            let mut out = toml::Table::new();
            for (key, item) in table.iter().filter(|(_, item)| !item.is_null()) {
                out.insert(key.clone(), to_toml(item, &format!("{path}.{key}"))?);
            }
            toml::Value::Table(out)
        }
    })
}
