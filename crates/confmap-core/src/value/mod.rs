//! The generic value tree that sits between typed config objects and text.
//!
//! Text engines produce a [`Value::Table`] when they parse a file and consume
//! one when they write it.  The tree itself is deliberately small: every
//! integer is an `i64` and every float an `f64`, exactly as TOML stores them.
//! Narrower field types (`i8`, `f32`, `char`, ...) are produced by explicit
//! conversions in [`convert`], never by the tree.

pub mod convert;
mod serde_impl;

use std::fmt;

use indexmap::IndexMap;

/// Ordered, string-keyed mapping.  Iteration follows insertion order, which is
/// also the order keys appear in the source text.
pub type Table = IndexMap<String, Value>;

/// One node of the value tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.  Never produced by parsing TOML; used for `None` fields.
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Table(Table),
}

/// The tag of a [`Value`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Table,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Table => "table",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Returns the tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Table(_) => ValueKind::Table,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Looks up a dotted key such as `"server.limits.max"`.
    ///
    /// Each segment must name a table except the last.  Returns `None` if any
    /// segment is missing.
    ///
    /// ```rust
    /// use confmap_core::{Table, Value};
    ///
    /// let mut inner = Table::new();
    /// inner.insert("port".into(), Value::Integer(80));
    /// let mut root = Table::new();
    /// root.insert("server".into(), Value::Table(inner));
    ///
    /// let root = Value::Table(root);
    /// assert_eq!(root.lookup("server.port"), Some(&Value::Integer(80)));
    /// assert_eq!(root.lookup("server.host"), None);
    /// ```
    pub fn lookup(&self, dotted: &str) -> Option<&Value> {
        dotted
            .split('.')
            .try_fold(self, |node, segment| node.as_table()?.get(segment))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Table> for Value {
    fn from(value: Table) -> Self {
        Value::Table(value)
    }
}

/// Renders a TOML-like literal: `"text"`, `[1, 2]`, `{ a = 1 }`, `null`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Table(table) => {
                if table.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (i, (key, item)) in table.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key} = {item}")?;
                }
                f.write_str(" }")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Value::Null.kind(), ValueKind::Null);
        assert_eq!(Value::Integer(1).kind(), ValueKind::Integer);
        assert_eq!(Value::Table(Table::new()).kind(), ValueKind::Table);
    }

    #[test]
    fn test_display_renders_toml_like_literals() {
        let mut table = Table::new();
        table.insert("a".into(), Value::Integer(1));
        table.insert("b".into(), Value::from("x"));

        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(
            Value::Array(vec![Value::Integer(1), Value::Integer(2)]).to_string(),
            "[1, 2]"
        );
        assert_eq!(Value::Table(table).to_string(), "{ a = 1, b = \"x\" }");
    }

    #[test]
    fn test_table_preserves_insertion_order() {
        // Arrange
        let mut table = Table::new();
        table.insert("zeta".into(), Value::Integer(1));
        table.insert("alpha".into(), Value::Integer(2));

        // Act
        let keys: Vec<&str> = table.keys().map(String::as_str).collect();

        // Assert
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn test_lookup_stops_at_non_table() {
        let mut root = Table::new();
        root.insert("port".into(), Value::Integer(80));
        let root = Value::Table(root);

        assert_eq!(root.lookup("port.inner"), None);
    }
}
