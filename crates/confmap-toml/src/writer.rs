//! Config object → commented, sectioned TOML text.
//!
//! # Output layout (for beginners)
//!
//! ```toml
//! # Server settings            <- type comment
//! # TCP port                   <- field comment
//! port = 8080
//! mode = "DEVELOPMENT"
//!
//! [limits]                     <- nested config object
//! max = 10
//!
//! [backends.east]              <- map of config objects: one header per key
//! host = "e1"
//! ```
//!
//! The writer walks the object in schema order, which already places every
//! plain assignment before the first section or map.  A blank line goes
//! before each table header once anything has been written.  Empty maps
//! without a null comment are left out, so an empty config produces empty
//! text and reloads to its defaults.
//!
//! Values are rendered with the `toml` crate's inline value serializer, so
//! strings are quoted and escaped and arrays (nested to any depth) and inline
//! tables use standard TOML syntax.

use std::io::Write;

use confmap_core::{ConfigObject, Node, Table, Value};
use serde::Serialize;
use tracing::trace;

use crate::error::ConfigError;
use crate::parse::to_toml;

/// Streams TOML to any [`Write`] sink.
pub struct TomlWriter<W: Write> {
    out: W,
    written: bool,
    last_blank: bool,
}

impl<W: Write> TomlWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            written: false,
            last_blank: false,
        }
    }

    /// Returns the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes every participating field of `object`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Mapping`] if a schema in the object graph is unusable.
    /// - [`ConfigError::Unrepresentable`] / [`ConfigError::Serialize`] if a
    ///   value has no TOML form.
    /// - [`ConfigError::Stream`] if the sink fails.
    pub fn write_object(&mut self, object: &dyn ConfigObject) -> Result<(), ConfigError> {
        self.write_fields(object, "")
    }

    /// Writes a plain table with no schema: assignments first, then one
    /// section per nested table.
    ///
    /// # Errors
    ///
    /// Same as [`write_object`](Self::write_object), minus schema errors.
    pub fn write_table(&mut self, table: &Table) -> Result<(), ConfigError> {
        self.write_plain(table, "")
    }

    // ── Schema-driven output ──────────────────────────────────────────────────

    fn write_fields(&mut self, object: &dyn ConfigObject, parent: &str) -> Result<(), ConfigError> {
        object.validate_schema()?;

        if let Some(comment) = object.type_comment() {
            self.comment(comment)?;
        }

        for field in object.fields() {
            let key = format_key(field.path);
            let full = format!("{parent}{key}");

            match field.node {
                Node::Absent => {
                    let Some(null_comment) = field.null_comment else {
                        trace!(path = %full, "skipping absent field");
                        continue;
                    };
                    if field.shape.is_table() {
                        self.separate()?;
                    }
                    if let Some(comment) = field.comment {
                        self.comment(comment)?;
                    }
                    self.comment(null_comment)?;
                }
                Node::Value(value) => {
                    if let Some(comment) = field.comment {
                        self.comment(comment)?;
                    }
                    self.assign(&key, &value, &full)?;
                }
                Node::Section(section) => {
                    self.separate()?;
                    if let Some(comment) = field.comment {
                        self.comment(comment)?;
                    }
                    self.header(&full)?;
                    self.write_fields(section, &format!("{full}."))?;
                }
                Node::Map(entries) => {
                    if entries.is_empty() && field.null_comment.is_none() {
                        trace!(path = %full, "skipping empty map");
                        continue;
                    }
                    self.separate()?;
                    if let Some(comment) = field.comment {
                        self.comment(comment)?;
                    }
                    match field.null_comment {
                        Some(null_comment) if entries.is_empty() => self.comment(null_comment)?,
                        _ => self.write_map(&full, &entries, true)?,
                    }
                }
            }
        }
        Ok(())
    }

    /// Scalar entries go under a single `[key]` header; section and map
    /// entries each get their own `[key.entry]` header after them.  A map
    /// with no scalar entries has no header of its own.
    ///
    /// `separated` is `true` when the caller already wrote the blank line
    /// and comment that belong above the first header written here.
    fn write_map(
        &mut self,
        key: &str,
        entries: &[(String, Node<'_>)],
        separated: bool,
    ) -> Result<(), ConfigError> {
        let scalars: Vec<_> = entries
            .iter()
            .filter_map(|(name, node)| match node {
                Node::Value(value) => Some((name, value)),
                _ => None,
            })
            .collect();
        let nested = entries
            .iter()
            .filter(|(_, node)| matches!(node, Node::Section(_) | Node::Map(_)));

        let mut separated = separated;
        if !scalars.is_empty() {
            if !separated {
                self.separate()?;
            }
            separated = false;
            self.header(key)?;
            for (name, value) in scalars {
                let entry_key = format_key(name);
                self.assign(&entry_key, value, &format!("{key}.{entry_key}"))?;
            }
        }

        for (name, node) in nested {
            let entry_key = format!("{key}.{}", format_key(name));
            match node {
                Node::Section(section) => {
                    if !separated {
                        self.separate()?;
                    }
                    self.header(&entry_key)?;
                    self.write_fields(*section, &format!("{entry_key}."))?;
                }
                Node::Map(inner) => self.write_map(&entry_key, inner, separated)?,
                Node::Absent | Node::Value(_) => continue,
            }
            separated = false;
        }
        Ok(())
    }

    // ── Schema-less output ────────────────────────────────────────────────────

    fn write_plain(&mut self, table: &Table, parent: &str) -> Result<(), ConfigError> {
        for (name, value) in table {
            if value.is_null() || value.as_table().is_some() {
                continue;
            }
            let key = format_key(name);
            self.assign(&key, value, &format!("{parent}{key}"))?;
        }

        for (name, value) in table {
            if let Value::Table(inner) = value {
                let full = format!("{parent}{}", format_key(name));
                self.separate()?;
                self.header(&full)?;
                self.write_plain(inner, &format!("{full}."))?;
            }
        }
        Ok(())
    }

    // ── Primitives ────────────────────────────────────────────────────────────

    fn line(&mut self, text: &str) -> Result<(), ConfigError> {
        writeln!(self.out, "{text}").map_err(ConfigError::Stream)?;
        self.written = true;
        self.last_blank = text.is_empty();
        Ok(())
    }

    /// Blank line before a header, unless nothing is written yet or the
    /// previous line is already blank.
    fn separate(&mut self) -> Result<(), ConfigError> {
        if self.written && !self.last_blank {
            self.line("")?;
        }
        Ok(())
    }

    fn header(&mut self, full: &str) -> Result<(), ConfigError> {
        self.line(&format!("[{full}]"))
    }

    fn comment(&mut self, text: &str) -> Result<(), ConfigError> {
        for line in dedent(text) {
            if line.is_empty() {
                self.line("#")?;
            } else {
                self.line(&format!("# {line}"))?;
            }
        }
        Ok(())
    }

    fn assign(&mut self, key: &str, value: &Value, path: &str) -> Result<(), ConfigError> {
        let rendered = render_value(value, path)?;
        self.line(&format!("{key} = {rendered}"))
    }
}

/// Renders `object` to a string.
///
/// # Errors
///
/// See [`TomlWriter::write_object`].
pub fn to_string(object: &dyn ConfigObject) -> Result<String, ConfigError> {
    let mut writer = TomlWriter::new(Vec::new());
    writer.write_object(object)?;
    Ok(bytes_to_string(writer.into_inner()))
}

/// Renders a plain table to a string.
///
/// # Errors
///
/// See [`TomlWriter::write_table`].
pub fn table_to_string(table: &Table) -> Result<String, ConfigError> {
    let mut writer = TomlWriter::new(Vec::new());
    writer.write_table(table)?;
    Ok(bytes_to_string(writer.into_inner()))
}

// Everything written is built from `str`, so the bytes are always UTF-8.
fn bytes_to_string(bytes: Vec<u8>) -> String {
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Renders one value as an inline TOML literal.  `path` names the value
/// in errors.
///
/// # Errors
///
/// [`ConfigError::Unrepresentable`] for a null inside an array.
pub fn render_value(value: &Value, path: &str) -> Result<String, ConfigError> {
    let toml_value = to_toml(value, path)?;
    let mut out = String::new();
    toml_value.serialize(toml::ser::ValueSerializer::new(&mut out))?;
    Ok(out)
}

/// Bare keys stay as they are; anything else is quoted.
pub fn format_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        key.to_owned()
    } else {
        toml::Value::String(key.to_owned()).to_string()
    }
}

/// Strips the common leading whitespace of all non-blank lines, and leading
/// and trailing blank lines, so indented multi-line comments read cleanly.
fn dedent(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return vec![""];
    };
    let lines = &lines[first..=last];

    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                l.get(indent..).unwrap_or_else(|| l.trim_start()).trim_end()
            }
        })
        .collect()
}
