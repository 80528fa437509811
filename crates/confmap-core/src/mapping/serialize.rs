//! Config object → table.
//!
//! This is the structural variant used to embed a config object inside
//! another format.  Absent fields are left out, and entries flagged
//! `ignore_default` are left out while they hold their default, exactly as
//! in written text.

use crate::error::MappingError;
use crate::mapping::{ConfigObject, Node};
use crate::value::{Table, Value};

/// Converts every participating field of `object` into a table entry.
///
/// # Errors
///
/// [`MappingError::Schema`] if the schema of `object` or of any nested
/// section is unusable.
pub fn to_table(object: &dyn ConfigObject) -> Result<Table, MappingError> {
    object.validate_schema()?;
    object
        .fields()
        .into_iter()
        .filter(|field| !field.node.is_absent())
        .map(|field| Ok((field.path.to_owned(), node_value(&field.node)?)))
        .collect()
}

/// Collapses a node into a plain value.  Absent nodes become `Null`.
pub(crate) fn node_value(node: &Node<'_>) -> Result<Value, MappingError> {
    let value = match node {
        Node::Absent => Value::Null,
        Node::Value(value) => value.clone(),
        Node::Section(object) => Value::Table(to_table(*object)?),
        Node::Map(entries) => Value::Table(
            entries
                .iter()
                .filter(|(_, node)| !node.is_absent())
                .map(|(key, node)| Ok((key.clone(), node_value(node)?)))
                .collect::<Result<Table, MappingError>>()?,
        ),
    };
    Ok(value)
}
