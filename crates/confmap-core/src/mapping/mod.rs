//! Moving data between config objects and the value tree.
//!
//! - [`deserialize`] fills an object from a table, running validators and
//!   processors per field.
//! - [`serialize`] turns an object into a table.
//! - [`merge`] fills in missing data from defaults, either tree-to-tree or
//!   entry-to-entry.
//!
//! Writers for text formats do not go through a table.  They walk the object
//! directly through [`ConfigObject::fields`], which yields one [`FieldView`]
//! per participating field with its comments and current [`Node`].  That
//! keeps comments and section structure available while writing.

pub mod deserialize;
pub mod merge;
pub mod serialize;

use std::fmt;

use tracing::trace;

use crate::error::MappingError;
use crate::schema::Config;
use crate::value::convert::Shape;
use crate::value::Value;

pub use deserialize::{fill, from_table};
pub use merge::{copy_defaults, merge_defaults, merged};
pub use serialize::to_table;

/// The current content of one field, as seen by a writer.
pub enum Node<'a> {
    /// Nothing to write: `None`, or a null value.
    Absent,
    /// A single assignment: scalars, enums, and lists.
    Value(Value),
    /// A nested config object.
    Section(&'a dyn ConfigObject),
    /// A string-keyed map.  Values are scalars, sections, or nested maps.
    Map(Vec<(String, Node<'a>)>),
}

impl Node<'static> {
    /// Wraps a scalar value; [`Value::Null`] becomes [`Node::Absent`].
    pub fn scalar(value: Value) -> Self {
        match value {
            Value::Null => Node::Absent,
            other => Node::Value(other),
        }
    }

    /// Wraps a map-shaped value.  Nested tables become nested maps.
    pub fn map_of(value: Value) -> Self {
        match value {
            Value::Table(table) => Node::Map(
                table
                    .into_iter()
                    .map(|(key, item)| (key, Node::map_of(item)))
                    .collect(),
            ),
            other => Node::scalar(other),
        }
    }
}

impl Node<'_> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Node::Absent)
    }

    /// Collapses the node into a plain value.  Absent nodes become `Null`.
    ///
    /// # Errors
    ///
    /// [`MappingError::Schema`] if a nested section has an unusable schema.
    pub fn to_value(&self) -> Result<Value, MappingError> {
        serialize::node_value(self)
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Absent => f.write_str("Absent"),
            Node::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Node::Section(object) => f.debug_tuple("Section").field(&object.type_name()).finish(),
            Node::Map(entries) => f.debug_map().entries(entries.iter().map(|(k, v)| (k, v))).finish(),
        }
    }
}

/// One participating field, ready to be written.
#[derive(Debug)]
pub struct FieldView<'a> {
    pub path: &'a str,
    pub comment: Option<&'a str>,
    pub null_comment: Option<&'a str>,
    pub shape: Shape,
    pub node: Node<'a>,
}

/// Object-safe view of a config instance, used by writers to walk nested
/// sections without knowing their types.
pub trait ConfigObject {
    fn type_name(&self) -> &'static str;

    fn type_comment(&self) -> Option<&str>;

    /// Participating fields in schema order.  Entries flagged
    /// `ignore_default` that still hold their default are left out.
    fn fields(&self) -> Vec<FieldView<'_>>;

    /// See [`crate::Schema::validate`].
    fn validate_schema(&self) -> Result<(), MappingError>;
}

impl<T: Config> ConfigObject for T {
    fn type_name(&self) -> &'static str {
        T::schema().type_name()
    }

    fn type_comment(&self) -> Option<&str> {
        T::schema().type_comment()
    }

    fn fields(&self) -> Vec<FieldView<'_>> {
        let schema = T::schema();
        schema
            .fields()
            .filter(|field| {
                let skip = field.ignore_default() && field.access.is_default(self);
                if skip {
                    trace!(
                        config = schema.type_name(),
                        path = field.path(),
                        "skipping field at its default"
                    );
                }
                !skip
            })
            .map(|field| FieldView {
                path: field.path(),
                comment: field.comment(),
                null_comment: field.null_comment(),
                shape: field.shape(),
                node: field.access.node(self),
            })
            .collect()
    }

    fn validate_schema(&self) -> Result<(), MappingError> {
        T::schema().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Table;

    #[test]
    fn test_scalar_null_is_absent() {
        assert!(Node::scalar(Value::Null).is_absent());
        assert!(matches!(Node::scalar(Value::Integer(1)), Node::Value(Value::Integer(1))));
    }

    #[test]
    fn test_map_of_nests_tables() {
        // Arrange
        let mut inner = Table::new();
        inner.insert("x".into(), Value::Integer(1));
        let mut outer = Table::new();
        outer.insert("a".into(), Value::Table(inner.clone()));
        outer.insert("b".into(), Value::from("text"));

        // Act
        let node = Node::map_of(Value::Table(outer.clone()));

        // Assert
        match &node {
            Node::Map(entries) => {
                assert_eq!(entries.len(), 2);
                assert!(matches!(entries[0].1, Node::Map(_)));
                assert!(matches!(entries[1].1, Node::Value(_)));
            }
            other => panic!("expected a map, got {other:?}"),
        }
        assert_eq!(node.to_value(), Ok(Value::Table(outer)));
    }
}
