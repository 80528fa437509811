//! Typed accessors behind each [`FieldDescriptor`](super::FieldDescriptor).
//!
//! Every registration kind on the builder produces one of these structs.
//! They hold plain `fn` pointers, so they are `Send + Sync` no matter what
//! the config type contains, and the schema can live in a `static`.

use indexmap::IndexMap;

use crate::entry::{ConfigEntry, EntryValue};
use crate::error::{ConversionError, MappingError};
use crate::mapping::deserialize::fill_at;
use crate::mapping::{self, Node};
use crate::schema::{Config, FieldDescriptor};
use crate::value::convert::{FromValue, Shape, ToValue};
use crate::value::{Table, Value};

/// Reads, writes, and compares one field of `T` through the value tree.
pub(crate) trait FieldAccess<T>: Send + Sync {
    fn shape(&self) -> Shape;

    /// Current value of the field, ready for serialization.
    fn node<'a>(&self, target: &'a T) -> Node<'a>;

    /// `true` for [`ConfigEntry`] fields, which bypass validators and processors.
    fn is_entry(&self) -> bool {
        false
    }

    /// `true` when the field holds its recorded default.  Only entries record one.
    fn is_default(&self, _target: &T) -> bool {
        false
    }

    /// Converts `raw` and stores it in `target`.  `path` is the full dotted
    /// path used in error messages.
    fn load(&self, target: &mut T, raw: &Value, path: &str) -> Result<(), MappingError>;

    /// Copies entry defaults from `defaults` into `target`.
    fn copy_defaults(&self, _target: &mut T, _defaults: &T) {}
}

fn child_path(parent: &str, key: &str) -> String {
    format!("{parent}.{key}")
}

fn expect_table<'v>(raw: &'v Value, path: &str) -> Result<&'v Table, MappingError> {
    raw.as_table()
        .ok_or_else(|| MappingError::conversion(path, ConversionError::mismatch("table", raw)))
}

/// Builds a `U` from its defaults and `table`, for sections that do not
/// exist yet.
fn new_section<U: Config>(table: &Table, path: &str) -> Result<U, MappingError> {
    let mut section = U::default();
    fill_at(&mut section, table, path)?;
    Ok(section)
}

// ── Plain values ──────────────────────────────────────────────────────────────

pub(crate) struct ValueAccess<T, V> {
    pub(crate) get: fn(&T) -> &V,
    pub(crate) get_mut: fn(&mut T) -> &mut V,
}

impl<T, V> FieldAccess<T> for ValueAccess<T, V>
where
    V: ToValue + FromValue + 'static,
{
    fn shape(&self) -> Shape {
        V::SHAPE
    }

    fn node<'a>(&self, target: &'a T) -> Node<'a> {
        let value = (self.get)(target).to_value();
        match V::SHAPE {
            Shape::Scalar => Node::scalar(value),
            Shape::Map | Shape::Section => Node::map_of(value),
        }
    }

    fn load(&self, target: &mut T, raw: &Value, path: &str) -> Result<(), MappingError> {
        (self.get_mut)(target)
            .fill_from(raw)
            .map_err(|source| MappingError::conversion(path, source))
    }
}

// ── Config entries ────────────────────────────────────────────────────────────

pub(crate) struct EntryAccess<T, V> {
    pub(crate) get: fn(&T) -> &ConfigEntry<V>,
    pub(crate) get_mut: fn(&mut T) -> &mut ConfigEntry<V>,
}

impl<T, V: EntryValue> FieldAccess<T> for EntryAccess<T, V> {
    // Entries are always written inline, whatever their value type.
    fn shape(&self) -> Shape {
        Shape::Scalar
    }

    fn node<'a>(&self, target: &'a T) -> Node<'a> {
        Node::scalar((self.get)(target).serialize())
    }

    fn is_entry(&self) -> bool {
        true
    }

    fn is_default(&self, target: &T) -> bool {
        (self.get)(target).is_default()
    }

    // The entry is updated in place, so listeners stay attached.
    fn load(&self, target: &mut T, raw: &Value, path: &str) -> Result<(), MappingError> {
        (self.get_mut)(target)
            .deserialize(raw)
            .map_err(|source| MappingError::conversion(path, source))
    }

    fn copy_defaults(&self, target: &mut T, defaults: &T) {
        let default = (self.get)(defaults).default().clone();
        (self.get_mut)(target).set_default(default);
    }
}

// ── Nested config objects ─────────────────────────────────────────────────────

pub(crate) struct SectionAccess<T, U> {
    pub(crate) get: fn(&T) -> &U,
    pub(crate) get_mut: fn(&mut T) -> &mut U,
}

impl<T, U: Config> FieldAccess<T> for SectionAccess<T, U> {
    fn shape(&self) -> Shape {
        Shape::Section
    }

    fn node<'a>(&self, target: &'a T) -> Node<'a> {
        Node::Section((self.get)(target))
    }

    fn load(&self, target: &mut T, raw: &Value, path: &str) -> Result<(), MappingError> {
        fill_at((self.get_mut)(target), expect_table(raw, path)?, path)
    }

    fn copy_defaults(&self, target: &mut T, defaults: &T) {
        mapping::copy_defaults((self.get_mut)(target), (self.get)(defaults));
    }
}

pub(crate) struct OptionalSectionAccess<T, U> {
    pub(crate) get: fn(&T) -> &Option<U>,
    pub(crate) get_mut: fn(&mut T) -> &mut Option<U>,
}

impl<T, U: Config> FieldAccess<T> for OptionalSectionAccess<T, U> {
    fn shape(&self) -> Shape {
        Shape::Section
    }

    fn node<'a>(&self, target: &'a T) -> Node<'a> {
        match (self.get)(target) {
            Some(section) => Node::Section(section),
            None => Node::Absent,
        }
    }

    fn load(&self, target: &mut T, raw: &Value, path: &str) -> Result<(), MappingError> {
        let slot = (self.get_mut)(target);
        if raw.is_null() {
            *slot = None;
            return Ok(());
        }
        let table = expect_table(raw, path)?;
        if let Some(section) = slot.as_mut() {
            fill_at(section, table, path)
        } else {
            *slot = Some(new_section::<U>(table, path)?);
            Ok(())
        }
    }

    fn copy_defaults(&self, target: &mut T, defaults: &T) {
        if let (Some(section), Some(default)) = ((self.get_mut)(target), (self.get)(defaults)) {
            mapping::copy_defaults(section, default);
        }
    }
}

pub(crate) struct SectionMapAccess<T, U> {
    pub(crate) get: fn(&T) -> &IndexMap<String, U>,
    pub(crate) get_mut: fn(&mut T) -> &mut IndexMap<String, U>,
}

impl<T, U: Config> FieldAccess<T> for SectionMapAccess<T, U> {
    fn shape(&self) -> Shape {
        Shape::Map
    }

    fn node<'a>(&self, target: &'a T) -> Node<'a> {
        let entries = (self.get)(target)
            .iter()
            .map(|(key, section)| (key.clone(), Node::Section(section)))
            .collect();
        Node::Map(entries)
    }

    fn load(&self, target: &mut T, raw: &Value, path: &str) -> Result<(), MappingError> {
        let table = expect_table(raw, path)?;
        let sections = (self.get_mut)(target);
        for (key, item) in table {
            let item_path = child_path(path, key);
            let item_table = expect_table(item, &item_path)?;
            match sections.get_mut(key) {
                Some(section) => fill_at(section, item_table, &item_path)?,
                None => {
                    let section = new_section::<U>(item_table, &item_path)?;
                    sections.insert(key.clone(), section);
                }
            }
        }
        Ok(())
    }

    fn copy_defaults(&self, target: &mut T, defaults: &T) {
        let defaults = (self.get)(defaults);
        for (key, section) in (self.get_mut)(target).iter_mut() {
            if let Some(default) = defaults.get(key) {
                mapping::copy_defaults(section, default);
            }
        }
    }
}

// ── Inherited fields ──────────────────────────────────────────────────────────

/// One field of an embedded parent config, reached through `get`.
pub(crate) struct InheritedAccess<T, P: 'static> {
    pub(crate) get: fn(&T) -> &P,
    pub(crate) get_mut: fn(&mut T) -> &mut P,
    pub(crate) field: &'static FieldDescriptor<P>,
}

impl<T, P: Config> FieldAccess<T> for InheritedAccess<T, P> {
    fn shape(&self) -> Shape {
        self.field.access.shape()
    }

    fn node<'a>(&self, target: &'a T) -> Node<'a> {
        self.field.access.node((self.get)(target))
    }

    fn is_entry(&self) -> bool {
        self.field.access.is_entry()
    }

    fn is_default(&self, target: &T) -> bool {
        self.field.access.is_default((self.get)(target))
    }

    fn load(&self, target: &mut T, raw: &Value, path: &str) -> Result<(), MappingError> {
        self.field.access.load((self.get_mut)(target), raw, path)
    }

    fn copy_defaults(&self, target: &mut T, defaults: &T) {
        self.field
            .access
            .copy_defaults((self.get_mut)(target), (self.get)(defaults));
    }
}
