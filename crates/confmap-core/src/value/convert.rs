//! Conversions between [`Value`] tree nodes and field types.
//!
//! # Narrowing rules
//!
//! The tree stores every integer as `i64` and every float as `f64`.  When a
//! field is narrower the value is converted with Rust's `as` casts:
//!
//! | Field type              | Accepted tree value | Conversion                  |
//! |-------------------------|---------------------|-----------------------------|
//! | `i8`..`i64`, `u8`..`u64`| `Integer`           | two's-complement truncation |
//! | `f32`, `f64`            | `Float`, `Integer`  | `as` cast, no range check   |
//! | `char`                  | `String` of length 1| the single character        |
//! | `bool`, `String`        | `Bool`, `String`    | unchanged                   |
//!
//! Truncation is accepted behavior: `300` loaded into an `i8` field becomes
//! `44`.  Fields that need range checks should use a bounded
//! [`crate::ConfigEntry`] or a validator.
//!
//! # Enums
//!
//! Enum fields are matched by exact, case-sensitive constant name.  A name
//! that matches no constant is a [`ConversionError::UnknownVariant`]; there is
//! no silent fallback to the first constant.  Declare enums with
//! [`crate::config_enum!`].

use indexmap::IndexMap;

use crate::error::ConversionError;
use crate::value::{Table, Value};

/// How a field is laid out in sectioned text.
///
/// Sections and maps become table headers, which must come after all plain
/// `key = value` assignments of the enclosing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Written as a single `key = value` assignment (scalars, enums, lists).
    Scalar,
    /// A string-keyed map, written under its own table header.
    Map,
    /// A nested config object, written under its own table header.
    Section,
}

impl Shape {
    /// `true` for shapes that are written as table headers.
    pub fn is_table(self) -> bool {
        !matches!(self, Shape::Scalar)
    }
}

/// Converts a field value into a tree node.
pub trait ToValue {
    /// Layout of this type in sectioned text.
    const SHAPE: Shape = Shape::Scalar;

    /// Returns the tree form of `self`.  [`Value::Null`] means "absent".
    fn to_value(&self) -> Value;
}

/// Builds a field value from a tree node.
pub trait FromValue: Sized {
    /// # Errors
    ///
    /// Returns [`ConversionError`] when `value` has the wrong tag or content.
    fn from_value(value: &Value) -> Result<Self, ConversionError>;

    /// Loads `value` into an existing instance.  Replaces it by default;
    /// maps merge key by key instead.
    ///
    /// # Errors
    ///
    /// Same as [`from_value`](Self::from_value).  On error `self` is left
    /// unchanged.
    fn fill_from(&mut self, value: &Value) -> Result<(), ConversionError> {
        *self = Self::from_value(value)?;
        Ok(())
    }
}

/// A fieldless enum whose constants are written as quoted names.
///
/// Implemented by [`crate::config_enum!`]; implement it by hand only for
/// enums that need unusual naming.
pub trait ConfigEnum: Copy + PartialEq + 'static {
    /// Every constant, in declaration order.
    const CONSTANTS: &'static [Self];

    /// The exact text used for this constant in config files.
    fn name(&self) -> &'static str;

    /// Finds the constant whose name is exactly `name`.
    fn from_name(name: &str) -> Option<Self> {
        Self::CONSTANTS.iter().copied().find(|c| c.name() == name)
    }

    /// All constant names, in declaration order.
    fn names() -> Vec<&'static str> {
        Self::CONSTANTS.iter().map(|c| c.name()).collect()
    }
}

/// Shared [`FromValue`] body for [`ConfigEnum`] types.
///
/// # Errors
///
/// [`ConversionError::TypeMismatch`] for non-strings and
/// [`ConversionError::UnknownVariant`] for unknown names.
pub fn enum_from_value<E: ConfigEnum>(value: &Value) -> Result<E, ConversionError> {
    let name = value
        .as_str()
        .ok_or_else(|| ConversionError::mismatch("string", value))?;
    E::from_name(name).ok_or_else(|| ConversionError::UnknownVariant {
        value: name.to_owned(),
        allowed: E::names(),
    })
}

/// Declares a fieldless enum usable as a config field or entry value.
///
/// Each variant is paired with the exact name written to config files.  The
/// enum derives `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, and `Hash`.
///
/// ```rust
/// use confmap_core::{config_enum, ConfigEnum, FromValue, ToValue, Value};
///
/// config_enum! {
///     /// Deployment stage.
///     pub enum Mode {
///         Development => "DEVELOPMENT",
///         Production => "PRODUCTION",
///     }
/// }
///
/// assert_eq!(Mode::Production.to_value(), Value::from("PRODUCTION"));
/// assert_eq!(Mode::from_value(&Value::from("DEVELOPMENT")), Ok(Mode::Development));
/// assert!(Mode::from_value(&Value::from("development")).is_err());
/// assert_eq!(Mode::names(), ["DEVELOPMENT", "PRODUCTION"]);
/// ```
#[macro_export]
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::ConfigEnum for $name {
            const CONSTANTS: &'static [Self] = &[$( $name::$variant ),+];

            fn name(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl $crate::ToValue for $name {
            fn to_value(&self) -> $crate::Value {
                $crate::Value::String(
                    ::std::borrow::ToOwned::to_owned($crate::ConfigEnum::name(self)),
                )
            }
        }

        impl $crate::FromValue for $name {
            fn from_value(
                value: &$crate::Value,
            ) -> ::std::result::Result<Self, $crate::ConversionError> {
                $crate::value::convert::enum_from_value(value)
            }
        }
    };
}

// ── Primitive conversions ─────────────────────────────────────────────────────

macro_rules! impl_integer {
    ($($ty:ty),+) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::Integer(*self as i64)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, ConversionError> {
                match value {
                    Value::Integer(n) => Ok(*n as $ty),
                    other => Err(ConversionError::mismatch("integer", other)),
                }
            }
        }
    )+};
}

impl_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! impl_float {
    ($($ty:ty),+) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::Float(*self as f64)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, ConversionError> {
                match value {
                    Value::Float(n) => Ok(*n as $ty),
                    // `ratio = 1` is a valid way to write 1.0 by hand.
                    Value::Integer(n) => Ok(*n as $ty),
                    other => Err(ConversionError::mismatch("float", other)),
                }
            }
        }
    )+};
}

impl_float!(f32, f64);

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        value
            .as_bool()
            .ok_or_else(|| ConversionError::mismatch("boolean", value))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| ConversionError::mismatch("string", value))
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromValue for char {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        let text = value
            .as_str()
            .ok_or_else(|| ConversionError::mismatch("string", value))?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConversionError::NotAChar(text.to_owned())),
        }
    }
}

/// Raw passthrough, for fields that keep the untyped tree.
impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

// ── Containers ────────────────────────────────────────────────────────────────

/// `None` is written as absent and read back from [`Value::Null`].
impl<T: ToValue> ToValue for Option<T> {
    const SHAPE: Shape = T::SHAPE;

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Lists nest to any depth; `Vec<Vec<String>>` is written `[["a"], ["b"]]`.
impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        let items = value
            .as_array()
            .ok_or_else(|| ConversionError::mismatch("array", value))?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                T::from_value(item).map_err(|source| ConversionError::Element {
                    index,
                    source: Box::new(source),
                })
            })
            .collect()
    }
}

/// String-keyed maps keep their key order.
impl<T: ToValue> ToValue for IndexMap<String, T> {
    const SHAPE: Shape = Shape::Map;

    fn to_value(&self) -> Value {
        let table: Table = self
            .iter()
            .map(|(key, item)| (key.clone(), item.to_value()))
            .collect();
        Value::Table(table)
    }
}

impl<T: FromValue> FromValue for IndexMap<String, T> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        let table = value
            .as_table()
            .ok_or_else(|| ConversionError::mismatch("table", value))?;
        table
            .iter()
            .map(|(key, item)| {
                T::from_value(item)
                    .map(|converted| (key.clone(), converted))
                    .map_err(|source| ConversionError::Entry {
                        key: key.clone(),
                        source: Box::new(source),
                    })
            })
            .collect()
    }

    /// Keys from `value` overwrite or extend the map; keys it lacks stay.
    fn fill_from(&mut self, value: &Value) -> Result<(), ConversionError> {
        let loaded = Self::from_value(value)?;
        self.extend(loaded);
        Ok(())
    }
}
