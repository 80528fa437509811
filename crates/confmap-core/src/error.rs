//! Error types for the mapping engine.
//!
//! [`ConversionError`] describes why one tree value does not fit one field
//! type; it carries no path.  [`MappingError`] is what callers see: it adds
//! the dotted path of the offending field so the user can find it in their
//! file.

use thiserror::Error;

use crate::value::{Value, ValueKind};

/// A tree value could not be converted into the declared field type.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversionError {
    /// The value has the wrong tag, e.g. a string where an integer is declared.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: ValueKind,
    },

    /// A `char` field was given a string that is not exactly one character.
    #[error("expected a single character, found {0:?}")]
    NotAChar(String),

    /// An enum field was given a name that matches none of its constants.
    #[error("unknown constant {value:?}, expected one of {allowed:?}")]
    UnknownVariant {
        value: String,
        allowed: Vec<&'static str>,
    },

    /// One element of a list failed to convert.
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<ConversionError>,
    },

    /// One value of a map failed to convert.
    #[error("key {key:?}: {source}")]
    Entry {
        key: String,
        #[source]
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    /// Builds a [`ConversionError::TypeMismatch`] for `found`.
    pub fn mismatch(expected: &'static str, found: &Value) -> Self {
        ConversionError::TypeMismatch {
            expected,
            found: found.kind(),
        }
    }
}

/// A load, save, or merge could not complete.
///
/// Every variant aborts the whole operation; no partially mapped object is
/// handed back to the caller.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MappingError {
    /// The type's registered schema is unusable (duplicate or empty paths).
    #[error("{type_name} is not a usable config schema: {reason}")]
    Schema {
        type_name: &'static str,
        reason: String,
    },

    /// A field validator rejected the raw value from the file.
    #[error("{path} is invalid. Current value: {value}. Allowed values: {allowed:?}")]
    Validation {
        path: String,
        value: Value,
        allowed: Vec<String>,
    },

    /// A raw value could not be converted into the field's declared type.
    #[error("{path}: {source}")]
    Conversion {
        path: String,
        #[source]
        source: ConversionError,
    },
}

impl MappingError {
    pub(crate) fn conversion(path: &str, source: ConversionError) -> Self {
        MappingError::Conversion {
            path: path.to_owned(),
            source,
        }
    }

    /// The dotted path of the field that failed, if the error is tied to one.
    pub fn path(&self) -> Option<&str> {
        match self {
            MappingError::Schema { .. } => None,
            MappingError::Validation { path, .. } | MappingError::Conversion { path, .. } => {
                Some(path)
            }
        }
    }
}
