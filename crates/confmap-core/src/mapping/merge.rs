//! Filling in missing data from defaults.
//!
//! Two strategies, chosen by what the caller has:
//!
//! - A defaults *tree* (a second file): [`merge_defaults`] copies every key
//!   the loaded tree lacks, recursing into tables present on both sides.
//! - A defaults *instance*: [`copy_defaults`] copies the recorded `default`
//!   of each [`ConfigEntry`](crate::ConfigEntry) into the matching entry of
//!   the loaded instance.  Current values are never touched.

use tracing::debug;

use crate::schema::Config;
use crate::value::{Table, Value};

/// Copies keys that are missing from `loaded` out of `defaults`.
///
/// Keys present in `loaded` are never overwritten.  When both sides hold a
/// table under the same key the merge recurses into it.
pub fn merge_defaults(loaded: &mut Table, defaults: &Table) {
    for (key, default) in defaults {
        match loaded.get_mut(key) {
            None => {
                loaded.insert(key.clone(), default.clone());
            }
            Some(Value::Table(inner)) => {
                if let Value::Table(default_inner) = default {
                    merge_defaults(inner, default_inner);
                }
            }
            Some(_) => {}
        }
    }
}

/// [`merge_defaults`] into a copy of `loaded`.
pub fn merged(loaded: &Table, defaults: &Table) -> Table {
    let mut out = loaded.clone();
    merge_defaults(&mut out, defaults);
    out
}

/// Copies entry defaults from `defaults` into `target`, recursing into
/// sections and into map entries whose keys exist on both sides.
pub fn copy_defaults<T: Config>(target: &mut T, defaults: &T) {
    let schema = T::schema();
    debug!(config = schema.type_name(), "copying entry defaults");
    for field in schema.fields() {
        field.access.copy_defaults(target, defaults);
    }
}
