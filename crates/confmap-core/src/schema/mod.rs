//! Per-type field metadata.
//!
//! # How registration works (for beginners)
//!
//! Rust has no runtime reflection, so a config type lists its fields once,
//! by hand, in [`Config::schema`].  Each registration hands the builder two
//! accessor functions (`|c| &c.port` and `|c| &mut c.port`) plus optional
//! metadata: the path used in files, a comment, a validator, and so on.
//! The resulting [`Schema`] is built on first use and cached in a `static`
//! (see [`crate::static_schema!`]).
//!
//! ```text
//!  Schema<ServerConfig>
//!  ├── "port"      Scalar   comment: "TCP port"
//!  ├── "mode"      Scalar   validator: DEVELOPMENT | PRODUCTION
//!  ├── "limits"    Section  ──► Schema<Limits>
//!  └── "backends"  Map      ──► Schema<Backend> per key
//! ```
//!
//! # Field order
//!
//! [`SchemaBuilder::build`] places inherited fields first, then moves every
//! section and map after all scalar fields while keeping the relative order
//! inside each group.  Writers depend on this: a TOML table header ends the
//! enclosing table, so every plain `key = value` must come before it.

mod access;
pub(crate) mod naming;

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

use crate::entry::{ConfigEntry, EntryValue};
use crate::error::MappingError;
use crate::value::convert::{FromValue, Shape, ToValue};
use crate::value::Value;

pub(crate) use access::FieldAccess;
use access::{
    EntryAccess, InheritedAccess, OptionalSectionAccess, SectionAccess, SectionMapAccess,
    ValueAccess,
};

/// A type that maps to and from a config table.
///
/// `Default` is the no-argument constructor used whenever the engine needs a
/// new instance: before loading, for an optional section that is `None`,
/// and for a section map key the target does not hold yet.
pub trait Config: Default + 'static {
    /// The registered field list, built once per type.
    fn schema() -> &'static Schema<Self>;
}

/// Rewrites a raw value before it is converted.  Processors run in
/// registration order, each receiving the previous one's output.
pub type Processor = fn(Value) -> Value;

/// Accepts or rejects a raw value before it is converted.
#[derive(Clone)]
pub struct Validator {
    check: fn(&Value) -> bool,
    allowed: Vec<String>,
}

impl Validator {
    /// `allowed` is a human-readable hint shown when `check` fails.
    pub fn new(check: fn(&Value) -> bool, allowed: &[&str]) -> Self {
        Self {
            check,
            allowed: allowed.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    pub fn validate(&self, value: &Value) -> bool {
        (self.check)(value)
    }

    pub fn allowed_values(&self) -> &[String] {
        &self.allowed
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("allowed", &self.allowed)
            .finish_non_exhaustive()
    }
}

// ── Field descriptors ─────────────────────────────────────────────────────────

/// Everything the engine knows about one field of `T`.
pub struct FieldDescriptor<T> {
    name: &'static str,
    path: String,
    comment: Option<String>,
    null_comment: Option<String>,
    ignore_default: bool,
    annotated: bool,
    validator: Option<Validator>,
    processors: Vec<Processor>,
    pub(crate) access: Box<dyn FieldAccess<T>>,
}

impl<T> FieldDescriptor<T> {
    fn new(name: &'static str, access: Box<dyn FieldAccess<T>>) -> Self {
        Self {
            name,
            path: naming::to_snake_case(name),
            comment: None,
            null_comment: None,
            ignore_default: false,
            annotated: true,
            validator: None,
            processors: Vec::new(),
            access,
        }
    }

    /// The identifier the field was registered under.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The key used in files.  Defaults to the snake-case form of the name.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Written in place of the value when the field is absent.
    pub fn null_comment(&self) -> Option<&str> {
        self.null_comment.as_deref()
    }

    /// When set, an entry still at its default is left out of the output.
    pub fn ignore_default(&self) -> bool {
        self.ignore_default
    }

    /// `false` for fields registered with [`SchemaBuilder::unannotated`].
    pub fn is_annotated(&self) -> bool {
        self.annotated
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn shape(&self) -> Shape {
        self.access.shape()
    }

    /// `true` when the field is a [`ConfigEntry`].
    pub fn is_entry(&self) -> bool {
        self.access.is_entry()
    }

    /// Runs the processor chain over `raw`.
    pub fn process(&self, raw: Value) -> Value {
        self.processors.iter().fold(raw, |value, processor| processor(value))
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("shape", &self.access.shape())
            .field("comment", &self.comment)
            .field("null_comment", &self.null_comment)
            .field("ignore_default", &self.ignore_default)
            .field("annotated", &self.annotated)
            .field("validator", &self.validator)
            .field("processors", &self.processors.len())
            .finish()
    }
}

// ── Schema ────────────────────────────────────────────────────────────────────

/// The ordered field list of a config type plus its type-level options.
pub struct Schema<T> {
    type_name: &'static str,
    type_comment: Option<String>,
    config_fields_only: bool,
    fields: Vec<FieldDescriptor<T>>,
    problems: Vec<String>,
}

impl<T: 'static> Schema<T> {
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder::new()
    }

    /// Short name of `T`, used in log events and errors.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Written at the top of the type's table.
    pub fn type_comment(&self) -> Option<&str> {
        self.type_comment.as_deref()
    }

    /// When `true`, only annotated fields take part in mapping.
    pub fn config_fields_only(&self) -> bool {
        self.config_fields_only
    }

    /// The participating fields, in mapping order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor<T>> + '_ {
        let only_annotated = self.config_fields_only;
        self.fields
            .iter()
            .filter(move |field| field.annotated || !only_annotated)
    }

    /// Every registered field, participating or not.
    pub fn all_fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// Finds a participating field by its file key.
    pub fn field(&self, path: &str) -> Option<&FieldDescriptor<T>> {
        self.fields().find(|field| field.path == path)
    }

    /// Reports registration problems found by [`SchemaBuilder::build`].
    ///
    /// # Errors
    ///
    /// [`MappingError::Schema`] listing every problem, e.g. two fields
    /// sharing a path.
    pub fn validate(&self) -> Result<(), MappingError> {
        if self.problems.is_empty() {
            return Ok(());
        }
        Err(MappingError::Schema {
            type_name: self.type_name,
            reason: self.problems.join("; "),
        })
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &self.type_name)
            .field("type_comment", &self.type_comment)
            .field("config_fields_only", &self.config_fields_only)
            .field("fields", &self.fields)
            .finish()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Registers the fields of `T`.
///
/// Modifier methods (`path`, `comment`, `validator`, ...) apply to the field
/// registered most recently.  Misuse such as a modifier before any field is
/// recorded and reported by [`Schema::validate`] instead of panicking.
///
/// ```rust
/// use confmap_core::{static_schema, Config, IntConfigEntry, Schema, Value};
///
/// #[derive(Default)]
/// struct Audio {
///     volume: IntConfigEntry,
///     device: String,
/// }
///
/// impl Config for Audio {
///     fn schema() -> &'static Schema<Self> {
///         static_schema!(Audio, {
///             Schema::<Self>::builder()
///                 .type_comment("Audio output")
///                 .entry("volume", |c| &c.volume, |c| &mut c.volume)
///                 .ignore_default()
///                 .field("device", |c| &c.device, |c| &mut c.device)
///                 .path("output_device")
///                 .validator(|v| v.as_str().is_some_and(|s| !s.is_empty()), &["<non-empty>"])
///                 .processor(|v| match v {
///                     Value::String(s) => Value::String(s.trim().to_owned()),
///                     other => other,
///                 })
///                 .build()
///         })
///     }
/// }
///
/// let paths: Vec<&str> = Audio::schema().fields().map(|f| f.path()).collect();
/// assert_eq!(paths, ["volume", "output_device"]);
/// ```
pub struct SchemaBuilder<T> {
    type_name: &'static str,
    type_comment: Option<String>,
    config_fields_only: bool,
    fields: Vec<FieldDescriptor<T>>,
    inherited: usize,
    last: Option<usize>,
    problems: Vec<String>,
}

impl<T: 'static> SchemaBuilder<T> {
    fn new() -> Self {
        let full = std::any::type_name::<T>();
        let type_name = full.rsplit("::").next().unwrap_or(full);
        Self {
            type_name,
            type_comment: None,
            config_fields_only: true,
            fields: Vec::new(),
            inherited: 0,
            last: None,
            problems: Vec::new(),
        }
    }

    pub fn type_comment(mut self, comment: &str) -> Self {
        self.type_comment = Some(comment.to_owned());
        self
    }

    /// `true` (the default) maps only annotated fields; `false` maps every
    /// registered field.
    pub fn config_fields_only(mut self, only: bool) -> Self {
        self.config_fields_only = only;
        self
    }

    fn push(mut self, name: &'static str, access: Box<dyn FieldAccess<T>>) -> Self {
        self.fields.push(FieldDescriptor::new(name, access));
        self.last = Some(self.fields.len() - 1);
        self
    }

    /// A scalar, enum, list, scalar map, or `Option` of one of those.
    pub fn field<V>(self, name: &'static str, get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self
    where
        V: ToValue + FromValue + 'static,
    {
        self.push(name, Box::new(ValueAccess { get, get_mut }))
    }

    /// A [`ConfigEntry`], loaded in place through [`ConfigEntry::deserialize`].
    pub fn entry<V: EntryValue>(
        self,
        name: &'static str,
        get: fn(&T) -> &ConfigEntry<V>,
        get_mut: fn(&mut T) -> &mut ConfigEntry<V>,
    ) -> Self {
        self.push(name, Box::new(EntryAccess { get, get_mut }))
    }

    /// A nested config object, written under its own table header.
    pub fn section<U: Config>(
        self,
        name: &'static str,
        get: fn(&T) -> &U,
        get_mut: fn(&mut T) -> &mut U,
    ) -> Self {
        self.push(name, Box::new(SectionAccess { get, get_mut }))
    }

    /// A nested config object that may be absent.
    pub fn optional_section<U: Config>(
        self,
        name: &'static str,
        get: fn(&T) -> &Option<U>,
        get_mut: fn(&mut T) -> &mut Option<U>,
    ) -> Self {
        self.push(name, Box::new(OptionalSectionAccess { get, get_mut }))
    }

    /// A string-keyed map whose values are config objects.
    pub fn section_map<U: Config>(
        self,
        name: &'static str,
        get: fn(&T) -> &IndexMap<String, U>,
        get_mut: fn(&mut T) -> &mut IndexMap<String, U>,
    ) -> Self {
        self.push(name, Box::new(SectionMapAccess { get, get_mut }))
    }

    /// Splices every participating field of the embedded config `P` in front
    /// of this type's own fields, as if they were declared here.
    ///
    /// Call it once per ancestor, outermost first.
    pub fn inherit<P: Config>(mut self, get: fn(&T) -> &P, get_mut: fn(&mut T) -> &mut P) -> Self {
        for parent in P::schema().fields() {
            let descriptor = FieldDescriptor {
                name: parent.name,
                path: parent.path.clone(),
                comment: parent.comment.clone(),
                null_comment: parent.null_comment.clone(),
                ignore_default: parent.ignore_default,
                annotated: true,
                validator: parent.validator.clone(),
                processors: parent.processors.clone(),
                access: Box::new(InheritedAccess {
                    get,
                    get_mut,
                    field: parent,
                }),
            };
            self.fields.insert(self.inherited, descriptor);
            self.inherited += 1;
        }
        self.last = None;
        self
    }

    fn modify(mut self, what: &str, apply: impl FnOnce(&mut FieldDescriptor<T>)) -> Self {
        match self.last {
            Some(index) => apply(&mut self.fields[index]),
            None => self
                .problems
                .push(format!("`{what}` must follow a field registration")),
        }
        self
    }

    /// Overrides the key used in files.
    pub fn path(self, path: &str) -> Self {
        let path = path.to_owned();
        self.modify("path", move |field| field.path = path)
    }

    pub fn comment(self, comment: &str) -> Self {
        let comment = comment.to_owned();
        self.modify("comment", move |field| field.comment = Some(comment))
    }

    pub fn null_comment(self, comment: &str) -> Self {
        let comment = comment.to_owned();
        self.modify("null_comment", move |field| field.null_comment = Some(comment))
    }

    pub fn ignore_default(self) -> Self {
        self.modify("ignore_default", |field| field.ignore_default = true)
    }

    pub fn validator(self, check: fn(&Value) -> bool, allowed: &[&str]) -> Self {
        let validator = Validator::new(check, allowed);
        self.modify("validator", move |field| field.validator = Some(validator))
    }

    /// Appends a processor to the field's chain.
    pub fn processor(self, processor: Processor) -> Self {
        self.modify("processor", move |field| field.processors.push(processor))
    }

    /// Marks the field as not annotated: it only takes part in mapping when
    /// the type uses `config_fields_only(false)`.
    pub fn unannotated(self) -> Self {
        self.modify("unannotated", |field| field.annotated = false)
    }

    /// Finalizes field order and records registration problems.
    pub fn build(self) -> Schema<T> {
        let SchemaBuilder {
            type_name,
            type_comment,
            config_fields_only,
            mut fields,
            mut problems,
            ..
        } = self;

        fields.sort_by_key(|field| field.shape().is_table());

        let mut seen = HashSet::new();
        for field in fields
            .iter()
            .filter(|field| field.annotated || !config_fields_only)
        {
            if field.path.is_empty() {
                problems.push(format!("field `{}` has an empty path", field.name));
            } else if !seen.insert(field.path.as_str()) {
                problems.push(format!("path `{}` is used by more than one field", field.path));
            }
        }

        Schema {
            type_name,
            type_comment,
            config_fields_only,
            fields,
            problems,
        }
    }
}
