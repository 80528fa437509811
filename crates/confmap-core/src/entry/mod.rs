//! Mutable, observable config values.
//!
//! A [`ConfigEntry`] holds a current value and the default it was created
//! with, optionally an inclusive `[min, max]` range, and a list of change
//! listeners.  Applications keep entries in their config structs and hand
//! them to UI code that edits settings at runtime.
//!
//! # State machine
//!
//! ```text
//!            set(v) / reset() / increment() / decrement()
//!   ┌──────────────────────────────────────────────────────────┐
//!   │                                                          │
//!   ▼                                                          │
//! value ──► clamp to [min, max] (bounded only) ──► store ──► notify listeners
//! ```
//!
//! There is no terminal state.  Entries live as long as the struct that owns
//! them and are mutated in place: loading a file into an existing entry keeps
//! every listener attached.
//!
//! # Listener re-entrancy
//!
//! Listeners run synchronously on the caller's thread, in registration order,
//! on every `set`.  A listener receives the new value by reference and cannot
//! reach back into the same entry (it is mutably borrowed), but it may update
//! other state; avoid chains of listeners that feed each other.

use std::fmt;

use crate::error::ConversionError;
use crate::value::convert::{FromValue, ToValue};
use crate::value::Value;

/// Values an entry can hold.
///
/// Blanket-implemented for every type that converts to and from the value
/// tree, compares by equality, and can be shared across threads.
pub trait EntryValue: ToValue + FromValue + Clone + PartialEq + Send + Sync + 'static {}

impl<V> EntryValue for V where V: ToValue + FromValue + Clone + PartialEq + Send + Sync + 'static {}

/// Numeric values that support [`ConfigEntry::increment`] and
/// [`ConfigEntry::decrement`].
pub trait Step: EntryValue + PartialOrd + Copy {
    /// The next value up; integers saturate at their maximum.
    fn step_up(self) -> Self;
    /// The next value down; integers saturate at their minimum.
    fn step_down(self) -> Self;
}

macro_rules! impl_step_integer {
    ($($ty:ty),+) => {$(
        impl Step for $ty {
            fn step_up(self) -> Self {
                self.saturating_add(1)
            }

            fn step_down(self) -> Self {
                self.saturating_sub(1)
            }
        }
    )+};
}

impl_step_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl Step for f32 {
    fn step_up(self) -> Self {
        self + 1.0
    }

    fn step_down(self) -> Self {
        self - 1.0
    }
}

impl Step for f64 {
    fn step_up(self) -> Self {
        self + 1.0
    }

    fn step_down(self) -> Self {
        self - 1.0
    }
}

/// Handle returned by [`ConfigEntry::add_change_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type ChangeListener<V> = Box<dyn Fn(&V) + Send + Sync>;

/// Inclusive range plus the comparison needed to clamp into it.
///
/// The clamp function is captured when the entry is built so that
/// [`ConfigEntry::set`] does not require `V: PartialOrd`.
struct Bounds<V> {
    min: V,
    max: V,
    clamp: fn(V, &V, &V) -> V,
}

fn clamp_partial<V: PartialOrd + Clone>(value: V, min: &V, max: &V) -> V {
    if value < *min {
        min.clone()
    } else if value > *max {
        max.clone()
    } else {
        value
    }
}

/// A mutable config value with a default, optional bounds, and listeners.
///
/// # Examples
///
/// ```rust
/// use confmap_core::IntConfigEntry;
///
/// let mut volume = IntConfigEntry::bounded(50, 1, 100);
/// volume.set(999);
/// assert_eq!(*volume.value(), 100); // clamped
///
/// volume.increment();
/// assert_eq!(*volume.value(), 1); // wrapped
///
/// volume.reset();
/// assert!(volume.is_default());
/// ```
pub struct ConfigEntry<V> {
    value: V,
    default: V,
    bounds: Option<Bounds<V>>,
    listeners: Vec<(ListenerId, ChangeListener<V>)>,
    next_listener: u64,
    disabled: bool,
}

pub type IntConfigEntry = ConfigEntry<i32>;
pub type LongConfigEntry = ConfigEntry<i64>;
pub type DoubleConfigEntry = ConfigEntry<f64>;
pub type BooleanConfigEntry = ConfigEntry<bool>;
pub type StringConfigEntry = ConfigEntry<String>;
pub type EnumConfigEntry<E> = ConfigEntry<E>;

impl<V: EntryValue> ConfigEntry<V> {
    /// Creates an unbounded entry whose value starts at `default`.
    pub fn new(default: V) -> Self {
        Self {
            value: default.clone(),
            default,
            bounds: None,
            listeners: Vec::new(),
            next_listener: 0,
            disabled: false,
        }
    }

    /// The current value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The value [`reset`](Self::reset) returns to.
    pub fn default(&self) -> &V {
        &self.default
    }

    /// `true` when the current value equals the default.
    pub fn is_default(&self) -> bool {
        self.value == self.default
    }

    /// `(min, max)` for bounded entries.
    pub fn bounds(&self) -> Option<(&V, &V)> {
        self.bounds.as_ref().map(|b| (&b.min, &b.max))
    }

    /// Stores `value`, clamped into the bounds if the entry has any, then
    /// notifies every listener with the stored value.
    pub fn set(&mut self, value: V) {
        let value = match &self.bounds {
            Some(bounds) => (bounds.clamp)(value, &bounds.min, &bounds.max),
            None => value,
        };
        self.value = value;
        for (_, listener) in &self.listeners {
            listener(&self.value);
        }
    }

    /// Sets the value back to the default and notifies listeners.
    pub fn reset(&mut self) {
        self.set(self.default.clone());
    }

    /// Replaces the default without touching the current value.
    pub fn set_default(&mut self, default: V) {
        self.default = default;
    }

    /// Registers `listener`; it runs after every subsequent `set`.
    pub fn add_change_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&V) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener.  Returns `false` if `id` was not registered.
    pub fn remove_change_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn clear_change_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// UI hint: whether the setting is currently greyed out.  Mapping ignores it.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Tree form of the current value.
    pub fn serialize(&self) -> Value {
        self.value.to_value()
    }

    /// Converts `value` and stores it through [`set`](Self::set), so bounds
    /// are applied and listeners fire.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if `value` does not convert to `V`; the
    /// entry is left unchanged.
    pub fn deserialize(&mut self, value: &Value) -> Result<(), ConversionError> {
        let converted = V::from_value(value)?;
        self.set(converted);
        Ok(())
    }
}

impl<V: EntryValue + PartialOrd> ConfigEntry<V> {
    /// Creates an entry limited to the inclusive range `[min, max]`.
    ///
    /// `min == max` produces an unbounded entry, and reversed bounds are
    /// swapped.  The default itself is stored as given.
    pub fn bounded(default: V, min: V, max: V) -> Self {
        let mut entry = Self::new(default);
        if min != max {
            let (min, max) = if min > max { (max, min) } else { (min, max) };
            entry.bounds = Some(Bounds {
                min,
                max,
                clamp: clamp_partial::<V>,
            });
        }
        entry
    }
}

impl<V: Step> ConfigEntry<V> {
    /// Adds one.  On a bounded entry, stepping past `max` wraps to `min`.
    pub fn increment(&mut self) {
        let next = self.value.step_up();
        let next = match &self.bounds {
            Some(bounds) if next > bounds.max => bounds.min,
            _ => next,
        };
        self.set(next);
    }

    /// Subtracts one.  On a bounded entry, stepping past `min` wraps to `max`.
    pub fn decrement(&mut self) {
        let next = self.value.step_down();
        let next = match &self.bounds {
            Some(bounds) if next < bounds.min => bounds.max,
            _ => next,
        };
        self.set(next);
    }
}

impl ConfigEntry<bool> {
    /// Flips the value.
    pub fn invert(&mut self) {
        self.set(!self.value);
    }
}

impl<V: EntryValue + Default> Default for ConfigEntry<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: fmt::Debug> fmt::Debug for ConfigEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("ConfigEntry");
        out.field("value", &self.value).field("default", &self.default);
        if let Some(bounds) = &self.bounds {
            out.field("min", &bounds.min).field("max", &bounds.max);
        }
        out.field("listeners", &self.listeners.len())
            .field("disabled", &self.disabled)
            .finish()
    }
}

/// Entries compare by value and default; listeners are not part of equality.
impl<V: PartialEq> PartialEq for ConfigEntry<V> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.default == other.default
    }
}
