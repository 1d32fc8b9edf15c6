#![forbid(unsafe_code)]

//! The capability a style is applied to.
//!
//! A [`Target`] is a property bag with named events. Styles write initial
//! properties through [`Target::set_property`] and subscribe to
//! [`Target::event`] signals.
//!
//! # Failure Modes
//!
//! Implementations are expected to fail fast:
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Unknown property key | `TargetError::UnknownProperty` |
//! | Unknown event name | `TargetError::UnknownEvent` |
//! | Wrong value type | `TargetError::TypeMismatch` |

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::TargetError;
use crate::event::Signal;
use crate::value::PropertyValue;

/// Global counter for unique target IDs.
static TARGET_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl TargetId {
    /// Allocate a fresh ID.
    #[must_use]
    pub fn next() -> Self {
        Self(TARGET_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arguments delivered with a target event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventArgs {
    values: Vec<PropertyValue>,
}

impl EventArgs {
    #[must_use]
    pub fn new(values: Vec<PropertyValue>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PropertyValue> {
        self.values.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyValue> {
        self.values.iter()
    }
}

impl From<Vec<PropertyValue>> for EventArgs {
    fn from(values: Vec<PropertyValue>) -> Self {
        Self::new(values)
    }
}

/// An element styles can be applied to.
///
/// All methods take `&self`; implementations use interior mutability. The
/// ID must stay stable for the lifetime of the target.
pub trait Target {
    /// Identity used to track applications of a style.
    fn id(&self) -> TargetId;

    /// Human-readable label for diagnostics.
    fn label(&self) -> String {
        self.id().to_string()
    }

    /// Write a property. Overwrites any previous value.
    fn set_property(&self, key: &str, value: PropertyValue) -> Result<(), TargetError>;

    /// Read a property.
    fn property(&self, key: &str) -> Option<PropertyValue>;

    /// The event source for `name`.
    fn event(&self, name: &str) -> Result<Signal<EventArgs>, TargetError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_ids_are_unique_and_increasing() {
        let a = TargetId::next();
        let b = TargetId::next();
        assert_ne!(a, b);
        assert!(b.id() > a.id());
        assert_eq!(a.to_string(), format!("#{}", a.id()));
    }

    #[test]
    fn event_args_accessors() {
        let args = EventArgs::from(vec![PropertyValue::Int(3), PropertyValue::from("x")]);
        assert_eq!(args.len(), 2);
        assert_eq!(args.get(0), Some(&PropertyValue::Int(3)));
        assert_eq!(args.get(2), None);
        assert_eq!(args.iter().count(), 2);
        assert!(EventArgs::empty().is_empty());
    }
}
