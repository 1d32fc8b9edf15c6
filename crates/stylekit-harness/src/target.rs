#![forbid(unsafe_code)]

//! In-memory [`Target`] with a fixed property schema and event set.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use stylekit_core::{EventArgs, PropertyMap, PropertyValue, Signal, Target, TargetError, TargetId};

/// A property bag with declared properties and named events.
///
/// Writes to undeclared keys and subscriptions to undeclared events fail,
/// matching the fail-fast policy the style engine expects.
pub struct MockTarget {
    id: TargetId,
    name: String,
    properties: RefCell<PropertyMap>,
    events: AHashMap<String, Signal<EventArgs>>,
    writes: RefCell<Vec<(String, PropertyValue)>>,
}

impl MockTarget {
    /// Start describing a target called `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> MockTargetBuilder {
        MockTargetBuilder {
            name: name.into(),
            properties: PropertyMap::new(),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This target as a shared trait object.
    #[must_use]
    pub fn as_target(self: &Rc<Self>) -> Rc<dyn Target> {
        Rc::clone(self) as Rc<dyn Target>
    }

    /// Emit `event` with `args`.
    pub fn fire_with(&self, event: &str, args: EventArgs) -> Result<(), TargetError> {
        self.signal(event)?.emit(&args);
        Ok(())
    }

    /// Emit `event` with no arguments.
    ///
    /// # Panics
    ///
    /// Panics if the event was not declared; this is a test helper.
    pub fn fire(&self, event: &str) {
        if let Err(err) = self.fire_with(event, EventArgs::empty()) {
            panic!("{err}");
        }
    }

    /// Number of handlers connected to `event` (0 for unknown events).
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.events.get(event).map_or(0, Signal::slot_count)
    }

    /// Handlers connected across every event.
    #[must_use]
    pub fn total_listeners(&self) -> usize {
        self.events.values().map(Signal::slot_count).sum()
    }

    /// How many times `key` was written.
    #[must_use]
    pub fn write_count(&self, key: &str) -> usize {
        self.writes.borrow().iter().filter(|(k, _)| k == key).count()
    }

    /// Every successful write, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<(String, PropertyValue)> {
        self.writes.borrow().clone()
    }

    fn signal(&self, event: &str) -> Result<&Signal<EventArgs>, TargetError> {
        self.events.get(event).ok_or_else(|| TargetError::UnknownEvent {
            target: self.name.clone(),
            event: event.to_owned(),
        })
    }
}

impl Target for MockTarget {
    fn id(&self) -> TargetId {
        self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn set_property(&self, key: &str, value: PropertyValue) -> Result<(), TargetError> {
        let mut properties = self.properties.borrow_mut();
        let slot = properties
            .get_mut(key)
            .ok_or_else(|| TargetError::UnknownProperty {
                target: self.name.clone(),
                key: key.to_owned(),
            })?;
        if !slot.same_kind(&value) {
            return Err(TargetError::TypeMismatch {
                target: self.name.clone(),
                key: key.to_owned(),
                expected: slot.kind(),
                found: value.kind(),
            });
        }
        *slot = value.clone();
        self.writes.borrow_mut().push((key.to_owned(), value));
        Ok(())
    }

    fn property(&self, key: &str) -> Option<PropertyValue> {
        self.properties.borrow().get(key).cloned()
    }

    fn event(&self, name: &str) -> Result<Signal<EventArgs>, TargetError> {
        self.signal(name).cloned()
    }
}

impl std::fmt::Debug for MockTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTarget")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("properties", &self.properties.borrow())
            .field("listeners", &self.total_listeners())
            .finish()
    }
}

/// Builder for [`MockTarget`].
#[derive(Debug)]
pub struct MockTargetBuilder {
    name: String,
    properties: PropertyMap,
    events: Vec<String>,
}

impl MockTargetBuilder {
    /// Declare a property with its starting value (which fixes its type).
    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Declare an event.
    #[must_use]
    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.events.push(name.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Rc<MockTarget> {
        Rc::new(MockTarget {
            id: TargetId::next(),
            name: self.name,
            properties: RefCell::new(self.properties),
            events: self
                .events
                .into_iter()
                .map(|name| (name, Signal::new()))
                .collect(),
            writes: RefCell::new(Vec::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn button() -> Rc<MockTarget> {
        MockTarget::builder("button")
            .property("color", "white")
            .property("opacity", 1.0)
            .event("MouseEnter")
            .build()
    }

    #[test]
    fn set_and_read_declared_property() {
        let target = button();
        target.set_property("color", "gray".into()).unwrap();
        assert_eq!(target.property("color"), Some("gray".into()));
        assert_eq!(target.write_count("color"), 1);
    }

    #[test]
    fn unknown_property_fails() {
        let target = button();
        let err = target.set_property("size", 3.into()).unwrap_err();
        assert!(matches!(err, TargetError::UnknownProperty { .. }));
        assert!(target.writes().is_empty());
    }

    #[test]
    fn wrong_type_fails() {
        let target = button();
        let err = target.set_property("opacity", "opaque".into()).unwrap_err();
        assert_eq!(
            err,
            TargetError::TypeMismatch {
                target: "button".into(),
                key: "opacity".into(),
                expected: "float",
                found: "text",
            }
        );
    }

    #[test]
    fn unknown_event_fails() {
        let target = button();
        assert!(matches!(
            target.event("Click"),
            Err(TargetError::UnknownEvent { .. })
        ));
        assert!(target.fire_with("Click", EventArgs::empty()).is_err());
    }

    #[test]
    fn fire_reaches_listeners() {
        let target = button();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = target
            .event("MouseEnter")
            .unwrap()
            .connect(move |_| h.set(h.get() + 1));
        assert_eq!(target.listener_count("MouseEnter"), 1);
        target.fire("MouseEnter");
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn ids_are_distinct() {
        assert_ne!(button().id(), button().id());
    }
}
