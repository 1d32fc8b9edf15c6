#![forbid(unsafe_code)]

//! Name -> style mapping with uniqueness enforcement.
//!
//! A [`StyleRegistry`] is a cheap, clonable handle to shared state. The
//! default registry is thread-local ([`StyleRegistry::global`]); pass an
//! explicit registry through [`StyleContext::with_registry`] to isolate a
//! set of styles.
//!
//! [`StyleContext::with_registry`]: crate::StyleContext::with_registry
//!
//! # Invariants
//!
//! 1. At most one definition per name.
//! 2. Entries live until explicitly unregistered (destroying a definition
//!    unregisters it). There is no implicit teardown.
//! 3. A definition may be looked up only under its current name.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::debug;

use crate::definition::StyleDefinition;
use crate::error::{Result, StyleError};

thread_local! {
    static GLOBAL_REGISTRY: StyleRegistry = StyleRegistry::new();
}

/// Shared registry of named style definitions.
#[derive(Clone, Default)]
pub struct StyleRegistry {
    entries: Rc<RefCell<AHashMap<String, StyleDefinition>>>,
}

impl StyleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the thread-local default registry.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_REGISTRY.with(Clone::clone)
    }

    /// Register `def` under `name`.
    ///
    /// Fails with [`StyleError::DuplicateName`] if the name is taken.
    pub fn register(&self, name: &str, def: &StyleDefinition) -> Result<()> {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(name) {
            debug!(style = name, "duplicate style name rejected");
            return Err(StyleError::DuplicateName {
                name: name.to_owned(),
            });
        }
        entries.insert(name.to_owned(), def.clone());
        debug!(style = name, "style registered");
        Ok(())
    }

    /// Move `def` to `new_name`, releasing its current name.
    ///
    /// Fails with [`StyleError::DuplicateName`] if another definition holds
    /// `new_name`. Renaming to the name `def` already holds is a no-op.
    pub fn rename(&self, def: &StyleDefinition, new_name: &str) -> Result<()> {
        let old_name = def.name();
        let mut entries = self.entries.borrow_mut();
        if let Some(existing) = entries.get(new_name) {
            if existing.ptr_eq(def) {
                return Ok(());
            }
            debug!(style = new_name, "rename to a taken name rejected");
            return Err(StyleError::DuplicateName {
                name: new_name.to_owned(),
            });
        }

        let mut released = None;
        if let Some(old) = old_name.as_deref() {
            if entries.get(old).is_some_and(|e| e.ptr_eq(def)) {
                released = entries.remove(old);
            }
        }
        entries.insert(new_name.to_owned(), def.clone());
        drop(entries);
        drop(released);

        debug!(from = ?old_name, to = new_name, "style renamed");
        Ok(())
    }

    /// Remove the entry for `name`. No-op if absent.
    pub fn unregister(&self, name: &str) -> Option<StyleDefinition> {
        let removed = self.entries.borrow_mut().remove(name);
        if removed.is_some() {
            debug!(style = name, "style unregistered");
        }
        removed
    }

    /// Look up a definition by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<StyleDefinition> {
        self.entries.borrow().get(name).cloned()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.borrow().contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Whether two handles refer to the same registry.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for StyleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleRegistry")
            .field("names", &self.names())
            .finish()
    }
}
