#![forbid(unsafe_code)]

//! Collaborators a style needs: the animation engine and the registry.

use std::fmt;
use std::rc::Rc;

use stylekit_core::AnimationEngine;

use crate::definition::StyleDefinition;
use crate::error::Result;
use crate::registry::StyleRegistry;

/// Engine and registry shared by a family of styles.
///
/// Cloning a context shares both collaborators.
#[derive(Clone)]
pub struct StyleContext {
    engine: Rc<dyn AnimationEngine>,
    registry: StyleRegistry,
}

impl StyleContext {
    /// Context using the thread-local default registry.
    #[must_use]
    pub fn new(engine: Rc<dyn AnimationEngine>) -> Self {
        Self::with_registry(engine, StyleRegistry::global())
    }

    /// Context using an explicit registry.
    #[must_use]
    pub fn with_registry(engine: Rc<dyn AnimationEngine>, registry: StyleRegistry) -> Self {
        Self { engine, registry }
    }

    #[must_use]
    pub fn engine(&self) -> &Rc<dyn AnimationEngine> {
        &self.engine
    }

    #[must_use]
    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    /// Create a style registered under `name`.
    pub fn define(&self, name: &str) -> Result<StyleDefinition> {
        StyleDefinition::new(self, Some(name))
    }

    /// Create an unregistered style.
    #[must_use]
    pub fn anonymous(&self) -> StyleDefinition {
        StyleDefinition::anonymous(self)
    }

    /// Look up a registered style.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<StyleDefinition> {
        self.registry.get(name)
    }
}

impl fmt::Debug for StyleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleContext")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
