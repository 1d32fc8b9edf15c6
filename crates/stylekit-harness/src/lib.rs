#![forbid(unsafe_code)]

//! Test doubles and fixtures for StyleKit.
//!
//! - [`MockTarget`]: declared-schema property bag with named events.
//! - [`ManualAnimationEngine`]: animations completed or interrupted by hand.
//! - [`CallLog`]: shared recorder for callback invocations.

pub mod engine;
pub mod target;

pub use engine::{ManualAnimation, ManualAnimationEngine};
pub use target::{MockTarget, MockTargetBuilder};

use std::cell::RefCell;
use std::rc::Rc;

/// Shared, clonable list of labels recorded by callbacks.
#[derive(Clone, Default, Debug)]
pub struct CallLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.entries.borrow_mut().push(entry.into());
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// How many entries equal `entry`.
    #[must_use]
    pub fn count(&self, entry: &str) -> usize {
        self.entries.borrow().iter().filter(|e| *e == entry).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
