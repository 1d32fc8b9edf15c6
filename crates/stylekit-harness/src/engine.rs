#![forbid(unsafe_code)]

//! Deterministic animation engine driven by the test.
//!
//! Animations never advance on their own. A test calls
//! [`ManualAnimation::finish`] to complete the current run (writing the end
//! state to the target) or [`ManualAnimation::interrupt`] to cancel it.
//!
//! # Invariants
//!
//! 1. `play()` always starts a new run and bumps `play_count()`.
//! 2. Replaying while a run is in progress emits nothing for the abandoned
//!    run.
//! 3. `finish()` / `interrupt()` on an animation that is not playing are
//!    no-ops that emit nothing.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use stylekit_core::{
    Animation, AnimationConfig, AnimationEngine, PlaybackState, PropertyMap, Signal, Target,
    TargetError, TargetId,
};

/// An animation whose runs are completed by hand.
pub struct ManualAnimation {
    target: Weak<dyn Target>,
    target_id: TargetId,
    config: AnimationConfig,
    properties: PropertyMap,
    state: Cell<PlaybackState>,
    plays: Cell<u32>,
    completed: Signal<PlaybackState>,
}

impl ManualAnimation {
    #[must_use]
    pub fn target_id(&self) -> TargetId {
        self.target_id
    }

    #[must_use]
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// End state this animation moves toward.
    #[must_use]
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// How many runs were started.
    #[must_use]
    pub fn play_count(&self) -> u32 {
        self.plays.get()
    }

    /// Handlers currently watching completion.
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.completed.slot_count()
    }

    /// Complete the current run: write the end state and emit
    /// [`PlaybackState::Completed`]. Returns `false` if nothing was playing.
    pub fn finish(&self) -> Result<bool, TargetError> {
        if self.state.get() != PlaybackState::Playing {
            return Ok(false);
        }
        if let Some(target) = self.target.upgrade() {
            for (key, value) in &self.properties {
                target.set_property(key, value.clone())?;
            }
        }
        self.state.set(PlaybackState::Completed);
        self.completed.emit(&PlaybackState::Completed);
        Ok(true)
    }

    /// Cancel the current run and emit [`PlaybackState::Cancelled`].
    /// Returns `false` if nothing was playing.
    pub fn interrupt(&self) -> bool {
        if self.state.get() != PlaybackState::Playing {
            return false;
        }
        self.state.set(PlaybackState::Cancelled);
        self.completed.emit(&PlaybackState::Cancelled);
        true
    }
}

impl Animation for ManualAnimation {
    fn play(&self) {
        self.plays.set(self.plays.get() + 1);
        self.state.set(PlaybackState::Playing);
    }

    fn completed(&self) -> Signal<PlaybackState> {
        self.completed.clone()
    }

    fn playback_state(&self) -> PlaybackState {
        self.state.get()
    }
}

impl std::fmt::Debug for ManualAnimation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualAnimation")
            .field("target", &self.target_id)
            .field("state", &self.state.get())
            .field("plays", &self.plays.get())
            .finish()
    }
}

/// Engine that records every animation it creates.
///
/// Creation fails with [`TargetError::UnknownProperty`] when an end-state key
/// is not readable on the target.
#[derive(Default)]
pub struct ManualAnimationEngine {
    created: RefCell<Vec<Rc<ManualAnimation>>>,
}

impl ManualAnimationEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every animation created so far, oldest first.
    #[must_use]
    pub fn animations(&self) -> Vec<Rc<ManualAnimation>> {
        self.created.borrow().clone()
    }

    /// Animations created for `target`, oldest first.
    #[must_use]
    pub fn animations_for(&self, target: &dyn Target) -> Vec<Rc<ManualAnimation>> {
        let id = target.id();
        self.created
            .borrow()
            .iter()
            .filter(|anim| anim.target_id == id)
            .cloned()
            .collect()
    }

    /// Finish every animation that is playing. Returns how many finished.
    pub fn finish_all(&self) -> Result<usize, TargetError> {
        let mut finished = 0;
        for anim in self.animations() {
            if anim.finish()? {
                finished += 1;
            }
        }
        Ok(finished)
    }

    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created.borrow().len()
    }
}

impl AnimationEngine for ManualAnimationEngine {
    fn create(
        &self,
        target: &Rc<dyn Target>,
        config: &AnimationConfig,
        properties: &PropertyMap,
    ) -> Result<Rc<dyn Animation>, TargetError> {
        if let Some(key) = properties.keys().find(|key| target.property(key).is_none()) {
            return Err(TargetError::UnknownProperty {
                target: target.label(),
                key: key.clone(),
            });
        }
        let animation = Rc::new(ManualAnimation {
            target: Rc::downgrade(target),
            target_id: target.id(),
            config: *config,
            properties: properties.clone(),
            state: Cell::new(PlaybackState::Begin),
            plays: Cell::new(0),
            completed: Signal::new(),
        });
        self.created.borrow_mut().push(Rc::clone(&animation));
        Ok(animation)
    }
}

impl std::fmt::Debug for ManualAnimationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualAnimationEngine")
            .field("created", &self.created.borrow().len())
            .finish()
    }
}
