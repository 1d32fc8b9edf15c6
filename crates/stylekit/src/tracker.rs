#![forbid(unsafe_code)]

//! Bookkeeping for every live subscription a style owns.
//!
//! The [`ApplicationTracker`] maps each applied target to its event groups.
//! An [`EventGroup`] holds the animation-derived records and the plain
//! callback subscriptions created for one event name.
//!
//! # Invariants
//!
//! 1. Every subscription a style creates is owned by exactly one record in
//!    the tracker; dropping a record disposes everything it owns.
//! 2. For each (target, binding) pair at most one completion watcher is
//!    pending. Replaying disposes the previous watcher before playing again.
//! 3. A completion watcher fires `on_complete` at most once, only for
//!    [`PlaybackState::Completed`], and disposes itself when it does.
//! 4. Disposing an animation record disposes its event subscription first,
//!    then its pending watcher.
//!
//! # State machine (per target and binding)
//!
//! ```text
//! Idle --fire--> Playing --(on_complete bound)--> WaitingCompletion
//! Playing --(no on_complete)--> Idle
//! WaitingCompletion --Completed--> Idle
//! WaitingCompletion --fire--> Playing (stale watcher disposed)
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use stylekit_core::{Animation, PlaybackState, Subscription, SubscriptionSet, TargetId};
use tracing::trace;

use crate::binding::AnimationBinding;

/// Where a (target, binding) pair is in its replay cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingPhase {
    /// Not replaying and no completion watcher pending. Bindings without
    /// `on_complete` return here as soon as `on_start` has run.
    Idle,
    /// Inside a replay: the animation was played and `on_start` is running.
    Playing,
    /// Played; a completion watcher is pending.
    WaitingCompletion,
}

// ---------------------------------------------------------------------------
// BindingInstance: per (target, binding) replay state
// ---------------------------------------------------------------------------

/// Runtime state for one binding applied to one target.
pub(crate) struct BindingInstance {
    animation: Rc<dyn Animation>,
    binding: Rc<AnimationBinding>,
    pending: RefCell<Option<Subscription>>,
    phase: Cell<BindingPhase>,
    event: String,
    target: TargetId,
}

impl BindingInstance {
    pub(crate) fn new(
        animation: Rc<dyn Animation>,
        binding: Rc<AnimationBinding>,
        event: &str,
        target: TargetId,
    ) -> Rc<Self> {
        Rc::new(Self {
            animation,
            binding,
            pending: RefCell::new(None),
            phase: Cell::new(BindingPhase::Idle),
            event: event.to_owned(),
            target,
        })
    }

    pub(crate) fn phase(&self) -> BindingPhase {
        self.phase.get()
    }

    pub(crate) fn has_pending_watcher(&self) -> bool {
        self.pending
            .borrow()
            .as_ref()
            .is_some_and(Subscription::is_connected)
    }

    /// Handle one firing of the bound event.
    pub(crate) fn replay(self: &Rc<Self>) {
        let stale = self.pending.borrow_mut().take();
        if let Some(mut stale) = stale {
            trace!(
                target_id = self.target.id(),
                event = %self.event,
                "cancelled pending completion watcher"
            );
            stale.dispose();
        }

        self.phase.set(BindingPhase::Playing);
        self.animation.play();
        trace!(target_id = self.target.id(), event = %self.event, "animation played");

        if let Some(on_start) = self.binding.on_start() {
            on_start(&self.animation);
        }

        if self.binding.on_complete().is_some() {
            let weak: Weak<Self> = Rc::downgrade(self);
            let watcher = self.animation.completed().connect(move |state| {
                if !state.is_success() {
                    return;
                }
                if let Some(instance) = weak.upgrade() {
                    instance.complete();
                }
            });
            // `on_start` may have re-fired the event; the newest watcher wins.
            let previous = self.pending.borrow_mut().replace(watcher);
            drop(previous);
            self.phase.set(BindingPhase::WaitingCompletion);
        } else {
            self.phase.set(BindingPhase::Idle);
        }
    }

    /// Completion watcher body: runs `on_complete` once for the current run.
    fn complete(&self) {
        let Some(mut watcher) = self.pending.borrow_mut().take() else {
            return;
        };
        watcher.dispose();
        self.phase.set(BindingPhase::Idle);
        trace!(
            target_id = self.target.id(),
            event = %self.event,
            state = ?PlaybackState::Completed,
            "animation completed"
        );
        if let Some(on_complete) = self.binding.on_complete() {
            on_complete(&self.animation);
        }
    }

    /// Drop any pending watcher without running `on_complete`.
    fn cancel(&self) {
        let pending = self.pending.borrow_mut().take();
        drop(pending);
        self.phase.set(BindingPhase::Idle);
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Event subscription for one binding instance plus the watcher it owns.
pub(crate) struct AnimationRecord {
    connection: Subscription,
    instance: Rc<BindingInstance>,
}

impl AnimationRecord {
    pub(crate) fn new(connection: Subscription, instance: Rc<BindingInstance>) -> Self {
        Self {
            connection,
            instance,
        }
    }

    fn dispose(&mut self) {
        self.connection.dispose();
        self.instance.cancel();
    }
}

impl Drop for AnimationRecord {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Subscriptions created for one event name on one target.
#[derive(Default)]
pub(crate) struct EventGroup {
    pub(crate) animations: Vec<AnimationRecord>,
    pub(crate) callbacks: SubscriptionSet,
}

impl EventGroup {
    fn is_empty(&self) -> bool {
        self.animations.is_empty() && self.callbacks.is_empty()
    }

    fn subscription_count(&self) -> usize {
        self.animations.len() + self.callbacks.len()
    }
}

/// Everything a style created for one target.
#[derive(Default)]
pub(crate) struct AppliedTarget {
    label: String,
    events: BTreeMap<String, EventGroup>,
}

impl AppliedTarget {
    pub(crate) fn new(label: String) -> Self {
        Self {
            label,
            events: BTreeMap::new(),
        }
    }

    pub(crate) fn group_mut(&mut self, event: &str) -> &mut EventGroup {
        self.events.entry(event.to_owned()).or_default()
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn subscription_count(&self) -> usize {
        self.events.values().map(EventGroup::subscription_count).sum()
    }
}

// ---------------------------------------------------------------------------
// ApplicationTracker
// ---------------------------------------------------------------------------

/// Target ID -> event name -> live subscriptions.
#[derive(Default)]
pub(crate) struct ApplicationTracker {
    targets: AHashMap<TargetId, AppliedTarget>,
}

impl ApplicationTracker {
    pub(crate) fn insert(&mut self, id: TargetId, applied: AppliedTarget) -> Option<AppliedTarget> {
        self.targets.insert(id, applied)
    }

    /// Detach a target's records. The caller drops them outside any borrow.
    pub(crate) fn remove(&mut self, id: TargetId) -> Option<AppliedTarget> {
        self.targets.remove(&id)
    }

    /// Detach every target's records.
    pub(crate) fn drain(&mut self) -> Vec<AppliedTarget> {
        self.targets.drain().map(|(_, applied)| applied).collect()
    }

    /// Detach the animation records for `event` on every target.
    pub(crate) fn take_animations(&mut self, event: &str) -> Vec<AnimationRecord> {
        self.take_from_groups(event, |group| std::mem::take(&mut group.animations))
    }

    /// Detach the callback subscriptions for `event` on every target.
    pub(crate) fn take_callbacks(&mut self, event: &str) -> Vec<SubscriptionSet> {
        self.take_from_groups(event, |group| vec![std::mem::take(&mut group.callbacks)])
    }

    fn take_from_groups<T>(
        &mut self,
        event: &str,
        mut take: impl FnMut(&mut EventGroup) -> Vec<T>,
    ) -> Vec<T> {
        let mut taken = Vec::new();
        for applied in self.targets.values_mut() {
            if let Some(group) = applied.events.get_mut(event) {
                taken.extend(take(group));
                if group.is_empty() {
                    applied.events.remove(event);
                }
            }
        }
        taken
    }

    pub(crate) fn contains(&self, id: TargetId) -> bool {
        self.targets.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.targets.len()
    }

    pub(crate) fn get(&self, id: TargetId) -> Option<&AppliedTarget> {
        self.targets.get(&id)
    }

    /// Subscriptions (event connections) recorded across all targets.
    pub(crate) fn total_subscriptions(&self) -> usize {
        self.targets
            .values()
            .map(AppliedTarget::subscription_count)
            .sum()
    }

    pub(crate) fn pending_watchers(&self, id: TargetId) -> usize {
        self.targets.get(&id).map_or(0, |applied| {
            applied
                .events
                .values()
                .flat_map(|group| group.animations.iter())
                .filter(|record| record.instance.has_pending_watcher())
                .count()
        })
    }

    pub(crate) fn phase(&self, id: TargetId, event: &str, index: usize) -> Option<BindingPhase> {
        self.targets
            .get(&id)?
            .events
            .get(event)?
            .animations
            .get(index)
            .map(|record| record.instance.phase())
    }

    pub(crate) fn event_subscriptions(&self, id: TargetId, event: &str) -> usize {
        self.targets
            .get(&id)
            .and_then(|applied| applied.events.get(event))
            .map_or(0, EventGroup::subscription_count)
    }
}

impl fmt::Debug for ApplicationTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationTracker")
            .field("targets", &self.targets.len())
            .field("subscriptions", &self.total_subscriptions())
            .finish()
    }
}
