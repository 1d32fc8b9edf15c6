#![forbid(unsafe_code)]

//! Style definitions: templates plus the engine that applies them.
//!
//! A [`StyleDefinition`] records initial properties, per-event animation
//! bindings and per-event callbacks. [`apply`](StyleDefinition::apply)
//! instantiates that template against a [`Target`]; every subscription it
//! creates is owned by the definition's tracker until
//! [`unapply`](StyleDefinition::unapply), [`disconnect_all`](StyleDefinition::disconnect_all),
//! [`disconnect_all_fn`](StyleDefinition::disconnect_all_fn) or
//! [`destroy`](StyleDefinition::destroy) releases it.
//!
//! # Invariants
//!
//! 1. The tracker holds exactly the subscriptions currently live for each
//!    (target, event) pair.
//! 2. Re-applying to an already-applied target replaces its previous
//!    subscriptions once the new ones are connected, so listeners never
//!    stack.
//! 3. One animation is created per binding per target per `apply` call and
//!    reused for every firing of the bound event.
//! 4. For a given event, animation handlers are connected before plain
//!    callbacks and so fire first.
//! 5. No internal borrow is held while calling into targets, engines or user
//!    callbacks; callbacks may re-enter the definition.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Bad event name / key / config | `InvalidArgument` at the call |
//! | Unknown property or event on a target | `Target(..)` from `apply`; that target's partial subscriptions are released |
//! | Re-apply fails on an applied target | `Target(..)`; the previous application stays live, initial properties already written are kept |
//! | Any call after `destroy` | `Destroyed` (disposal calls are no-ops) |
//! | `unapply` on a target never applied | no-op |
//!
//! Template changes (`connect`, `set_initial_properties`, ...) take effect on
//! the next `apply`; targets already applied keep what they were given.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use stylekit_core::{
    AnimationConfig, AnimationEngine, EventArgs, PropertyMap, Target, TargetId,
};
use tracing::debug;

use crate::binding::{
    AnimationBinding, AnimationHooks, EventCallback, validate_event_name, validate_properties,
    validate_style_name,
};
use crate::context::StyleContext;
use crate::error::{Result, StyleError, display_name};
use crate::tracker::{AnimationRecord, AppliedTarget, ApplicationTracker, BindingInstance, BindingPhase};

struct DefinitionState {
    name: Option<String>,
    initial: PropertyMap,
    animations: BTreeMap<String, Vec<Rc<AnimationBinding>>>,
    callbacks: BTreeMap<String, Vec<EventCallback>>,
    applied: ApplicationTracker,
    context: StyleContext,
    destroyed: bool,
    retired_name: Option<String>,
}

/// A reusable bundle of initial properties, event animations and callbacks.
///
/// `StyleDefinition` is a handle: clones share the same definition. The
/// registry keeps a handle for every named definition until it is destroyed
/// or unregistered; an anonymous definition is torn down (all subscriptions
/// released) when its last handle drops.
///
/// # Example
///
/// ```ignore
/// let ctx = StyleContext::new(engine);
/// let button = ctx.define("Button")?;
/// button
///     .set_initial_properties(props! { "color" => "gray" })?
///     .connect(
///         "MouseEnter",
///         AnimationConfig::new(0.2),
///         props! { "color" => "blue" },
///         AnimationHooks::new().on_complete(|_| println!("done")),
///     )?
///     .apply(&target)?;
/// ```
#[derive(Clone)]
pub struct StyleDefinition {
    inner: Rc<RefCell<DefinitionState>>,
}

impl StyleDefinition {
    /// Create a definition, registering it when `name` is given.
    ///
    /// Fails with [`StyleError::DuplicateName`] if the name is taken.
    pub fn new(ctx: &StyleContext, name: Option<&str>) -> Result<Self> {
        let def = Self::anonymous(ctx);
        if let Some(name) = name {
            validate_style_name(name)?;
            ctx.registry().register(name, &def)?;
            def.inner.borrow_mut().name = Some(name.to_owned());
        }
        Ok(def)
    }

    /// Create an unregistered definition.
    #[must_use]
    pub fn anonymous(ctx: &StyleContext) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DefinitionState {
                name: None,
                initial: PropertyMap::new(),
                animations: BTreeMap::new(),
                callbacks: BTreeMap::new(),
                applied: ApplicationTracker::default(),
                context: ctx.clone(),
                destroyed: false,
                retired_name: None,
            })),
        }
    }

    /// Current registered name.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.inner.borrow().name.clone()
    }

    /// Whether two handles refer to the same definition.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.borrow().destroyed
    }

    fn ensure_live(&self) -> Result<()> {
        let state = self.inner.borrow();
        if state.destroyed {
            return Err(StyleError::Destroyed {
                name: state.retired_name.clone(),
            });
        }
        Ok(())
    }

    fn label(&self) -> String {
        display_name(&self.inner.borrow().name)
    }

    // -----------------------------------------------------------------------
    // Builder surface
    // -----------------------------------------------------------------------

    /// Register under `new_name`, releasing the current name.
    ///
    /// Fails with [`StyleError::DuplicateName`] if another definition uses
    /// `new_name`. Anonymous definitions become named.
    pub fn change_name(&self, new_name: &str) -> Result<&Self> {
        self.ensure_live()?;
        validate_style_name(new_name)?;
        if self.name().as_deref() == Some(new_name) {
            return Ok(self);
        }
        let registry = self.inner.borrow().context.registry().clone();
        registry.rename(self, new_name)?;
        self.inner.borrow_mut().name = Some(new_name.to_owned());
        Ok(self)
    }

    /// Replace (not merge) the initial properties.
    pub fn set_initial_properties(&self, properties: PropertyMap) -> Result<&Self> {
        self.ensure_live()?;
        validate_properties("properties", &properties)?;
        self.inner.borrow_mut().initial = properties;
        Ok(self)
    }

    /// Append an animation binding for `event`.
    ///
    /// Bindings for the same event are kept in insertion order.
    pub fn connect(
        &self,
        event: &str,
        config: AnimationConfig,
        properties: PropertyMap,
        hooks: AnimationHooks,
    ) -> Result<&Self> {
        self.ensure_live()?;
        validate_event_name(event)?;
        let binding = AnimationBinding::new(config, properties, hooks)?;
        self.inner
            .borrow_mut()
            .animations
            .entry(event.to_owned())
            .or_default()
            .push(Rc::new(binding));
        Ok(self)
    }

    /// Append a plain callback for `event`.
    pub fn connect_fn(
        &self,
        event: &str,
        callback: impl Fn(&EventArgs) + 'static,
    ) -> Result<&Self> {
        self.ensure_live()?;
        validate_event_name(event)?;
        let callback: EventCallback = Rc::new(callback);
        self.inner
            .borrow_mut()
            .callbacks
            .entry(event.to_owned())
            .or_default()
            .push(callback);
        Ok(self)
    }

    /// Tear down every animation subscription for `event` on every applied
    /// target (pending completion watchers included) and drop the event's
    /// animation bindings from the template.
    pub fn disconnect_all(&self, event: &str) -> &Self {
        let records: Vec<AnimationRecord> = {
            let mut state = self.inner.borrow_mut();
            state.animations.remove(event);
            state.applied.take_animations(event)
        };
        if !records.is_empty() {
            debug!(
                style = %self.label(),
                event,
                disposed = records.len(),
                "animation subscriptions disconnected"
            );
        }
        drop(records);
        self
    }

    /// Tear down every plain-callback subscription for `event` on every
    /// applied target and drop the event's callbacks from the template.
    pub fn disconnect_all_fn(&self, event: &str) -> &Self {
        let (sets, callbacks) = {
            let mut state = self.inner.borrow_mut();
            let callbacks = state.callbacks.remove(event);
            (state.applied.take_callbacks(event), callbacks)
        };
        let disposed: usize = sets.iter().map(|set| set.len()).sum();
        if disposed > 0 {
            debug!(
                style = %self.label(),
                event,
                disposed,
                "callback subscriptions disconnected"
            );
        }
        drop(sets);
        drop(callbacks);
        self
    }

    // -----------------------------------------------------------------------
    // Application engine
    // -----------------------------------------------------------------------

    /// Apply to one target.
    pub fn apply(&self, target: &Rc<dyn Target>) -> Result<&Self> {
        self.apply_all(std::iter::once(target))
    }

    /// Apply to each target in order. Stops at the first failure; targets
    /// before it stay applied.
    pub fn apply_all<'a>(
        &self,
        targets: impl IntoIterator<Item = &'a Rc<dyn Target>>,
    ) -> Result<&Self> {
        for target in targets {
            self.apply_one(target)?;
        }
        Ok(self)
    }

    fn apply_one(&self, target: &Rc<dyn Target>) -> Result<()> {
        self.ensure_live()?;
        let id = target.id();
        let template = {
            let state = self.inner.borrow();
            Template {
                initial: state.initial.clone(),
                animations: state.animations.clone(),
                callbacks: state.callbacks.clone(),
                engine: Rc::clone(state.context.engine()),
            }
        };

        // A previous application stays live until the new one is complete.
        let applied = template.instantiate(target)?;
        let subscriptions = applied.subscription_count();

        let previous = {
            let mut state = self.inner.borrow_mut();
            if state.destroyed {
                let name = state.retired_name.clone();
                drop(state);
                drop(applied);
                return Err(StyleError::Destroyed { name });
            }
            state.applied.insert(id, applied)
        };
        if let Some(previous) = previous {
            let disposed = previous.subscription_count();
            drop(previous);
            debug!(
                style = %self.label(),
                target_id = id.id(),
                disposed,
                "re-applied, previous subscriptions released"
            );
        }

        debug!(
            style = %self.label(),
            target_id = id.id(),
            target_label = %target.label(),
            subscriptions,
            "style applied"
        );
        Ok(())
    }

    /// Release everything this definition created for `target`. No-op if
    /// the target was never applied.
    pub fn unapply(&self, target: &dyn Target) -> &Self {
        let removed = self.inner.borrow_mut().applied.remove(target.id());
        if let Some(applied) = removed {
            debug!(
                style = %self.label(),
                target_id = target.id().id(),
                target_label = applied.label(),
                disposed = applied.subscription_count(),
                "style unapplied"
            );
        }
        self
    }

    /// Release every subscription, unregister the name and make the
    /// definition inert. Idempotent.
    pub fn destroy(&self) {
        let (records, templates, name, registry) = {
            let mut state = self.inner.borrow_mut();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.initial.clear();
            let templates = (
                std::mem::take(&mut state.animations),
                std::mem::take(&mut state.callbacks),
            );
            let name = state.name.take();
            state.retired_name = name.clone();
            (
                state.applied.drain(),
                templates,
                name,
                state.context.registry().clone(),
            )
        };
        let targets = records.len();
        drop(records);
        drop(templates);

        if let Some(name) = name.as_deref() {
            if registry.get(name).is_some_and(|entry| entry.ptr_eq(self)) {
                registry.unregister(name);
            }
        }
        debug!(style = %display_name(&name), targets, "style destroyed");
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn initial_properties(&self) -> PropertyMap {
        self.inner.borrow().initial.clone()
    }

    /// Event names with at least one binding or callback, sorted.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        let state = self.inner.borrow();
        let mut events: Vec<String> = state
            .animations
            .keys()
            .chain(state.callbacks.keys())
            .cloned()
            .collect();
        events.sort();
        events.dedup();
        events
    }

    /// Animation bindings recorded for `event`.
    #[must_use]
    pub fn binding_count(&self, event: &str) -> usize {
        self.inner.borrow().animations.get(event).map_or(0, Vec::len)
    }

    /// Plain callbacks recorded for `event`.
    #[must_use]
    pub fn callback_count(&self, event: &str) -> usize {
        self.inner.borrow().callbacks.get(event).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_applied(&self, target: &dyn Target) -> bool {
        self.inner.borrow().applied.contains(target.id())
    }

    /// Number of targets currently applied.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.inner.borrow().applied.len()
    }

    /// Event subscriptions held for `target`.
    #[must_use]
    pub fn subscription_count(&self, target: &dyn Target) -> usize {
        self.inner
            .borrow()
            .applied
            .get(target.id())
            .map_or(0, AppliedTarget::subscription_count)
    }

    /// Event subscriptions held for `event` on `target`.
    #[must_use]
    pub fn event_subscription_count(&self, target: &dyn Target, event: &str) -> usize {
        self.inner
            .borrow()
            .applied
            .event_subscriptions(target.id(), event)
    }

    /// Event subscriptions held across all targets.
    #[must_use]
    pub fn total_subscriptions(&self) -> usize {
        self.inner.borrow().applied.total_subscriptions()
    }

    /// Completion watchers currently pending for `target`.
    #[must_use]
    pub fn pending_watchers(&self, target: &dyn Target) -> usize {
        self.inner.borrow().applied.pending_watchers(target.id())
    }

    /// Replay phase of the `index`-th binding for `event` on `target`.
    #[must_use]
    pub fn binding_phase(
        &self,
        target: &dyn Target,
        event: &str,
        index: usize,
    ) -> Option<BindingPhase> {
        self.inner.borrow().applied.phase(target.id(), event, index)
    }
}

impl fmt::Debug for StyleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("StyleDefinition")
            .field("name", &state.name)
            .field("initial", &state.initial)
            .field("events", &state.animations.keys().collect::<Vec<_>>())
            .field("callback_events", &state.callbacks.keys().collect::<Vec<_>>())
            .field("applied", &state.applied)
            .field("destroyed", &state.destroyed)
            .finish()
    }
}

/// Snapshot of the template taken before calling out to a target.
struct Template {
    initial: PropertyMap,
    animations: BTreeMap<String, Vec<Rc<AnimationBinding>>>,
    callbacks: BTreeMap<String, Vec<EventCallback>>,
    engine: Rc<dyn AnimationEngine>,
}

impl Template {
    /// Write initial properties and connect every handler. On error the
    /// partially built record is dropped, releasing what was connected.
    fn instantiate(&self, target: &Rc<dyn Target>) -> Result<AppliedTarget> {
        let id: TargetId = target.id();
        let mut applied = AppliedTarget::new(target.label());

        for (key, value) in &self.initial {
            target.set_property(key, value.clone())?;
        }

        for (event, bindings) in &self.animations {
            let signal = target.event(event)?;
            for binding in bindings {
                let animation =
                    self.engine
                        .create(target, binding.config(), binding.properties())?;
                let instance = BindingInstance::new(animation, Rc::clone(binding), event, id);
                let handler = Rc::clone(&instance);
                let connection = signal.connect(move |_| handler.replay());
                applied
                    .group_mut(event)
                    .animations
                    .push(AnimationRecord::new(connection, instance));
            }
        }

        for (event, callbacks) in &self.callbacks {
            let signal = target.event(event)?;
            let group = applied.group_mut(event);
            for callback in callbacks {
                let callback = Rc::clone(callback);
                group.callbacks.connect(&signal, move |args| callback(args));
            }
        }

        Ok(applied)
    }
}
