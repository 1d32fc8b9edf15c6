#![forbid(unsafe_code)]

//! Event sources and disposable subscriptions.
//!
//! - [`Signal`]: a shared, single-threaded multicast event source.
//! - [`Subscription`]: handle for one connected handler; disposes on drop.
//! - [`SubscriptionSet`]: owns a group of subscriptions and releases them
//!   together.
//!
//! # Architecture
//!
//! `Signal<A>` uses `Rc<RefCell<..>>` for shared ownership. Every slot carries
//! a shared liveness flag. A [`Subscription`] holds that flag plus a `Weak`
//! pointer back to the signal, so disposing it never keeps the source alive.
//!
//! # Invariants
//!
//! 1. Handlers fire in connection order.
//! 2. `emit()` holds no borrow while handlers run, so handlers may connect or
//!    dispose subscriptions on the same signal.
//! 3. A slot disposed during an emission is skipped if it has not run yet.
//!    Slots connected during an emission first fire on the next emission.
//! 4. `Subscription::dispose()` is idempotent; dropping a disposed handle is a
//!    no-op.
//!
//! # Failure Modes
//!
//! - Handler panic: propagates out of `emit()`; remaining handlers for that
//!   emission do not run.
//! - Signal dropped while subscriptions are alive: disposal becomes a no-op.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Handler<A> = Rc<dyn Fn(&A)>;

struct Slot<A> {
    id: u64,
    live: Rc<Cell<bool>>,
    handler: Handler<A>,
}

struct SignalInner<A> {
    next_id: u64,
    slots: Vec<Slot<A>>,
}

/// A multicast event source.
///
/// Cloning a `Signal` creates a new handle to the **same** slot list.
pub struct Signal<A: 'static> {
    inner: Rc<RefCell<SignalInner<A>>>,
}

impl<A: 'static> Clone for Signal<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A: 'static> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slot_count())
            .finish()
    }
}

impl<A: 'static> Signal<A> {
    /// Create a signal with no connected handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                next_id: 0,
                slots: Vec::new(),
            })),
        }
    }

    /// Connect `handler`. It stays connected until the returned
    /// [`Subscription`] is disposed or dropped.
    #[must_use = "dropping the subscription disconnects the handler immediately"]
    pub fn connect(&self, handler: impl Fn(&A) + 'static) -> Subscription {
        let live = Rc::new(Cell::new(true));
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.slots.push(Slot {
                id,
                live: Rc::clone(&live),
                handler: Rc::new(handler),
            });
            id
        };

        let source: Weak<RefCell<SignalInner<A>>> = Rc::downgrade(&self.inner);
        Subscription {
            live,
            release: Some(Box::new(move || {
                if let Some(inner) = source.upgrade() {
                    inner.borrow_mut().slots.retain(|slot| slot.id != id);
                }
            })),
        }
    }

    /// Invoke every live handler with `args`.
    pub fn emit(&self, args: &A) {
        let snapshot: Vec<(Rc<Cell<bool>>, Handler<A>)> = self
            .inner
            .borrow()
            .slots
            .iter()
            .map(|slot| (Rc::clone(&slot.live), Rc::clone(&slot.handler)))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::trace!(handlers = snapshot.len(), "signal emit");

        for (live, handler) in snapshot {
            if live.get() {
                handler(args);
            }
        }
    }

    /// Number of currently connected handlers.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.inner.borrow().slots.len()
    }

    /// Whether no handler is connected.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.inner.borrow().slots.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// Owned handle for one connected handler.
///
/// Disposing (explicitly or by drop) removes the handler from its signal.
#[must_use = "dropping the subscription disconnects the handler immediately"]
pub struct Subscription {
    live: Rc<Cell<bool>>,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// A handle that is not connected to anything.
    pub fn detached() -> Self {
        Self {
            live: Rc::new(Cell::new(false)),
            release: None,
        }
    }

    /// Whether the handler is still connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.live.get()
    }

    /// Disconnect the handler. Safe to call more than once.
    pub fn dispose(&mut self) {
        self.live.set(false);
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("connected", &self.is_connected())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// SubscriptionSet
// ---------------------------------------------------------------------------

/// Owns a group of subscriptions.
///
/// # Invariants
///
/// 1. Subscriptions are released in reverse registration order.
/// 2. After `clear()` or drop, no handler held by the set fires again.
/// 3. `len()` counts held handles, connected or not.
#[derive(Default)]
pub struct SubscriptionSet {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `sub`.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Connect `handler` to `signal` and hold the resulting subscription.
    pub fn connect<A: 'static>(
        &mut self,
        signal: &Signal<A>,
        handler: impl Fn(&A) + 'static,
    ) -> &mut Self {
        self.subscriptions.push(signal.connect(handler));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Number of held handles that are still connected.
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|sub| sub.is_connected())
            .count()
    }

    /// Dispose every held subscription. The set stays reusable.
    pub fn clear(&mut self) {
        while let Some(mut sub) = self.subscriptions.pop() {
            sub.dispose();
        }
    }
}

impl Drop for SubscriptionSet {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for SubscriptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionSet")
            .field("len", &self.subscriptions.len())
            .finish()
    }
}
