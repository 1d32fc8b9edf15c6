#![forbid(unsafe_code)]

//! Reusable style definitions for event-driven UI targets.
//!
//! A [`StyleDefinition`] bundles initial properties, event-triggered
//! animations and plain event callbacks. Applying it to a [`Target`] writes
//! the initial properties and subscribes everything; the definition keeps
//! every subscription it created so that `unapply`, `disconnect_all` and
//! `destroy` can release them deterministically.
//!
//! Targets and animation engines are capabilities supplied by the host
//! (see [`Target`] and [`AnimationEngine`]). Definitions are registered by
//! name in a [`StyleRegistry`].
//!
//! # Quick start
//!
//! ```ignore
//! use stylekit::{AnimationConfig, AnimationHooks, StyleContext, props};
//!
//! let ctx = StyleContext::new(engine);
//! ctx.define("Button")?
//!     .set_initial_properties(props! { "color" => "gray" })?
//!     .connect("MouseEnter", AnimationConfig::new(0.2), props! { "color" => "blue" }, AnimationHooks::new())?
//!     .connect("MouseLeave", AnimationConfig::new(0.2), props! { "color" => "gray" }, AnimationHooks::new())?
//!     .apply(&button)?;
//! ```

pub mod binding;
pub mod context;
pub mod definition;
pub mod error;
pub mod registry;
mod tracker;

pub use binding::{AnimationBinding, AnimationCallback, AnimationHooks, EventCallback};
pub use context::StyleContext;
pub use definition::StyleDefinition;
pub use error::{Result, StyleError};
pub use registry::StyleRegistry;
pub use tracker::BindingPhase;

pub use stylekit_core::{
    Animation, AnimationConfig, AnimationEngine, ConfigError, EasingDirection, EasingStyle,
    EventArgs, PlaybackState, PropertyKey, PropertyMap, PropertyValue, Rgb, Signal, Subscription,
    SubscriptionSet, Target, TargetError, TargetId, props,
};
