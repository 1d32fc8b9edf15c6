#![forbid(unsafe_code)]

//! Core primitives for StyleKit.
//!
//! This crate provides:
//! - [`Signal`] / [`Subscription`] for single-threaded event sources with
//!   disposable handles
//! - [`PropertyValue`] / [`PropertyMap`] for dynamically typed properties
//! - the [`Target`] and [`AnimationEngine`] capabilities styles are applied
//!   through

pub mod animation;
pub mod error;
pub mod event;
pub mod target;
pub mod value;

pub use animation::{
    Animation, AnimationConfig, AnimationEngine, EasingDirection, EasingStyle, PlaybackState,
};
pub use error::{ConfigError, TargetError};
pub use event::{Signal, Subscription, SubscriptionSet};
pub use target::{EventArgs, Target, TargetId};
pub use value::{PropertyKey, PropertyMap, PropertyValue, Rgb};
