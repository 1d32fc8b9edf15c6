#![forbid(unsafe_code)]

//! Animation capability consumed by styles.
//!
//! The core never interpolates anything. An [`AnimationEngine`] turns a
//! target, an [`AnimationConfig`] and an end-state [`PropertyMap`] into an
//! [`Animation`] handle; the engine owns timing and easing.
//!
//! # Invariants
//!
//! 1. `AnimationConfig` is passed to the engine unmodified.
//! 2. An animation's `completed()` signal emits a terminal [`PlaybackState`]
//!    once per run. Only [`PlaybackState::Completed`] means the run finished
//!    normally.
//! 3. Calling `play()` while a run is in progress restarts playback per the
//!    engine's own restart contract.

use std::rc::Rc;

use crate::error::{ConfigError, TargetError};
use crate::event::Signal;
use crate::target::Target;
use crate::value::PropertyMap;

/// Easing curve family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EasingStyle {
    Linear,
    Sine,
    #[default]
    Quad,
    Cubic,
    Quart,
    Quint,
    Exponential,
    Circular,
    Back,
    Bounce,
    Elastic,
}

/// Which end of the curve the easing applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EasingDirection {
    In,
    #[default]
    Out,
    InOut,
}

/// Playback state reported by an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaybackState {
    /// Created, never played.
    Begin,
    /// Waiting out the configured delay.
    Delayed,
    Playing,
    Paused,
    /// Run finished normally.
    Completed,
    /// Run was interrupted or cancelled.
    Cancelled,
}

impl PlaybackState {
    /// Whether a run has ended, successfully or not.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether this is a successful completion.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Timing parameters handed to the engine.
///
/// # Examples
///
/// ```ignore
/// let config = AnimationConfig::new(0.2)
///     .easing(EasingStyle::Sine)
///     .direction(EasingDirection::InOut)
///     .repeat(2)
///     .reverses(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationConfig {
    /// Run length in seconds.
    pub duration: f64,
    pub easing: EasingStyle,
    pub direction: EasingDirection,
    /// Extra repetitions after the first run; `-1` repeats forever.
    pub repeat_count: i32,
    /// Play back to the start after reaching the end.
    pub reverses: bool,
    /// Seconds to wait before each run starts.
    pub delay: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl AnimationConfig {
    /// Config with the given duration and default easing.
    #[must_use]
    pub const fn new(duration: f64) -> Self {
        Self {
            duration,
            easing: EasingStyle::Quad,
            direction: EasingDirection::Out,
            repeat_count: 0,
            reverses: false,
            delay: 0.0,
        }
    }

    #[must_use]
    pub const fn easing(mut self, easing: EasingStyle) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub const fn direction(mut self, direction: EasingDirection) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub const fn repeat(mut self, count: i32) -> Self {
        self.repeat_count = count;
        self
    }

    #[must_use]
    pub const fn reverses(mut self, reverses: bool) -> Self {
        self.reverses = reverses;
        self
    }

    #[must_use]
    pub const fn delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Whether the animation repeats forever.
    #[must_use]
    pub const fn is_infinite(&self) -> bool {
        self.repeat_count < 0
    }

    /// Check every field is usable by an engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ConfigError::new(
                "duration",
                format!("expected a finite, non-negative number of seconds, got {}", self.duration),
            ));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(ConfigError::new(
                "delay",
                format!("expected a finite, non-negative number of seconds, got {}", self.delay),
            ));
        }
        if self.repeat_count < -1 {
            return Err(ConfigError::new(
                "repeat_count",
                format!("expected -1 or more, got {}", self.repeat_count),
            ));
        }
        Ok(())
    }
}

/// A playable animation created by an [`AnimationEngine`].
pub trait Animation {
    /// Start playback, restarting if a run is in progress.
    fn play(&self);

    /// Signal emitting the terminal state of each run.
    fn completed(&self) -> Signal<PlaybackState>;

    /// Current playback state.
    fn playback_state(&self) -> PlaybackState;
}

/// Factory for [`Animation`]s.
pub trait AnimationEngine {
    /// Build an animation moving `target` toward `properties`.
    fn create(
        &self,
        target: &Rc<dyn Target>,
        config: &AnimationConfig,
        properties: &PropertyMap,
    ) -> Result<Rc<dyn Animation>, TargetError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let config = AnimationConfig::new(0.2)
            .easing(EasingStyle::Sine)
            .direction(EasingDirection::InOut)
            .repeat(-1)
            .reverses(true)
            .delay(0.1);
        assert_eq!(config.duration, 0.2);
        assert_eq!(config.easing, EasingStyle::Sine);
        assert_eq!(config.direction, EasingDirection::InOut);
        assert!(config.is_infinite());
        assert!(config.reverses);
        assert_eq!(config.delay, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_is_one_second_quad_out() {
        let config = AnimationConfig::default();
        assert_eq!(config.duration, 1.0);
        assert_eq!(config.easing, EasingStyle::Quad);
        assert_eq!(config.direction, EasingDirection::Out);
        assert_eq!(config.repeat_count, 0);
    }

    #[test]
    fn validate_rejects_bad_fields() {
        assert_eq!(
            AnimationConfig::new(-0.5).validate().unwrap_err().field,
            "duration"
        );
        assert_eq!(
            AnimationConfig::new(f64::NAN).validate().unwrap_err().field,
            "duration"
        );
        assert_eq!(
            AnimationConfig::new(1.0)
                .delay(f64::INFINITY)
                .validate()
                .unwrap_err()
                .field,
            "delay"
        );
        assert_eq!(
            AnimationConfig::new(1.0).repeat(-2).validate().unwrap_err().field,
            "repeat_count"
        );
    }

    #[test]
    fn zero_duration_is_valid() {
        assert!(AnimationConfig::new(0.0).validate().is_ok());
    }

    #[test]
    fn playback_state_classification() {
        assert!(PlaybackState::Completed.is_success());
        assert!(PlaybackState::Completed.is_terminal());
        assert!(PlaybackState::Cancelled.is_terminal());
        assert!(!PlaybackState::Cancelled.is_success());
        assert!(!PlaybackState::Playing.is_terminal());
    }
}
