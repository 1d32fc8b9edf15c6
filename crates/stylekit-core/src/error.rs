#![forbid(unsafe_code)]

//! Errors raised by targets, animation engines and configuration checks.

/// Failure reported by a [`Target`](crate::target::Target) or an
/// [`AnimationEngine`](crate::animation::AnimationEngine).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TargetError {
    /// The target has no property with this key.
    #[error("target '{target}' has no property '{key}'")]
    UnknownProperty { target: String, key: String },

    /// The target exposes no event with this name.
    #[error("target '{target}' has no event '{event}'")]
    UnknownEvent { target: String, event: String },

    /// The value's type does not match the property's type.
    #[error("property '{key}' on '{target}' expects {expected}, got {found}")]
    TypeMismatch {
        target: String,
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The animation engine refused to build an animation.
    #[error("animation engine error: {0}")]
    Engine(String),
}

/// A malformed [`AnimationConfig`](crate::animation::AnimationConfig) field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid animation config field `{field}`: {reason}")]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl ConfigError {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}
