#![forbid(unsafe_code)]

//! Style errors.
//!
//! Validation failures are raised synchronously by the call that violates
//! the contract. Failures from targets and animation engines are propagated
//! unchanged inside [`StyleError::Target`]. Disposal never fails.

use stylekit_core::{ConfigError, TargetError};

/// Errors from style operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StyleError {
    /// The name is already held by another definition in the registry.
    #[error("a style named '{name}' is already registered")]
    DuplicateName { name: String },

    /// An argument failed validation.
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    /// A target or animation engine rejected an operation.
    #[error(transparent)]
    Target(#[from] TargetError),

    /// The definition was destroyed.
    #[error("style {} has been destroyed", display_name(.name))]
    Destroyed { name: Option<String> },
}

impl StyleError {
    pub(crate) fn invalid(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }
}

impl From<ConfigError> for StyleError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidArgument {
            argument: "config",
            reason: err.to_string(),
        }
    }
}

pub(crate) fn display_name(name: &Option<String>) -> String {
    match name {
        Some(name) => format!("'{name}'"),
        None => "<anonymous>".to_owned(),
    }
}

/// Result alias for style operations.
pub type Result<T> = std::result::Result<T, StyleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            StyleError::DuplicateName {
                name: "Button".into()
            }
            .to_string(),
            "a style named 'Button' is already registered"
        );
        assert_eq!(
            StyleError::invalid("event", "must not be empty").to_string(),
            "invalid argument `event`: must not be empty"
        );
        assert_eq!(
            StyleError::Destroyed { name: None }.to_string(),
            "style <anonymous> has been destroyed"
        );
        assert_eq!(
            StyleError::Destroyed {
                name: Some("Card".into())
            }
            .to_string(),
            "style 'Card' has been destroyed"
        );
    }

    #[test]
    fn config_errors_become_invalid_argument() {
        let err: StyleError = stylekit_core::AnimationConfig::new(-1.0)
            .validate()
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            StyleError::InvalidArgument {
                argument: "config",
                ..
            }
        ));
    }

    #[test]
    fn target_errors_pass_through() {
        let inner = TargetError::Engine("boom".into());
        let err = StyleError::from(inner.clone());
        assert_eq!(err.to_string(), inner.to_string());
    }
}
