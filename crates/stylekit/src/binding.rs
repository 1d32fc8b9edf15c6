#![forbid(unsafe_code)]

//! Templates recorded on a style by `connect` / `connect_fn`.
//!
//! An [`AnimationBinding`] is immutable once created: end-state properties,
//! the engine config, and optional start/complete hooks. Plain callbacks are
//! stored as [`EventCallback`]s.

use std::fmt;
use std::rc::Rc;

use stylekit_core::{Animation, AnimationConfig, EventArgs, PropertyMap};

use crate::error::{Result, StyleError};

/// Hook invoked with the animation a binding drives.
pub type AnimationCallback = Rc<dyn Fn(&Rc<dyn Animation>)>;

/// Plain handler subscribed directly to a target event.
pub type EventCallback = Rc<dyn Fn(&EventArgs)>;

/// Optional start/complete hooks for [`StyleDefinition::connect`].
///
/// [`StyleDefinition::connect`]: crate::StyleDefinition::connect
///
/// # Examples
///
/// ```ignore
/// let hooks = AnimationHooks::new()
///     .on_start(|_| println!("start"))
///     .on_complete(|_| println!("done"));
/// ```
#[derive(Clone, Default)]
pub struct AnimationHooks {
    on_start: Option<AnimationCallback>,
    on_complete: Option<AnimationCallback>,
}

impl AnimationHooks {
    /// No hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` synchronously every time the animation is (re)played.
    #[must_use]
    pub fn on_start(mut self, f: impl Fn(&Rc<dyn Animation>) + 'static) -> Self {
        self.on_start = Some(Rc::new(f));
        self
    }

    /// Run `f` once per run that completes successfully.
    #[must_use]
    pub fn on_complete(mut self, f: impl Fn(&Rc<dyn Animation>) + 'static) -> Self {
        self.on_complete = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for AnimationHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHooks")
            .field("on_start", &self.on_start.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// One event-triggered animation template.
pub struct AnimationBinding {
    config: AnimationConfig,
    properties: PropertyMap,
    on_start: Option<AnimationCallback>,
    on_complete: Option<AnimationCallback>,
}

impl AnimationBinding {
    /// Validate inputs and build the binding.
    pub(crate) fn new(
        config: AnimationConfig,
        properties: PropertyMap,
        hooks: AnimationHooks,
    ) -> Result<Self> {
        config.validate()?;
        validate_properties("properties", &properties)?;
        Ok(Self {
            config,
            properties,
            on_start: hooks.on_start,
            on_complete: hooks.on_complete,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// End state the animation moves toward.
    #[must_use]
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    #[must_use]
    pub fn on_start(&self) -> Option<&AnimationCallback> {
        self.on_start.as_ref()
    }

    #[must_use]
    pub fn on_complete(&self) -> Option<&AnimationCallback> {
        self.on_complete.as_ref()
    }
}

impl fmt::Debug for AnimationBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationBinding")
            .field("config", &self.config)
            .field("properties", &self.properties)
            .field("on_start", &self.on_start.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Event names must be non-empty and carry no surrounding whitespace.
pub(crate) fn validate_event_name(event: &str) -> Result<()> {
    if event.is_empty() {
        return Err(StyleError::invalid("event", "event name must not be empty"));
    }
    if event.trim() != event {
        return Err(StyleError::invalid(
            "event",
            format!("event name {event:?} has surrounding whitespace"),
        ));
    }
    Ok(())
}

/// Property keys must be non-empty and carry no surrounding whitespace.
pub(crate) fn validate_properties(argument: &'static str, properties: &PropertyMap) -> Result<()> {
    for key in properties.keys() {
        if key.is_empty() || key.trim() != key {
            return Err(StyleError::invalid(
                argument,
                format!("property key {key:?} is not a valid name"),
            ));
        }
    }
    Ok(())
}

/// Style names follow the same rule as event names.
pub(crate) fn validate_style_name(name: &str) -> Result<()> {
    if name.is_empty() || name.trim() != name {
        return Err(StyleError::invalid(
            "name",
            format!("style name {name:?} is not a valid name"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylekit_core::props;

    #[test]
    fn event_name_rules() {
        assert!(validate_event_name("MouseEnter").is_ok());
        assert!(validate_event_name("").is_err());
        assert!(validate_event_name(" MouseEnter").is_err());
    }

    #[test]
    fn property_key_rules() {
        assert!(validate_properties("properties", &props! { "color" => "red" }).is_ok());
        assert!(validate_properties("properties", &props! {}).is_ok());
        let err = validate_properties("properties", &props! { "" => 1 }).unwrap_err();
        assert!(matches!(
            err,
            StyleError::InvalidArgument {
                argument: "properties",
                ..
            }
        ));
    }

    #[test]
    fn binding_rejects_bad_config() {
        let result = AnimationBinding::new(
            AnimationConfig::new(f64::NAN),
            props! { "color" => "blue" },
            AnimationHooks::new(),
        );
        assert!(matches!(
            result,
            Err(StyleError::InvalidArgument {
                argument: "config",
                ..
            })
        ));
    }

    #[test]
    fn binding_keeps_hooks() {
        let binding = AnimationBinding::new(
            AnimationConfig::new(0.2),
            props! { "color" => "blue" },
            AnimationHooks::new().on_complete(|_| {}),
        )
        .unwrap();
        assert!(binding.on_start().is_none());
        assert!(binding.on_complete().is_some());
        assert_eq!(binding.config().duration, 0.2);
        let debug = format!("{binding:?}");
        assert!(debug.contains("on_complete: true"));
    }
}
