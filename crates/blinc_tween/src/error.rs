//! Tween error types

use thiserror::Error;

/// Errors raised while building or playing tweens
///
/// Plugin and action faults are never caught inside the engine: they abort
/// the resolution that raised them and surface to whoever called
/// `set_position`, `tick`, or the registry tick.
#[derive(Error, Debug)]
pub enum TweenError {
    /// A plugin hook failed for a property
    #[error("Plugin failed on property `{property}`: {message}")]
    Plugin { property: String, message: String },

    /// An action callback failed
    #[error("Action failed: {0}")]
    Action(String),

    /// Tweens are not duplicable
    #[error("Tween can not be duplicated")]
    DuplicateUnsupported,

    /// Tween options could not be parsed
    #[error("Invalid tween options: {0}")]
    Options(#[from] toml::de::Error),
}

impl TweenError {
    /// Build a plugin fault for `property`
    pub fn plugin(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            property: property.into(),
            message: message.into(),
        }
    }

    /// Build an action fault
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action(message.into())
    }
}

/// Result type for tween operations
pub type Result<T> = std::result::Result<T, TweenError>;
