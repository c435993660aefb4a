//! Animation engine errors.

use thiserror::Error;

/// Errors raised by animations, composites and property tweens.
///
/// Errors from listeners propagate unchanged to the caller of the
/// operation that dispatched the event (`start`, a scheduler tick, ...).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimationError {
    /// A duration, missed time or option outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A listener name outside `start`, `frame`, `suspend`, `resume`,
    /// `end` and `stop`.
    #[error("invalid event type {0:?}")]
    InvalidEventType(String),

    /// The easing function returned NaN or an infinity. The animation has
    /// already been stopped when this is returned.
    #[error("easing produced a non-numeric value ({0})")]
    NonNumericTween(f64),

    /// `from` and `to` resolve to different units after percentage
    /// normalisation.
    #[error("mismatched units for {property}: {from:?} vs {to:?}")]
    MismatchedUnits {
        /// Animated property.
        property: String,
        /// Unit of the start value.
        from: String,
        /// Unit of the end value.
        to: String,
    },

    /// A property value that does not parse for its kind.
    #[error("invalid value {value:?} for {property}")]
    InvalidValue {
        /// Animated property.
        property: String,
        /// Offending text.
        value: String,
    },

    /// A failure reported by a user listener.
    #[error("listener failed: {0}")]
    Listener(String),
}
