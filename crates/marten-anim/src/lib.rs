//! Tick-driven animations for the Marten DOM.
//!
//! - [`scheduler`]: the shared 20 ms timer and its clocks
//! - [`animation`]: the start / suspend / resume / stop state machine
//! - [`composite`]: concurrent and sequential composition, `then` chains
//! - [`easing`]: progress curves
//! - [`property`]: CSS property and attribute tweens
//!
//! Everything is single-threaded: handles are `Rc`-based and every
//! callback runs synchronously inside [`Scheduler::tick`] or the call that
//! triggered it.

/// Timed animations.
pub mod animation;
/// Composite animations.
pub mod composite;
/// Easing curves.
pub mod easing;
/// Errors.
pub mod error;
/// Property tweens.
pub mod property;
/// The tick timer.
pub mod scheduler;

pub use animation::{
    Animation, AnimationEvent, AnimationOptions, AnimationState, EventKind, Listener, Subscription,
    WeakAnimation,
};
pub use composite::{Step, concurrent, sequential};
pub use easing::{Easing, EasingName};
pub use error::AnimationError;
pub use property::{PropertyAnimation, PropertyKind, PropertyValue, StyleHost, Unit, css_animation};
pub use scheduler::{Clock, ManualClock, Scheduler, SystemClock, TICK_INTERVAL, TickId};
