//! Timed animations.
//!
//! An [`Animation`] is a handle to a small state machine:
//!
//! ```text
//! Idle ──start──▶ Running ◀──resume── Suspended
//!                  │   └────suspend─────▲
//!                  ├──(elapsed ≥ duration)──▶ Done
//!                  └──stop──▶ Stopped
//! ```
//!
//! While running it holds one tick registration on its [`Scheduler`]. Each
//! tick computes the elapsed time, the eased factor, and notifies `frame`
//! listeners. Nothing is drawn here: listeners do the actual work.
//!
//! A running animation is kept alive by its scheduler registration, so a
//! started animation plays to the end even if every handle is dropped.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use strum_macros::{Display, EnumIter, EnumString};

use crate::easing::Easing;
use crate::scheduler::{Scheduler, TickId};
use crate::AnimationError;

/// The six listener lists of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    /// Fired synchronously by `start`, before the first tick is scheduled.
    Start,
    /// Fired on every tick while running.
    Frame,
    /// Fired by `suspend`.
    Suspend,
    /// Fired by `resume`.
    Resume,
    /// Fired once when the elapsed time reaches the duration.
    End,
    /// Fired by `stop` on an active animation. Never followed by `End`.
    Stop,
}

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    /// Created, never started.
    Idle,
    /// Registered with the scheduler and advancing.
    Running,
    /// Registered, but ticks are ignored until `resume`.
    Suspended,
    /// Reached its duration without looping.
    Done,
    /// Cancelled by `stop`.
    Stopped,
}

/// What a listener is told.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationEvent {
    /// Which list is being notified.
    pub kind: EventKind,
    /// Elapsed milliseconds, in `[0, duration]`.
    pub time_delta: f64,
    /// Eased progress for `time_delta`.
    pub factor: f64,
}

/// A listener callback.
pub type Listener = Rc<dyn Fn(&AnimationEvent) -> Result<(), AnimationError>>;

/// Handle returned by [`Animation::add_listener`], used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    kind: EventKind,
    id: u64,
}

impl Subscription {
    /// The event the listener is registered for.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }
}

/// Construction options.
#[derive(Debug, Clone, Default)]
pub struct AnimationOptions {
    /// Restart immediately after `End`.
    pub looping: bool,
    /// Progress curve. Linear by default.
    pub easing: Easing,
    /// Scheduler to tick on. The thread's shared scheduler when `None`.
    pub scheduler: Option<Scheduler>,
}

impl AnimationOptions {
    /// Options ticking on `scheduler`, otherwise default.
    #[must_use]
    pub fn on(scheduler: &Scheduler) -> Self {
        Self {
            scheduler: Some(scheduler.clone()),
            ..Self::default()
        }
    }

    /// Replace the easing.
    #[must_use]
    pub fn with_easing(mut self, easing: impl Into<Easing>) -> Self {
        self.easing = easing.into();
        self
    }

    /// Enable or disable looping.
    #[must_use]
    pub const fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }
}

struct AnimationInner {
    duration: f64,
    looping: bool,
    easing: Easing,
    scheduler: Scheduler,
    state: AnimationState,
    time_delta: f64,
    factor: f64,
    /// Scheduler time at which `time_delta` was zero.
    anchor: f64,
    suspended_at: f64,
    tick: Option<TickId>,
    /// Bumped by every start and stop, so a tick can tell whether a
    /// listener restarted or cancelled the run it belongs to.
    generation: u64,
    listeners: Vec<(Subscription, Listener)>,
    next_listener: u64,
}

/// A shared handle to one animation. Clones refer to the same animation.
#[derive(Clone)]
pub struct Animation {
    inner: Rc<RefCell<AnimationInner>>,
}

/// A non-owning [`Animation`] reference.
#[derive(Clone)]
pub struct WeakAnimation {
    inner: Weak<RefCell<AnimationInner>>,
}

impl WeakAnimation {
    /// The animation, if any handle still owns it.
    #[must_use]
    pub fn upgrade(&self) -> Option<Animation> {
        self.inner.upgrade().map(|inner| Animation { inner })
    }
}

pub(crate) fn validate_time(what: &str, value: f64) -> Result<f64, AnimationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AnimationError::InvalidArgument(format!(
            "{what} must be a finite, non-negative number of milliseconds (got {value})"
        )))
    }
}

impl Animation {
    /// Create an idle animation lasting `duration` milliseconds.
    ///
    /// # Errors
    ///
    /// [`AnimationError::InvalidArgument`] for a negative or non-finite
    /// duration.
    pub fn new(duration: f64, options: AnimationOptions) -> Result<Self, AnimationError> {
        let duration = validate_time("duration", duration)?;
        let AnimationOptions {
            looping,
            easing,
            scheduler,
        } = options;
        Ok(Self {
            inner: Rc::new(RefCell::new(AnimationInner {
                duration,
                looping,
                easing,
                scheduler: scheduler.unwrap_or_else(Scheduler::current),
                state: AnimationState::Idle,
                time_delta: 0.0,
                factor: 0.0,
                anchor: 0.0,
                suspended_at: 0.0,
                tick: None,
                generation: 0,
                listeners: Vec::new(),
                next_listener: 0,
            })),
        })
    }

    /// A non-owning reference to this animation.
    #[must_use]
    pub fn downgrade(&self) -> WeakAnimation {
        WeakAnimation {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether two handles refer to the same animation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Start from the beginning. See [`Animation::start_at`].
    ///
    /// # Errors
    ///
    /// Propagates errors from `start` listeners.
    pub fn start(&self) -> Result<(), AnimationError> {
        self.start_at(0.0)
    }

    /// Start as if `missed` milliseconds had already elapsed.
    ///
    /// Works from any state. An active animation is restarted: its tick
    /// registration is replaced and no `stop` event fires. `start`
    /// listeners run before the first tick is scheduled; if one fails the
    /// animation is left stopped.
    ///
    /// # Errors
    ///
    /// [`AnimationError::InvalidArgument`] for a negative or non-finite
    /// `missed`, [`AnimationError::NonNumericTween`] if the easing yields
    /// a non-finite factor at `missed` (the animation is stopped before
    /// any `start` listener runs), or the first listener error.
    pub fn start_at(&self, missed: f64) -> Result<(), AnimationError> {
        let missed = validate_time("missed time delta", missed)?;
        let scheduler = {
            let mut inner = self.inner.borrow_mut();
            if let Some(tick) = inner.tick.take() {
                let _ = inner.scheduler.unregister(tick);
            }
            let now = inner.scheduler.now();
            inner.state = AnimationState::Running;
            inner.generation += 1;
            inner.anchor = now - missed;
            inner.time_delta = missed.min(inner.duration);
            inner.factor = inner.easing.apply(progress(inner.time_delta, inner.duration));
            tracing::debug!(duration = inner.duration, missed, "animation started");
            inner.scheduler.clone()
        };

        let factor = self.factor();
        if !factor.is_finite() {
            self.stop()?;
            return Err(AnimationError::NonNumericTween(factor));
        }

        if let Err(error) = self.dispatch(EventKind::Start) {
            self.inner.borrow_mut().state = AnimationState::Stopped;
            return Err(error);
        }

        // A start listener may have stopped or restarted us.
        let mut inner = self.inner.borrow_mut();
        if inner.state == AnimationState::Running && inner.tick.is_none() {
            let this = self.clone();
            inner.tick = Some(scheduler.register(move |now| this.on_tick(now)));
        }
        Ok(())
    }

    /// Freeze a running animation. Ticks are ignored until
    /// [`Animation::resume`]. No-op in any other state.
    ///
    /// # Errors
    ///
    /// Propagates errors from `suspend` listeners.
    pub fn suspend(&self) -> Result<(), AnimationError> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state != AnimationState::Running {
                return Ok(());
            }
            inner.state = AnimationState::Suspended;
            inner.suspended_at = inner.scheduler.now();
            tracing::debug!(time_delta = inner.time_delta, "animation suspended");
        }
        self.dispatch(EventKind::Suspend)
    }

    /// Continue a suspended animation. The time spent suspended does not
    /// count as elapsed. No-op in any other state.
    ///
    /// # Errors
    ///
    /// Propagates errors from `resume` listeners.
    pub fn resume(&self) -> Result<(), AnimationError> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state != AnimationState::Suspended {
                return Ok(());
            }
            let paused_for = inner.scheduler.now() - inner.suspended_at;
            inner.anchor += paused_for;
            inner.state = AnimationState::Running;
            tracing::debug!(paused_for, "animation resumed");
        }
        self.dispatch(EventKind::Resume)
    }

    /// Cancel a running or suspended animation.
    ///
    /// The tick registration is dropped before `stop` listeners run, so no
    /// further `frame` or `end` is delivered, even when called from a
    /// listener mid-tick. Idempotent: stopping an animation that is not
    /// active does nothing.
    ///
    /// # Errors
    ///
    /// Propagates errors from `stop` listeners.
    pub fn stop(&self) -> Result<(), AnimationError> {
        {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.state, AnimationState::Running | AnimationState::Suspended) {
                return Ok(());
            }
            if let Some(tick) = inner.tick.take() {
                let _ = inner.scheduler.unregister(tick);
            }
            inner.state = AnimationState::Stopped;
            inner.generation += 1;
            tracing::debug!(time_delta = inner.time_delta, "animation stopped");
        }
        self.dispatch(EventKind::Stop)
    }

    fn on_tick(&self, now: f64) -> Result<(), AnimationError> {
        let (generation, finished, factor) = {
            let mut inner = self.inner.borrow_mut();
            if inner.state != AnimationState::Running {
                return Ok(());
            }
            let elapsed = (now - inner.anchor).clamp(0.0, inner.duration);
            inner.time_delta = elapsed;
            inner.factor = inner.easing.apply(progress(elapsed, inner.duration));
            (inner.generation, elapsed >= inner.duration, inner.factor)
        };

        if !factor.is_finite() {
            self.stop()?;
            return Err(AnimationError::NonNumericTween(factor));
        }

        // A failed frame ends the run; it never reaches `end`.
        if let Err(error) = self.dispatch(EventKind::Frame) {
            self.stop()?;
            return Err(error);
        }
        if !finished || !self.is_current(generation) {
            return Ok(());
        }

        let looping = {
            let mut inner = self.inner.borrow_mut();
            if !inner.looping {
                if let Some(tick) = inner.tick.take() {
                    let _ = inner.scheduler.unregister(tick);
                }
                inner.state = AnimationState::Done;
                tracing::debug!(duration = inner.duration, "animation finished");
            }
            inner.looping
        };

        self.dispatch(EventKind::End)?;
        if looping && self.is_current(generation) {
            self.start()?;
        }
        Ok(())
    }

    /// Still running the same start it was at `generation`.
    fn is_current(&self, generation: u64) -> bool {
        let inner = self.inner.borrow();
        inner.generation == generation && inner.state == AnimationState::Running
    }

    fn dispatch(&self, kind: EventKind) -> Result<(), AnimationError> {
        // Snapshot first: listeners are free to add, remove, start or stop.
        let (event, listeners) = {
            let inner = self.inner.borrow();
            let event = AnimationEvent {
                kind,
                time_delta: inner.time_delta,
                factor: inner.factor,
            };
            let listeners: Vec<Listener> = inner
                .listeners
                .iter()
                .filter(|(subscription, _)| subscription.kind == kind)
                .map(|(_, listener)| Rc::clone(listener))
                .collect();
            (event, listeners)
        };
        for listener in listeners {
            listener(&event)?;
        }
        Ok(())
    }

    /// Append a listener to the `kind` list.
    pub fn add_listener<F>(&self, kind: EventKind, listener: F) -> Subscription
    where
        F: Fn(&AnimationEvent) -> Result<(), AnimationError> + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let subscription = Subscription {
            kind,
            id: inner.next_listener,
        };
        inner.next_listener += 1;
        inner.listeners.push((subscription, Rc::new(listener)));
        subscription
    }

    /// [`Animation::add_listener`] with the event given by name (`"start"`,
    /// `"frame"`, ...).
    ///
    /// # Errors
    ///
    /// [`AnimationError::InvalidEventType`] for any other name.
    pub fn add_listener_named<F>(&self, kind: &str, listener: F) -> Result<Subscription, AnimationError>
    where
        F: Fn(&AnimationEvent) -> Result<(), AnimationError> + 'static,
    {
        let kind: EventKind = kind
            .parse()
            .map_err(|_| AnimationError::InvalidEventType(kind.to_string()))?;
        Ok(self.add_listener(kind, listener))
    }

    /// Remove a listener. Returns false if it was already removed.
    pub fn remove_listener(&self, subscription: &Subscription) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(existing, _)| existing != subscription);
        inner.listeners.len() != before
    }

    /// Running or suspended.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        matches!(
            self.inner.borrow().state,
            AnimationState::Running | AnimationState::Suspended
        )
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> AnimationState {
        self.inner.borrow().state
    }

    /// Total length in milliseconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.inner.borrow().duration
    }

    /// Elapsed milliseconds as of the last tick (or start).
    #[must_use]
    pub fn time_delta(&self) -> f64 {
        self.inner.borrow().time_delta
    }

    /// Eased progress as of the last tick (or start).
    #[must_use]
    pub fn factor(&self) -> f64 {
        self.inner.borrow().factor
    }

    /// The scheduler this animation ticks on.
    #[must_use]
    pub fn scheduler(&self) -> Scheduler {
        self.inner.borrow().scheduler.clone()
    }
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Animation")
            .field("duration", &inner.duration)
            .field("state", &inner.state)
            .field("time_delta", &inner.time_delta)
            .field("looping", &inner.looping)
            .finish_non_exhaustive()
    }
}

/// Linear progress; a zero-length animation is always complete.
fn progress(elapsed: f64, duration: f64) -> f64 {
    if duration > 0.0 {
        elapsed / duration
    } else {
        1.0
    }
}
