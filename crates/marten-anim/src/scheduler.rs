//! The shared tick timer.
//!
//! Every running animation registers one tick callback. A [`Scheduler`]
//! keeps those callbacks keyed by an increasing [`TickId`] and drives them
//! all from a single timer: the timer is considered running from the first
//! registration until the registry becomes empty again.
//!
//! Time comes from an injected [`Clock`], so tests and the CLI can replace
//! wall time with a [`ManualClock`] and call [`Scheduler::tick`] or
//! [`Scheduler::run_for`] themselves.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::AnimationError;
use crate::animation::validate_time;

/// Milliseconds between two timer ticks.
pub const TICK_INTERVAL: f64 = 20.0;

/// A source of timestamps in milliseconds.
pub trait Clock {
    /// Current time in milliseconds. Only differences are meaningful.
    fn now(&self) -> f64;
}

/// Monotonic wall time, measured from the clock's creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// A clock reading zero now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// A clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to `ms`.
    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    /// Move forward by `ms`.
    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Handle for a registered tick callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(u64);

type TickCallback = Rc<dyn Fn(f64) -> Result<(), AnimationError>>;

struct SchedulerInner {
    clock: Rc<dyn Clock>,
    listeners: RefCell<BTreeMap<TickId, TickCallback>>,
    next_id: Cell<u64>,
    timer_running: Cell<bool>,
}

/// Owner of the tick registry and its timer. Clones share state.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<SchedulerInner>,
}

thread_local! {
    static CURRENT: Scheduler = Scheduler::new(SystemClock::new());
}

impl Scheduler {
    /// A scheduler reading time from `clock`.
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            inner: Rc::new(SchedulerInner {
                clock: Rc::new(clock),
                listeners: RefCell::new(BTreeMap::new()),
                next_id: Cell::new(0),
                timer_running: Cell::new(false),
            }),
        }
    }

    /// A scheduler driven by a fresh [`ManualClock`], returned alongside.
    #[must_use]
    pub fn manual() -> (Self, ManualClock) {
        let clock = ManualClock::new();
        (Self::new(clock.clone()), clock)
    }

    /// The thread's shared scheduler, backed by a [`SystemClock`].
    ///
    /// Animations created without an explicit scheduler use this one.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.with(Self::clone)
    }

    /// The clock's current time.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.inner.clock.now()
    }

    /// Add a tick callback. It receives the tick timestamp.
    pub fn register<F>(&self, callback: F) -> TickId
    where
        F: Fn(f64) -> Result<(), AnimationError> + 'static,
    {
        let id = TickId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        let _ = self.inner.listeners.borrow_mut().insert(id, Rc::new(callback));

        if !self.inner.timer_running.replace(true) {
            tracing::debug!("tick timer started");
        }
        id
    }

    /// Remove a tick callback. Returns false if it was not registered.
    ///
    /// Removal is visible immediately, including to a tick pass already in
    /// progress.
    pub fn unregister(&self, id: TickId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let removed = listeners.remove(&id).is_some();
        if listeners.is_empty() && self.inner.timer_running.replace(false) {
            tracing::debug!("tick timer stopped");
        }
        removed
    }

    /// Whether any callback is registered (the timer is running).
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.inner.timer_running.get()
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Run one timer pass at the clock's current time.
    ///
    /// Callbacks run in registration order. The set of ids is taken when
    /// the pass begins: callbacks registered during the pass wait for the
    /// next one, and callbacks removed during the pass are skipped.
    ///
    /// # Errors
    ///
    /// The first callback error ends the pass and is returned.
    pub fn tick(&self) -> Result<(), AnimationError> {
        let now = self.now();
        let ids: Vec<TickId> = self.inner.listeners.borrow().keys().copied().collect();
        for id in ids {
            let callback = self.inner.listeners.borrow().get(&id).map(Rc::clone);
            if let Some(callback) = callback {
                callback(now)?;
            }
        }
        Ok(())
    }

    /// Tick every [`TICK_INTERVAL`] of wall time until nothing is
    /// registered.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first tick error.
    pub fn run(&self) -> Result<(), AnimationError> {
        let interval = Duration::from_secs_f64(TICK_INTERVAL / 1000.0);
        while self.is_ticking() {
            std::thread::sleep(interval);
            self.tick()?;
        }
        Ok(())
    }

    /// Advance `clock` by `ms` in [`TICK_INTERVAL`] steps, ticking after
    /// each step. The last step is shortened to land exactly on `ms`.
    ///
    /// # Errors
    ///
    /// [`AnimationError::InvalidArgument`] for a negative or non-finite
    /// `ms`. Otherwise stops at and returns the first tick error.
    pub fn run_for(&self, clock: &ManualClock, ms: f64) -> Result<(), AnimationError> {
        let mut remaining = validate_time("run length", ms)?;
        while remaining > 0.0 {
            let step = remaining.min(TICK_INTERVAL);
            clock.advance(step);
            remaining -= step;
            self.tick()?;
        }
        Ok(())
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now())
            .field("listeners", &self.listener_count())
            .field("ticking", &self.is_ticking())
            .finish()
    }
}
