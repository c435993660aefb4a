//! Animations built from other animations.
//!
//! A composite is itself an [`Animation`]: it has its own duration and
//! listeners and ticks on the same scheduler. Its listeners drive the
//! children.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::animation::{Animation, AnimationOptions, EventKind, Subscription, WeakAnimation};
use crate::scheduler::Scheduler;
use crate::AnimationError;

/// Run `children` side by side.
///
/// The composite lasts as long as the longest child. Starting it starts
/// every child with the same missed time; `suspend`, `resume` and `stop`
/// are forwarded to every child.
///
/// # Errors
///
/// [`AnimationError::InvalidArgument`] if the options are invalid.
pub fn concurrent(children: Vec<Animation>, options: AnimationOptions) -> Result<Animation, AnimationError> {
    let duration = children.iter().map(Animation::duration).fold(0.0, f64::max);
    let composite = Animation::new(duration, options)?;
    let children = Rc::new(children);

    let forward = |kind: EventKind, action: fn(&Animation) -> Result<(), AnimationError>| {
        let children = Rc::clone(&children);
        let _ = composite.add_listener(kind, move |_| children.iter().try_for_each(action));
    };
    forward(EventKind::Suspend, Animation::suspend);
    forward(EventKind::Resume, Animation::resume);
    forward(EventKind::Stop, Animation::stop);

    let _ = composite.add_listener(EventKind::Start, move |event| {
        children
            .iter()
            .try_for_each(|child| child.start_at(event.time_delta))
    });

    Ok(composite)
}

/// Run `children` one after another.
///
/// The composite lasts as long as all children together. Each child is
/// launched once the composite's elapsed time reaches the sum of the
/// durations before it, checked on start and on every frame. A child
/// whose window was skipped entirely (for example by a late start) is
/// still started, with the overshoot as its missed time.
///
/// While a child runs, the composite's `suspend`, `resume` and `stop` are
/// forwarded to it. Those subscriptions are removed once the child is no
/// longer animating: after it stops, or after an `end` that does not loop.
///
/// # Errors
///
/// [`AnimationError::InvalidArgument`] if the options are invalid.
pub fn sequential(children: Vec<Animation>, options: AnimationOptions) -> Result<Animation, AnimationError> {
    let offsets: Vec<f64> = children
        .iter()
        .scan(0.0, |offset, child| {
            let start = *offset;
            *offset += child.duration();
            Some(start)
        })
        .collect();
    let duration = children.iter().map(Animation::duration).sum();
    let composite = Animation::new(duration, options)?;

    let launcher = Rc::new(Launcher {
        composite: composite.downgrade(),
        children,
        offsets,
        next: Cell::new(0),
    });

    let on_start = Rc::clone(&launcher);
    let _ = composite.add_listener(EventKind::Start, move |event| {
        on_start.next.set(0);
        on_start.launch_due(event.time_delta)
    });
    let _ = composite.add_listener(EventKind::Frame, move |event| launcher.launch_due(event.time_delta));

    Ok(composite)
}

struct Launcher {
    composite: WeakAnimation,
    children: Vec<Animation>,
    offsets: Vec<f64>,
    /// Index of the first child not yet launched in this run.
    next: Cell<usize>,
}

impl Launcher {
    fn launch_due(&self, elapsed: f64) -> Result<(), AnimationError> {
        while let Some(&offset) = self.offsets.get(self.next.get()) {
            if offset > elapsed {
                break;
            }
            let index = self.next.get();
            self.next.set(index + 1);

            let child = &self.children[index];
            if let Some(composite) = self.composite.upgrade() {
                Wiring::attach(&composite, child);
            }
            tracing::debug!(index, missed = elapsed - offset, "launching sequential child");
            child.start_at(elapsed - offset)?;
        }
        Ok(())
    }
}

/// Forwarding from a composite to one running child.
struct Wiring {
    composite: WeakAnimation,
    child: WeakAnimation,
    on_composite: Vec<Subscription>,
    on_child: Vec<Subscription>,
}

impl Wiring {
    fn attach(composite: &Animation, child: &Animation) {
        let forward = |kind: EventKind, action: fn(&Animation) -> Result<(), AnimationError>| {
            let target = child.clone();
            composite.add_listener(kind, move |_| action(&target))
        };
        let on_composite = vec![
            forward(EventKind::Suspend, Animation::suspend),
            forward(EventKind::Resume, Animation::resume),
            forward(EventKind::Stop, Animation::stop),
        ];

        let slot: Rc<RefCell<Option<Self>>> = Rc::new(RefCell::new(None));
        let dispose = |kind: EventKind| {
            let slot = Rc::clone(&slot);
            let watched = child.downgrade();
            child.add_listener(kind, move |_| {
                // A looping child fires `end` every cycle and keeps running.
                if watched.upgrade().is_some_and(|child| child.is_animating()) {
                    return Ok(());
                }
                let wiring = slot.borrow_mut().take();
                if let Some(wiring) = wiring {
                    wiring.dispose();
                }
                Ok(())
            })
        };
        let on_child = vec![dispose(EventKind::End), dispose(EventKind::Stop)];

        *slot.borrow_mut() = Some(Self {
            composite: composite.downgrade(),
            child: child.downgrade(),
            on_composite,
            on_child,
        });
    }

    fn dispose(self) {
        if let Some(composite) = self.composite.upgrade() {
            for subscription in &self.on_composite {
                let _ = composite.remove_listener(subscription);
            }
        }
        if let Some(child) = self.child.upgrade() {
            for subscription in &self.on_child {
                let _ = child.remove_listener(subscription);
            }
        }
    }
}

/// Something that can follow an animation in [`Animation::then`].
pub enum Step {
    /// A pause of this many milliseconds.
    Delay(f64),
    /// A callback run once, taking no time.
    Call(Rc<dyn Fn() -> Result<(), AnimationError>>),
    /// An animation, used as is.
    Animation(Animation),
}

impl Step {
    /// A step that runs `f` when reached.
    pub fn call<F>(f: F) -> Self
    where
        F: Fn() -> Result<(), AnimationError> + 'static,
    {
        Self::Call(Rc::new(f))
    }

    /// Turn the step into an animation ticking on `scheduler`.
    ///
    /// # Errors
    ///
    /// [`AnimationError::InvalidArgument`] for an invalid delay.
    pub fn into_animation(self, scheduler: &Scheduler) -> Result<Animation, AnimationError> {
        match self {
            Self::Delay(ms) => Animation::new(ms, AnimationOptions::on(scheduler)),
            Self::Call(f) => {
                let animation = Animation::new(0.0, AnimationOptions::on(scheduler))?;
                let _ = animation.add_listener(EventKind::Start, move |_| f());
                Ok(animation)
            }
            Self::Animation(animation) => Ok(animation),
        }
    }
}

impl From<f64> for Step {
    fn from(ms: f64) -> Self {
        Self::Delay(ms)
    }
}

impl From<Animation> for Step {
    fn from(animation: Animation) -> Self {
        Self::Animation(animation)
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delay(ms) => f.debug_tuple("Delay").field(ms).finish(),
            Self::Call(_) => f.write_str("Call(..)"),
            Self::Animation(animation) => f.debug_tuple("Animation").field(animation).finish(),
        }
    }
}

impl Animation {
    /// A sequential composite of this animation followed by `step`,
    /// ticking on this animation's scheduler.
    ///
    /// ```ignore
    /// let chain = fade.then(250.0)?.then(Step::call(|| Ok(())))?;
    /// ```
    ///
    /// # Errors
    ///
    /// [`AnimationError::InvalidArgument`] for an invalid delay.
    pub fn then(&self, step: impl Into<Step>) -> Result<Self, AnimationError> {
        let scheduler = self.scheduler();
        let next = step.into().into_animation(&scheduler)?;
        sequential(vec![self.clone(), next], AnimationOptions::on(&scheduler))
    }
}
