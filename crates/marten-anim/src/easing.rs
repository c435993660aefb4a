//! Easing curves.
//!
//! An easing maps linear progress `t` in `[0, 1]` to the tween factor fed to
//! property setters. All curves here satisfy `f(0) = 0` and `f(1) = 1`; the
//! overshooting and elastic ones leave `[0, 1]` in between.

use std::f64::consts::PI;
use std::fmt;
use std::rc::Rc;

use strum_macros::{Display, EnumIter, EnumString};

/// Default exponent of the power curves.
pub const DEFAULT_POWER: f64 = 2.0;

/// Default overshoot of [`overshoot_out`].
pub const DEFAULT_OVERSHOOT: f64 = 1.701_58;

/// Default amplitude of [`elastic_out`].
pub const DEFAULT_ELASTIC_AMPLITUDE: f64 = 1.0;

/// Default period of [`elastic_out`].
pub const DEFAULT_ELASTIC_PERIOD: f64 = 0.3;

/// A shareable easing function.
#[derive(Clone)]
pub struct Easing(Rc<dyn Fn(f64) -> f64>);

impl Easing {
    /// Wrap an arbitrary function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + 'static,
    {
        Self(Rc::new(f))
    }

    /// Evaluate the curve at `t`.
    #[must_use]
    pub fn apply(&self, t: f64) -> f64 {
        (self.0)(t)
    }
}

impl Default for Easing {
    fn default() -> Self {
        linear()
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Easing(..)")
    }
}

/// `f(t) = t`
#[must_use]
pub fn linear() -> Easing {
    Easing::new(|t| t)
}

/// One-dimensional cubic Bezier through the control values `p0..p3`.
///
/// `bezier(0.0, p1, p2, 1.0)` keeps the endpoints fixed.
#[must_use]
pub fn bezier(p0: f64, p1: f64, p2: f64, p3: f64) -> Easing {
    Easing::new(move |t| {
        let mt = 1.0 - t;
        mt * mt * mt * p0 + 3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t * p3
    })
}

/// `f(t) = t^power`
#[must_use]
pub fn ease_in(power: f64) -> Easing {
    Easing::new(move |t| t.powf(power))
}

/// Mirror image of [`ease_in`]: fast start, slow finish.
#[must_use]
pub fn ease_out(power: f64) -> Easing {
    reverse(&ease_in(power))
}

/// [`ease_in`] for the first half, [`ease_out`] for the second.
#[must_use]
pub fn ease_both(power: f64) -> Easing {
    combine(&ease_in(power), &ease_out(power))
}

/// Runs past the target by roughly 10% (for the default `amount`) and
/// settles back.
#[must_use]
pub fn overshoot_out(amount: f64) -> Easing {
    Easing::new(move |t| {
        let t = t - 1.0;
        t * t * ((amount + 1.0) * t + amount) + 1.0
    })
}

/// A ball dropped onto the target: four decaying bounces.
#[must_use]
pub fn bounce_out() -> Easing {
    Easing::new(bounce_out_at)
}

/// [`bounce_out`] played backwards.
#[must_use]
pub fn bounce_in() -> Easing {
    reverse(&bounce_out())
}

/// [`bounce_in`] then [`bounce_out`].
#[must_use]
pub fn bounce_both() -> Easing {
    combine(&bounce_in(), &bounce_out())
}

fn bounce_out_at(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984_375
    }
}

/// A damped spring around the target.
///
/// `amplitude` below 1 is raised to 1; `period` is the oscillation period
/// as a fraction of the whole animation.
#[must_use]
pub fn elastic_out(amplitude: f64, period: f64) -> Easing {
    let amplitude = amplitude.max(1.0);
    let phase = period / (2.0 * PI) * (1.0 / amplitude).asin();
    Easing::new(move |t| {
        if t <= 0.0 {
            0.0
        } else if t >= 1.0 {
            1.0
        } else {
            amplitude * 2f64.powf(-10.0 * t) * ((t - phase) * (2.0 * PI) / period).sin() + 1.0
        }
    })
}

/// `reverse(f)(t) = 1 - f(1 - t)`
#[must_use]
pub fn reverse(easing: &Easing) -> Easing {
    let easing = easing.clone();
    Easing::new(move |t| 1.0 - easing.apply(1.0 - t))
}

/// `ease_in` over `[0, 0.5)` and `ease_out` over `[0.5, 1]`, each rescaled
/// to its half.
#[must_use]
pub fn combine(ease_in: &Easing, ease_out: &Easing) -> Easing {
    let (ease_in, ease_out) = (ease_in.clone(), ease_out.clone());
    Easing::new(move |t| {
        if t < 0.5 {
            ease_in.apply(t * 2.0) / 2.0
        } else {
            ease_out.apply(t * 2.0 - 1.0) / 2.0 + 0.5
        }
    })
}

/// [CSS Easing § 3.2 cubic Bezier easing functions](https://www.w3.org/TR/css-easing-1/#cubic-bezier-easing-functions)
///
/// "A cubic Bézier curve is defined by four points, P0, P1, P2, and P3. P0
/// and P3 are always set to (0,0) and (1,1)."
///
/// The curve parameter for a given `t` is found with Newton's method.
#[must_use]
pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Easing {
    Easing::new(move |t| {
        if t <= 0.0 || t >= 1.0 {
            return t;
        }
        let mut guess = t;
        for _ in 0..8 {
            let error = bezier_component(x1, x2, guess) - t;
            if error.abs() < 1e-6 {
                break;
            }
            let slope = bezier_derivative(x1, x2, guess);
            if slope.abs() < 1e-6 {
                break;
            }
            guess -= error / slope;
        }
        bezier_component(y1, y2, guess)
    })
}

fn bezier_component(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

fn bezier_derivative(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

/// Easings addressable by name, with their default parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum EasingName {
    /// [`linear`]
    Linear,
    /// [`ease_in`] with [`DEFAULT_POWER`]
    EaseIn,
    /// [`ease_out`] with [`DEFAULT_POWER`]
    EaseOut,
    /// [`ease_both`] with [`DEFAULT_POWER`]
    EaseBoth,
    /// [`overshoot_out`] with [`DEFAULT_OVERSHOOT`]
    OvershootOut,
    /// [`bounce_in`]
    BounceIn,
    /// [`bounce_out`]
    BounceOut,
    /// [`bounce_both`]
    BounceBoth,
    /// [`elastic_out`] with the default amplitude and period
    ElasticOut,
    /// CSS `ease`: `cubic-bezier(0.25, 0.1, 0.25, 1)`
    CssEase,
    /// CSS `ease-in`: `cubic-bezier(0.42, 0, 1, 1)`
    CssEaseIn,
    /// CSS `ease-out`: `cubic-bezier(0, 0, 0.58, 1)`
    CssEaseOut,
    /// CSS `ease-in-out`: `cubic-bezier(0.42, 0, 0.58, 1)`
    CssEaseInOut,
}

impl EasingName {
    /// Build the named curve.
    #[must_use]
    pub fn easing(self) -> Easing {
        match self {
            Self::Linear => linear(),
            Self::EaseIn => ease_in(DEFAULT_POWER),
            Self::EaseOut => ease_out(DEFAULT_POWER),
            Self::EaseBoth => ease_both(DEFAULT_POWER),
            Self::OvershootOut => overshoot_out(DEFAULT_OVERSHOOT),
            Self::BounceIn => bounce_in(),
            Self::BounceOut => bounce_out(),
            Self::BounceBoth => bounce_both(),
            Self::ElasticOut => elastic_out(DEFAULT_ELASTIC_AMPLITUDE, DEFAULT_ELASTIC_PERIOD),
            Self::CssEase => cubic_bezier(0.25, 0.1, 0.25, 1.0),
            Self::CssEaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0),
            Self::CssEaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0),
            Self::CssEaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0),
        }
    }
}

impl From<EasingName> for Easing {
    fn from(name: EasingName) -> Self {
        name.easing()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_endpoints_are_exact() {
        for name in EasingName::iter() {
            let easing = name.easing();
            assert!(close(easing.apply(0.0), 0.0), "{name} at 0");
            assert!(close(easing.apply(1.0), 1.0), "{name} at 1");
        }
    }

    #[test]
    fn test_power_curves() {
        assert!(close(ease_in(2.0).apply(0.5), 0.25));
        assert!(close(ease_out(2.0).apply(0.5), 0.75));
        assert!(close(ease_both(2.0).apply(0.25), 0.125));
        assert!(close(ease_both(2.0).apply(0.5), 0.5));
    }

    #[test]
    fn test_overshoot_leaves_range() {
        let easing = overshoot_out(DEFAULT_OVERSHOOT);
        assert!(easing.apply(0.8) > 1.0);
        assert!(easing.apply(0.2) < 1.0);
    }

    #[test]
    fn test_bounce_out_lands_on_target() {
        let easing = bounce_out();
        assert!(close(easing.apply(1.0 / 2.75), 1.0));
        assert!(easing.apply(0.5) < 1.0);
    }

    #[test]
    fn test_bezier_control_values() {
        let easing = bezier(0.0, 0.0, 1.0, 1.0);
        assert!(close(easing.apply(0.5), 0.5));
        assert!(easing.apply(0.25) < 0.25);
    }

    #[test]
    fn test_cubic_bezier_linear_and_ease() {
        let diagonal = cubic_bezier(0.25, 0.25, 0.75, 0.75);
        assert!(close(diagonal.apply(0.3), 0.3));
        let ease = EasingName::CssEase.easing();
        assert!(ease.apply(0.5) > 0.5);
    }

    #[test]
    fn test_names_parse_kebab_case() {
        assert_eq!(EasingName::from_str("ease-both"), Ok(EasingName::EaseBoth));
        assert_eq!(EasingName::from_str("css-ease-in-out"), Ok(EasingName::CssEaseInOut));
        assert_eq!(EasingName::BounceOut.to_string(), "bounce-out");
        assert!(EasingName::from_str("wobble").is_err());
    }
}
