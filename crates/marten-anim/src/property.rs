//! CSS property and attribute tweens.
//!
//! [`css_animation`] wraps an [`Animation`] with listeners that write an
//! interpolated value to every target element on each frame. How a
//! property is read, parsed, normalised and written depends on its
//! [`PropertyKind`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use marten_common::warning::warn_once;
use marten_dom::{DomTree, NodeId};
use strum_macros::Display;

use crate::animation::{Animation, AnimationOptions, EventKind};
use crate::AnimationError;

/// Element storage a property tween reads from and writes to.
pub trait StyleHost {
    /// The value of `property` currently in effect for `element`.
    fn computed_style(&self, element: NodeId, property: &str) -> Option<String>;

    /// Set `property` on `element`. Returns false if `element` can't take
    /// styles.
    fn set_style(&mut self, element: NodeId, property: &str, value: &str) -> bool;

    /// Value of the attribute `name`.
    fn attribute(&self, element: NodeId, name: &str) -> Option<String>;

    /// Set the attribute `name`. Returns false if `element` can't take
    /// attributes.
    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> bool;

    /// The containing element, used to resolve percentages.
    fn parent(&self, element: NodeId) -> Option<NodeId>;
}

/// Styles live in each element's inline `style` attribute; there is no
/// cascade, so the computed value is the declared one.
impl StyleHost for DomTree {
    fn computed_style(&self, element: NodeId, property: &str) -> Option<String> {
        self.style_property(element, property)
    }

    fn set_style(&mut self, element: NodeId, property: &str, value: &str) -> bool {
        self.set_style_property(element, property, value)
    }

    fn attribute(&self, element: NodeId, name: &str) -> Option<String> {
        self.as_element(element)?.attribute(name).map(str::to_string)
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> bool {
        Self::set_attribute(self, element, name, value)
    }

    fn parent(&self, element: NodeId) -> Option<NodeId> {
        Self::parent(self, element).filter(|&parent| self.is_element(parent))
    }
}

/// A parsed property value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    /// A plain number.
    Number(f64),
    /// A length; `unit` is `px`, `%`, `em`, ...
    Length {
        /// Magnitude.
        value: f64,
        /// Unit suffix, lowercase.
        unit: Unit,
    },
    /// An RGB colour with channels in `[0, 255]`.
    Color([f64; 3]),
}

/// Length units understood by the length kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Unit {
    /// `px`
    #[strum(to_string = "px")]
    Px,
    /// `%`
    #[strum(to_string = "%")]
    Percent,
    /// `em`
    #[strum(to_string = "em")]
    Em,
    /// `rem`
    #[strum(to_string = "rem")]
    Rem,
    /// `pt`
    #[strum(to_string = "pt")]
    Pt,
    /// `vw`
    #[strum(to_string = "vw")]
    Vw,
    /// `vh`
    #[strum(to_string = "vh")]
    Vh,
}

impl Unit {
    fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix.to_ascii_lowercase().as_str() {
            "px" => Self::Px,
            "%" => Self::Percent,
            "em" => Self::Em,
            "rem" => Self::Rem,
            "pt" => Self::Pt,
            "vw" => Self::Vw,
            "vh" => Self::Vh,
            _ => return None,
        })
    }
}

impl PropertyValue {
    /// `self + (to - self) * factor`, channel by channel for colours.
    ///
    /// Values of different shapes do not interpolate; `self` is returned.
    #[must_use]
    pub fn lerp(&self, to: &Self, factor: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * factor;
        match (*self, *to) {
            (Self::Number(a), Self::Number(b)) => Self::Number(mix(a, b)),
            (Self::Length { value: a, unit }, Self::Length { value: b, .. }) => Self::Length {
                value: mix(a, b),
                unit,
            },
            (Self::Color(a), Self::Color(b)) => {
                Self::Color([mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])])
            }
            _ => *self,
        }
    }

    const fn unit_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Color(_) => "color",
            Self::Length { unit, .. } => match unit {
                Unit::Px => "px",
                Unit::Percent => "%",
                Unit::Em => "em",
                Unit::Rem => "rem",
                Unit::Pt => "pt",
                Unit::Vw => "vw",
                Unit::Vh => "vh",
            },
        }
    }
}

impl fmt::Display for PropertyValue {
    /// The CSS text written back to the element.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Length { value, unit } => write!(f, "{value}{unit}"),
            Self::Color([r, g, b]) => {
                let channel = |c: f64| c.round().clamp(0.0, 255.0) as u8;
                write!(f, "rgb({}, {}, {})", channel(*r), channel(*g), channel(*b))
            }
        }
    }
}

/// How a property is parsed, read, normalised and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PropertyKind {
    /// `opacity`: a number clamped to `[0, 1]`.
    NumberZeroToOne,
    /// Lengths whose percentages refer to the container's width.
    HorizontalLength,
    /// Lengths whose percentages refer to the container's height.
    VerticalLength,
    /// Colours.
    Color,
    /// Anything else: a numeric attribute.
    AttributeNumber,
}

impl PropertyKind {
    /// The kind for a property name. Unknown names animate an attribute.
    #[must_use]
    pub fn for_property(name: &str) -> Self {
        match name {
            "opacity" => Self::NumberZeroToOne,
            "left" | "right" | "width" | "min-width" | "max-width" | "margin-left"
            | "margin-right" | "padding-left" | "padding-right" | "border-left-width"
            | "border-right-width" | "text-indent" | "letter-spacing" | "word-spacing" => {
                Self::HorizontalLength
            }
            "top" | "bottom" | "height" | "min-height" | "max-height" | "margin-top"
            | "margin-bottom" | "padding-top" | "padding-bottom" | "border-top-width"
            | "border-bottom-width" | "line-height" | "font-size" => Self::VerticalLength,
            "color" | "background-color" | "border-color" | "border-top-color"
            | "border-right-color" | "border-bottom-color" | "border-left-color"
            | "outline-color" => Self::Color,
            _ => Self::AttributeNumber,
        }
    }

    /// Parse `text` as a value of this kind.
    ///
    /// # Errors
    ///
    /// [`AnimationError::InvalidValue`] if it doesn't parse.
    pub fn parse(self, property: &str, text: &str) -> Result<PropertyValue, AnimationError> {
        let invalid = || AnimationError::InvalidValue {
            property: property.to_string(),
            value: text.to_string(),
        };
        let text = text.trim();
        match self {
            Self::NumberZeroToOne => parse_number(text)
                .map(|n| PropertyValue::Number(n.clamp(0.0, 1.0)))
                .ok_or_else(invalid),
            Self::AttributeNumber => parse_number(text).map(PropertyValue::Number).ok_or_else(invalid),
            Self::HorizontalLength | Self::VerticalLength => parse_length(text).ok_or_else(invalid),
            Self::Color => parse_color(text).map(PropertyValue::Color).ok_or_else(invalid),
        }
    }

    /// The element's current value, or the kind's initial value when it
    /// has none.
    ///
    /// # Errors
    ///
    /// [`AnimationError::InvalidValue`] if the stored value doesn't parse.
    pub fn current<H: StyleHost + ?Sized>(
        self,
        host: &H,
        element: NodeId,
        property: &str,
    ) -> Result<PropertyValue, AnimationError> {
        let stored = match self {
            Self::AttributeNumber => host.attribute(element, property),
            _ => host.computed_style(element, property),
        };
        match stored.as_deref().map(str::trim) {
            None | Some("") => self.parse(property, self.initial_value()),
            Some("auto") if self.is_length() => self.parse(property, "0px"),
            Some(text) => self.parse(property, text),
        }
    }

    /// Write `value` to the element.
    pub fn write<H: StyleHost + ?Sized>(self, host: &mut H, element: NodeId, property: &str, value: &PropertyValue) {
        let text = value.to_string();
        let accepted = match self {
            Self::AttributeNumber => host.set_attribute(element, property, &text),
            _ => host.set_style(element, property, &text),
        };
        if !accepted {
            warn_once("anim", &format!("node {} cannot take {property}", element.0));
        }
    }

    /// Convert a percentage length into pixels of the element's container.
    ///
    /// Horizontal lengths refer to the container's width plus its left and
    /// right padding; vertical ones to its height plus top and bottom
    /// padding. Other values are returned unchanged.
    #[must_use]
    pub fn normalise<H: StyleHost + ?Sized>(self, host: &H, element: NodeId, value: PropertyValue) -> PropertyValue {
        let PropertyValue::Length {
            value: percent,
            unit: Unit::Percent,
        } = value
        else {
            return value;
        };
        let sides: [&str; 3] = match self {
            Self::HorizontalLength => ["width", "padding-left", "padding-right"],
            Self::VerticalLength => ["height", "padding-top", "padding-bottom"],
            _ => return value,
        };
        let container: f64 = host.parent(element).map_or(0.0, |parent| {
            sides
                .iter()
                .map(|side| pixels(host.computed_style(parent, side).as_deref()))
                .sum()
        });
        PropertyValue::Length {
            value: container * percent / 100.0,
            unit: Unit::Px,
        }
    }

    const fn is_length(self) -> bool {
        matches!(self, Self::HorizontalLength | Self::VerticalLength)
    }

    const fn initial_value(self) -> &'static str {
        match self {
            Self::NumberZeroToOne => "1",
            Self::HorizontalLength | Self::VerticalLength => "0px",
            Self::Color => "#000000",
            Self::AttributeNumber => "0",
        }
    }
}

/// Pixel value of a container dimension; anything else counts as zero.
fn pixels(text: Option<&str>) -> f64 {
    match text.and_then(parse_length) {
        Some(PropertyValue::Length {
            value,
            unit: Unit::Px,
        }) => value,
        _ => 0.0,
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// `<number><unit>`; a bare `0` is `0px`.
fn parse_length(text: &str) -> Option<PropertyValue> {
    let bytes = text.as_bytes();
    let digits_from = |mut end: usize| {
        while bytes.get(end).is_some_and(|b| b.is_ascii_digit() || *b == b'.') {
            end += 1;
        }
        end
    };
    let mut split = digits_from(usize::from(matches!(bytes.first(), Some(b'+' | b'-'))));
    // An exponent needs a digit after the `e`, otherwise it starts `em`.
    if matches!(bytes.get(split), Some(b'e' | b'E')) && bytes.get(split + 1).is_some_and(u8::is_ascii_digit) {
        split = digits_from(split + 1);
    }
    let (number, suffix) = text.split_at(split);
    let value = parse_number(number)?;
    let unit = if suffix.is_empty() {
        if value != 0.0 {
            return None;
        }
        Unit::Px
    } else {
        Unit::from_suffix(suffix)?
    };
    Some(PropertyValue::Length { value, unit })
}

/// [CSS Color § 5 sRGB colors](https://www.w3.org/TR/css-color-4/#rgb-functions)
///
/// `#rgb`, `#rrggbb`, `rgb(r, g, b)` and `rgb(r%, g%, b%)`.
fn parse_color(text: &str) -> Option<[f64; 3]> {
    if let Some(hex) = text.strip_prefix('#') {
        let digits: Vec<u32> = hex.chars().map(|c| c.to_digit(16)).collect::<Option<_>>()?;
        return match digits.as_slice() {
            [r, g, b] => Some([r * 17, g * 17, b * 17].map(f64::from)),
            [r1, r2, g1, g2, b1, b2] => Some([r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2].map(f64::from)),
            _ => None,
        };
    }

    let lower = text.to_ascii_lowercase();
    let inner = lower.strip_prefix("rgb(")?.strip_suffix(')')?;
    let channels: Vec<f64> = inner
        .split(',')
        .map(|part| {
            let part = part.trim();
            match part.strip_suffix('%') {
                Some(percent) => parse_number(percent.trim()).map(|p| p * 255.0 / 100.0),
                None => parse_number(part),
            }
        })
        .collect::<Option<_>>()?;
    match channels.as_slice() {
        &[r, g, b] => Some([r, g, b].map(|c| c.clamp(0.0, 255.0))),
        _ => None,
    }
}

/// One element's resolved endpoints.
#[derive(Debug, Clone, Copy)]
struct Tween {
    element: NodeId,
    from: PropertyValue,
    to: PropertyValue,
}

/// A property tween over a set of elements, plus what is needed to chain
/// further tweens onto it.
pub struct PropertyAnimation<H: StyleHost + 'static> {
    animation: Animation,
    host: Rc<RefCell<H>>,
    elements: Vec<NodeId>,
    /// Last target value per property, used as the next `from`.
    last_to: HashMap<String, String>,
}

impl<H: StyleHost + 'static> PropertyAnimation<H> {
    /// The underlying animation.
    #[must_use]
    pub const fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Follow this tween with another on the same elements.
    ///
    /// When `from` is `None` and an earlier tween in the chain animated the
    /// same property, that tween's `to` is used. Otherwise the element's
    /// value when the new tween starts is used.
    ///
    /// # Errors
    ///
    /// As [`css_animation`].
    pub fn then_css(
        &self,
        property: &str,
        from: Option<&str>,
        to: &str,
        duration: f64,
        options: AnimationOptions,
    ) -> Result<Self, AnimationError> {
        let from = from
            .map(str::to_string)
            .or_else(|| self.last_to.get(property).cloned());
        let next = css_animation(&self.host, &self.elements, property, from.as_deref(), to, duration, options)?;
        let animation = self.animation.then(next.animation)?;

        let mut last_to = self.last_to.clone();
        let _ = last_to.insert(property.to_string(), to.to_string());
        Ok(Self {
            animation,
            host: Rc::clone(&self.host),
            elements: self.elements.clone(),
            last_to,
        })
    }
}

impl<H: StyleHost + 'static> Deref for PropertyAnimation<H> {
    type Target = Animation;

    fn deref(&self) -> &Animation {
        &self.animation
    }
}

impl<H: StyleHost + 'static> fmt::Debug for PropertyAnimation<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAnimation")
            .field("animation", &self.animation)
            .field("elements", &self.elements)
            .field("last_to", &self.last_to)
            .finish_non_exhaustive()
    }
}

/// Animate `property` on `elements` from `from` to `to`.
///
/// Endpoints are resolved on every start: a missing `from` is read from
/// each element, and percentages are converted to pixels of the element's
/// container. The start value is written immediately, then every frame
/// writes `from + (to - from) * factor`.
///
/// Unknown property names animate a numeric attribute of that name.
///
/// # Errors
///
/// [`AnimationError::InvalidValue`] if `from` or `to` doesn't parse, or
/// [`AnimationError::InvalidArgument`] for an invalid duration. Units are
/// compared on start; a mismatch fails the start with
/// [`AnimationError::MismatchedUnits`].
pub fn css_animation<H: StyleHost + 'static>(
    host: &Rc<RefCell<H>>,
    elements: &[NodeId],
    property: &str,
    from: Option<&str>,
    to: &str,
    duration: f64,
    options: AnimationOptions,
) -> Result<PropertyAnimation<H>, AnimationError> {
    let kind = PropertyKind::for_property(property);
    if kind == PropertyKind::AttributeNumber {
        warn_once("anim", &format!("unknown property {property:?}, animating it as an attribute"));
    }

    let to_value = kind.parse(property, to)?;
    let from_value = from.map(|text| kind.parse(property, text)).transpose()?;
    let animation = Animation::new(duration, options)?;
    let tweens: Rc<RefCell<Vec<Tween>>> = Rc::new(RefCell::new(Vec::new()));

    let start_host = Rc::clone(host);
    let start_tweens = Rc::clone(&tweens);
    let start_elements = elements.to_vec();
    let start_property = property.to_string();
    let _ = animation.add_listener(EventKind::Start, move |event| {
        let mut host = start_host.borrow_mut();
        let mut resolved = Vec::with_capacity(start_elements.len());
        for &element in &start_elements {
            let from = match from_value {
                Some(value) => value,
                None => kind.current(&*host, element, &start_property)?,
            };
            let from = kind.normalise(&*host, element, from);
            let to = kind.normalise(&*host, element, to_value);
            if from.unit_name() != to.unit_name() {
                return Err(AnimationError::MismatchedUnits {
                    property: start_property.clone(),
                    from: from.unit_name().to_string(),
                    to: to.unit_name().to_string(),
                });
            }
            resolved.push(Tween { element, from, to });
        }
        for tween in &resolved {
            kind.write(&mut *host, tween.element, &start_property, &tween.from.lerp(&tween.to, event.factor));
        }
        *start_tweens.borrow_mut() = resolved;
        Ok(())
    });

    let frame_host = Rc::clone(host);
    let frame_property = property.to_string();
    let _ = animation.add_listener(EventKind::Frame, move |event| {
        let mut host = frame_host.borrow_mut();
        for tween in tweens.borrow().iter() {
            kind.write(&mut *host, tween.element, &frame_property, &tween.from.lerp(&tween.to, event.factor));
        }
        Ok(())
    });

    let mut last_to = HashMap::new();
    let _ = last_to.insert(property.to_string(), to.to_string());
    Ok(PropertyAnimation {
        animation,
        host: Rc::clone(host),
        elements: elements.to_vec(),
        last_to,
    })
}
