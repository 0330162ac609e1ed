//! Value interpolation
//!
//! [`interpolate`] is pure: the same inputs always give the same output and
//! nothing outside the return value is touched. The endpoints are returned
//! verbatim so `t = 0` and `t = 1` never suffer float rounding.

use crate::easing::Easing;
use crate::error::{MotionError, Result};
use crate::value::{AnimValue, Rgba, Transform};

/// Types that blend linearly between two values of themselves.
///
/// `t = 0.0` gives `self`, `t = 1.0` gives `to`. Values outside the unit
/// range extrapolate, which overshooting easings rely on.
pub trait Interpolate: Sized {
    fn interpolate(&self, to: &Self, t: f32) -> Self;
}

#[inline]
fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

impl Interpolate for f32 {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        lerp(*self, *to, t)
    }
}

impl Interpolate for Rgba {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        Rgba {
            r: lerp(self.r, to.r, t),
            g: lerp(self.g, to.g, t),
            b: lerp(self.b, to.b, t),
            a: lerp(self.a, to.a, t),
        }
    }
}

impl Interpolate for Transform {
    /// Channels blend independently; rotation takes the literal path, so
    /// 0 -> 360 spins a full turn.
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        Transform {
            translate_x: lerp(self.translate_x, to.translate_x, t),
            translate_y: lerp(self.translate_y, to.translate_y, t),
            rotate: lerp(self.rotate, to.rotate, t),
            scale_x: lerp(self.scale_x, to.scale_x, t),
            scale_y: lerp(self.scale_y, to.scale_y, t),
        }
    }
}

/// Interpolate `property` from `from` to `to` at raw progress `t` shaped by `easing`.
///
/// Fails with [`MotionError::InvalidKeyframeType`] if the two values are of
/// different kinds. The kind check runs even at the endpoints.
pub fn interpolate(
    property: &str,
    from: &AnimValue,
    to: &AnimValue,
    t: f32,
    easing: Easing,
) -> Result<AnimValue> {
    if from.kind() != to.kind() {
        return Err(mismatch(property, from, to));
    }

    if t <= 0.0 {
        return Ok(*from);
    }
    if t >= 1.0 {
        return Ok(*to);
    }

    let eased = easing.apply(t);
    let value = match (from, to) {
        (AnimValue::Number(a), AnimValue::Number(b)) => AnimValue::Number(a.interpolate(b, eased)),
        (AnimValue::Color(a), AnimValue::Color(b)) => AnimValue::Color(a.interpolate(b, eased)),
        (AnimValue::Transform(a), AnimValue::Transform(b)) => {
            AnimValue::Transform(a.interpolate(b, eased))
        }
        _ => return Err(mismatch(property, from, to)),
    };
    Ok(value)
}

fn mismatch(property: &str, from: &AnimValue, to: &AnimValue) -> MotionError {
    MotionError::InvalidKeyframeType {
        property: property.to_string(),
        from: from.kind(),
        to: to.kind(),
    }
}
