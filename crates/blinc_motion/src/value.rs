//! Animatable values
//!
//! A property animates between values of a single [`ValueKind`]. Numbers
//! cover scalar properties (x, opacity, rotate, border radius), colors are
//! straight RGBA, and [`Transform`] bundles the 2D transform channels that
//! are usually animated together.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Linear RGBA color, channels in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }
}

/// Composite 2D transform: translation, rotation (degrees) and scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Transform {
    pub translate_x: f32,
    pub translate_y: f32,
    pub rotate: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate_x: 0.0,
        translate_y: 0.0,
        rotate: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::IDENTITY
        }
    }

    pub fn rotation(degrees: f32) -> Self {
        Self {
            rotate: degrees,
            ..Self::IDENTITY
        }
    }

    pub fn scale(value: f32) -> Self {
        Self {
            scale_x: value,
            scale_y: value,
            ..Self::IDENTITY
        }
    }

    /// Builder: set translation
    pub fn with_translate(mut self, x: f32, y: f32) -> Self {
        self.translate_x = x;
        self.translate_y = y;
        self
    }

    /// Builder: set rotation
    pub fn with_rotate(mut self, degrees: f32) -> Self {
        self.rotate = degrees;
        self
    }

    /// Builder: set uniform scale
    pub fn with_scale(mut self, value: f32) -> Self {
        self.scale_x = value;
        self.scale_y = value;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The kind of an [`AnimValue`]; only values of the same kind interpolate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    Color,
    Transform,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Number => f.write_str("number"),
            ValueKind::Color => f.write_str("color"),
            ValueKind::Transform => f.write_str("transform"),
        }
    }
}

/// A value written to a render target property
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnimValue {
    Number(f32),
    Color(Rgba),
    Transform(Transform),
}

impl AnimValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            AnimValue::Number(_) => ValueKind::Number,
            AnimValue::Color(_) => ValueKind::Color,
            AnimValue::Transform(_) => ValueKind::Transform,
        }
    }

    /// Identity value for a kind: zero, transparent, identity transform
    pub fn neutral(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Number => AnimValue::Number(0.0),
            ValueKind::Color => AnimValue::Color(Rgba::TRANSPARENT),
            ValueKind::Transform => AnimValue::Transform(Transform::IDENTITY),
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            AnimValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgba> {
        match self {
            AnimValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_transform(&self) -> Option<Transform> {
        match self {
            AnimValue::Transform(t) => Some(*t),
            _ => None,
        }
    }

    /// Channel-wise comparison within `epsilon`; values of different kinds never match
    pub fn approx_eq(&self, other: &AnimValue, epsilon: f32) -> bool {
        let close = |a: f32, b: f32| (a - b).abs() <= epsilon;
        match (self, other) {
            (AnimValue::Number(a), AnimValue::Number(b)) => close(*a, *b),
            (AnimValue::Color(a), AnimValue::Color(b)) => {
                close(a.r, b.r) && close(a.g, b.g) && close(a.b, b.b) && close(a.a, b.a)
            }
            (AnimValue::Transform(a), AnimValue::Transform(b)) => {
                close(a.translate_x, b.translate_x)
                    && close(a.translate_y, b.translate_y)
                    && close(a.rotate, b.rotate)
                    && close(a.scale_x, b.scale_x)
                    && close(a.scale_y, b.scale_y)
            }
            _ => false,
        }
    }
}

impl From<f32> for AnimValue {
    fn from(value: f32) -> Self {
        AnimValue::Number(value)
    }
}

impl From<f64> for AnimValue {
    fn from(value: f64) -> Self {
        AnimValue::Number(value as f32)
    }
}

impl From<Rgba> for AnimValue {
    fn from(value: Rgba) -> Self {
        AnimValue::Color(value)
    }
}

impl From<Transform> for AnimValue {
    fn from(value: Transform) -> Self {
        AnimValue::Transform(value)
    }
}

/// Ordered mapping from property name to value
///
/// Insertion order is kept so render targets see writes in a stable order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyValues(IndexMap<String, AnimValue>);

impl PropertyValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a property
    pub fn with(mut self, property: impl Into<String>, value: impl Into<AnimValue>) -> Self {
        self.insert(property, value);
        self
    }

    pub fn insert(&mut self, property: impl Into<String>, value: impl Into<AnimValue>) {
        self.0.insert(property.into(), value.into());
    }

    pub fn get(&self, property: &str) -> Option<&AnimValue> {
        self.0.get(property)
    }

    /// Shorthand for numeric properties
    pub fn number(&self, property: &str) -> Option<f32> {
        self.get(property).and_then(AnimValue::as_number)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.0.contains_key(property)
    }

    pub fn remove(&mut self, property: &str) -> Option<AnimValue> {
        self.0.shift_remove(property)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnimValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Overwrite entries with those from `other`, appending new properties
    pub fn merge(&mut self, other: &PropertyValues) {
        for (k, v) in other.iter() {
            self.0.insert(k.to_string(), *v);
        }
    }
}

impl<K: Into<String>, V: Into<AnimValue>> FromIterator<(K, V)> for PropertyValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
