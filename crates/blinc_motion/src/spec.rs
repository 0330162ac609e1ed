//! Data-driven timelines
//!
//! [`TimelineSpec`] is the serde form of a [`Timeline`], for animations kept
//! in TOML or JSON next to the UI that plays them.
//!
//! ```toml
//! mode = "parallel"
//! repeat = { count = 2 }
//! direction = "alternate"
//!
//! [[segments]]
//! property = "scale"
//! values = [1.0, 1.4, 1.4, 1.0, 1.0]
//! duration = 2.0
//! easing = "ease_in_out"
//! ```

use crate::easing::Easing;
use crate::error::{MotionError, Result};
use crate::keyframe::{Keyframe, Segment};
use crate::timeline::{PlayDirection, Repeat, Timeline, TimelineMode};
use crate::value::AnimValue;
use serde::{Deserialize, Serialize};

/// One segment: either explicit `keyframes` or evenly spaced `values`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentSpec {
    pub property: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<Keyframe>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<AnimValue>,
    /// Seconds
    pub duration: f32,
    #[serde(default)]
    pub delay: f32,
    #[serde(default)]
    pub easing: Easing,
}

impl SegmentSpec {
    pub fn build(&self) -> Result<Segment> {
        let segment = match (self.keyframes.is_empty(), self.values.is_empty()) {
            (false, true) => {
                Segment::new(&self.property, self.keyframes.iter().copied(), self.duration)?
            }
            (true, false) => {
                Segment::from_values(&self.property, self.values.iter().copied(), self.duration)?
            }
            (false, false) => {
                return Err(MotionError::InvalidSegment(format!(
                    "`{}` sets both keyframes and values",
                    self.property
                )))
            }
            (true, true) => {
                return Err(MotionError::InvalidSegment(format!(
                    "`{}` has no keyframes",
                    self.property
                )))
            }
        };
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(MotionError::InvalidSegment(format!(
                "`{}` delay must be a non-negative number, got {}",
                self.property, self.delay
            )));
        }
        Ok(segment.with_delay(self.delay).with_easing(self.easing))
    }
}

/// Serializable description of a [`Timeline`]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimelineSpec {
    pub mode: TimelineMode,
    pub repeat: Repeat,
    pub direction: PlayDirection,
    pub segments: Vec<SegmentSpec>,
}

impl TimelineSpec {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate every segment and assemble the timeline
    pub fn build(&self) -> Result<Timeline> {
        let segments = self
            .segments
            .iter()
            .map(SegmentSpec::build)
            .collect::<Result<Vec<_>>>()?;
        Ok(Timeline::new(self.mode, segments)
            .with_repeat(self.repeat)
            .with_direction(self.direction))
    }
}
