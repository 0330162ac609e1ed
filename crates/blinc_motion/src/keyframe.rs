//! Keyframes and segments
//!
//! A [`Segment`] animates one property through an ordered list of keyframes
//! over `duration` seconds, after waiting `delay` seconds. Keyframe offsets
//! are normalized positions within the segment: the first is always `0.0`
//! and the last always `1.0` once the segment is built.

use crate::easing::Easing;
use crate::error::{MotionError, Result};
use crate::interpolate::interpolate;
use crate::value::AnimValue;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A target value at a normalized position within a segment
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Position within the segment (0.0 to 1.0)
    pub offset: f32,
    /// Value at this keyframe
    pub value: AnimValue,
}

impl Keyframe {
    pub fn new(offset: f32, value: impl Into<AnimValue>) -> Self {
        Self {
            offset,
            value: value.into(),
        }
    }
}

/// Keyframes for a single property plus timing
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    property: String,
    keyframes: SmallVec<[Keyframe; 4]>,
    /// Seconds
    duration: f32,
    /// Seconds to wait before the first keyframe starts moving
    delay: f32,
    easing: Easing,
}

impl Segment {
    /// Build a segment from explicit keyframes.
    ///
    /// Offsets must be finite, within `[0, 1]` and non-decreasing. A missing
    /// keyframe at either end is implied by repeating the nearest value.
    pub fn new(
        property: impl Into<String>,
        keyframes: impl IntoIterator<Item = Keyframe>,
        duration: f32,
    ) -> Result<Self> {
        let property = property.into();
        let mut keyframes: SmallVec<[Keyframe; 4]> = keyframes.into_iter().collect();

        if keyframes.is_empty() {
            return Err(MotionError::InvalidSegment(format!(
                "`{property}` has no keyframes"
            )));
        }
        validate_time(&property, "duration", duration)?;

        let mut prev = 0.0;
        for kf in &keyframes {
            if !kf.offset.is_finite() || !(0.0..=1.0).contains(&kf.offset) {
                return Err(MotionError::InvalidSegment(format!(
                    "`{property}` keyframe offset {} is outside [0, 1]",
                    kf.offset
                )));
            }
            if kf.offset < prev {
                return Err(MotionError::InvalidSegment(format!(
                    "`{property}` keyframe offsets decrease ({} after {prev})",
                    kf.offset
                )));
            }
            prev = kf.offset;
        }

        let first = keyframes[0];
        if first.offset > 0.0 {
            keyframes.insert(0, Keyframe::new(0.0, first.value));
        }
        let last = keyframes[keyframes.len() - 1];
        if last.offset < 1.0 {
            keyframes.push(Keyframe::new(1.0, last.value));
        }

        Ok(Self {
            property,
            keyframes,
            duration,
            delay: 0.0,
            easing: Easing::Linear,
        })
    }

    /// Two-keyframe segment. Negative or non-finite durations become zero.
    pub fn tween(
        property: impl Into<String>,
        from: impl Into<AnimValue>,
        to: impl Into<AnimValue>,
        duration: f32,
    ) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        let mut keyframes = SmallVec::new();
        keyframes.push(Keyframe::new(0.0, from));
        keyframes.push(Keyframe::new(1.0, to));
        Self {
            property: property.into(),
            keyframes,
            duration,
            delay: 0.0,
            easing: Easing::Linear,
        }
    }

    /// Keyframes spread evenly over the segment: `n` values land on `i / (n - 1)`.
    pub fn from_values<V: Into<AnimValue>>(
        property: impl Into<String>,
        values: impl IntoIterator<Item = V>,
        duration: f32,
    ) -> Result<Self> {
        let values: SmallVec<[AnimValue; 8]> = values.into_iter().map(Into::into).collect();
        let last = values.len().saturating_sub(1).max(1) as f32;
        let keyframes = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Keyframe::new(i as f32 / last, value));
        Self::new(property, keyframes, duration)
    }

    /// Builder: set delay (seconds). Negative values clamp to zero.
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        self
    }

    /// Builder: set easing
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Builder: rename the animated property
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Delay plus duration
    pub fn span(&self) -> f32 {
        self.delay + self.duration
    }

    pub fn first_value(&self) -> AnimValue {
        self.keyframes[0].value
    }

    pub fn last_value(&self) -> AnimValue {
        self.keyframes[self.keyframes.len() - 1].value
    }

    /// Replace the value of the offset-0 keyframe
    pub(crate) fn rebase(&mut self, value: AnimValue) {
        self.keyframes[0].value = value;
    }

    /// Replace the value of the offset-1 keyframe
    pub(crate) fn rebase_end(&mut self, value: AnimValue) {
        let last = self.keyframes.len() - 1;
        self.keyframes[last].value = value;
    }

    /// Value at `progress` through the segment (clamped to `[0, 1]`).
    ///
    /// Easing shapes the progress between each adjacent pair of keyframes.
    pub fn sample(&self, progress: f32) -> Result<AnimValue> {
        let kfs = &self.keyframes;
        let n = kfs.len();

        if progress <= 0.0 {
            return interpolate(&self.property, &kfs[0].value, &kfs[1].value, 0.0, self.easing);
        }
        if progress >= 1.0 {
            return interpolate(
                &self.property,
                &kfs[n - 2].value,
                &kfs[n - 1].value,
                1.0,
                self.easing,
            );
        }

        // last offset is 1.0 and progress < 1.0, so a pair always matches
        let idx = kfs
            .windows(2)
            .position(|pair| progress < pair[1].offset)
            .unwrap_or(n - 2);
        let (a, b) = (&kfs[idx], &kfs[idx + 1]);
        let local = (progress - a.offset) / (b.offset - a.offset);
        interpolate(&self.property, &a.value, &b.value, local, self.easing)
    }

    /// Value at `elapsed` seconds since the segment's window opened (delay included)
    pub fn sample_at(&self, elapsed: f32) -> Result<AnimValue> {
        let local = elapsed - self.delay;
        if local < 0.0 {
            return self.sample(0.0);
        }
        if self.duration <= 0.0 {
            return self.sample(1.0);
        }
        self.sample(local / self.duration)
    }
}

fn validate_time(property: &str, what: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(MotionError::InvalidSegment(format!(
            "`{property}` {what} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}
