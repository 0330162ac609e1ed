//! Transitions and declarative targets
//!
//! [`Transition`] is the timing half of a declarative animation: how long,
//! how eased, how often. [`Animate`] pairs it with a property group and
//! restarts the animation only when the declared target actually changes,
//! so unrelated re-renders of the host component don't restart motion.

use crate::controller::{ControlHandle, PropertyGroup, StartOptions};
use crate::easing::Easing;
use crate::error::Result;
use crate::keyframe::Segment;
use crate::timeline::{PlayDirection, Repeat, Timeline};
use crate::value::{AnimValue, PropertyValues};
use serde::{Deserialize, Serialize};

/// Timing for a declarative animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transition {
    /// Seconds
    pub duration: f32,
    /// Seconds before motion starts
    pub delay: f32,
    pub easing: Easing,
    pub repeat: Repeat,
    pub direction: PlayDirection,
}

impl Default for Transition {
    fn default() -> Self {
        Self {
            duration: 0.3,
            delay: 0.0,
            easing: Easing::EaseOut,
            repeat: Repeat::Count(1),
            direction: PlayDirection::Forward,
        }
    }
}

impl Transition {
    /// Transition of `duration` seconds with default easing
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    /// Builder: set delay
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// Builder: set easing
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Builder: set repeat
    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Builder: set direction
    pub fn with_direction(mut self, direction: PlayDirection) -> Self {
        self.direction = direction;
        self
    }

    fn apply(&self, segment: Segment) -> Segment {
        segment.with_delay(self.delay).with_easing(self.easing)
    }

    fn finish(&self, timeline: Timeline) -> Timeline {
        timeline
            .with_repeat(self.repeat)
            .with_direction(self.direction)
    }

    /// Parallel tweens from `from` to every property in `to`.
    ///
    /// A property missing from `from` starts at its target and does not move.
    pub fn timeline(&self, from: &PropertyValues, to: &PropertyValues) -> Timeline {
        let segments = to.iter().map(|(property, target)| {
            let start = from.get(property).copied().unwrap_or(*target);
            self.apply(Segment::tween(property, start, *target, self.duration))
        });
        self.finish(Timeline::parallel(segments))
    }

    /// Parallel keyframe tracks sharing this transition's timing.
    ///
    /// Each track's values are spread evenly across the duration.
    pub fn keyframes<P, I>(&self, tracks: impl IntoIterator<Item = (P, I)>) -> Result<Timeline>
    where
        P: Into<String>,
        I: IntoIterator<Item = AnimValue>,
    {
        let segments = tracks
            .into_iter()
            .map(|(property, values)| {
                Segment::from_values(property, values, self.duration).map(|s| self.apply(s))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.finish(Timeline::parallel(segments)))
    }
}

/// Declarative animation binding for one property group
///
/// Call [`update`](Animate::update) with the target declared by every render;
/// a new animation starts only when the target differs from the last one.
#[derive(Clone, Debug)]
pub struct Animate {
    group: PropertyGroup,
    transition: Transition,
    declared: Option<PropertyValues>,
    epsilon: f32,
}

impl Animate {
    pub fn new(group: impl Into<PropertyGroup>, transition: Transition) -> Self {
        Self {
            group: group.into(),
            transition,
            declared: None,
            epsilon: 1e-4,
        }
    }

    /// Builder: tolerance used when comparing declared targets
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon.abs();
        self
    }

    pub fn group(&self) -> &PropertyGroup {
        &self.group
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    /// Replace the transition used for future target changes
    pub fn set_transition(&mut self, transition: Transition) {
        self.transition = transition;
    }

    /// Last declared target, if any
    pub fn declared(&self) -> Option<&PropertyValues> {
        self.declared.as_ref()
    }

    /// Apply values without animating, before the first target is declared
    pub fn initial(&self, handle: &ControlHandle, values: &PropertyValues) {
        handle.set_immediate(self.group.clone(), values);
    }

    /// Declare the current target. Returns whether an animation was started.
    pub fn update(&mut self, handle: &ControlHandle, target: PropertyValues) -> Result<bool> {
        if let Some(previous) = &self.declared {
            if same_target(previous, &target, self.epsilon) {
                return Ok(false);
            }
        }

        let current = handle.snapshot(self.group.as_str());
        let timeline = self.transition.timeline(&current, &target);
        handle.start_with(
            self.group.clone(),
            timeline,
            StartOptions::continue_from_current(),
        )?;
        tracing::trace!(group = %self.group, properties = target.len(), "declared target changed");
        self.declared = Some(target);
        Ok(true)
    }
}

fn same_target(a: &PropertyValues, b: &PropertyValues, epsilon: f32) -> bool {
    a.len() == b.len()
        && a.iter().all(|(property, value)| {
            b.get(property)
                .is_some_and(|other| value.approx_eq(other, epsilon))
        })
}
