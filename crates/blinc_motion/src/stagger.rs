//! Staggered parent/child animation
//!
//! Child start times are computed up front and baked into segment delays, so
//! the result is a single parallel [`Timeline`] with no runtime signalling
//! between parent and children.

use crate::keyframe::Segment;
use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};

/// Stagger direction for child animations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerDirection {
    /// First to last
    #[default]
    Forward,
    /// Last to first
    Reverse,
    /// From the center outward
    FromCenter,
}

/// Per-child delay configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerConfig {
    /// Seconds between consecutive children
    pub interval: f32,
    pub direction: StaggerDirection,
    /// Children past this position share the delay of position `limit`
    pub limit: Option<usize>,
}

impl StaggerConfig {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(0.0),
            ..Default::default()
        }
    }

    /// Stagger from last to first
    pub fn reverse(mut self) -> Self {
        self.direction = StaggerDirection::Reverse;
        self
    }

    /// Stagger from center outward
    pub fn from_center(mut self) -> Self {
        self.direction = StaggerDirection::FromCenter;
        self
    }

    /// Cap the stagger position at `n`
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Delay in seconds for child `index` of `total`
    pub fn delay_for_index(&self, index: usize, total: usize) -> f32 {
        let position = match self.direction {
            StaggerDirection::Forward => index,
            StaggerDirection::Reverse => total.saturating_sub(1).saturating_sub(index),
            StaggerDirection::FromCenter => {
                let center = total / 2;
                center.abs_diff(index)
            }
        };
        let position = match self.limit {
            Some(limit) => position.min(limit),
            None => position,
        };
        self.interval * position as f32
    }
}

/// When children play relative to the parent
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum When {
    /// Parent finishes, then children start
    BeforeChildren,
    /// Children finish, then the parent starts
    AfterChildren,
    /// Parent and children start together
    #[default]
    Simultaneous,
}

/// Timing of a parent animation and its children
///
/// ```ignore
/// let orchestration = Orchestration::new()
///     .with_delay(0.5)
///     .with_stagger(StaggerConfig::new(0.2))
///     .with_when(When::BeforeChildren);
/// let timeline = orchestration.compose(parent_segments, &children);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Orchestration {
    /// Seconds before anything starts
    pub delay: f32,
    /// Extra seconds before the first child starts
    pub delay_children: f32,
    pub stagger: StaggerConfig,
    pub when: When,
}

impl Orchestration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn with_delay_children(mut self, delay: f32) -> Self {
        self.delay_children = delay.max(0.0);
        self
    }

    pub fn with_stagger(mut self, stagger: StaggerConfig) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn with_when(mut self, when: When) -> Self {
        self.when = when;
        self
    }

    /// Combine parent and child segments into one parallel timeline.
    ///
    /// Child properties are renamed `"{index}.{property}"` so every child
    /// keeps its own values inside the shared property group.
    pub fn compose<P, C>(&self, parent: P, children: &[C]) -> Timeline
    where
        P: IntoIterator<Item = Segment>,
        C: AsRef<[Segment]>,
    {
        let parent: Vec<Segment> = parent.into_iter().collect();
        let total = children.len();

        let child_span = |base: f32| {
            children
                .iter()
                .enumerate()
                .flat_map(|(i, segments)| {
                    let offset = base + self.stagger.delay_for_index(i, total);
                    segments.as_ref().iter().map(move |s| offset + s.span())
                })
                .fold(base, f32::max)
        };
        let parent_span = |base: f32| {
            parent
                .iter()
                .map(|s| base + s.span())
                .fold(base, f32::max)
        };

        let (parent_base, child_base) = match self.when {
            When::BeforeChildren => {
                let base = self.delay;
                (base, parent_span(base) + self.delay_children)
            }
            When::AfterChildren => {
                let base = self.delay + self.delay_children;
                (child_span(base), base)
            }
            When::Simultaneous => (self.delay, self.delay + self.delay_children),
        };

        let mut segments: Vec<Segment> = parent
            .iter()
            .map(|s| s.clone().with_delay(s.delay() + parent_base))
            .collect();

        for (i, child) in children.iter().enumerate() {
            let offset = child_base + self.stagger.delay_for_index(i, total);
            segments.extend(child.as_ref().iter().map(|s| {
                let property = format!("{i}.{}", s.property());
                s.clone()
                    .with_property(property)
                    .with_delay(s.delay() + offset)
            }));
        }

        tracing::trace!(
            parent_base,
            child_base,
            children = total,
            "composed staggered timeline"
        );
        Timeline::parallel(segments)
    }
}
