//! Timelines
//!
//! A [`Timeline`] owns a set of [`Segment`]s and a playhead. Segments either
//! play one after another ([`TimelineMode::Sequential`]) or all at once
//! ([`TimelineMode::Parallel`]). One pass over the segments is a cycle; the
//! timeline repeats cycles according to [`Repeat`] and [`PlayDirection`].
//!
//! Cycle boundaries belong to the cycle that is ending, so after exactly one
//! cycle the playhead reports that cycle's end values. The frame that reaches
//! the total duration reports `done`.

use crate::error::Result;
use crate::keyframe::Segment;
use crate::value::PropertyValues;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Playback direction for timelines
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayDirection {
    /// Play forward (0.0 -> 1.0)
    #[default]
    Forward,
    /// Play every cycle in reverse (1.0 -> 0.0)
    Reverse,
    /// Alternate between forward and reverse each cycle
    Alternate,
}

/// How many cycles a timeline plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repeat {
    /// Total number of cycles; zero plays once
    Count(u32),
    Infinite,
}

impl Repeat {
    /// Total cycles, or `None` for infinite
    pub fn cycles(self) -> Option<u32> {
        match self {
            Repeat::Count(n) => Some(n.max(1)),
            Repeat::Infinite => None,
        }
    }
}

impl Default for Repeat {
    fn default() -> Self {
        Repeat::Count(1)
    }
}

/// How the segments of a timeline are laid out in time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineMode {
    /// Each segment starts when the previous one ends
    Sequential,
    /// Every segment starts at the beginning of the cycle
    #[default]
    Parallel,
}

/// Result of advancing a timeline
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineFrame {
    pub done: bool,
    pub values: PropertyValues,
}

/// Keyframe segments plus a playhead
#[derive(Clone, Debug)]
pub struct Timeline {
    mode: TimelineMode,
    segments: Vec<Segment>,
    repeat: Repeat,
    direction: PlayDirection,
    /// Seconds since the timeline started
    elapsed: f32,
    /// Length of one cycle in seconds
    cycle_duration: f32,
    finished: bool,
}

impl Timeline {
    pub fn new(mode: TimelineMode, segments: impl IntoIterator<Item = Segment>) -> Self {
        let mut timeline = Self {
            mode,
            segments: segments.into_iter().collect(),
            repeat: Repeat::default(),
            direction: PlayDirection::default(),
            elapsed: 0.0,
            cycle_duration: 0.0,
            finished: false,
        };
        timeline.recompute_duration();
        timeline
    }

    /// Segments play one after another
    pub fn sequential(segments: impl IntoIterator<Item = Segment>) -> Self {
        Self::new(TimelineMode::Sequential, segments)
    }

    /// Segments play at the same time, each after its own delay
    pub fn parallel(segments: impl IntoIterator<Item = Segment>) -> Self {
        Self::new(TimelineMode::Parallel, segments)
    }

    /// Timeline with a single segment
    pub fn single(segment: Segment) -> Self {
        Self::parallel([segment])
    }

    /// Builder: set repeat behaviour
    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    /// Builder: play `count` cycles in total
    pub fn repeat(self, count: u32) -> Self {
        self.with_repeat(Repeat::Count(count))
    }

    /// Builder: loop forever
    pub fn repeat_infinite(self) -> Self {
        self.with_repeat(Repeat::Infinite)
    }

    /// Builder: set playback direction
    pub fn with_direction(mut self, direction: PlayDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Builder: ping-pong between forward and reverse cycles
    pub fn alternate(self) -> Self {
        self.with_direction(PlayDirection::Alternate)
    }

    /// Append a segment
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
        self.recompute_duration();
    }

    fn recompute_duration(&mut self) {
        self.cycle_duration = match self.mode {
            TimelineMode::Sequential => self.segments.iter().map(Segment::span).sum(),
            TimelineMode::Parallel => self
                .segments
                .iter()
                .map(Segment::span)
                .fold(0.0, f32::max),
        };
    }

    pub fn mode(&self) -> TimelineMode {
        self.mode
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn repeat_mode(&self) -> Repeat {
        self.repeat
    }

    pub fn direction(&self) -> PlayDirection {
        self.direction
    }

    /// Seconds played so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Length of one cycle in seconds
    pub fn cycle_duration(&self) -> f32 {
        self.cycle_duration
    }

    /// Total play time, or `None` if the timeline loops forever
    pub fn total_duration(&self) -> Option<f32> {
        self.repeat
            .cycles()
            .map(|cycles| self.cycle_duration * cycles as f32)
    }

    pub fn is_done(&self) -> bool {
        self.finished
    }

    /// Distinct animated properties in first-seen order
    pub fn properties(&self) -> impl Iterator<Item = &str> {
        let mut seen = FxHashSet::default();
        self.segments
            .iter()
            .map(Segment::property)
            .filter(move |p| seen.insert(*p))
    }

    /// Move the playhead forward by `dt` seconds and sample every property.
    ///
    /// Negative or non-finite deltas count as zero. Once done, further calls
    /// keep returning the final values with `done = true`.
    pub fn advance(&mut self, dt: f32) -> Result<TimelineFrame> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += dt;

        if let Some(total) = self.total_duration() {
            if self.elapsed >= total {
                self.elapsed = total;
                self.finished = true;
            }
        }

        let values = self.sample(self.elapsed)?;
        Ok(TimelineFrame {
            done: self.finished,
            values,
        })
    }

    /// Values at the playhead position `elapsed` without moving the playhead
    pub fn sample(&self, elapsed: f32) -> Result<PropertyValues> {
        let (cycle, local) = self.locate(elapsed);
        self.sample_cycle(local, self.is_reversed(cycle))
    }

    /// Values before any time has passed.
    ///
    /// Unlike `sample(0.0)` this holds zero-duration segments at their first
    /// keyframe; they only jump once the timeline is advanced. No
    /// interpolation happens here, so mismatched keyframe kinds only surface
    /// from [`advance`](Self::advance).
    pub fn initial_values(&self) -> PropertyValues {
        let mut values = PropertyValues::new();
        if self.is_reversed(0) {
            // a reversed cycle starts where the forward one ends
            for segment in &self.segments {
                values.insert(segment.property(), segment.last_value());
            }
        } else {
            for segment in &self.segments {
                if !values.contains(segment.property()) {
                    values.insert(segment.property(), segment.first_value());
                }
            }
        }
        values
    }

    /// Start playback of each property from the value in `snapshot`.
    ///
    /// Forward timelines rewrite the first keyframe of each property's first
    /// segment. When the first cycle plays in reverse, playback starts at the
    /// end, so the last keyframe of each property's last segment is rewritten
    /// instead.
    pub fn rebase_from(&mut self, snapshot: &PropertyValues) {
        let mut seen = FxHashSet::default();
        if self.is_reversed(0) {
            for segment in self.segments.iter_mut().rev() {
                if !seen.insert(segment.property().to_string()) {
                    continue;
                }
                if let Some(value) = snapshot.get(segment.property()) {
                    segment.rebase_end(*value);
                }
            }
        } else {
            for segment in &mut self.segments {
                if !seen.insert(segment.property().to_string()) {
                    continue;
                }
                if let Some(value) = snapshot.get(segment.property()) {
                    segment.rebase(*value);
                }
            }
        }
    }

    /// Map a playhead position to (cycle index, seconds into that cycle)
    fn locate(&self, elapsed: f32) -> (u32, f32) {
        let last_cycle = self.repeat.cycles().map(|n| n - 1);
        let cycle_len = self.cycle_duration;

        if cycle_len <= 0.0 {
            return (last_cycle.unwrap_or(0), 0.0);
        }

        let mut index = (elapsed / cycle_len).floor().max(0.0) as u32;
        let mut local = elapsed - index as f32 * cycle_len;
        if local <= 0.0 && index > 0 {
            index -= 1;
            local = cycle_len;
        }
        if let Some(last) = last_cycle {
            if index > last {
                index = last;
                local = cycle_len;
            }
        }
        (index, local.clamp(0.0, cycle_len))
    }

    fn is_reversed(&self, cycle: u32) -> bool {
        match self.direction {
            PlayDirection::Forward => false,
            PlayDirection::Reverse => true,
            PlayDirection::Alternate => cycle % 2 == 1,
        }
    }

    fn sample_cycle(&self, local: f32, reversed: bool) -> Result<PropertyValues> {
        let t = if reversed {
            self.cycle_duration - local
        } else {
            local
        };

        let mut values = PropertyValues::new();
        match self.mode {
            TimelineMode::Parallel => {
                for segment in &self.segments {
                    values.insert(segment.property(), segment.sample_at(t)?);
                }
            }
            TimelineMode::Sequential => {
                let mut start = 0.0;
                for segment in &self.segments {
                    if t >= start {
                        values.insert(segment.property(), segment.sample_at(t - start)?);
                    } else if !values.contains(segment.property()) {
                        values.insert(segment.property(), segment.sample(0.0)?);
                    }
                    start += segment.span();
                }
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::error::MotionError;
    use crate::keyframe::Keyframe;
    use crate::value::{AnimValue, Rgba};

    fn x(frame: &TimelineFrame) -> f32 {
        frame.values.number("x").unwrap()
    }

    #[test]
    fn test_linear_move_right() {
        let mut timeline = Timeline::single(Segment::tween("x", 0.0, 750.0, 2.0));

        let frame = timeline.advance(1.0).unwrap();
        assert_eq!(x(&frame), 375.0);
        assert!(!frame.done);

        let frame = timeline.advance(1.0).unwrap();
        assert_eq!(x(&frame), 750.0);
        assert!(frame.done);
    }

    #[test]
    fn test_alternate_repeat_pulse() {
        let mut timeline = Timeline::single(Segment::tween("scale", 1.0, 1.4, 1.0))
            .repeat(2)
            .alternate();

        let frame = timeline.advance(1.0).unwrap();
        assert_eq!(frame.values.number("scale"), Some(1.4));
        assert!(!frame.done);

        let frame = timeline.advance(1.0).unwrap();
        assert_eq!(frame.values.number("scale"), Some(1.0));

        let frame = timeline.advance(0.01).unwrap();
        assert!(frame.done);
        assert_eq!(frame.values.number("scale"), Some(1.0));
    }

    #[test]
    fn test_forward_repeat_restarts_each_cycle() {
        let mut timeline = Timeline::single(Segment::tween("x", 0.0, 10.0, 1.0)).repeat(3);
        assert!((x(&timeline.advance(1.25).unwrap()) - 2.5).abs() < 1e-4);
        assert!((x(&timeline.advance(1.0).unwrap()) - 2.5).abs() < 1e-4);
        let frame = timeline.advance(0.75).unwrap();
        assert_eq!(x(&frame), 10.0);
        assert!(frame.done);
    }

    #[test]
    fn test_infinite_repeat_never_done() {
        let mut timeline = Timeline::single(Segment::tween("x", 0.0, 1.0, 0.5))
            .repeat_infinite()
            .alternate();
        for _ in 0..1000 {
            assert!(!timeline.advance(0.1).unwrap().done);
        }
        assert_eq!(timeline.total_duration(), None);
    }

    #[test]
    fn test_reverse_direction() {
        let mut timeline = Timeline::single(Segment::tween("x", 0.0, 100.0, 1.0))
            .with_direction(PlayDirection::Reverse);
        assert_eq!(timeline.initial_values().number("x"), Some(100.0));
        assert!((x(&timeline.advance(0.25).unwrap()) - 75.0).abs() < 1e-4);
        let frame = timeline.advance(0.75).unwrap();
        assert_eq!(x(&frame), 0.0);
        assert!(frame.done);
    }

    #[test]
    fn test_sequential_segments_hand_off() {
        let mut timeline = Timeline::sequential([
            Segment::tween("x", 0.0, 100.0, 1.0),
            Segment::tween("x", 100.0, 50.0, 1.0).with_delay(0.5),
            Segment::tween("opacity", 0.0, 1.0, 1.0),
        ]);
        assert!((timeline.cycle_duration() - 3.5).abs() < 1e-6);

        // opacity has not started; backwards fill holds its first keyframe
        let frame = timeline.advance(0.5).unwrap();
        assert!((x(&frame) - 50.0).abs() < 1e-4);
        assert_eq!(frame.values.number("opacity"), Some(0.0));

        // inside the second segment's delay
        let frame = timeline.advance(0.75).unwrap();
        assert_eq!(x(&frame), 100.0);

        let frame = timeline.advance(1.25).unwrap();
        assert_eq!(x(&frame), 50.0);
        assert_eq!(frame.values.number("opacity"), Some(0.0));

        let frame = timeline.advance(1.0).unwrap();
        assert_eq!(frame.values.number("opacity"), Some(1.0));
        assert!(frame.done);
    }

    #[test]
    fn test_parallel_branches_finish_independently() {
        let mut timeline = Timeline::parallel([
            Segment::tween("x", 0.0, 10.0, 1.0),
            Segment::tween("y", 0.0, 10.0, 1.0).with_delay(1.0),
        ]);
        let frame = timeline.advance(1.0).unwrap();
        assert_eq!(frame.values.number("x"), Some(10.0));
        assert_eq!(frame.values.number("y"), Some(0.0));
        assert!(!frame.done);

        let frame = timeline.advance(1.0).unwrap();
        assert_eq!(frame.values.number("y"), Some(10.0));
        assert!(frame.done);
    }

    #[test]
    fn test_zero_duration_resolves_on_next_advance() {
        let mut timeline = Timeline::single(Segment::tween("x", 0.0, 42.0, 0.0));
        assert_eq!(timeline.initial_values().number("x"), Some(0.0));

        let frame = timeline.advance(0.0).unwrap();
        assert_eq!(x(&frame), 42.0);
        assert!(frame.done);
    }

    #[test]
    fn test_rebase_only_touches_first_segment_per_property() {
        let mut timeline = Timeline::sequential([
            Segment::tween("x", 0.0, 100.0, 1.0),
            Segment::tween("x", 100.0, 0.0, 1.0),
        ]);
        timeline.rebase_from(&PropertyValues::new().with("x", 40.0).with("y", 3.0));

        assert_eq!(timeline.segments()[0].first_value(), AnimValue::Number(40.0));
        assert_eq!(timeline.segments()[1].first_value(), AnimValue::Number(100.0));
        assert_eq!(timeline.properties().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_reversed_rebase_rewrites_playback_start() {
        let mut timeline = Timeline::sequential([
            Segment::tween("x", 0.0, 100.0, 1.0),
            Segment::tween("x", 100.0, 80.0, 1.0),
        ])
        .with_direction(PlayDirection::Reverse);
        timeline.rebase_from(&PropertyValues::new().with("x", 40.0));

        assert_eq!(timeline.segments()[0].first_value(), AnimValue::Number(0.0));
        assert_eq!(timeline.segments()[0].last_value(), AnimValue::Number(100.0));
        assert_eq!(timeline.segments()[1].last_value(), AnimValue::Number(40.0));
        assert_eq!(timeline.initial_values().number("x"), Some(40.0));

        // no jump on the first frame
        let frame = timeline.advance(0.25).unwrap();
        assert!((x(&frame) - 55.0).abs() < 1e-4);
    }

    #[test]
    fn test_mixed_kinds_fail_on_advance() {
        let segment = Segment::new(
            "bg",
            [
                Keyframe::new(0.0, 0.0),
                Keyframe::new(1.0, AnimValue::Color(Rgba::WHITE)),
            ],
            1.0,
        )
        .unwrap()
        .with_easing(Easing::EaseOut);
        let mut timeline = Timeline::single(segment);
        assert!(matches!(
            timeline.advance(0.5),
            Err(MotionError::InvalidKeyframeType { .. })
        ));
    }
}
