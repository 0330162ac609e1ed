//! Timeline presets for common entry, exit, and attention animations
//!
//! Durations are in seconds. Every preset animates plain numeric properties
//! (`opacity`, `scale`, `x`, `y`, `rotate`) so the results can be started on
//! any controller group and combined with other segments.

use crate::easing::Easing;
use crate::keyframe::{Keyframe, Segment};
use crate::timeline::Timeline;

/// Pre-built timelines for common patterns
pub struct AnimationPreset;

fn track(property: &str, keyframes: &[(f32, f32)], duration: f32, easing: Easing) -> Segment {
    let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
    let first = keyframes.first().map_or(0.0, |&(_, v)| v);
    let last = keyframes.last().map_or(first, |&(_, v)| v);
    let frames = keyframes
        .iter()
        .map(|&(offset, value)| Keyframe::new(offset, value));
    Segment::new(property, frames, duration)
        .unwrap_or_else(|_| Segment::tween(property, first, last, duration))
        .with_easing(easing)
}

impl AnimationPreset {
    // ========================================================================
    // Fade
    // ========================================================================

    pub fn fade_in(duration: f32) -> Timeline {
        Timeline::single(Segment::tween("opacity", 0.0, 1.0, duration).with_easing(Easing::EaseOut))
    }

    pub fn fade_out(duration: f32) -> Timeline {
        Timeline::single(Segment::tween("opacity", 1.0, 0.0, duration).with_easing(Easing::EaseIn))
    }

    // ========================================================================
    // Scale
    // ========================================================================

    /// Grow from nothing while fading in
    pub fn scale_in(duration: f32) -> Timeline {
        Timeline::parallel([
            Segment::tween("scale", 0.0, 1.0, duration).with_easing(Easing::EaseOutCubic),
            Segment::tween("opacity", 0.0, 1.0, duration).with_easing(Easing::EaseOutCubic),
        ])
    }

    /// Grow past full size, then settle
    pub fn pop_in(duration: f32) -> Timeline {
        Timeline::parallel([
            track(
                "scale",
                &[(0.0, 0.0), (0.7, 1.1), (1.0, 1.0)],
                duration,
                Easing::EaseOut,
            ),
            track("opacity", &[(0.0, 0.0), (0.7, 1.0)], duration, Easing::EaseOut),
        ])
    }

    // ========================================================================
    // Slide
    // ========================================================================

    /// Slide in from an offset of `(dx, dy)` while fading in
    pub fn slide_in(duration: f32, dx: f32, dy: f32) -> Timeline {
        Timeline::parallel([
            Segment::tween("x", dx, 0.0, duration).with_easing(Easing::EaseOutCubic),
            Segment::tween("y", dy, 0.0, duration).with_easing(Easing::EaseOutCubic),
            Segment::tween("opacity", 0.0, 1.0, duration).with_easing(Easing::EaseOutCubic),
        ])
    }

    // ========================================================================
    // Attention
    // ========================================================================

    /// Horizontal shake (error feedback)
    pub fn shake(duration: f32, intensity: f32) -> Timeline {
        let i = intensity;
        Timeline::single(track(
            "x",
            &[
                (0.0, 0.0),
                (0.1, -i),
                (0.3, i),
                (0.5, -i * 0.8),
                (0.7, i * 0.6),
                (0.9, -i * 0.3),
                (1.0, 0.0),
            ],
            duration,
            Easing::EaseInOut,
        ))
    }

    pub fn pulse(duration: f32) -> Timeline {
        Timeline::single(track(
            "scale",
            &[(0.0, 1.0), (0.5, 1.1), (1.0, 1.0)],
            duration,
            Easing::EaseInOut,
        ))
    }

    /// One full turn per cycle, forever
    pub fn spin(duration: f32) -> Timeline {
        Timeline::single(Segment::tween("rotate", 0.0, 360.0, duration)).repeat_infinite()
    }
}
