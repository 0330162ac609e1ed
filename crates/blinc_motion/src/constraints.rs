//! Drag constraints
//!
//! Pointer tracking stays with the host. While a drag is in progress the host
//! feeds positions through [`DragConstraints::drag_to`]; on pointer up,
//! [`DragConstraints::release`] animates the element back inside its bounds.

use crate::controller::{ControlHandle, PropertyGroup, StartOptions};
use crate::error::Result;
use crate::transition::Transition;
use crate::value::PropertyValues;
use serde::{Deserialize, Serialize};

/// Bounds for the `x`/`y` offset of a dragged element, relative to its origin
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConstraints {
    /// Smallest `x`
    pub left: f32,
    /// Largest `x`
    pub right: f32,
    /// Smallest `y`
    pub top: f32,
    /// Largest `y`
    pub bottom: f32,
    /// Fraction of the overshoot that follows the pointer past a bound (0..=1)
    pub elastic: f32,
}

impl Default for DragConstraints {
    fn default() -> Self {
        Self {
            left: f32::NEG_INFINITY,
            right: f32::INFINITY,
            top: f32::NEG_INFINITY,
            bottom: f32::INFINITY,
            elastic: 0.5,
        }
    }
}

impl DragConstraints {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
            ..Default::default()
        }
    }

    /// Same distance in every direction
    pub fn uniform(distance: f32) -> Self {
        let d = distance.abs();
        Self::new(-d, d, -d, d)
    }

    /// Builder: set elasticity
    pub fn with_elastic(mut self, elastic: f32) -> Self {
        self.elastic = elastic.clamp(0.0, 1.0);
        self
    }

    fn x_range(&self) -> (f32, f32) {
        (self.left.min(self.right), self.left.max(self.right))
    }

    fn y_range(&self) -> (f32, f32) {
        (self.top.min(self.bottom), self.top.max(self.bottom))
    }

    /// Nearest point inside the bounds
    pub fn clamp(&self, x: f32, y: f32) -> (f32, f32) {
        let (min_x, max_x) = self.x_range();
        let (min_y, max_y) = self.y_range();
        (x.max(min_x).min(max_x), y.max(min_y).min(max_y))
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.clamp(x, y) == (x, y)
    }

    /// Position shown while dragging: overshoot past a bound is scaled by
    /// `elastic`.
    pub fn elastic_position(&self, x: f32, y: f32) -> (f32, f32) {
        let (cx, cy) = self.clamp(x, y);
        (
            cx + (x - cx) * self.elastic,
            cy + (y - cy) * self.elastic,
        )
    }

    /// Apply a pointer position to `group` without animating
    pub fn drag_to(
        &self,
        handle: &ControlHandle,
        group: impl Into<PropertyGroup>,
        x: f32,
        y: f32,
    ) -> (f32, f32) {
        let (ex, ey) = self.elastic_position(x, y);
        handle.set_immediate(group, &PropertyValues::new().with("x", ex).with("y", ey));
        (ex, ey)
    }

    /// Animate `group` from its current position back inside the bounds.
    ///
    /// Returns whether a snap-back animation was started.
    pub fn release(
        &self,
        handle: &ControlHandle,
        group: impl Into<PropertyGroup>,
        transition: &Transition,
    ) -> Result<bool> {
        let group = group.into();
        let current = handle.snapshot(group.as_str());
        let x = current.number("x").unwrap_or(0.0);
        let y = current.number("y").unwrap_or(0.0);
        let (tx, ty) = self.clamp(x, y);
        if (tx, ty) == (x, y) {
            return Ok(false);
        }

        let target = PropertyValues::new().with("x", tx).with("y", ty);
        let from = PropertyValues::new().with("x", x).with("y", y);
        let timeline = transition.timeline(&from, &target);
        tracing::debug!(group = %group, from_x = x, from_y = y, to_x = tx, to_y = ty, "drag snap-back");
        handle.start_with(group, timeline, StartOptions::continue_from_current())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::AnimationController;
    use crate::easing::Easing;
    use crate::render::NullTarget;
    use crate::scheduler::AnimationScheduler;

    #[test]
    fn test_clamp_and_contains() {
        let bounds = DragConstraints::new(-20.0, 20.0, -5.0, 5.0);
        assert_eq!(bounds.clamp(30.0, -10.0), (20.0, -5.0));
        assert!(bounds.contains(0.0, 0.0));
        assert!(!bounds.contains(21.0, 0.0));
    }

    #[test]
    fn test_swapped_bounds_are_normalized() {
        let bounds = DragConstraints::new(20.0, -20.0, 5.0, -5.0);
        assert_eq!(bounds.clamp(100.0, 100.0), (20.0, 5.0));
    }

    #[test]
    fn test_elastic_overshoot() {
        let bounds = DragConstraints::uniform(10.0).with_elastic(0.5);
        assert_eq!(bounds.elastic_position(30.0, 0.0), (20.0, 0.0));
        let rigid = bounds.with_elastic(0.0);
        assert_eq!(rigid.elastic_position(30.0, 0.0), (10.0, 0.0));
    }

    #[test]
    fn test_release_snaps_back() {
        let scheduler = AnimationScheduler::new();
        let controller = AnimationController::new(&scheduler.handle(), NullTarget);
        let handle = controller.handle();
        let bounds = DragConstraints::uniform(10.0).with_elastic(1.0);
        let transition = Transition::new(0.2).with_easing(Easing::Linear);

        bounds.drag_to(&handle, "drag", 30.0, 4.0);
        assert_eq!(controller.value("drag", "x").and_then(|v| v.as_number()), Some(30.0));

        assert!(bounds.release(&handle, "drag", &transition).unwrap());
        scheduler.tick(0.1).unwrap();
        let x = controller.value("drag", "x").and_then(|v| v.as_number()).unwrap();
        assert!((x - 20.0).abs() < 1e-4);

        scheduler.tick(0.1).unwrap();
        assert_eq!(controller.value("drag", "x").and_then(|v| v.as_number()), Some(10.0));
        assert_eq!(controller.value("drag", "y").and_then(|v| v.as_number()), Some(4.0));

        // already inside
        assert!(!bounds.release(&handle, "drag", &transition).unwrap());
    }
}
