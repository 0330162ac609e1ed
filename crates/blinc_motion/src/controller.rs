//! Animation controllers
//!
//! An [`AnimationController`] belongs to one mounted element. It holds at most
//! one active [`Timeline`] per [`PropertyGroup`], the last computed values of
//! every group, and the element's [`RenderTarget`].
//!
//! Starting a group that is already animating replaces its timeline in place.
//! The scheduler keeps only weak references, so dropping the controller
//! detaches it and no further writes reach the render target.
//!
//! Event callbacks get a [`ControlHandle`] instead of the controller itself.

use crate::error::{MotionError, Result};
use crate::render::RenderTarget;
use crate::scheduler::{ControllerId, SchedulerHandle};
use crate::timeline::Timeline;
use crate::value::{AnimValue, PropertyValues};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::borrow::Borrow;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Identifier for a set of properties animated as one unit
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyGroup(String);

impl PropertyGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PropertyGroup {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PropertyGroup {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for PropertyGroup {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&PropertyGroup> for PropertyGroup {
    fn from(group: &PropertyGroup) -> Self {
        group.clone()
    }
}

/// Options for [`AnimationController::start_with`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StartOptions {
    /// Replace each property's first keyframe with its current snapshot value
    pub continue_from_current: bool,
}

impl StartOptions {
    pub fn continue_from_current() -> Self {
        Self {
            continue_from_current: true,
        }
    }
}

/// Result of advancing one group for one frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GroupAdvance {
    Running,
    Completed,
}

#[derive(Debug, Default)]
struct GroupState {
    timeline: Option<Timeline>,
    snapshot: PropertyValues,
}

type CompleteCallback = Box<dyn FnMut(&PropertyGroup)>;

pub(crate) struct ControllerInner {
    id: Option<ControllerId>,
    scheduler: SchedulerHandle,
    target: Box<dyn RenderTarget>,
    groups: IndexMap<PropertyGroup, GroupState, FxBuildHasher>,
    on_complete: Option<CompleteCallback>,
}

impl ControllerInner {
    fn start_with(
        &mut self,
        group: PropertyGroup,
        mut timeline: Timeline,
        options: StartOptions,
    ) -> Result<()> {
        let id = self.id.ok_or(MotionError::SchedulerDropped)?;
        self.scheduler.register(id, &group)?;

        let state = self.groups.entry(group.clone()).or_default();
        if options.continue_from_current {
            timeline.rebase_from(&state.snapshot);
        }
        state.snapshot.merge(&timeline.initial_values());
        let replaced = state.timeline.replace(timeline).is_some();

        tracing::debug!(
            group = %group,
            replaced,
            continue_from_current = options.continue_from_current,
            "animation started"
        );
        Ok(())
    }

    fn stop(&mut self, group: &str) {
        let was_running = self.halt(group);
        if let Some(id) = self.id {
            self.scheduler.deregister(id, group);
        }
        if was_running {
            tracing::debug!(group, "animation stopped");
        } else {
            tracing::trace!(group, "stop on idle or unknown group");
        }
    }

    fn cancel_all(&mut self) {
        let mut stopped = 0;
        for state in self.groups.values_mut() {
            if state.timeline.take().is_some() {
                stopped += 1;
            }
        }
        if let Some(id) = self.id {
            self.scheduler.deregister_controller(id);
        }
        if stopped > 0 {
            tracing::debug!(groups = stopped, "controller animations cancelled");
        }
    }

    fn set_immediate(&mut self, group: PropertyGroup, values: &PropertyValues) {
        self.stop(group.as_str());
        for (property, value) in values.iter() {
            self.target.write(property, value);
        }
        self.groups
            .entry(group)
            .or_default()
            .snapshot
            .merge(values);
    }

    fn snapshot(&self, group: &str) -> PropertyValues {
        self.groups
            .get(group)
            .map(|state| state.snapshot.clone())
            .unwrap_or_default()
    }

    fn try_snapshot(&self, group: &str) -> Result<PropertyValues> {
        self.groups
            .get(group)
            .map(|state| state.snapshot.clone())
            .ok_or_else(|| MotionError::UnknownPropertyGroup(group.to_string()))
    }

    fn value(&self, group: &str, property: &str) -> Option<AnimValue> {
        self.groups
            .get(group)
            .and_then(|state| state.snapshot.get(property))
            .copied()
    }

    fn is_animating(&self, group: &str) -> bool {
        self.groups
            .get(group)
            .is_some_and(|state| state.timeline.is_some())
    }

    fn active_groups(&self) -> Vec<PropertyGroup> {
        self.groups
            .iter()
            .filter(|(_, state)| state.timeline.is_some())
            .map(|(group, _)| group.clone())
            .collect()
    }

    /// Discard the group's timeline, keeping its snapshot. Returns whether
    /// a timeline was running.
    pub(crate) fn halt(&mut self, group: &str) -> bool {
        self.groups
            .get_mut(group)
            .is_some_and(|state| state.timeline.take().is_some())
    }

    /// Advance one group and write its values to the render target
    pub(crate) fn advance_group(&mut self, group: &PropertyGroup, dt: f32) -> Result<GroupAdvance> {
        let Some(state) = self.groups.get_mut(group.as_str()) else {
            return Err(MotionError::SchedulerNotRunning {
                group: group.to_string(),
            });
        };
        let Some(timeline) = state.timeline.as_mut() else {
            return Err(MotionError::SchedulerNotRunning {
                group: group.to_string(),
            });
        };

        let frame = match timeline.advance(dt) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!(group = %group, error = %err, "animation halted");
                state.timeline = None;
                return Err(err);
            }
        };

        for (property, value) in frame.values.iter() {
            self.target.write(property, value);
        }
        state.snapshot.merge(&frame.values);

        if frame.done {
            state.timeline = None;
            tracing::trace!(group = %group, "animation complete");
            Ok(GroupAdvance::Completed)
        } else {
            Ok(GroupAdvance::Running)
        }
    }

    /// Run the completion callback without holding the controller borrow
    pub(crate) fn notify_complete(this: &RefCell<ControllerInner>, group: &PropertyGroup) {
        let callback = match this.try_borrow_mut() {
            Ok(mut inner) => inner.on_complete.take(),
            Err(_) => return,
        };
        let Some(mut callback) = callback else {
            return;
        };

        callback(group);

        // The callback may have installed a replacement
        if let Ok(mut inner) = this.try_borrow_mut() {
            if inner.on_complete.is_none() {
                inner.on_complete = Some(callback);
            }
        }
    }
}

fn with_mut<R>(cell: &RefCell<ControllerInner>, f: impl FnOnce(&mut ControllerInner) -> R) -> Result<R> {
    let mut inner = cell.try_borrow_mut().map_err(|_| MotionError::ControllerBusy)?;
    Ok(f(&mut inner))
}

fn with_ref<R: Default>(cell: &RefCell<ControllerInner>, f: impl FnOnce(&ControllerInner) -> R) -> R {
    match cell.try_borrow() {
        Ok(inner) => f(&inner),
        Err(_) => {
            tracing::warn!("controller read while busy, returning neutral value");
            R::default()
        }
    }
}

/// Owner of the animations for one mounted element
///
/// ```ignore
/// let controller = AnimationController::new(&scheduler.handle(), target);
/// controller.start("box", Timeline::single(Segment::tween("x", 0.0, 750.0, 2.0)))?;
/// ```
pub struct AnimationController {
    inner: Rc<RefCell<ControllerInner>>,
}

impl AnimationController {
    /// Create a controller that writes to `target`.
    ///
    /// If the scheduler is already gone the controller still works for
    /// snapshots and [`set_immediate`](Self::set_immediate), but every start
    /// fails with [`MotionError::SchedulerDropped`].
    pub fn new(scheduler: &SchedulerHandle, target: impl RenderTarget + 'static) -> Self {
        let inner = Rc::new(RefCell::new(ControllerInner {
            id: None,
            scheduler: scheduler.clone(),
            target: Box::new(target),
            groups: IndexMap::default(),
            on_complete: None,
        }));
        let id = scheduler.attach(Rc::downgrade(&inner));
        inner.borrow_mut().id = id;
        Self { inner }
    }

    /// Scheduler key, `None` if the scheduler was gone at construction
    pub fn id(&self) -> Option<ControllerId> {
        RefCell::borrow(&self.inner).id
    }

    /// Weak handle for event callbacks
    pub fn handle(&self) -> ControlHandle {
        ControlHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Start `timeline` on `group` from its first keyframes
    pub fn start(&self, group: impl Into<PropertyGroup>, timeline: Timeline) -> Result<()> {
        self.start_with(group, timeline, StartOptions::default())
    }

    /// Start `timeline` on `group`, replacing any timeline already running there.
    ///
    /// The group's snapshot takes the timeline's initial values right away,
    /// so a `stop` before the next frame freezes at the first keyframe.
    pub fn start_with(
        &self,
        group: impl Into<PropertyGroup>,
        timeline: Timeline,
        options: StartOptions,
    ) -> Result<()> {
        let group = group.into();
        with_mut(&self.inner, |inner| inner.start_with(group, timeline, options))?
    }

    /// Freeze `group` at its current values. Unknown groups are ignored.
    pub fn stop(&self, group: &str) {
        if with_mut(&self.inner, |inner| inner.stop(group)).is_err() {
            tracing::warn!(group, "stop ignored, controller busy");
        }
    }

    /// Stop every group of this controller
    pub fn cancel_all(&self) {
        if with_mut(&self.inner, ControllerInner::cancel_all).is_err() {
            tracing::warn!("cancel_all ignored, controller busy");
        }
    }

    /// Write `values` straight to the target and snapshot, stopping `group`
    pub fn set_immediate(&self, group: impl Into<PropertyGroup>, values: &PropertyValues) {
        let group = group.into();
        if with_mut(&self.inner, |inner| inner.set_immediate(group, values)).is_err() {
            tracing::warn!("set_immediate ignored, controller busy");
        }
    }

    /// Last computed values of `group`; empty if it was never started
    pub fn snapshot(&self, group: &str) -> PropertyValues {
        with_ref(&self.inner, |inner| inner.snapshot(group))
    }

    /// Like [`snapshot`](Self::snapshot) but fails for unknown groups
    pub fn try_snapshot(&self, group: &str) -> Result<PropertyValues> {
        let inner = self.inner.try_borrow().map_err(|_| MotionError::ControllerBusy)?;
        inner.try_snapshot(group)
    }

    pub fn value(&self, group: &str, property: &str) -> Option<AnimValue> {
        with_ref(&self.inner, |inner| inner.value(group, property))
    }

    pub fn is_animating(&self, group: &str) -> bool {
        with_ref(&self.inner, |inner| inner.is_animating(group))
    }

    /// Groups with a running timeline, in first-start order
    pub fn active_groups(&self) -> Vec<PropertyGroup> {
        with_ref(&self.inner, ControllerInner::active_groups)
    }

    /// Called once each time a group's timeline finishes
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnMut(&PropertyGroup) + 'static,
    {
        if with_mut(&self.inner, |inner| inner.on_complete = Some(Box::new(callback))).is_err() {
            tracing::warn!("on_complete ignored, controller busy");
        }
    }
}

impl Drop for AnimationController {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.cancel_all();
            if let Some(id) = inner.id.take() {
                inner.scheduler.detach(id);
            }
        }
    }
}

impl fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationController")
            .field("id", &self.id())
            .field("active_groups", &self.active_groups())
            .finish()
    }
}

/// Cloneable, non-owning handle to an [`AnimationController`]
///
/// Once the controller is dropped every call is a no-op: starts succeed
/// without effect and reads return neutral values.
#[derive(Clone)]
pub struct ControlHandle {
    inner: Weak<RefCell<ControllerInner>>,
}

impl ControlHandle {
    /// Check whether the controller still exists
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    pub fn start(&self, group: impl Into<PropertyGroup>, timeline: Timeline) -> Result<()> {
        self.start_with(group, timeline, StartOptions::default())
    }

    pub fn start_with(
        &self,
        group: impl Into<PropertyGroup>,
        timeline: Timeline,
        options: StartOptions,
    ) -> Result<()> {
        let Some(inner) = self.inner.upgrade() else {
            tracing::trace!("start on dropped controller ignored");
            return Ok(());
        };
        let group = group.into();
        with_mut(&inner, |inner| inner.start_with(group, timeline, options))?
    }

    pub fn stop(&self, group: &str) {
        if let Some(inner) = self.inner.upgrade() {
            if with_mut(&inner, |inner| inner.stop(group)).is_err() {
                tracing::warn!(group, "stop ignored, controller busy");
            }
        }
    }

    /// Stop every group of the controller
    pub fn stop_all(&self) {
        if let Some(inner) = self.inner.upgrade() {
            if with_mut(&inner, ControllerInner::cancel_all).is_err() {
                tracing::warn!("stop_all ignored, controller busy");
            }
        }
    }

    pub fn set_immediate(&self, group: impl Into<PropertyGroup>, values: &PropertyValues) {
        if let Some(inner) = self.inner.upgrade() {
            let group = group.into();
            if with_mut(&inner, |inner| inner.set_immediate(group, values)).is_err() {
                tracing::warn!("set_immediate ignored, controller busy");
            }
        }
    }

    pub fn snapshot(&self, group: &str) -> PropertyValues {
        self.inner
            .upgrade()
            .map(|inner| with_ref(&inner, |inner| inner.snapshot(group)))
            .unwrap_or_default()
    }

    pub fn value(&self, group: &str, property: &str) -> Option<AnimValue> {
        self.inner
            .upgrade()
            .and_then(|inner| with_ref(&inner, |inner| inner.value(group, property)))
    }

    pub fn is_animating(&self, group: &str) -> bool {
        self.inner
            .upgrade()
            .is_some_and(|inner| with_ref(&inner, |inner| inner.is_animating(group)))
    }
}

impl fmt::Debug for ControlHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframe::{Keyframe, Segment};
    use crate::render::RecordingTarget;
    use crate::scheduler::AnimationScheduler;
    use crate::value::Rgba;
    use std::cell::{Cell, OnceCell};

    fn setup() -> (AnimationScheduler, AnimationController, RecordingTarget) {
        let scheduler = AnimationScheduler::new();
        let target = RecordingTarget::new();
        let controller = AnimationController::new(&scheduler.handle(), target.clone());
        (scheduler, controller, target)
    }

    fn x(controller: &AnimationController, group: &str) -> f32 {
        controller
            .value(group, "x")
            .and_then(|v| v.as_number())
            .unwrap()
    }

    #[test]
    fn test_snapshot_before_start_is_empty() {
        let (_scheduler, controller, _) = setup();
        assert!(controller.snapshot("box").is_empty());
        assert!(matches!(
            controller.try_snapshot("box"),
            Err(MotionError::UnknownPropertyGroup(g)) if g == "box"
        ));
        // benign
        controller.stop("box");
    }

    #[test]
    fn test_advance_writes_to_target() {
        let (scheduler, controller, target) = setup();
        controller
            .start("box", Timeline::single(Segment::tween("x", 0.0, 750.0, 2.0)))
            .unwrap();

        scheduler.tick(1.0).unwrap();
        assert_eq!(target.last("x"), Some(AnimValue::Number(375.0)));
    }

    #[test]
    fn test_stop_immediately_after_start_freezes_at_first_keyframe() {
        let (scheduler, controller, target) = setup();
        controller
            .start("box", Timeline::single(Segment::tween("x", 25.0, 750.0, 2.0)))
            .unwrap();
        controller.stop("box");

        assert_eq!(x(&controller, "box"), 25.0);
        scheduler.tick(0.5).unwrap();
        assert_eq!(x(&controller, "box"), 25.0);
        assert!(target.is_empty());
    }

    #[test]
    fn test_restart_replaces_timeline() {
        let (scheduler, controller, _) = setup();
        controller
            .start("box", Timeline::single(Segment::tween("x", 0.0, 100.0, 1.0)))
            .unwrap();
        scheduler.tick(0.5).unwrap();
        controller
            .start("box", Timeline::single(Segment::tween("x", 1000.0, 2000.0, 1.0)))
            .unwrap();
        scheduler.tick(0.5).unwrap();

        assert!((x(&controller, "box") - 1500.0).abs() < 1e-3);
        assert_eq!(scheduler.registration_count(), 1);
    }

    #[test]
    fn test_continue_from_current() {
        let (scheduler, controller, _) = setup();
        controller
            .start("box", Timeline::single(Segment::tween("x", 0.0, 100.0, 1.0)))
            .unwrap();
        scheduler.tick(0.5).unwrap();

        controller
            .start_with(
                "box",
                Timeline::single(Segment::tween("x", 0.0, 0.0, 1.0)),
                StartOptions::continue_from_current(),
            )
            .unwrap();
        assert!((x(&controller, "box") - 50.0).abs() < 1e-4);

        scheduler.tick(0.5).unwrap();
        assert!((x(&controller, "box") - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_continue_from_current_on_reversed_timeline() {
        let (scheduler, controller, _) = setup();
        controller.set_immediate("box", &PropertyValues::new().with("x", 40.0));

        let reversed = Timeline::single(Segment::tween("x", 0.0, 100.0, 1.0))
            .with_direction(crate::timeline::PlayDirection::Reverse);
        controller
            .start_with("box", reversed, StartOptions::continue_from_current())
            .unwrap();
        assert_eq!(x(&controller, "box"), 40.0);

        scheduler.tick(0.01).unwrap();
        assert!((x(&controller, "box") - 39.6).abs() < 1e-3);
        scheduler.tick(0.99).unwrap();
        assert_eq!(x(&controller, "box"), 0.0);
    }

    #[test]
    fn test_render_target_cannot_reenter_controller() {
        let scheduler = AnimationScheduler::new();
        let slot: Rc<OnceCell<ControlHandle>> = Rc::new(OnceCell::new());
        let busy = Rc::new(Cell::new(0));
        let (own, rejected) = (slot.clone(), busy.clone());
        let controller = AnimationController::new(
            &scheduler.handle(),
            move |_: &str, _: &AnimValue| {
                let Some(handle) = own.get() else {
                    return;
                };
                let restart =
                    handle.start("box", Timeline::single(Segment::tween("x", 0.0, 1.0, 1.0)));
                if matches!(restart, Err(MotionError::ControllerBusy)) {
                    rejected.set(rejected.get() + 1);
                }
                // reads and stops are ignored rather than failing
                assert!(handle.snapshot("box").is_empty());
                handle.stop("box");
            },
        );
        let _ = slot.set(controller.handle());

        controller
            .start("box", Timeline::single(Segment::tween("x", 0.0, 100.0, 1.0)))
            .unwrap();
        scheduler.tick(0.5).unwrap();

        assert_eq!(busy.get(), 1);
        assert!((x(&controller, "box") - 50.0).abs() < 1e-4);
        assert!(controller.is_animating("box"));
        assert_eq!(scheduler.registration_count(), 1);
    }

    #[test]
    fn test_mismatched_keyframes_halt_group() {
        let (scheduler, controller, target) = setup();
        let bad = Segment::new(
            "fill",
            [
                Keyframe::new(0.0, 1.0),
                Keyframe::new(1.0, Rgba::WHITE),
            ],
            1.0,
        )
        .unwrap();
        controller.start("paint", Timeline::single(bad)).unwrap();

        let report = scheduler.tick(0.5).unwrap();
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            report.failed[0].2,
            MotionError::InvalidKeyframeType { .. }
        ));
        assert!(!controller.is_animating("paint"));
        assert_eq!(scheduler.registration_count(), 0);
        // frozen at the last valid value
        assert_eq!(controller.value("paint", "fill"), Some(AnimValue::Number(1.0)));
        assert!(target.is_empty());
    }

    #[test]
    fn test_handle_is_noop_after_drop() {
        let (scheduler, controller, _) = setup();
        let handle = controller.handle();
        assert!(handle.is_alive());
        drop(controller);

        assert!(!handle.is_alive());
        handle
            .start("box", Timeline::single(Segment::tween("x", 0.0, 1.0, 1.0)))
            .unwrap();
        assert!(handle.snapshot("box").is_empty());
        assert_eq!(scheduler.registration_count(), 0);
    }

    #[test]
    fn test_set_immediate_stops_and_writes() {
        let (scheduler, controller, target) = setup();
        controller
            .start("box", Timeline::single(Segment::tween("x", 0.0, 100.0, 1.0)))
            .unwrap();
        controller.set_immediate("box", &PropertyValues::new().with("x", 7.0));

        assert!(!controller.is_animating("box"));
        assert_eq!(target.last("x"), Some(AnimValue::Number(7.0)));
        assert_eq!(scheduler.registration_count(), 0);
    }

    #[test]
    fn test_active_groups_and_stop_all() {
        let (scheduler, controller, _) = setup();
        let handle = controller.handle();
        for group in ["a", "b", "c"] {
            controller
                .start(group, Timeline::single(Segment::tween("x", 0.0, 1.0, 1.0)))
                .unwrap();
        }
        controller.stop("b");
        assert_eq!(
            controller.active_groups(),
            vec![PropertyGroup::from("a"), PropertyGroup::from("c")]
        );

        handle.stop_all();
        assert!(controller.active_groups().is_empty());
        assert!(!scheduler.is_running());
    }
}
