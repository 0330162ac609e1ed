//! Animation scheduler
//!
//! Drives registered controller groups once per frame. The scheduler never
//! owns a controller: it keeps weak references keyed by [`ControllerId`] and
//! an ordered list of `(controller, group)` registrations.
//!
//! ```text
//!   Idle ──register──▶ Running ──last group done / cancel_all──▶ Idle
//! ```

use crate::clock::FrameClock;
use crate::config::MotionConfig;
use crate::controller::{ControllerInner, GroupAdvance, PropertyGroup};
use crate::error::{MotionError, Result};
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Handle to a controller attached to a scheduler
    pub struct ControllerId;
}

/// Scheduler state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// No registered groups
    Idle,
    /// At least one group receives ticks
    Running,
}

/// Outcome of one [`AnimationScheduler::tick`]
#[derive(Debug, Default)]
pub struct TickReport {
    /// Groups advanced this frame
    pub advanced: usize,
    /// Groups whose timeline finished this frame (now deregistered)
    pub completed: Vec<(ControllerId, PropertyGroup)>,
    /// Groups halted by an error this frame (now deregistered)
    pub failed: Vec<(ControllerId, PropertyGroup, MotionError)>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.advanced == 0 && self.completed.is_empty() && self.failed.is_empty()
    }
}

#[derive(Clone, Debug)]
struct Registration {
    controller: ControllerId,
    group: PropertyGroup,
}

struct SchedulerInner {
    controllers: SlotMap<ControllerId, Weak<RefCell<ControllerInner>>>,
    registrations: Vec<Registration>,
    state: SchedulerState,
    frame_count: u64,
    config: MotionConfig,
    clock_attached: bool,
}

impl SchedulerInner {
    fn is_registered(&self, controller: ControllerId, group: &str) -> bool {
        self.registrations
            .iter()
            .any(|r| r.controller == controller && r.group.as_str() == group)
    }

    fn deregister(&mut self, controller: ControllerId, group: &str) {
        self.registrations
            .retain(|r| !(r.controller == controller && r.group.as_str() == group));
        self.settle();
    }

    fn deregister_controller(&mut self, controller: ControllerId) {
        self.registrations.retain(|r| r.controller != controller);
        self.settle();
    }

    fn settle(&mut self) {
        if self.registrations.is_empty() && self.state == SchedulerState::Running {
            self.state = SchedulerState::Idle;
            tracing::debug!(frame = self.frame_count, "animation scheduler idle");
        }
    }
}

/// The animation scheduler that ticks all registered controller groups
///
/// Controllers are created against a [`SchedulerHandle`] and register their
/// groups implicitly when an animation starts.
///
/// ```ignore
/// let mut clock = ManualClock::new();
/// let scheduler = AnimationScheduler::new();
/// scheduler.attach_clock(&mut clock);
///
/// let controller = AnimationController::new(&scheduler.handle(), target);
/// controller.start("box", timeline)?;
/// clock.frame(1.0 / 60.0);
/// ```
pub struct AnimationScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::with_config(MotionConfig::default())
    }

    pub fn with_config(config: MotionConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                controllers: SlotMap::with_key(),
                registrations: Vec::new(),
                state: SchedulerState::Idle,
                frame_count: 0,
                config,
                clock_attached: false,
            })),
        }
    }

    /// Subscribe to the host frame clock.
    ///
    /// Only the first call subscribes; later calls are ignored.
    pub fn attach_clock<C: FrameClock + ?Sized>(&self, clock: &mut C) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.clock_attached {
                tracing::warn!("frame clock already attached, ignoring");
                return;
            }
            inner.clock_attached = true;
        }

        let weak = Rc::downgrade(&self.inner);
        clock.on_frame(Box::new(move |dt| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Err(err) = tick(&inner, dt) {
                tracing::error!(error = %err, "animation tick failed");
            }
        }));
    }

    /// Get a handle for creating controllers
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Advance every registered group by `dt` seconds.
    ///
    /// Groups are advanced in registration order. Finished and failed groups
    /// are deregistered; completion callbacks run after the group's
    /// controller is released. An advance of a group with no active timeline
    /// is returned as [`MotionError::SchedulerNotRunning`] once the rest of
    /// the frame has been processed.
    pub fn tick(&self, dt: f32) -> Result<TickReport> {
        tick(&self.inner, dt)
    }

    /// Deregister every group and freeze each snapshot where it stands.
    ///
    /// A controller that is mid-write (this was called from its render
    /// target) keeps its registrations and timelines.
    pub fn cancel_all(&self) {
        let registrations = {
            let mut inner = self.inner.borrow_mut();
            let taken = std::mem::take(&mut inner.registrations);
            taken
                .into_iter()
                .map(|r| {
                    let controller = inner.controllers.get(r.controller).cloned();
                    (r, controller)
                })
                .collect::<Vec<_>>()
        };

        let mut cancelled = 0;
        let mut busy = Vec::new();
        for (registration, controller) in registrations {
            let Some(controller) = controller.and_then(|weak| weak.upgrade()) else {
                continue;
            };
            match controller.try_borrow_mut() {
                Ok(mut controller) => {
                    controller.halt(registration.group.as_str());
                    cancelled += 1;
                }
                Err(_) => {
                    tracing::warn!(
                        group = %registration.group,
                        "controller busy during cancel_all, group keeps running"
                    );
                    busy.push(registration);
                }
            };
        }

        let mut inner = self.inner.borrow_mut();
        // busy groups keep their slots ahead of anything registered meanwhile
        if !busy.is_empty() {
            busy.append(&mut inner.registrations);
            inner.registrations = busy;
        }
        inner.settle();
        tracing::debug!(groups = cancelled, "cancelled all animations");
    }

    pub fn state(&self) -> SchedulerState {
        self.inner.borrow().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    /// Number of `(controller, group)` pairs receiving ticks
    pub fn registration_count(&self) -> usize {
        self.inner.borrow().registrations.len()
    }

    /// Number of controllers attached (live or not yet pruned)
    pub fn controller_count(&self) -> usize {
        self.inner.borrow().controllers.len()
    }

    /// Ticks processed so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame_count
    }

    pub fn config(&self) -> MotionConfig {
        self.inner.borrow().config.clone()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn tick(scheduler: &Rc<RefCell<SchedulerInner>>, dt: f32) -> Result<TickReport> {
    let (dt, pending) = {
        let mut inner = scheduler.borrow_mut();
        inner.frame_count += 1;
        let dt = inner.config.clamp_delta(dt);
        let pending = inner.registrations.clone();
        (dt, pending)
    };

    let mut report = TickReport::default();
    let mut violation = None;

    for Registration { controller: id, group } in pending {
        // A completion callback earlier in this frame may have stopped or
        // replaced this registration.
        let controller = {
            let inner = scheduler.borrow();
            if !inner.is_registered(id, group.as_str()) {
                continue;
            }
            inner.controllers.get(id).and_then(Weak::upgrade)
        };

        let Some(controller) = controller else {
            tracing::trace!(group = %group, "pruning registration of dropped controller");
            let mut inner = scheduler.borrow_mut();
            inner.controllers.remove(id);
            inner.deregister_controller(id);
            continue;
        };

        let outcome = match controller.try_borrow_mut() {
            Ok(mut inner) => inner.advance_group(&group, dt),
            Err(_) => {
                tracing::warn!(group = %group, "controller busy, skipping frame");
                continue;
            }
        };

        match outcome {
            Ok(GroupAdvance::Running) => report.advanced += 1,
            Ok(GroupAdvance::Completed) => {
                report.advanced += 1;
                scheduler.borrow_mut().deregister(id, group.as_str());
                ControllerInner::notify_complete(&controller, &group);
                report.completed.push((id, group));
            }
            Err(err @ MotionError::SchedulerNotRunning { .. }) => {
                scheduler.borrow_mut().deregister(id, group.as_str());
                violation.get_or_insert(err);
            }
            Err(err) => {
                scheduler.borrow_mut().deregister(id, group.as_str());
                report.failed.push((id, group, err));
            }
        }
    }

    tracing::trace!(
        dt,
        advanced = report.advanced,
        completed = report.completed.len(),
        "animation tick"
    );

    match violation {
        Some(err) => Err(err),
        None => Ok(report),
    }
}

/// Weak handle to an [`AnimationScheduler`]
///
/// Held by controllers; every operation degrades gracefully once the
/// scheduler is dropped.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Check whether the scheduler still exists
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Current state, or `None` once the scheduler is dropped
    pub fn state(&self) -> Option<SchedulerState> {
        self.inner.upgrade().map(|inner| inner.borrow().state)
    }

    pub(crate) fn attach(&self, controller: Weak<RefCell<ControllerInner>>) -> Option<ControllerId> {
        let inner = self.inner.upgrade()?;
        let id = inner.borrow_mut().controllers.insert(controller);
        Some(id)
    }

    pub(crate) fn detach(&self, controller: ControllerId) {
        if let Some(inner) = self.inner.upgrade() {
            let mut inner = inner.borrow_mut();
            inner.controllers.remove(controller);
            inner.deregister_controller(controller);
        }
    }

    /// Register a group for ticks. Re-registering keeps the original position.
    pub(crate) fn register(&self, controller: ControllerId, group: &PropertyGroup) -> Result<()> {
        let inner = self.inner.upgrade().ok_or(MotionError::SchedulerDropped)?;
        let mut inner = inner.borrow_mut();
        if inner.is_registered(controller, group.as_str()) {
            return Ok(());
        }
        inner.registrations.push(Registration {
            controller,
            group: group.clone(),
        });
        if inner.state == SchedulerState::Idle {
            inner.state = SchedulerState::Running;
            tracing::debug!(group = %group, "animation scheduler running");
        }
        Ok(())
    }

    pub(crate) fn deregister(&self, controller: ControllerId, group: &str) {
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().deregister(controller, group);
        }
    }

    pub(crate) fn deregister_controller(&self, controller: ControllerId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().deregister_controller(controller);
        }
    }
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
