//! Blinc Motion Engine
//!
//! Keyframe timelines, per-element animation controllers, and a frame-driven
//! scheduler that writes interpolated values to a host render target.
//!
//! # Features
//!
//! - **Interpolation**: numbers, RGBA colors, and composite transforms with
//!   exact endpoints under every easing curve
//! - **Timelines**: sequential or parallel keyframe segments with delay,
//!   repeat, and forward/reverse/alternate playback
//! - **Controllers**: one timeline per property group, replace-in-place
//!   starts, continue-from-current transitions, stop/snapshot at any time
//! - **Scheduler**: Idle/Running state machine driven by the host frame clock,
//!   holding only weak references to controllers
//! - **Orchestration**: declarative targets, staggered children, drag
//!   snap-back, and data-driven timelines loaded from TOML or JSON
//!
//! # Example
//!
//! ```ignore
//! use blinc_motion::{AnimValue, AnimationController, AnimationScheduler, ManualClock, Segment, Timeline};
//!
//! let mut clock = ManualClock::new();
//! let scheduler = AnimationScheduler::new();
//! scheduler.attach_clock(&mut clock);
//!
//! let controller = AnimationController::new(&scheduler.handle(), |property: &str, value: &AnimValue| {
//!     // apply to the element
//! });
//! controller.start("box", Timeline::single(Segment::tween("x", 0.0, 750.0, 2.0)))?;
//! clock.run(120, 1.0 / 60.0);
//! ```

pub mod clock;
pub mod config;
pub mod constraints;
pub mod controller;
pub mod easing;
pub mod error;
pub mod interpolate;
pub mod keyframe;
pub mod presets;
pub mod render;
pub mod scheduler;
pub mod spec;
pub mod stagger;
pub mod timeline;
pub mod transition;
pub mod value;

pub use clock::{FrameCallback, FrameClock, FrameTimer, ManualClock};
pub use config::MotionConfig;
pub use constraints::DragConstraints;
pub use controller::{AnimationController, ControlHandle, PropertyGroup, StartOptions};
pub use easing::Easing;
pub use error::{MotionError, Result};
pub use interpolate::{interpolate, Interpolate};
pub use keyframe::{Keyframe, Segment};
pub use presets::AnimationPreset;
pub use render::{NullTarget, RecordingTarget, RenderTarget};
pub use scheduler::{AnimationScheduler, ControllerId, SchedulerHandle, SchedulerState, TickReport};
pub use spec::{SegmentSpec, TimelineSpec};
pub use stagger::{Orchestration, StaggerConfig, StaggerDirection, When};
pub use timeline::{PlayDirection, Repeat, Timeline, TimelineFrame, TimelineMode};
pub use transition::{Animate, Transition};
pub use value::{AnimValue, PropertyValues, Rgba, Transform, ValueKind};
