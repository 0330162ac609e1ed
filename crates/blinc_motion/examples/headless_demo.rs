//! Headless Motion Demo
//!
//! Drives the five demo boxes through a real-time frame loop and logs the
//! values each render target receives.
//!
//! Run with:
//! `RUST_LOG=blinc_motion=debug,headless_demo=info cargo run -p blinc_motion --example headless_demo [motion.toml]`

use anyhow::{Context, Result};
use blinc_motion::{
    AnimValue, Animate, AnimationController, AnimationScheduler, DragConstraints, FrameTimer,
    ManualClock, MotionConfig, Orchestration, PropertyValues, Segment, StaggerConfig, StartOptions,
    TimelineSpec, Transition, When,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const BOX4: &str = r#"
[[segments]]
property = "scale"
values = [1.0, 1.4, 1.4, 1.0, 1.0]
duration = 2.0
easing = "ease_in_out"

[[segments]]
property = "borderRadius"
values = [20.0, 20.0, 50.0, 50.0, 20.0]
duration = 2.0
easing = "ease_in_out"

[[segments]]
property = "rotate"
values = [0.0, 0.0, 270.0, 270.0, 0.0]
duration = 2.0
easing = "ease_in_out"
"#;

fn logging_target(name: &'static str) -> impl FnMut(&str, &AnimValue) {
    move |property: &str, value: &AnimValue| {
        tracing::info!(target: "headless_demo", element = name, property, ?value);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => MotionConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => MotionConfig::default(),
    };

    let mut clock = ManualClock::new();
    let scheduler = AnimationScheduler::with_config(config.clone());
    scheduler.attach_clock(&mut clock);
    let handle = scheduler.handle();

    // Box1: state toggle
    let box1 = AnimationController::new(&handle, logging_target("box1"));
    let mut box1_state = Animate::new("box", config.default_transition);
    box1_state.initial(&box1.handle(), &PropertyValues::new().with("opacity", 0.1));
    box1_state.update(
        &box1.handle(),
        PropertyValues::new()
            .with("x", 750.0)
            .with("opacity", 1.0)
            .with("rotate", 360.0),
    )?;

    // Box2: drag released outside its bounds
    let box2 = AnimationController::new(&handle, logging_target("box2"));
    let bounds = DragConstraints::new(20.0, 20.0, 5.0, 5.0);
    bounds.drag_to(&box2.handle(), "drag", 140.0, 60.0);
    bounds.release(&box2.handle(), "drag", &Transition::new(0.4))?;

    // Box3: staggered list
    let box3 = AnimationController::new(&handle, logging_target("box3"));
    let child = || {
        vec![
            Segment::tween("x", -10.0, 0.0, 0.3),
            Segment::tween("opacity", 0.0, 1.0, 0.3),
        ]
    };
    let list = Orchestration::new()
        .with_delay(0.5)
        .with_stagger(StaggerConfig::new(0.2))
        .with_when(When::BeforeChildren)
        .compose([Segment::tween("x", -1000.0, 0.0, 0.3)], &[child(), child(), child()]);
    box3.start("list", list)?;

    // Box4: keyframe arrays from data
    let box4 = AnimationController::new(&handle, logging_target("box4"));
    box4.start("show", TimelineSpec::from_toml(BOX4)?.build()?)?;

    // Box5: imperative control, stopped halfway by the "Stop" button
    let box5 = AnimationController::new(&handle, logging_target("box5"));
    let control = box5.handle();
    let move_right = Transition::new(2.0).timeline(
        &PropertyValues::new().with("x", 0.0),
        &PropertyValues::new().with("x", 750.0),
    );
    control.start_with("position", move_right, StartOptions::continue_from_current())?;

    let mut timer = FrameTimer::new(config.target_fps);
    let frame_time = Duration::from_secs_f32(1.0 / config.target_fps as f32);
    let mut elapsed = 0.0;
    let mut stopped = false;

    while scheduler.is_running() {
        std::thread::sleep(frame_time);
        let dt = timer.delta();
        elapsed += dt;
        clock.frame(dt);

        if !stopped && elapsed >= 1.0 {
            control.stop_all();
            stopped = true;
            tracing::info!(target: "headless_demo", snapshot = ?control.snapshot("position"), "box5 stopped");
        }
    }

    tracing::info!(
        target: "headless_demo",
        frames = scheduler.frame_count(),
        seconds = elapsed,
        "all animations settled"
    );
    Ok(())
}
