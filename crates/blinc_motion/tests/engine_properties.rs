//! End-to-end behaviour of the timeline engine through its public API

use blinc_motion::{
    interpolate, AnimValue, AnimationController, AnimationScheduler, Easing, MotionConfig,
    MotionError, PropertyGroup, PropertyValues, RecordingTarget, Rgba, SchedulerState, Segment,
    Timeline, TimelineSpec, Transform,
};
use std::cell::RefCell;
use std::rc::Rc;

const EASINGS: [Easing; 15] = [
    Easing::Linear,
    Easing::EaseIn,
    Easing::EaseOut,
    Easing::EaseInOut,
    Easing::EaseInQuad,
    Easing::EaseOutQuad,
    Easing::EaseInOutQuad,
    Easing::EaseInCubic,
    Easing::EaseOutCubic,
    Easing::EaseInOutCubic,
    Easing::EaseInQuart,
    Easing::EaseOutQuart,
    Easing::EaseInOutQuart,
    Easing::CubicBezier(0.68, -0.6, 0.32, 1.6),
    Easing::Steps(4),
];

fn unclamped() -> AnimationScheduler {
    AnimationScheduler::with_config(MotionConfig {
        max_frame_delta: 0.0,
        ..Default::default()
    })
}

fn x_of(controller: &AnimationController, group: &str) -> f32 {
    controller
        .value(group, "x")
        .and_then(|v| v.as_number())
        .unwrap_or(f32::NAN)
}

#[test]
fn test_endpoints_are_exact_for_every_easing() {
    let pairs = [
        (AnimValue::Number(0.1), AnimValue::Number(0.7)),
        (
            AnimValue::Color(Rgba::new(0.1, 0.2, 0.3, 0.4)),
            AnimValue::Color(Rgba::new(0.9, 0.8, 0.7, 0.6)),
        ),
        (
            AnimValue::Transform(Transform::translate(3.3, -1.1).with_rotate(12.5)),
            AnimValue::Transform(Transform::scale(1.7).with_rotate(270.0)),
        ),
    ];
    for easing in EASINGS {
        for (a, b) in &pairs {
            assert_eq!(interpolate("p", a, b, 0.0, easing).unwrap(), *a, "{easing:?}");
            assert_eq!(interpolate("p", a, b, 1.0, easing).unwrap(), *b, "{easing:?}");
        }
    }
}

#[test]
fn test_linear_interpolation_is_monotonic_componentwise() {
    let a = AnimValue::Color(Rgba::new(0.0, 1.0, 0.5, 0.2));
    let b = AnimValue::Color(Rgba::new(1.0, 0.0, 0.5, 0.9));
    let mut prev = Rgba::new(0.0, 1.0, 0.5, 0.2);
    for i in 0..=100 {
        let t = i as f32 / 100.0;
        let c = interpolate("fill", &a, &b, t, Easing::Linear)
            .unwrap()
            .as_color()
            .unwrap();
        assert!(c.r >= prev.r && c.g <= prev.g && c.a >= prev.a);
        assert!((c.b - 0.5).abs() < 1e-6);
        prev = c;
    }
}

#[test]
fn test_slide_scenario_through_scheduler() {
    let scheduler = unclamped();
    let controller = AnimationController::new(&scheduler.handle(), RecordingTarget::new());
    controller
        .start("box", Timeline::single(Segment::tween("x", 0.0, 750.0, 2.0)))
        .unwrap();

    let report = scheduler.tick(1.0).unwrap();
    assert_eq!(report.advanced, 1);
    assert!(report.completed.is_empty());
    assert_eq!(x_of(&controller, "box"), 375.0);

    let report = scheduler.tick(1.0).unwrap();
    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.completed[0].1, PropertyGroup::from("box"));
    assert_eq!(x_of(&controller, "box"), 750.0);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn test_alternate_scenario_reports_done_and_stays_done() {
    let mut timeline =
        Timeline::single(Segment::tween("scale", 1.0, 1.4, 1.0)).alternate().repeat(2);

    let frame = timeline.advance(1.0).unwrap();
    assert!(!frame.done);
    assert_eq!(frame.values.number("scale"), Some(1.4));

    let frame = timeline.advance(1.0).unwrap();
    assert_eq!(frame.values.number("scale"), Some(1.0));

    let frame = timeline.advance(0.01).unwrap();
    assert!(frame.done);
    assert_eq!(frame.values.number("scale"), Some(1.0));
}

#[test]
fn test_restart_uses_only_the_new_keyframes() {
    let scheduler = unclamped();
    let target = RecordingTarget::new();
    let controller = AnimationController::new(&scheduler.handle(), target.clone());

    controller
        .start("box", Timeline::single(Segment::tween("x", 0.0, 10.0, 1.0)))
        .unwrap();
    scheduler.tick(0.5).unwrap();
    controller
        .start("box", Timeline::single(Segment::tween("x", 100.0, 200.0, 1.0)))
        .unwrap();
    target.clear();

    for _ in 0..4 {
        scheduler.tick(0.25).unwrap();
    }
    let xs: Vec<f32> = target
        .writes()
        .iter()
        .filter_map(|(_, v)| v.as_number())
        .collect();
    assert_eq!(xs.len(), 4);
    assert!(xs.iter().all(|x| (100.0..=200.0).contains(x)));
    assert_eq!(xs[3], 200.0);
}

#[test]
fn test_stop_then_tick_never_moves_snapshot() {
    let scheduler = unclamped();
    let controller = AnimationController::new(&scheduler.handle(), RecordingTarget::new());
    controller
        .start("box", Timeline::single(Segment::tween("x", 0.0, 100.0, 1.0)))
        .unwrap();
    scheduler.tick(0.3).unwrap();
    controller.stop("box");
    let frozen = controller.snapshot("box");

    for _ in 0..10 {
        scheduler.tick(0.3).unwrap();
    }
    assert_eq!(controller.snapshot("box"), frozen);
}

#[test]
fn test_stop_right_after_start_freezes_initial_keyframe() {
    let scheduler = unclamped();
    let controller = AnimationController::new(&scheduler.handle(), RecordingTarget::new());
    let segment = Segment::from_values("x", [40.0, 80.0, 120.0], 1.0).unwrap();
    controller.start("box", Timeline::single(segment)).unwrap();
    controller.stop("box");
    scheduler.tick(0.5).unwrap();
    assert_eq!(x_of(&controller, "box"), 40.0);
}

#[test]
fn test_unknown_groups_are_benign() {
    let scheduler = AnimationScheduler::new();
    let controller = AnimationController::new(&scheduler.handle(), RecordingTarget::new());
    controller.stop("never-started");
    assert_eq!(controller.snapshot("never-started"), PropertyValues::new());
    assert_eq!(controller.value("never-started", "x"), None);
    assert!(matches!(
        controller.try_snapshot("never-started"),
        Err(MotionError::UnknownPropertyGroup(_))
    ));
}

#[test]
fn test_bad_keyframes_fail_once_then_deregister() {
    let scheduler = unclamped();
    let target = RecordingTarget::new();
    let controller = AnimationController::new(&scheduler.handle(), target.clone());
    let spec = TimelineSpec::from_json(
        r#"{ "segments": [
            { "property": "x", "values": [0.0, 10.0], "duration": 1.0 },
            { "property": "tint", "values": [0.0, { "r": 1.0, "g": 0.0, "b": 0.0 }], "duration": 1.0 }
        ] }"#,
    )
    .unwrap();
    controller.start("box", spec.build().unwrap()).unwrap();
    controller
        .start("other", Timeline::single(Segment::tween("y", 0.0, 1.0, 1.0)))
        .unwrap();

    let report = scheduler.tick(0.5).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].1, PropertyGroup::from("box"));
    assert_eq!(report.advanced, 1);
    assert_eq!(target.count("x"), 0);
    assert_eq!(x_of(&controller, "box"), 0.0);

    let report = scheduler.tick(0.5).unwrap();
    assert!(report.failed.is_empty());
    assert_eq!(scheduler.registration_count(), 0);
}

#[test]
fn test_completion_callbacks_fire_once_per_group() {
    let scheduler = unclamped();
    let controller = AnimationController::new(&scheduler.handle(), RecordingTarget::new());
    let finished = Rc::new(RefCell::new(Vec::new()));
    let sink = finished.clone();
    controller.on_complete(move |group| sink.borrow_mut().push(group.to_string()));

    controller
        .start("slow", Timeline::single(Segment::tween("x", 0.0, 1.0, 2.0)))
        .unwrap();
    controller
        .start("fast", Timeline::single(Segment::tween("x", 0.0, 1.0, 1.0)))
        .unwrap();

    for _ in 0..4 {
        scheduler.tick(1.0).unwrap();
    }
    assert_eq!(*finished.borrow(), vec!["fast".to_string(), "slow".to_string()]);
}

#[test]
fn test_config_file_drives_frame_clamp() {
    let path = std::env::temp_dir().join(format!("blinc-motion-{}.toml", std::process::id()));
    std::fs::write(&path, "max_frame_delta = 0.25\ntarget_fps = 60\n").unwrap();
    let config = MotionConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let scheduler = AnimationScheduler::with_config(config);
    let controller = AnimationController::new(&scheduler.handle(), RecordingTarget::new());
    controller
        .start("box", Timeline::single(Segment::tween("x", 0.0, 100.0, 1.0)))
        .unwrap();
    scheduler.tick(3.0).unwrap();
    assert_eq!(x_of(&controller, "box"), 25.0);
}
