//! Frame clocks
//!
//! The host owns the frame loop. It exposes it through [`FrameClock`], which
//! the scheduler subscribes to exactly once.

use std::time::Instant;

/// Per-frame callback receiving the frame delta in seconds
pub type FrameCallback = Box<dyn FnMut(f32)>;

/// Host frame loop (`onFrame`)
pub trait FrameClock {
    fn on_frame(&mut self, callback: FrameCallback);
}

/// Frame clock driven by explicit calls, for headless hosts and tests
#[derive(Default)]
pub struct ManualClock {
    callbacks: Vec<FrameCallback>,
    frames: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one frame of `dt` seconds to every subscriber
    pub fn frame(&mut self, dt: f32) {
        self.frames += 1;
        for callback in &mut self.callbacks {
            callback(dt);
        }
    }

    /// Deliver `count` frames of `dt` seconds
    pub fn run(&mut self, count: usize, dt: f32) {
        for _ in 0..count {
            self.frame(dt);
        }
    }

    /// Frames delivered so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn subscriber_count(&self) -> usize {
        self.callbacks.len()
    }
}

impl FrameClock for ManualClock {
    fn on_frame(&mut self, callback: FrameCallback) {
        self.callbacks.push(callback);
    }
}

/// Measures wall-clock deltas between frames
#[derive(Clone, Debug)]
pub struct FrameTimer {
    last_frame: Option<Instant>,
    target_fps: u32,
}

impl FrameTimer {
    pub fn new(target_fps: u32) -> Self {
        Self {
            last_frame: None,
            target_fps: target_fps.max(1),
        }
    }

    /// Seconds since the previous call.
    ///
    /// The first call has no previous frame and returns one nominal frame
    /// at the target rate.
    pub fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = match self.last_frame {
            Some(last) => (now - last).as_secs_f32(),
            None => 1.0 / self.target_fps as f32,
        };
        self.last_frame = Some(now);
        dt
    }

    /// Forget the previous frame so a resumed loop doesn't report the pause
    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(120)
    }
}
