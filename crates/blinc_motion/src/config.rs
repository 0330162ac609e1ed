//! Engine configuration (`motion.toml`)

use crate::error::{MotionError, Result};
use crate::transition::Transition;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Scheduler and default timing configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Largest frame delta (seconds) the scheduler passes on; 0 disables the clamp
    pub max_frame_delta: f32,
    /// Frame rate assumed for the first frame of a [`FrameTimer`](crate::clock::FrameTimer)
    pub target_fps: u32,
    /// Timing used by declarative animations that don't specify their own
    pub default_transition: Transition,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_frame_delta: 0.0,
            target_fps: 120,
            default_transition: Transition::default(),
        }
    }
}

impl MotionConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: MotionConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "loaded motion config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_frame_delta.is_finite() || self.max_frame_delta < 0.0 {
            return Err(MotionError::Config(format!(
                "max_frame_delta must be >= 0, got {}",
                self.max_frame_delta
            )));
        }
        if self.target_fps == 0 {
            return Err(MotionError::Config("target_fps must be > 0".to_string()));
        }
        let t = &self.default_transition;
        if !t.duration.is_finite() || t.duration < 0.0 || !t.delay.is_finite() || t.delay < 0.0 {
            return Err(MotionError::Config(
                "default_transition duration and delay must be >= 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply the frame-delta clamp
    pub fn clamp_delta(&self, dt: f32) -> f32 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if self.max_frame_delta > 0.0 {
            dt.min(self.max_frame_delta)
        } else {
            dt
        }
    }
}
