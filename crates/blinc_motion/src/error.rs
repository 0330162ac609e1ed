//! Motion error types

use crate::value::ValueKind;
use thiserror::Error;

/// Errors produced by the motion engine
#[derive(Error, Debug)]
pub enum MotionError {
    /// Two keyframes of one property hold values that cannot be blended
    #[error("cannot interpolate `{property}` from {from} to {to}")]
    InvalidKeyframeType {
        property: String,
        from: ValueKind,
        to: ValueKind,
    },

    /// Strict lookup of a property group that was never started
    #[error("unknown property group: {0}")]
    UnknownPropertyGroup(String),

    /// A controller group was advanced without an active registration
    #[error("group `{group}` advanced while not registered with the scheduler")]
    SchedulerNotRunning { group: String },

    /// Malformed keyframes or timing on a segment
    #[error("invalid segment: {0}")]
    InvalidSegment(String),

    /// The scheduler backing a controller no longer exists
    #[error("animation scheduler has been dropped")]
    SchedulerDropped,

    /// A controller was re-entered from its own render target or callback
    #[error("controller is busy; render targets and callbacks must not re-enter it")]
    ControllerBusy,

    /// Invalid configuration value
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for motion operations
pub type Result<T> = std::result::Result<T, MotionError>;
