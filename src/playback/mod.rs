pub mod engine;
pub mod interpolator;
pub mod viewport;

pub use engine::{PlaybackController, TickOutcome};
pub use interpolator::PositionInterpolator;
pub use viewport::Viewport;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Not playing, at the first point
    Stopped,
    Playing,
    /// Not playing, somewhere past the first point
    Paused,
}

/// Playback timing configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackConfig {
    /// Time between index advances while playing
    pub tick_interval: Duration,
    /// Marker glide time from one point to the next
    pub animation_duration: Duration,
    /// Viewport recenter time while playing
    pub pan_duration: Duration,
    /// Frame cadence of the animation loop
    pub frame_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1000),
            animation_duration: Duration::from_millis(1000),
            pan_duration: Duration::from_millis(1200),
            frame_interval: Duration::from_millis(16),
        }
    }
}
