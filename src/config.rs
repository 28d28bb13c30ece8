//! Live playback knobs: interpolation speed and inter-gesture pause

use crate::error::SequencerError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Smallest per-frame step; keeps every instruction terminating
pub const MIN_SPEED: f32 = 0.001;

/// Range the UI slider exposes for speed
pub const RECOMMENDED_SPEED: RangeInclusive<f32> = 0.05..=0.50;

/// Upper end of the UI slider for the pause
pub const MAX_RECOMMENDED_PAUSE_MS: u32 = 2000;

pub const DEFAULT_SPEED: f32 = 0.1;
pub const DEFAULT_PAUSE_MS: u32 = 800;

/// Playback parameters. Both may change while a sequence is playing and
/// take effect on the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Channel units moved per frame by every active instruction
    pub speed: f32,
    /// Dwell between consecutive scripts, in milliseconds
    pub pause_ms: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            pause_ms: DEFAULT_PAUSE_MS,
        }
    }
}

fn clamp_speed(speed: f32) -> f32 {
    // NaN fails the comparison and falls back to the floor
    if speed > MIN_SPEED {
        speed
    } else {
        MIN_SPEED
    }
}

/// Why `speed` cannot be used as a per-frame step as given
fn unusable_speed(speed: f32) -> Option<&'static str> {
    if speed.is_nan() || speed <= 0.0 {
        Some("is not positive")
    } else if speed.is_infinite() {
        Some("is infinite")
    } else {
        None
    }
}

impl PlaybackConfig {
    pub fn new(speed: f32, pause_ms: u32) -> Self {
        Self { speed, pause_ms }.sanitized()
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SequencerError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SequencerError::Config(e.to_string()))?;
        config.warn_if_out_of_range();
        Ok(config.sanitized())
    }

    /// Copy with speed clamped to a positive, finite step
    pub fn sanitized(self) -> Self {
        let speed = if self.speed.is_infinite() {
            *RECOMMENDED_SPEED.end()
        } else {
            clamp_speed(self.speed)
        };
        Self { speed, ..self }
    }

    /// Speed as applied by the player, even if the field was written directly
    pub fn effective_speed(&self) -> f32 {
        self.sanitized().speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        if let Some(reason) = unusable_speed(speed) {
            self.speed = speed;
            *self = self.sanitized();
            log::warn!("Speed {} {}, using {}", speed, reason, self.speed);
        } else {
            self.speed = speed;
        }
    }

    pub fn set_pause_ms(&mut self, pause_ms: u32) {
        self.pause_ms = pause_ms;
    }

    /// Log values outside the ranges the UI offers; they are still honoured
    pub fn warn_if_out_of_range(&self) {
        if !RECOMMENDED_SPEED.contains(&self.speed) {
            log::warn!(
                "Speed {} outside recommended range {:?}",
                self.speed,
                RECOMMENDED_SPEED
            );
        }
        if self.pause_ms > MAX_RECOMMENDED_PAUSE_MS {
            log::warn!(
                "Pause {}ms exceeds recommended maximum {}ms",
                self.pause_ms,
                MAX_RECOMMENDED_PAUSE_MS
            );
        }
    }
}
