//! Frame pacing with a clamped accumulator

use std::time::{Duration, Instant};

use super::RuntimeConfig;

/// Decides when the next animation frame is due
///
/// Stands in for the display's frame callback: at most one frame is due per
/// call, and time lost to a stall is clamped rather than replayed.
#[derive(Debug, Clone)]
pub struct FramePacer {
    frame_duration: Duration,
    max_delta: Duration,
    accumulator: Duration,
    last_update: Option<Instant>,
}

impl FramePacer {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            frame_duration: config.frame_duration(),
            max_delta: config.max_delta(),
            accumulator: Duration::ZERO,
            last_update: None,
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Advance the clock to `now` and report whether a frame is due
    pub fn frame_due(&mut self, now: Instant) -> bool {
        // Calculate delta time
        let delta = match self.last_update {
            Some(last) => now.saturating_duration_since(last).min(self.max_delta),
            None => self.frame_duration,
        };
        self.last_update = Some(now);
        self.accumulator += delta;

        if self.accumulator < self.frame_duration {
            return false;
        }
        self.accumulator -= self.frame_duration;
        // Clamp remaining accumulator to prevent runaway catchup
        if self.accumulator > self.frame_duration {
            self.accumulator = self.frame_duration;
        }
        true
    }

    /// How long to wait before the next frame could be due
    pub fn time_until_next(&self) -> Duration {
        self.frame_duration.saturating_sub(self.accumulator)
    }

    /// Forget elapsed time, e.g. after the loop was paused
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
        self.last_update = None;
    }
}
