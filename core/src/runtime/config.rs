//! Runtime configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Frame pacing settings (`[runtime]` in a toy manifest)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Target frame rate in Hz
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Maximum delta time clamp in milliseconds (prevents a catch-up burst)
    #[serde(default = "default_max_delta_ms")]
    pub max_delta_ms: u64,
    /// Tick duration warning threshold in microseconds
    #[serde(default = "default_frame_budget_us")]
    pub frame_budget_us: u64,
}

fn default_frame_rate() -> u32 {
    60
}

fn default_max_delta_ms() -> u64 {
    100
}

fn default_frame_budget_us() -> u64 {
    4000 // 4ms at 60fps
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            max_delta_ms: default_max_delta_ms(),
            frame_budget_us: default_frame_budget_us(),
        }
    }
}

impl RuntimeConfig {
    /// Time per frame (inverse of the frame rate)
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate.max(1) as f64)
    }

    pub fn max_delta(&self) -> Duration {
        Duration::from_millis(self.max_delta_ms)
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_micros(self.frame_budget_us)
    }
}

/// Step function called at the start of every tick (`[step]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepConfig {
    #[serde(default = "default_step_export")]
    pub export: String,
    /// The export returns a changed-element count; zero means converged
    #[serde(default)]
    pub reports_changes: bool,
}

fn default_step_export() -> String {
    "update".to_string()
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            export: default_step_export(),
            reports_changes: false,
        }
    }
}
