//! Per-frame tick: step, then paint

use std::time::Instant;

use crate::scene::{Repaint, SceneError, ScenePainter};
use crate::surface::Surface;
use crate::wasm::{CallError, ComputationHandle};

use super::{RuntimeConfig, StepConfig};

/// What the host should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Schedule another frame
    Continue,
    /// Stop scheduling until an external reset
    Converged,
}

/// A tick failed; the loop must not be rescheduled
#[derive(Debug, thiserror::Error)]
pub enum RenderFault {
    #[error("step export '{export}' failed: {source}")]
    Step { export: String, source: CallError },
    #[error("paint failed: {0}")]
    Paint(#[from] SceneError),
}

/// Drives one module: calls its step function and paints the result
#[derive(Debug)]
pub struct RenderLoop {
    step: Option<StepConfig>,
    painter: ScenePainter,
    config: RuntimeConfig,
    frames: u64,
}

impl RenderLoop {
    pub fn new(step: Option<StepConfig>, painter: ScenePainter, config: RuntimeConfig) -> Self {
        Self {
            step,
            painter,
            config,
            frames: 0,
        }
    }

    /// Acquire the scene's inputs once init has succeeded
    pub fn prepare(&mut self, handle: &mut ComputationHandle) -> Result<(), SceneError> {
        self.painter.prepare(handle)
    }

    /// Run one frame
    ///
    /// The paint always reflects the state after this tick's step call,
    /// including on the tick that converges.
    pub fn tick<S: Surface + ?Sized>(
        &mut self,
        handle: &mut ComputationHandle,
        surface: &mut S,
    ) -> Result<TickOutcome, RenderFault> {
        let tick_start = Instant::now();
        let mut converged = false;

        if let Some(step) = &self.step {
            let changes = handle.call(&step.export, &[]).map_err(|source| RenderFault::Step {
                export: step.export.clone(),
                source,
            })?;
            if step.reports_changes && changes == Some(0) {
                tracing::debug!("{} reported no changes, converging", step.export);
                converged = true;
            }
        }

        self.painter.paint(handle, surface)?;
        self.frames += 1;

        if self.painter.repaint() == Repaint::Once {
            converged = true;
        }

        // Check frame budget
        let tick_time = tick_start.elapsed();
        if tick_time > self.config.frame_budget() {
            tracing::warn!(
                "Tick took {:?}, exceeds budget of {:?}",
                tick_time,
                self.config.frame_budget()
            );
        }

        Ok(if converged {
            TickOutcome::Converged
        } else {
            TickOutcome::Continue
        })
    }

    /// Drop the cached frame view, e.g. after the module was re-initialized
    pub fn invalidate(&mut self) {
        self.painter.invalidate();
    }

    pub fn painter(&self) -> &ScenePainter {
        &self.painter
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Frames painted so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
