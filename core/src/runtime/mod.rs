//! Render loop orchestration
//!
//! [`LoopState`] is the explicit lifecycle of a toy. [`RenderLoop`] runs a
//! single frame (step, then paint) and [`FramePacer`] decides when the next
//! frame is due.

mod config;
mod pacer;
mod render_loop;
mod state;


pub use config::{RuntimeConfig, StepConfig};
pub use pacer::FramePacer;
pub use render_loop::{RenderFault, RenderLoop, TickOutcome};
pub use state::{LoopEvent, LoopState, TransitionError};
