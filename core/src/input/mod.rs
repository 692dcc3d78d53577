//! Input bridge
//!
//! Translates pointer and keyboard events into calls on the module's
//! exports. Pointer positions are mapped into the module's logical grid
//! using the surface's *current* bounding rectangle, so layout changes
//! between events are always honored.
//!
//! The bridge never checks whether the module finished loading; the host
//! controller ([`crate::app::AppContext`]) gates every event on that.

mod keyboard;
mod keycode;
mod pointer;


use serde::{Deserialize, Serialize};
pub use winit::keyboard::KeyCode;

use crate::surface::SurfaceRect;
use crate::wasm::{CallError, ComputationHandle};

pub use keyboard::{Direction, KeyAction, KeyboardMapping};
pub use keycode::{key_name, parse_key};
pub use pointer::{LogicalPoint, PointerEvent, map_pointer};

/// Input section of a toy manifest
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// Logical grid width (defaults to the canvas width)
    #[serde(default)]
    pub logical_width: Option<u32>,
    /// Logical grid height (defaults to the canvas height)
    #[serde(default)]
    pub logical_height: Option<u32>,
    /// Export receiving `(x, y)` clicks, e.g. `handle_input`
    #[serde(default)]
    pub click_export: Option<String>,
    /// Export receiving direction codes, e.g. `update`
    #[serde(default)]
    pub key_export: Option<String>,
    #[serde(default)]
    pub keys: KeyboardMapping,
}

/// Result of handing an event to the bridge
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    /// Not forwarded (not loaded, unbound, or outside the grid)
    Ignored,
    /// Forwarded to an export, with its result if any
    Dispatched { export: String, result: Option<u32> },
    /// A reset key was pressed; the host performs the reset
    ResetRequested,
}

/// Forwards input events to a computation module
#[derive(Debug, Clone)]
pub struct InputBridge {
    logical_width: u32,
    logical_height: u32,
    click_export: Option<String>,
    key_export: Option<String>,
    keys: KeyboardMapping,
}

impl InputBridge {
    /// Build from manifest settings, falling back to the canvas size for the
    /// logical grid
    pub fn new(config: &InputConfig, canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            logical_width: config.logical_width.unwrap_or(canvas_width),
            logical_height: config.logical_height.unwrap_or(canvas_height),
            click_export: config.click_export.clone(),
            key_export: config.key_export.clone(),
            keys: config.keys.clone(),
        }
    }

    pub fn logical_size(&self) -> (u32, u32) {
        (self.logical_width, self.logical_height)
    }

    /// Map a pointer event and forward it to the click export
    pub fn pointer(
        &self,
        handle: &mut ComputationHandle,
        rect: &SurfaceRect,
        event: PointerEvent,
    ) -> Result<InputOutcome, CallError> {
        let Some(export) = &self.click_export else {
            return Ok(InputOutcome::Ignored);
        };
        let Some(point) = map_pointer(event, rect, self.logical_width, self.logical_height) else {
            tracing::debug!(?event, "Pointer event outside the logical grid");
            return Ok(InputOutcome::Ignored);
        };

        let result = handle.call(export, &[point.x, point.y])?;
        tracing::debug!("{}({}, {}) -> {:?}", export, point.x, point.y, result);
        Ok(InputOutcome::Dispatched {
            export: export.clone(),
            result,
        })
    }

    /// Forward a key press according to the keyboard mapping
    pub fn key(&self, handle: &mut ComputationHandle, key: KeyCode) -> Result<InputOutcome, CallError> {
        match self.keys.action_for(key) {
            Some(KeyAction::Reset) => Ok(InputOutcome::ResetRequested),
            Some(KeyAction::Move(direction)) => {
                let Some(export) = &self.key_export else {
                    return Ok(InputOutcome::Ignored);
                };
                let result = handle.call(export, &[direction.code()])?;
                Ok(InputOutcome::Dispatched {
                    export: export.clone(),
                    result,
                })
            }
            None => Ok(InputOutcome::Ignored),
        }
    }
}
