//! Screen-space to logical coordinate mapping

use crate::surface::SurfaceRect;

/// Distance from an integer below which a mapped coordinate snaps to it
const SNAP_EPSILON: f64 = 1e-9;

/// A pointer event in screen-space (client) coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerEvent {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// A cell in the module's own coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalPoint {
    pub x: u32,
    pub y: u32,
}

fn to_cell(offset: f64, displayed: f64, logical: u32) -> Option<u32> {
    if !(displayed > 0.0) || logical == 0 || offset < 0.0 {
        return None;
    }
    let scale = displayed / logical as f64;
    let raw = offset / scale;
    let nearest = raw.round();
    let cell = if (raw - nearest).abs() < SNAP_EPSILON {
        nearest
    } else {
        raw.trunc()
    };
    (cell < logical as f64).then_some(cell as u32)
}

/// Map a pointer event onto the logical grid
///
/// `rect` must be the surface's bounding rectangle at the time of the event.
/// Returns `None` for events outside the grid.
pub fn map_pointer(
    event: PointerEvent,
    rect: &SurfaceRect,
    logical_width: u32,
    logical_height: u32,
) -> Option<LogicalPoint> {
    let x = to_cell(event.client_x - rect.left, rect.width, logical_width)?;
    let y = to_cell(event.client_y - rect.top, rect.height, logical_height)?;
    Some(LogicalPoint { x, y })
}
