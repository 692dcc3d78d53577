//! Frame buffer views over linear memory
//!
//! A computation module exposes its pixels as a byte range of its linear
//! memory, described by four exports (`startAddr`, `getSize`, `getWidth`,
//! `getHeight`). [`FrameBufferView`] captures that layout together with the
//! memory epoch at which it was taken.
//!
//! Growing linear memory may move the underlying buffer, so any growth makes
//! every previously taken view stale. A stale view refuses to hand out
//! pixels until it is re-acquired, which turns a use-after-growth bug into
//! an explicit [`FrameError::Stale`].
//!
//! # Re-acquisition policy
//!
//! [`ReacquirePolicy::EveryFrame`] (the default) re-queries the layout every
//! tick. It costs four export calls per frame and removes the whole class of
//! stale-layout bugs, including modules that move their buffer without
//! growing memory. [`ReacquirePolicy::OnGrowth`] acquires once after init and
//! again only when the limiter has signaled growth or the view was
//! invalidated.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::surface::ImageRef;
use crate::wasm::{CallError, ComputationHandle};

#[cfg(test)]
mod tests;

/// Bytes per RGBA pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// When to re-derive the frame layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReacquirePolicy {
    #[default]
    EveryFrame,
    OnGrowth,
}

impl ReacquirePolicy {
    /// Whether `view` must be re-acquired before it is read this frame
    pub fn needs_reacquire(self, view: &FrameBufferView, handle: &ComputationHandle) -> bool {
        match self {
            Self::EveryFrame => true,
            Self::OnGrowth => view.is_stale(handle),
        }
    }
}

/// Names of the exports describing the pixel buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameExports {
    #[serde(default = "default_start_export")]
    pub start: String,
    #[serde(default = "default_size_export")]
    pub size: String,
    #[serde(default = "default_width_export")]
    pub width: String,
    #[serde(default = "default_height_export")]
    pub height: String,
}

fn default_start_export() -> String {
    "startAddr".to_string()
}
fn default_size_export() -> String {
    "getSize".to_string()
}
fn default_width_export() -> String {
    "getWidth".to_string()
}
fn default_height_export() -> String {
    "getHeight".to_string()
}

impl Default for FrameExports {
    fn default() -> Self {
        Self {
            start: default_start_export(),
            size: default_size_export(),
            width: default_width_export(),
            height: default_height_export(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error(transparent)]
    Call(#[from] CallError),
    #[error("layout export '{0}' returned no value")]
    MissingValue(String),
    #[error("module has no linear memory")]
    NoMemory,
    #[error("frame of {width}x{height} needs {expected} bytes but the module reports {size}")]
    ShapeMismatch {
        width: u32,
        height: u32,
        size: u32,
        expected: u64,
    },
    #[error("frame range {start}..{end} exceeds linear memory of {memory_len} bytes")]
    OutOfBounds {
        start: u64,
        end: u64,
        memory_len: usize,
    },
    #[error("frame view is stale (memory grew or the view was invalidated)")]
    Stale,
}

/// Location and shape of the pixel buffer inside linear memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub start: u32,
    pub size: u32,
    pub width: u32,
    pub height: u32,
}

impl FrameLayout {
    /// Query the layout from the module's exports
    pub fn query(handle: &mut ComputationHandle, exports: &FrameExports) -> Result<Self, FrameError> {
        let mut read = |name: &str| -> Result<u32, FrameError> {
            handle
                .call(name, &[])?
                .ok_or_else(|| FrameError::MissingValue(name.to_string()))
        };
        Ok(Self {
            start: read(&exports.start)?,
            size: read(&exports.size)?,
            width: read(&exports.width)?,
            height: read(&exports.height)?,
        })
    }

    /// Check the shape and that the range lies within `memory_len` bytes
    pub fn validate(&self, memory_len: usize) -> Result<(), FrameError> {
        let expected = self.width as u64 * self.height as u64 * BYTES_PER_PIXEL as u64;
        if self.size as u64 != expected {
            return Err(FrameError::ShapeMismatch {
                width: self.width,
                height: self.height,
                size: self.size,
                expected,
            });
        }
        let start = self.start as u64;
        let end = start + self.size as u64;
        if end > memory_len as u64 {
            return Err(FrameError::OutOfBounds {
                start,
                end,
                memory_len,
            });
        }
        Ok(())
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.start as usize + self.size as usize
    }
}

/// Read-only view of the module's pixel buffer
///
/// The view does not borrow the memory; it hands out borrowed slices on
/// demand through [`FrameBufferView::pixels`], and only while it is valid.
#[derive(Debug, Clone)]
pub struct FrameBufferView {
    exports: FrameExports,
    layout: FrameLayout,
    epoch: u64,
    valid: bool,
}

impl FrameBufferView {
    /// Query the layout and take a view at the current memory epoch
    pub fn acquire(handle: &mut ComputationHandle, exports: &FrameExports) -> Result<Self, FrameError> {
        if !handle.has_memory() {
            return Err(FrameError::NoMemory);
        }
        // Layout queries may themselves grow memory; read the epoch afterwards.
        let layout = FrameLayout::query(handle, exports)?;
        layout.validate(handle.memory_len())?;
        Ok(Self {
            exports: exports.clone(),
            layout,
            epoch: handle.memory_epoch(),
            valid: true,
        })
    }

    /// Re-query the layout; on failure the view stays invalid
    pub fn reacquire(&mut self, handle: &mut ComputationHandle) -> Result<(), FrameError> {
        self.valid = false;
        *self = Self::acquire(handle, &self.exports)?;
        Ok(())
    }

    /// Mark the view unusable until the next [`reacquire`](Self::reacquire)
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// True if invalidated or if memory has grown since acquisition
    pub fn is_stale(&self, handle: &ComputationHandle) -> bool {
        !self.valid || self.epoch != handle.memory_epoch()
    }

    /// Pixel bytes of the current frame
    pub fn pixels<'h>(&self, handle: &'h ComputationHandle) -> Result<&'h [u8], FrameError> {
        if self.is_stale(handle) {
            return Err(FrameError::Stale);
        }
        let memory = handle.memory_bytes();
        self.layout.validate(memory.len())?;
        Ok(&memory[self.layout.range()])
    }

    /// The current frame as a borrowed image
    pub fn image<'h>(&self, handle: &'h ComputationHandle) -> Result<ImageRef<'h>, FrameError> {
        Ok(ImageRef {
            width: self.layout.width,
            height: self.layout.height,
            data: self.pixels(handle)?,
        })
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn height(&self) -> u32 {
        self.layout.height
    }
}
