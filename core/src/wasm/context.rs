//! Per-store host data
//!
//! Holds the resource limiter that enforces the RAM cap and detects memory
//! growth, plus a bounded history of diagnostics printed by the module.

use std::collections::VecDeque;

use wasmtime::{ResourceLimiter, StoreLimits, StoreLimitsBuilder};

/// Default linear memory cap for a toy (16MB)
pub const DEFAULT_RAM_LIMIT: usize = 16 * 1024 * 1024;

/// Number of `print` lines retained in the history
pub const PRINT_HISTORY: usize = 64;

/// Resource limiter that counts linear memory growth.
///
/// Every approved growth bumps the memory epoch. Views over linear memory
/// record the epoch they were taken at; a different epoch means the buffer
/// may have moved.
#[derive(Debug)]
pub struct GrowthTracker {
    inner: StoreLimits,
    epoch: u64,
    peak_bytes: usize,
}

impl GrowthTracker {
    pub fn new(ram_limit: usize) -> Self {
        Self {
            inner: StoreLimitsBuilder::new().memory_size(ram_limit).build(),
            epoch: 0,
            peak_bytes: 0,
        }
    }

    /// Number of growth events seen so far (including initial allocation)
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Largest memory size approved so far, in bytes
    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes
    }
}

impl ResourceLimiter for GrowthTracker {
    fn memory_growing(
        &mut self,
        current: usize,
        desired: usize,
        maximum: Option<usize>,
    ) -> anyhow::Result<bool> {
        let allowed = self.inner.memory_growing(current, desired, maximum)?;
        if allowed {
            // Approved growth may still fail later; over-invalidating is harmless.
            self.epoch += 1;
            self.peak_bytes = self.peak_bytes.max(desired);
            tracing::trace!(current, desired, epoch = self.epoch, "linear memory growing");
        } else {
            tracing::warn!(
                "Memory growth to {} bytes rejected (limit reached, current {} bytes)",
                desired,
                current
            );
        }
        Ok(allowed)
    }

    fn table_growing(
        &mut self,
        current: usize,
        desired: usize,
        maximum: Option<usize>,
    ) -> anyhow::Result<bool> {
        self.inner.table_growing(current, desired, maximum)
    }
}

/// Data stored alongside a module instance
#[derive(Debug)]
pub struct HostContext {
    pub limits: GrowthTracker,
    prints: VecDeque<String>,
}

impl HostContext {
    pub fn new() -> Self {
        Self::with_ram_limit(DEFAULT_RAM_LIMIT)
    }

    pub fn with_ram_limit(ram_limit: usize) -> Self {
        Self {
            limits: GrowthTracker::new(ram_limit),
            prints: VecDeque::with_capacity(PRINT_HISTORY),
        }
    }

    pub fn memory_epoch(&self) -> u64 {
        self.limits.epoch()
    }

    /// Append a line to the print history, evicting the oldest when full
    pub fn record_print(&mut self, line: String) {
        if self.prints.len() == PRINT_HISTORY {
            self.prints.pop_front();
        }
        self.prints.push_back(line);
    }

    pub fn prints(&self) -> impl Iterator<Item = &str> {
        self.prints.iter().map(String::as_str)
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new()
    }
}
