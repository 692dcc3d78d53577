//! WASM runtime wrapper
//!
//! Provides abstractions over wasmtime for instantiating computation modules
//! and calling into them.
//!
//! # Key Types
//!
//! - [`WasmEngine`] - Shared WASM engine (one per host process)
//! - [`ComputationHandle`] - Instantiated module: exports plus linear memory
//! - [`HostImports`] - Import object (print sink, optional host memory)
//! - [`HostContext`] - Per-store data: growth-tracking limiter, print history

mod context;
mod engine;
mod handle;
mod imports;
pub mod values;

#[cfg(test)]
mod tests;

pub use context::{DEFAULT_RAM_LIMIT, GrowthTracker, HostContext, PRINT_HISTORY};
pub use engine::{WASM_PAGE_SIZE, WasmEngine};
pub use handle::{CallError, ComputationHandle};
pub use imports::{HostImports, HostMemory, ImportName};
