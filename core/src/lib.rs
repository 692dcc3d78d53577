//! Toyhost Core - Host runtime for canvas toys
//!
//! A toy is a compiled WebAssembly computation module plus a TOML manifest.
//! The host loads the module, initializes it, and repeatedly asks it to step
//! and paint onto a 2D surface while forwarding pointer and keyboard input.
//!
//! # Architecture
//!
//! - [`loader`] - Fetches, frames, compiles and instantiates modules
//! - [`wasm`] - [`ComputationHandle`] over a wasmtime store and its memory
//! - [`framebuffer`] - Validated views of a module's pixel buffer
//! - [`scene`] - Paints a module's state onto a [`Surface`]
//! - [`runtime`] - Loop state machine, per-frame tick and frame pacing
//! - [`input`] - Maps pointer and keyboard events onto module exports
//! - [`app`] - [`AppContext`], the controller tying the above together
//! - [`cache`] - Named on-disk asset cache for offline use
//! - [`config`] - Toy manifests

pub mod app;
pub mod cache;
pub mod config;
pub mod framebuffer;
pub mod input;
#[cfg(test)]
mod integration;
pub mod loader;
pub mod runtime;
pub mod scene;
pub mod surface;
#[cfg(test)]
pub mod test_utils;
pub mod wasm;

pub use app::{AppContext, Diagnostic, Diagnostics, Level};
pub use cache::{CacheError, OfflineCache};
pub use config::{ManifestError, ToyManifest};
pub use framebuffer::{FrameBufferView, FrameError, ReacquirePolicy};
pub use loader::{InitError, LoadError, ModuleSource, load, load_from_bytes, load_streaming};
pub use runtime::{FramePacer, LoopState, RenderLoop, RuntimeConfig, TickOutcome};
pub use surface::{PixelSurface, Surface, SurfaceRect};
pub use wasm::{CallError, ComputationHandle, HostImports, WasmEngine};
