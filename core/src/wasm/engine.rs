//! WASM engine wrapper for loading and compiling modules

use anyhow::{Context, Result};
use wasmtime::{Engine, ExternType, Module};

/// Size of one WASM page in bytes
pub const WASM_PAGE_SIZE: usize = 65536;

/// Shared WASM engine (one per host process)
pub struct WasmEngine {
    engine: Engine,
}

impl WasmEngine {
    /// Create a new WASM engine with default configuration
    pub fn new() -> Result<Self> {
        let engine = Engine::default();
        Ok(Self { engine })
    }

    /// Get a reference to the underlying wasmtime engine
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Compile a WASM module from bytes
    pub fn load_module(&self, bytes: &[u8]) -> Result<Module> {
        Module::new(&self.engine, bytes).context("Failed to compile WASM module")
    }

    /// Validate that a module's declared memory fits the host RAM limit
    ///
    /// Checked before instantiation so an oversized module produces a clear
    /// error instead of an opaque limiter rejection. Both exported and
    /// imported memories are considered, since toys may ask the host to
    /// provide their memory.
    pub fn validate_module_memory(module: &Module, ram_limit: usize) -> Result<()> {
        let exported = module
            .exports()
            .filter_map(|export| match export.ty() {
                ExternType::Memory(ty) => Some((export.name().to_string(), ty)),
                _ => None,
            });
        let imported = module.imports().filter_map(|import| match import.ty() {
            ExternType::Memory(ty) => Some((format!("{}.{}", import.module(), import.name()), ty)),
            _ => None,
        });

        for (name, mem_type) in exported.chain(imported) {
            let min_pages = mem_type.minimum();
            let min_bytes = min_pages as usize * WASM_PAGE_SIZE;

            if min_bytes > ram_limit {
                anyhow::bail!(
                    "Module memory '{}' requires {} bytes ({} pages) minimum, \
                     but the host only allows {} bytes",
                    name,
                    min_bytes,
                    min_pages,
                    ram_limit
                );
            }

            if mem_type.maximum().is_none() {
                tracing::debug!(
                    "Module memory '{}' has no maximum declared; host will limit to {} bytes",
                    name,
                    ram_limit
                );
            }
        }
        Ok(())
    }
}
