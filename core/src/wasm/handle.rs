//! Handle to an instantiated computation module

use std::fmt;

use anyhow::{Context, Result};
use wasmtime::{FuncType, Instance, Linker, Memory, Module, Store, Val};

use super::context::HostContext;
use super::engine::WasmEngine;
use super::imports::{HostImports, link_imports};
use super::values::{coerce_u32, val_to_u32};

/// Error calling into a module export
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    #[error("export '{0}' not found")]
    MissingExport(String),
    #[error("export '{export}' expects {expected} arguments, got {got}")]
    Arity {
        export: String,
        expected: usize,
        got: usize,
    },
    #[error("export '{0}' has a signature the host cannot drive")]
    UnsupportedSignature(String),
    #[error("export '{export}' trapped: {message}")]
    Trap { export: String, message: String },
}

/// An instantiated computation module
///
/// Owns the store, so all exports and the linear memory live exactly as
/// long as the handle.
pub struct ComputationHandle {
    store: Store<HostContext>,
    instance: Instance,
    memory: Option<Memory>,
}

impl fmt::Debug for ComputationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputationHandle")
            .field("memory_len", &self.memory_len())
            .field("memory_epoch", &self.memory_epoch())
            .finish_non_exhaustive()
    }
}

impl ComputationHandle {
    /// Instantiate a compiled module with the given host imports
    ///
    /// The linear memory is the module's `memory` export, or the
    /// host-provided memory when the module only imports one.
    pub fn instantiate(engine: &WasmEngine, module: &Module, imports: &HostImports) -> Result<Self> {
        let mut store = Store::new(engine.engine(), HostContext::with_ram_limit(imports.ram_limit));

        // Enable resource limiter to enforce memory constraints and track growth
        store.limiter(|ctx| &mut ctx.limits);

        let mut linker = Linker::new(engine.engine());
        let host_memory = link_imports(&mut linker, &mut store, module, imports)?;

        let instance = linker
            .instantiate(&mut store, module)
            .context("Failed to instantiate WASM module")?;

        let memory = instance.get_memory(&mut store, "memory").or(host_memory);
        if memory.is_none() {
            tracing::debug!("Module exposes no linear memory");
        }

        Ok(Self {
            store,
            instance,
            memory,
        })
    }

    pub fn has_export(&mut self, name: &str) -> bool {
        self.instance.get_func(&mut self.store, name).is_some()
    }

    /// Signature of an exported function
    pub fn export_signature(&mut self, name: &str) -> Option<FuncType> {
        self.instance
            .get_func(&mut self.store, name)
            .map(|func| func.ty(&self.store))
    }

    /// Call an export with integer arguments
    ///
    /// Arguments are coerced to the declared numeric parameter types. The
    /// first result, if the export returns any, is read back as a `u32`.
    pub fn call(&mut self, name: &str, args: &[u32]) -> Result<Option<u32>, CallError> {
        let ty = self
            .export_signature(name)
            .ok_or_else(|| CallError::MissingExport(name.to_string()))?;

        let expected = ty.params().len();
        if expected != args.len() {
            return Err(CallError::Arity {
                export: name.to_string(),
                expected,
                got: args.len(),
            });
        }

        let params = ty
            .params()
            .zip(args)
            .map(|(param, &arg)| coerce_u32(&param, arg))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| CallError::UnsupportedSignature(name.to_string()))?;

        let results = self.call_values(name, &params)?;
        match results.first() {
            Some(val) => val_to_u32(val)
                .map(Some)
                .ok_or_else(|| CallError::UnsupportedSignature(name.to_string())),
            None => Ok(None),
        }
    }

    /// Call an export with already-typed arguments, returning all results
    pub fn call_values(&mut self, name: &str, args: &[Val]) -> Result<Vec<Val>, CallError> {
        let func = self
            .instance
            .get_func(&mut self.store, name)
            .ok_or_else(|| CallError::MissingExport(name.to_string()))?;

        let ty = func.ty(&self.store);
        if ty.params().len() != args.len() {
            return Err(CallError::Arity {
                export: name.to_string(),
                expected: ty.params().len(),
                got: args.len(),
            });
        }

        let mut results = vec![Val::I32(0); ty.results().len()];
        func.call(&mut self.store, args, &mut results)
            .map_err(|e| CallError::Trap {
                export: name.to_string(),
                message: format!("{:#}", e),
            })?;
        Ok(results)
    }

    /// Names of all exported functions, in declaration order
    pub fn function_exports(&mut self) -> Vec<String> {
        self.instance
            .exports(&mut self.store)
            .filter_map(|export| {
                let name = export.name().to_string();
                export.into_func().map(|_| name)
            })
            .collect()
    }

    /// Current contents of linear memory (empty if the module has none)
    pub fn memory_bytes(&self) -> &[u8] {
        match self.memory {
            Some(memory) => memory.data(&self.store),
            None => &[],
        }
    }

    pub fn memory_len(&self) -> usize {
        self.memory
            .map(|memory| memory.data_size(&self.store))
            .unwrap_or(0)
    }

    pub fn has_memory(&self) -> bool {
        self.memory.is_some()
    }

    /// Growth counter of the store's linear memories
    pub fn memory_epoch(&self) -> u64 {
        self.store.data().memory_epoch()
    }

    /// Lines the module has sent to the print sink
    pub fn prints(&self) -> impl Iterator<Item = &str> {
        self.store.data().prints()
    }

    pub fn store(&self) -> &Store<HostContext> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store<HostContext> {
        &mut self.store
    }
}
