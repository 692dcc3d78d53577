//! Host-provided imports
//!
//! Toys import at most two things from the host: a diagnostic `print`
//! callback and, for some modules, the linear memory itself.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wasmtime::{ExternType, Linker, Memory, MemoryType, Module, Store};

use super::context::{DEFAULT_RAM_LIMIT, HostContext};
use super::values::{format_values, zero_value};

/// Fully qualified import name (`module.name`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportName {
    pub module: String,
    pub name: String,
}

impl ImportName {
    pub fn new(module: &str, name: &str) -> Self {
        Self {
            module: module.to_string(),
            name: name.to_string(),
        }
    }
}

/// Host-allocated linear memory handed to the module as an import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMemory {
    #[serde(default = "default_memory_module")]
    pub module: String,
    #[serde(default = "default_memory_name")]
    pub name: String,
    /// Initial size in 64KB pages
    pub initial: u32,
    /// Maximum size in 64KB pages
    #[serde(default)]
    pub maximum: Option<u32>,
}

fn default_memory_module() -> String {
    "js".to_string()
}

fn default_memory_name() -> String {
    "mem".to_string()
}

/// The import object passed to instantiation
#[derive(Debug, Clone)]
pub struct HostImports {
    /// Where the diagnostic print sink is imported from (None disables it)
    pub print: Option<ImportName>,
    pub memory: Option<HostMemory>,
    pub ram_limit: usize,
}

impl Default for HostImports {
    fn default() -> Self {
        Self {
            print: Some(ImportName::new("env", "print")),
            memory: None,
            ram_limit: DEFAULT_RAM_LIMIT,
        }
    }
}

/// Define the host imports a module asks for
///
/// `print` is registered with whatever function type the module declares,
/// so any argument shape is accepted. Returns the host memory if one was
/// created.
pub(crate) fn link_imports(
    linker: &mut Linker<HostContext>,
    store: &mut Store<HostContext>,
    module: &Module,
    imports: &HostImports,
) -> Result<Option<Memory>> {
    if let Some(print) = &imports.print {
        for import in module.imports() {
            if import.module() != print.module || import.name() != print.name {
                continue;
            }
            let ExternType::Func(func_ty) = import.ty() else {
                tracing::warn!(
                    "Import {}.{} is not a function; print sink not provided",
                    print.module,
                    print.name
                );
                continue;
            };

            let result_types: Vec<_> = func_ty.results().collect();
            let zeros = match result_types.iter().map(zero_value).collect::<Option<Vec<_>>>() {
                Some(zeros) => zeros,
                None => {
                    tracing::warn!(
                        "Import {}.{} returns a non-nullable reference; print sink not provided",
                        print.module,
                        print.name
                    );
                    continue;
                }
            };

            linker.func_new(
                &print.module,
                &print.name,
                func_ty.clone(),
                move |mut caller, params, results| {
                    let line = format_values(params);
                    tracing::info!("[TOY] {}", line);
                    caller.data_mut().record_print(line);
                    for (slot, zero) in results.iter_mut().zip(&zeros) {
                        *slot = zero.clone();
                    }
                    Ok(())
                },
            )?;
        }
    }

    let Some(host) = &imports.memory else {
        return Ok(None);
    };
    let memory = Memory::new(&mut *store, MemoryType::new(host.initial, host.maximum))
        .with_context(|| {
            format!(
                "Failed to allocate host memory {}.{} ({} pages)",
                host.module, host.name, host.initial
            )
        })?;
    linker.define(&*store, &host.module, &host.name, memory)?;
    Ok(Some(memory))
}
