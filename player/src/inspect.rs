//! Inspect command - list a module's imports and exports

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use toyhost_core::WasmEngine;
use toyhost_core::loader::ModuleFramer;
use wasmtime::{ExternType, FuncType};

/// Arguments for the inspect command
#[derive(Args)]
pub struct InspectArgs {
    /// Path to a .wasm module
    pub wasm: PathBuf,
}

fn describe_func(ty: &FuncType) -> String {
    let params: Vec<String> = ty.params().map(|p| p.to_string()).collect();
    let results: Vec<String> = ty.results().map(|r| r.to_string()).collect();
    format!("func ({}) -> ({})", params.join(", "), results.join(", "))
}

fn describe(ty: &ExternType) -> String {
    match ty {
        ExternType::Func(func) => describe_func(func),
        ExternType::Memory(memory) => match memory.maximum() {
            Some(max) => format!("memory {}..{} pages", memory.minimum(), max),
            None => format!("memory {}.. pages", memory.minimum()),
        },
        ExternType::Global(global) => format!("global {:?} {}", global.mutability(), global.content()),
        ExternType::Table(table) => format!("table {} x{}", table.element(), table.minimum()),
        other => format!("{:?}", other),
    }
}

/// Execute the inspect command
pub fn execute(args: InspectArgs) -> Result<()> {
    let bytes = std::fs::read(&args.wasm)
        .with_context(|| format!("Failed to read {}", args.wasm.display()))?;

    let mut framer = ModuleFramer::new();
    framer.advance(&bytes, true)?;

    let engine = WasmEngine::new()?;
    let module = engine.load_module(&bytes)?;

    println!("{} ({} bytes, {} sections)", args.wasm.display(), bytes.len(), framer.sections());
    println!("imports:");
    for import in module.imports() {
        println!("  {}.{}: {}", import.module(), import.name(), describe(&import.ty()));
    }
    println!("exports:");
    for export in module.exports() {
        println!("  {}: {}", export.name(), describe(&export.ty()));
    }
    Ok(())
}
