//! Call command - invoke one export and print its results
//!
//! Arguments are parsed according to the export's declared parameter types,
//! so `i64`/`f32`/`f64` exports can be exercised as well as `i32` ones.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use toyhost_core::loader::run_init;
use toyhost_core::wasm::values::{format_values, parse_arg};
use toyhost_core::{HostImports, ToyManifest, WasmEngine, load_from_bytes};

/// Arguments for the call command
#[derive(Args)]
pub struct CallArgs {
    /// Path to a .wasm module
    pub wasm: PathBuf,

    /// Export to call
    pub export: String,

    /// Arguments, one per declared parameter
    #[arg(allow_negative_numbers = true)]
    pub args: Vec<String>,

    /// Take host imports (and the init call) from this toy manifest
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

/// Execute the call command
pub fn execute(args: CallArgs) -> Result<()> {
    let manifest = args
        .manifest
        .as_deref()
        .map(|path| {
            ToyManifest::load(path).with_context(|| format!("Failed to load {}", path.display()))
        })
        .transpose()?;
    let imports = manifest
        .as_ref()
        .map(ToyManifest::host_imports)
        .unwrap_or_else(HostImports::default);

    let bytes = std::fs::read(&args.wasm)
        .with_context(|| format!("Failed to read {}", args.wasm.display()))?;
    let engine = WasmEngine::new()?;
    let mut handle = load_from_bytes(&engine, &bytes, &imports)?;

    if let Some(init) = manifest.as_ref().and_then(|m| m.init.as_ref()) {
        let outcome = run_init(&mut handle, init)?;
        tracing::info!("{} -> {:?}", init.export, outcome);
    }

    let Some(signature) = handle.export_signature(&args.export) else {
        bail!("'{}' is not an exported function", args.export);
    };
    let params: Vec<_> = signature.params().collect();
    if params.len() != args.args.len() {
        bail!(
            "'{}' takes {} arguments, got {}",
            args.export,
            params.len(),
            args.args.len()
        );
    }

    let values = params
        .iter()
        .zip(&args.args)
        .map(|(ty, text)| parse_arg(ty, text))
        .collect::<Result<Vec<_>, _>>()?;

    let results = handle.call_values(&args.export, &values)?;
    for line in handle.prints() {
        println!("print: {}", line);
    }
    println!("{}", format_values(&results));
    Ok(())
}
