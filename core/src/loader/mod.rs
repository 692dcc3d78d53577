//! Module loader
//!
//! Turns a byte source into an instantiated [`ComputationHandle`]. Two
//! acquisition modes exist:
//!
//! - [`load_from_bytes`] for a buffer that is already complete
//! - [`load_streaming`] for a body that is still arriving; section framing is
//!   checked chunk by chunk, so a malformed binary fails without waiting for
//!   the rest of the download
//!
//! Network failures are reported once and never retried. Running `init` is a
//! separate step ([`run_init`]) so the host controller decides what a failed
//! init means for the rest of the page.

mod framing;
mod init;
mod source;


use std::path::PathBuf;

use futures_util::{Stream, StreamExt};

use crate::wasm::{ComputationHandle, HostImports, WasmEngine};

pub use framing::{Framing, ModuleFramer};
pub use init::{HostValue, InitArg, InitConfig, InitError, InitOutcome, run_init};
pub use source::{ModuleSource, fetch_module_stream};
pub(crate) use source::is_url;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to fetch {location}: {message}")]
    Network { location: String, message: String },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed module at byte {offset}: {message}")]
    Malformed { offset: usize, message: String },
    #[error("compilation failed: {0}")]
    Compile(String),
    #[error("instantiation failed: {0}")]
    Instantiate(String),
}

/// Compile and instantiate a complete binary
pub fn load_from_bytes(
    engine: &WasmEngine,
    bytes: &[u8],
    imports: &HostImports,
) -> Result<ComputationHandle, LoadError> {
    ModuleFramer::new().advance(bytes, true)?;
    compile_and_instantiate(engine, bytes, imports)
}

/// Compile and instantiate a binary while it is still being received
///
/// Chunks are framed as they arrive. The first stream error aborts the load.
pub async fn load_streaming<S, B>(
    engine: &WasmEngine,
    stream: S,
    imports: &HostImports,
) -> Result<ComputationHandle, LoadError>
where
    S: Stream<Item = Result<B, LoadError>>,
    B: AsRef<[u8]>,
{
    let mut stream = std::pin::pin!(stream);
    let mut framer = ModuleFramer::new();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(chunk?.as_ref());
        if framer.advance(&buf, false)? == Framing::Complete {
            break;
        }
    }
    framer.advance(&buf, true)?;

    tracing::debug!(
        "Received {} bytes ({} sections), compiling",
        buf.len(),
        framer.sections()
    );
    compile_and_instantiate(engine, &buf, imports)
}

/// Load a module from any source
pub async fn load(
    engine: &WasmEngine,
    source: &ModuleSource,
    imports: &HostImports,
) -> Result<ComputationHandle, LoadError> {
    tracing::info!("Loading module from {}", source);
    match source {
        ModuleSource::Bytes(bytes) => load_from_bytes(engine, bytes, imports),
        ModuleSource::Path(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            load_from_bytes(engine, &bytes, imports)
        }
        ModuleSource::Url(url) => {
            let stream = fetch_module_stream(url).await?;
            load_streaming(engine, stream, imports).await
        }
    }
}

fn compile_and_instantiate(
    engine: &WasmEngine,
    bytes: &[u8],
    imports: &HostImports,
) -> Result<ComputationHandle, LoadError> {
    let module = engine
        .load_module(bytes)
        .map_err(|e| LoadError::Compile(format!("{:#}", e)))?;

    WasmEngine::validate_module_memory(&module, imports.ram_limit)
        .map_err(|e| LoadError::Instantiate(format!("{:#}", e)))?;

    ComputationHandle::instantiate(engine, &module, imports)
        .map_err(|e| LoadError::Instantiate(format!("{:#}", e)))
}
