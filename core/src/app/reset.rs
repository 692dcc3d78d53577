//! What a reset does to the module

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::wasm::{CallError, ComputationHandle};

/// `[reset]` section of a toy manifest
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResetAction {
    /// Call the init export again with the same arguments
    #[default]
    Reinit,
    /// Set `count` random cells through `export(index)`, with indices in
    /// `0..range`
    Scatter {
        #[serde(default = "default_scatter_export")]
        export: String,
        #[serde(default = "default_scatter_count")]
        count: u32,
        #[serde(default = "default_scatter_range")]
        range: u32,
    },
}

fn default_scatter_export() -> String {
    "set_cell".to_string()
}

fn default_scatter_count() -> u32 {
    500
}

fn default_scatter_range() -> u32 {
    1024
}

/// Call `export` with `count` random indices below `range`
pub(crate) fn scatter(
    handle: &mut ComputationHandle,
    export: &str,
    count: u32,
    range: u32,
) -> Result<(), CallError> {
    if range == 0 {
        return Ok(());
    }
    let mut rng = rand::rng();
    for _ in 0..count {
        handle.call(export, &[rng.random_range(0..range)])?;
    }
    tracing::debug!("Scattered {} cells via {}", count, export);
    Ok(())
}
