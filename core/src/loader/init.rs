//! Module initialization

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::wasm::{CallError, ComputationHandle};

/// Values computed by the host when init runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostValue {
    /// Wall clock in milliseconds, truncated to 32 bits (used as a seed)
    ClockMillis,
}

/// One argument passed to the init export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitArg {
    Value(u32),
    Host(HostValue),
}

impl InitArg {
    pub fn resolve(self) -> u32 {
        match self {
            Self::Value(value) => value,
            Self::Host(HostValue::ClockMillis) => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_millis() as u32)
                .unwrap_or(0),
        }
    }
}

/// `[init]` section of a toy manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitConfig {
    #[serde(default = "default_init_export")]
    pub export: String,
    #[serde(default)]
    pub args: Vec<InitArg>,
}

fn default_init_export() -> String {
    "init".to_string()
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            export: default_init_export(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The export returns nothing; success is assumed
    NoStatus,
    /// Nonzero status reported by the module
    Status(u32),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InitError {
    #[error("'{export}' reported failure (status {status})")]
    Failed { export: String, status: u32 },
    #[error("init export '{0}' not found")]
    Missing(String),
    #[error(transparent)]
    Call(#[from] CallError),
}

/// Run the init export
///
/// A returned zero is the module's allocation failure sentinel.
pub fn run_init(handle: &mut ComputationHandle, config: &InitConfig) -> Result<InitOutcome, InitError> {
    if !handle.has_export(&config.export) {
        return Err(InitError::Missing(config.export.clone()));
    }

    let args: Vec<u32> = config.args.iter().map(|arg| arg.resolve()).collect();
    tracing::debug!("Calling {}{:?}", config.export, args);

    match handle.call(&config.export, &args)? {
        None => Ok(InitOutcome::NoStatus),
        Some(0) => Err(InitError::Failed {
            export: config.export.clone(),
            status: 0,
        }),
        Some(status) => Ok(InitOutcome::Status(status)),
    }
}
