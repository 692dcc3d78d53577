//! Loop state machine

use std::fmt;

/// Lifecycle of a toy's render loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// No module yet (or it was torn down)
    #[default]
    Unloaded,
    /// Module loaded and initialized; input is accepted
    Loaded,
    /// Frames are being scheduled
    Running,
    /// The simulation converged; waiting for a reset
    Paused,
    /// A tick failed; nothing runs until the module is reloaded
    Faulted,
}

/// Something that happened to the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// Load continuation finished and init succeeded
    Loaded,
    /// First frame requested
    Start,
    /// The step function reported no changes
    Converge,
    /// An external reset restarted a converged loop
    Resume,
    /// A call into the module failed
    Fault,
    /// The host is tearing the toy down
    Unload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal transition {event:?} from {from:?}")]
pub struct TransitionError {
    pub from: LoopState,
    pub event: LoopEvent,
}

impl LoopState {
    /// Apply an event, returning the next state
    pub fn apply(self, event: LoopEvent) -> Result<Self, TransitionError> {
        use LoopEvent as E;
        use LoopState as S;

        match (self, event) {
            (_, E::Unload) => Ok(S::Unloaded),
            (S::Unloaded, E::Loaded) => Ok(S::Loaded),
            (S::Loaded, E::Start) => Ok(S::Running),
            (S::Running, E::Converge) => Ok(S::Paused),
            (S::Paused, E::Resume) => Ok(S::Running),
            (S::Loaded | S::Running | S::Paused, E::Fault) => Ok(S::Faulted),
            (from, event) => Err(TransitionError { from, event }),
        }
    }

    /// The module is initialized and accepts input
    pub fn is_loaded(self) -> bool {
        matches!(self, Self::Loaded | Self::Running | Self::Paused)
    }

    /// Another frame should be scheduled
    pub fn is_scheduled(self) -> bool {
        self == Self::Running
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unloaded => "unloaded",
            Self::Loaded => "loaded",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Faulted => "faulted",
        };
        f.write_str(name)
    }
}
