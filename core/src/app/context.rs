//! Host controller owning one toy

use winit::keyboard::KeyCode;

use crate::config::ToyManifest;
use crate::input::{InputBridge, InputOutcome, PointerEvent};
use crate::loader::{InitConfig, InitError, LoadError, run_init};
use crate::runtime::{LoopEvent, LoopState, RenderLoop, TickOutcome};
use crate::scene::ScenePainter;
use crate::surface::Surface;
use crate::wasm::ComputationHandle;

use super::diagnostics::Diagnostics;
use super::reset::{ResetAction, scatter};

/// Everything one toy needs, passed explicitly to the loop, the input
/// handlers and the load continuation
pub struct AppContext<S: Surface> {
    name: String,
    surface: S,
    state: LoopState,
    handle: Option<ComputationHandle>,
    render: RenderLoop,
    input: InputBridge,
    init: Option<InitConfig>,
    reset: ResetAction,
    diagnostics: Diagnostics,
    torn_down: bool,
}

impl<S: Surface> AppContext<S> {
    pub fn new(surface: S, manifest: &ToyManifest) -> Self {
        let render = RenderLoop::new(
            manifest.step.clone(),
            ScenePainter::new(manifest.scene.clone()),
            manifest.runtime.clone(),
        );
        let input = InputBridge::new(&manifest.input, manifest.canvas.width, manifest.canvas.height);

        Self {
            name: manifest.name.clone(),
            surface,
            state: LoopState::Unloaded,
            handle: None,
            render,
            input,
            init: manifest.init.clone(),
            reset: manifest.reset.clone(),
            diagnostics: Diagnostics::default(),
            torn_down: false,
        }
    }

    /// Load continuation
    ///
    /// Runs init and, if it succeeds, starts the render loop. Any failure is
    /// reported once and leaves the toy inert. A no-op after [`teardown`].
    ///
    /// [`teardown`]: Self::teardown
    pub fn on_loaded(&mut self, loaded: Result<ComputationHandle, LoadError>) -> bool {
        if self.torn_down {
            tracing::debug!("{}: load finished after teardown, ignoring", self.name);
            return false;
        }
        if self.state != LoopState::Unloaded {
            self.diagnostics
                .warn(format!("{}: module already loaded, ignoring second load", self.name));
            return false;
        }

        let mut handle = match loaded {
            Ok(handle) => handle,
            Err(e) => {
                self.diagnostics
                    .error(format!("{}: failed to load module: {}", self.name, e));
                return false;
            }
        };

        if let Some(init) = &self.init {
            match run_init(&mut handle, init) {
                Ok(outcome) => tracing::debug!("{}: init returned {:?}", self.name, outcome),
                Err(e) => {
                    self.diagnostics
                        .error(format!("{}: initialization failed: {}", self.name, e));
                    return false;
                }
            }
        }
        self.transition(LoopEvent::Loaded);

        if let Err(e) = self.render.prepare(&mut handle) {
            self.handle = Some(handle);
            self.fault(format!("{}: cannot read frame buffer: {}", self.name, e));
            return false;
        }

        self.handle = Some(handle);
        self.transition(LoopEvent::Start);
        self.diagnostics.info(format!("{}: module loaded", self.name));
        true
    }

    /// Run one frame if the loop is scheduled
    ///
    /// Returns `None` when nothing ran or the tick faulted.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.state.is_scheduled() {
            return None;
        }
        let handle = self.handle.as_mut()?;

        match self.render.tick(handle, &mut self.surface) {
            Ok(TickOutcome::Continue) => Some(TickOutcome::Continue),
            Ok(TickOutcome::Converged) => {
                tracing::info!(
                    "{}: converged after {} frames",
                    self.name,
                    self.render.frames()
                );
                self.transition(LoopEvent::Converge);
                Some(TickOutcome::Converged)
            }
            Err(e) => {
                self.fault(format!("{}: render loop stopped: {}", self.name, e));
                None
            }
        }
    }

    /// Whether another frame should be scheduled
    pub fn frame_requested(&self) -> bool {
        self.state.is_scheduled()
    }

    /// Forward a pointer event, mapped through the surface's current rect
    pub fn on_pointer(&mut self, event: PointerEvent) -> InputOutcome {
        if !self.state.is_loaded() {
            return InputOutcome::Ignored;
        }
        let Some(handle) = self.handle.as_mut() else {
            return InputOutcome::Ignored;
        };

        let rect = self.surface.bounding_rect();
        match self.input.pointer(handle, &rect, event) {
            Ok(outcome) => {
                if let InputOutcome::Dispatched { export, result } = &outcome {
                    tracing::info!("{}: {} -> {:?}", self.name, export, result);
                }
                outcome
            }
            Err(e) => {
                self.fault(format!("{}: input handler failed: {}", self.name, e));
                InputOutcome::Ignored
            }
        }
    }

    /// Forward a key press; the reset key resets the toy
    pub fn on_key(&mut self, key: KeyCode) -> InputOutcome {
        if !self.state.is_loaded() {
            return InputOutcome::Ignored;
        }
        let Some(handle) = self.handle.as_mut() else {
            return InputOutcome::Ignored;
        };

        match self.input.key(handle, key) {
            Ok(InputOutcome::ResetRequested) => {
                self.reset();
                InputOutcome::ResetRequested
            }
            Ok(outcome) => outcome,
            Err(e) => {
                self.fault(format!("{}: key handler failed: {}", self.name, e));
                InputOutcome::Ignored
            }
        }
    }

    /// Re-run the reset action and resume a converged loop
    pub fn reset(&mut self) {
        if !self.state.is_loaded() {
            tracing::debug!("{}: reset ignored while {}", self.name, self.state);
            return;
        }
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        let result = match &self.reset {
            ResetAction::Reinit => match &self.init {
                Some(init) => run_init(handle, init).map(|_| ()),
                None => Ok(()),
            },
            ResetAction::Scatter {
                export,
                count,
                range,
            } => scatter(handle, export, *count, *range).map_err(InitError::from),
        };

        match result {
            Ok(()) => {}
            // The module declined; the loop stays where it was
            Err(InitError::Failed { export, status }) => {
                self.diagnostics.error(format!(
                    "{}: reset failed, '{}' returned {}",
                    self.name, export, status
                ));
                return;
            }
            Err(e) => {
                self.fault(format!("{}: reset failed: {}", self.name, e));
                return;
            }
        }

        self.render.invalidate();
        if self.state == LoopState::Paused {
            self.transition(LoopEvent::Resume);
        }
        tracing::info!("{}: reset", self.name);
    }

    /// Drop the module; a load still in flight will be ignored
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.handle = None;
        self.transition(LoopEvent::Unload);
    }

    fn transition(&mut self, event: LoopEvent) {
        match self.state.apply(event) {
            Ok(next) => {
                tracing::debug!("{}: {} -> {}", self.name, self.state, next);
                self.state = next;
            }
            Err(e) => tracing::warn!("{}: {}", self.name, e),
        }
    }

    fn fault(&mut self, message: String) {
        self.diagnostics.error(message);
        self.transition(LoopEvent::Fault);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn handle(&self) -> Option<&ComputationHandle> {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut ComputationHandle> {
        self.handle.as_mut()
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render
    }
}
