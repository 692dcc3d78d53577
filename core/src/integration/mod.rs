//! End-to-end scenarios: load, init, tick, input and the offline cache
//! working together through [`AppContext`](crate::app::AppContext).

#[cfg(test)]
mod input_tests;

#[cfg(test)]
pub(crate) mod test_utils {
    use crate::app::AppContext;
    use crate::config::ToyManifest;
    use crate::loader::load_from_bytes;
    use crate::surface::PixelSurface;
    use crate::wasm::WasmEngine;

    /// Host controller for `manifest`, displayed at `scale` times its size
    pub fn new_app(manifest: &ToyManifest, scale: f64) -> AppContext<PixelSurface> {
        let surface = PixelSurface::new(manifest.canvas.width, manifest.canvas.height)
            .with_rect(manifest.display_rect(scale));
        AppContext::new(surface, manifest)
    }

    /// Load `wasm` through the loader and hand it to the load continuation
    pub fn load_into(app: &mut AppContext<PixelSurface>, manifest: &ToyManifest, wasm: &[u8]) -> bool {
        let engine = WasmEngine::new().unwrap();
        app.on_loaded(load_from_bytes(&engine, wasm, &manifest.host_imports()))
    }

    pub fn call(app: &mut AppContext<PixelSurface>, export: &str) -> Option<u32> {
        app.handle_mut().unwrap().call(export, &[]).unwrap()
    }
}
