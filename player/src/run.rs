//! Run command - load a toy and drive its render loop
//!
//! Scripted clicks and keys are delivered once, after the first frame, in
//! the order given, and one extra frame is painted so the final frame shows
//! their effect. The loop stops after `--frames` frames or when the toy
//! stops requesting frames (converged, faulted, or failed to load).

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Args;
use toyhost_core::cache::{self, OfflineCache};
use toyhost_core::input::{KeyCode, PointerEvent, parse_key};
use toyhost_core::{
    AppContext, FramePacer, LoopState, ModuleSource, PixelSurface, Surface, ToyManifest,
    WasmEngine, load,
};

/// Arguments for the run command
#[derive(Args)]
pub struct RunArgs {
    /// Path to the toy manifest
    pub manifest: PathBuf,

    /// Maximum number of frames to run
    #[arg(long, default_value = "1")]
    pub frames: u64,

    /// Display scale applied to the canvas's displayed size
    #[arg(long, default_value = "1.0")]
    pub scale: f64,

    /// Click at screen position X,Y (repeatable)
    #[arg(long = "click", value_name = "X,Y", value_parser = parse_point)]
    pub clicks: Vec<(f64, f64)>,

    /// Press a key, e.g. W or ArrowUp (repeatable)
    #[arg(long = "key", value_name = "NAME")]
    pub keys: Vec<String>,

    /// Save the final frame as PNG
    #[arg(long)]
    pub screenshot: Option<PathBuf>,

    /// Load the module from the offline cache only
    #[arg(long)]
    pub offline: bool,

    /// Cache root (defaults to the platform data directory)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Pace frames at the toy's frame rate instead of as fast as possible
    #[arg(long)]
    pub realtime: bool,
}

fn parse_point(text: &str) -> Result<(f64, f64), String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{}'", text))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{}': {}", v, e))
    };
    Ok((parse(x)?, parse(y)?))
}

/// Resolve where the module bytes come from, preferring the offline cache
fn module_source(manifest: &ToyManifest, args: &RunArgs) -> Result<ModuleSource> {
    let cached = match (&manifest.cache, manifest.cached_module_path()) {
        (Some(config), Some(path)) => {
            let root = match &args.cache_dir {
                Some(dir) => dir.clone(),
                None => cache::default_root().context("Could not determine cache directory")?,
            };
            let cache = OfflineCache::open(&root, &config.name);
            cache.lookup(path)?
        }
        _ => None,
    };

    match cached {
        Some(bytes) => {
            tracing::info!("Using cached module for '{}'", manifest.name);
            Ok(ModuleSource::Bytes(bytes))
        }
        None if args.offline => {
            if manifest.cache.is_none() {
                bail!("'{}' has no [cache] section; cannot run offline", manifest.name);
            }
            bail!(
                "module for '{}' is not cached; run `toyhost cache install` first",
                manifest.name
            );
        }
        None => Ok(manifest.module_source()),
    }
}

/// Tick the loop, delivering the scripted input after the first frame.
/// Returns the number of frames ticked.
fn drive<S: Surface>(
    app: &mut AppContext<S>,
    args: &RunArgs,
    keys: &[KeyCode],
    pacer: &mut FramePacer,
) -> u64 {
    let has_script = !args.clicks.is_empty() || !keys.is_empty();
    let frame_limit = args.frames + u64::from(has_script);
    let mut frames = 0;
    let mut scripted = false;

    while frames < frame_limit {
        if app.frame_requested() {
            if args.realtime {
                while !pacer.frame_due(Instant::now()) {
                    std::thread::sleep(pacer.time_until_next());
                }
            }
            app.tick();
            frames += 1;
        } else if scripted {
            break;
        }

        if !scripted {
            scripted = true;
            for &(x, y) in &args.clicks {
                let outcome = app.on_pointer(PointerEvent::new(x, y));
                tracing::info!("click ({}, {}): {:?}", x, y, outcome);
            }
            for &key in keys {
                let outcome = app.on_key(key);
                tracing::info!("key {:?}: {:?}", key, outcome);
            }
            pacer.reset();
        }
    }
    frames
}

/// Execute the run command
pub fn execute(args: RunArgs) -> Result<()> {
    let manifest = ToyManifest::load(&args.manifest)
        .with_context(|| format!("Failed to load {}", args.manifest.display()))?;

    // Resolve keys up front so a typo fails before the module loads
    let keys = args
        .keys
        .iter()
        .map(|name| parse_key(name).with_context(|| format!("Unknown key '{}'", name)))
        .collect::<Result<Vec<_>>>()?;

    let source = module_source(&manifest, &args)?;
    let surface = PixelSurface::new(manifest.canvas.width, manifest.canvas.height)
        .with_rect(manifest.display_rect(args.scale));
    let mut app = AppContext::new(surface, &manifest);

    let engine = WasmEngine::new()?;
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;
    let loaded = rt.block_on(load(&engine, &source, &manifest.host_imports()));

    if !app.on_loaded(loaded) {
        let reason = app
            .diagnostics()
            .errors()
            .last()
            .map(|d| d.message.clone())
            .unwrap_or_else(|| "unknown error".to_string());
        bail!("{}", reason);
    }

    let mut pacer = FramePacer::new(&manifest.runtime);
    drive(&mut app, &args, &keys, &mut pacer);

    if let Some(path) = &args.screenshot {
        app.surface()
            .save_png(path)
            .with_context(|| format!("Failed to save screenshot to {}", path.display()))?;
    }

    let status = app.render_loop().painter().status();
    tracing::info!(
        "{}: {} frames, state {}{}",
        app.name(),
        app.render_loop().frames(),
        app.state(),
        status.map(|s| format!(", status {}", s)).unwrap_or_default()
    );

    if app.state() == LoopState::Faulted {
        bail!("'{}' faulted", app.name());
    }
    app.teardown();
    Ok(())
}
