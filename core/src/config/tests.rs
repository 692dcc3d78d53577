//! Manifest tests

use winit::keyboard::KeyCode;

use super::*;
use crate::app::ResetAction;
use crate::framebuffer::ReacquirePolicy;
use crate::input::KeyAction;
use crate::loader::{HostValue, InitArg};
use crate::scene::{Addressing, Coloring, Repaint};
use crate::test_utils::FRAMEBUFFER_MANIFEST;

const GRIDFILL: &str = include_str!("../../../toys/gridfill.toml");
const CNVBUF: &str = include_str!("../../../toys/cnvbuf.toml");
const GAME: &str = include_str!("../../../toys/game.toml");
const BLOCKMAZE: &str = include_str!("../../../toys/blockmaze.toml");
const LIFE: &str = include_str!("../../../toys/life.toml");
const MANDELBROT: &str = include_str!("../../../toys/mandelbrot.toml");

fn parse(src: &str) -> ToyManifest {
    ToyManifest::from_toml_str(src).unwrap()
}

fn invalid(src: &str) -> String {
    match ToyManifest::from_toml_str(src) {
        Err(ManifestError::Invalid(message)) => message,
        other => panic!("expected an invalid manifest, got {:?}", other),
    }
}

// ============================================================================
// Shipped manifests
// ============================================================================

#[test]
fn test_gridfill_manifest() {
    let manifest = parse(GRIDFILL);
    assert_eq!(manifest.name, "gridfill");
    assert_eq!((manifest.canvas.width, manifest.canvas.height), (640, 480));

    let init = manifest.init.as_ref().unwrap();
    assert_eq!(
        init.args,
        vec![
            InitArg::Value(640),
            InitArg::Value(480),
            InitArg::Host(HostValue::ClockMillis)
        ]
    );
    assert_eq!(manifest.input.logical_width, Some(480));
    assert_eq!(manifest.input.click_export.as_deref(), Some("handle_input"));

    let cache = manifest.cache.as_ref().unwrap();
    assert_eq!(cache.name, "fox-store");
    assert_eq!(cache.assets.len(), 25);
    assert_eq!(
        manifest.cached_module_path(),
        Some("/zigtoys/toys/gridfill/main.wasm")
    );
}

#[test]
fn test_cnvbuf_manifest() {
    let manifest = parse(CNVBUF);
    let imports = manifest.host_imports();
    let memory = imports.memory.unwrap();
    assert_eq!((memory.module.as_str(), memory.name.as_str()), ("js", "mem"));
    assert_eq!((memory.initial, memory.maximum), (10, Some(20)));
    assert_eq!(imports.print, Some(ImportName::new("env", "print")));
    assert!(matches!(
        manifest.scene.kind,
        SceneKind::Framebuffer {
            policy: ReacquirePolicy::EveryFrame,
            ..
        }
    ));
}

#[test]
fn test_game_manifest() {
    let manifest = parse(GAME);
    assert_eq!((manifest.canvas.width, manifest.canvas.height), (100, 100));
    assert_eq!(manifest.scene.repaint, Repaint::Once);
    let SceneKind::CellGrid(grid) = &manifest.scene.kind else {
        panic!("expected a cell grid");
    };
    assert_eq!(grid.coloring, Coloring::Palette);
    assert_eq!(grid.palette.len(), 2);
    assert_eq!(grid.palette[1].color.to_string(), "#808080");
    assert!(grid.status_export.is_none());

    // Display only: no key reaches the module
    assert!(manifest.input.key_export.is_none());
    assert_eq!(manifest.input.keys.action_for(KeyCode::KeyR), None);
    assert_eq!(manifest.input.keys.action_for(KeyCode::ArrowUp), None);
}

#[test]
fn test_blockmaze_manifest() {
    let manifest = parse(BLOCKMAZE);
    assert_eq!((manifest.canvas.width, manifest.canvas.height), (250, 250));
    let SceneKind::CellGrid(grid) = &manifest.scene.kind else {
        panic!("expected a cell grid");
    };
    assert_eq!(grid.coloring, Coloring::Channels);
    assert_eq!(grid.status_export.as_deref(), Some("is_won"));
    assert_eq!(manifest.input.key_export.as_deref(), Some("update"));
    assert_eq!(
        manifest.input.keys.action_for(KeyCode::KeyR),
        Some(KeyAction::Reset)
    );
    assert_eq!(manifest.reset, ResetAction::Reinit);
    assert!(manifest.step.is_none());
}

#[test]
fn test_life_manifest() {
    let manifest = parse(LIFE);
    let step = manifest.step.as_ref().unwrap();
    assert_eq!(step.export, "advance");
    assert!(step.reports_changes);
    assert!(manifest.init.is_none());

    let SceneKind::CellGrid(grid) = &manifest.scene.kind else {
        panic!("expected a cell grid");
    };
    assert_eq!(grid.addressing, Addressing::Index);
    assert_eq!(grid.coloring, Coloring::Glyph);
    assert_eq!(
        manifest.reset,
        ResetAction::Scatter {
            export: "set_cell".to_string(),
            count: 500,
            range: 1024
        }
    );
    assert_eq!(manifest.runtime.frame_rate, 30);
}

#[test]
fn test_mandelbrot_manifest() {
    let manifest = parse(MANDELBROT);
    assert_eq!(manifest.scene.repaint, Repaint::Once);
    assert_eq!(manifest.runtime.frame_budget_us, 250_000);
    assert!(manifest.cache.is_none());
    assert_eq!(manifest.cached_module_path(), None);
}

// ============================================================================
// Defaults and paths
// ============================================================================

#[test]
fn test_minimal_manifest_defaults() {
    let manifest = parse(FRAMEBUFFER_MANIFEST);
    assert_eq!(manifest.ram_limit, DEFAULT_RAM_LIMIT);
    assert_eq!(manifest.scene, SceneConfig::default());
    assert_eq!(manifest.runtime, RuntimeConfig::default());
    assert_eq!(manifest.reset, ResetAction::Reinit);
    assert!(manifest.step.is_none());
    assert!(manifest.host_memory.is_none());
    assert_eq!(manifest.display_rect(1.0), SurfaceRect::sized(10.0, 10.0));
}

#[test]
fn test_display_rect_scaling() {
    let manifest = parse(
        r#"
        name = "scaled"
        module = "toy.wasm"
        [canvas]
        width = 640
        height = 480
        display_width = 320
        display_height = 240.5
        "#,
    );
    assert_eq!(manifest.display_rect(2.0), SurfaceRect::sized(640.0, 481.0));
}

#[test]
fn test_load_resolves_module_next_to_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("toy.toml");
    std::fs::write(&path, FRAMEBUFFER_MANIFEST).unwrap();

    let manifest = ToyManifest::load(&path).unwrap();
    assert_eq!(manifest.base_dir, dir.path());
    assert_eq!(
        manifest.module_source(),
        ModuleSource::Path(dir.path().join("test.wasm"))
    );
    assert!(!manifest.is_remote());
}

#[test]
fn test_remote_module() {
    let manifest = parse(
        r#"
        name = "remote"
        module = "https://example.org/toys/main.wasm"
        [canvas]
        width = 8
        height = 8
        "#,
    );
    assert!(manifest.is_remote());
    assert!(matches!(manifest.module_source(), ModuleSource::Url(_)));
}

#[test]
fn test_load_missing_file() {
    let err = ToyManifest::load(Path::new("/nonexistent/toy.toml")).unwrap_err();
    assert!(matches!(err, ManifestError::Io { .. }));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_parse_error() {
    let err = ToyManifest::from_toml_str("name = ").unwrap_err();
    assert!(matches!(err, ManifestError::Parse(_)));
}

#[test]
fn test_missing_canvas_is_a_parse_error() {
    let err = ToyManifest::from_toml_str("name = \"x\"\nmodule = \"x.wasm\"").unwrap_err();
    assert!(matches!(err, ManifestError::Parse(_)));
}

#[test]
fn test_rejects_zero_canvas() {
    let message = invalid(
        r#"
        name = "x"
        module = "x.wasm"
        [canvas]
        width = 0
        height = 10
        "#,
    );
    assert!(message.contains("canvas"));
}

#[test]
fn test_rejects_empty_grid() {
    let message = invalid(
        r#"
        name = "x"
        module = "x.wasm"
        [canvas]
        width = 10
        height = 10
        [scene]
        kind = "cell_grid"
        columns = 0
        "#,
    );
    assert!(message.contains("cell grid"));
}

#[test]
fn test_rejects_inverted_host_memory() {
    let message = invalid(
        r#"
        name = "x"
        module = "x.wasm"
        [canvas]
        width = 10
        height = 10
        [host_memory]
        initial = 20
        maximum = 10
        "#,
    );
    assert!(message.contains("host memory"));
}

#[test]
fn test_rejects_zero_logical_size() {
    let message = invalid(
        r#"
        name = "x"
        module = "x.wasm"
        [canvas]
        width = 10
        height = 10
        [input]
        logical_width = 0
        "#,
    );
    assert!(message.contains("logical"));
}
