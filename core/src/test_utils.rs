//! Shared test utilities for integration and unit tests

use anyhow::Result;

use crate::config::ToyManifest;
use crate::wasm::{ComputationHandle, HostImports, WasmEngine};

// ============================================================================
// Instantiation helpers
// ============================================================================

/// Compile WAT text and instantiate it with default host imports
pub fn instantiate_wat(wat_src: &str) -> Result<ComputationHandle> {
    instantiate_wat_with(wat_src, &HostImports::default())
}

pub fn instantiate_wat_with(wat_src: &str, imports: &HostImports) -> Result<ComputationHandle> {
    let engine = WasmEngine::new()?;
    let wasm = wat::parse_str(wat_src)?;
    let module = engine.load_module(&wasm)?;
    ComputationHandle::instantiate(&engine, &module, imports)
}

/// Parse a manifest snippet, panicking on error
pub fn manifest(toml_src: &str) -> ToyManifest {
    ToyManifest::from_toml_str(toml_src).expect("test manifest should parse")
}

// ============================================================================
// Test modules
// ============================================================================

/// Framebuffer toy: `width`x`height` RGBA buffer at address 1024
///
/// - `init` fills every pixel with (0, 0, 255, 255) and returns `init_status`
/// - `update` increments a frame counter and writes it into the red channel
///   of pixel 0
/// - `handle_input(x, y)` records the last click and returns the click count
pub fn framebuffer_toy_wat(width: u32, height: u32, init_status: u32) -> String {
    let size = width * height * 4;
    format!(
        r#"
        (module
            (import "env" "print" (func $print (param i32)))
            (memory (export "memory") 1)
            (global $frame (mut i32) (i32.const 0))
            (global $clicks (mut i32) (i32.const 0))
            (global $last_x (mut i32) (i32.const -1))
            (global $last_y (mut i32) (i32.const -1))
            (func (export "init") (result i32)
                (local $i i32)
                (block $done
                    (loop $fill
                        (br_if $done (i32.ge_u (local.get $i) (i32.const {size})))
                        (i32.store (i32.add (i32.const 1024) (local.get $i)) (i32.const 0xffff0000))
                        (local.set $i (i32.add (local.get $i) (i32.const 4)))
                        (br $fill)))
                (call $print (i32.const {size}))
                (i32.const {init_status}))
            (func (export "startAddr") (result i32) (i32.const 1024))
            (func (export "getSize") (result i32) (i32.const {size}))
            (func (export "getWidth") (result i32) (i32.const {width}))
            (func (export "getHeight") (result i32) (i32.const {height}))
            (func (export "update")
                (global.set $frame (i32.add (global.get $frame) (i32.const 1)))
                (i32.store8 (i32.const 1024) (global.get $frame)))
            (func (export "handle_input") (param $x i32) (param $y i32) (result i32)
                (global.set $last_x (local.get $x))
                (global.set $last_y (local.get $y))
                (global.set $clicks (i32.add (global.get $clicks) (i32.const 1)))
                (global.get $clicks))
            (func (export "frame") (result i32) (global.get $frame))
            (func (export "clicks") (result i32) (global.get $clicks))
            (func (export "last_x") (result i32) (global.get $last_x))
            (func (export "last_y") (result i32) (global.get $last_y))
        )
    "#
    )
}

/// Toy whose `update` grows memory by one page and moves its 2x2 frame into
/// the new page. The old location holds 0x11 bytes, the new one 0x22.
pub const GROWING_TOY_WAT: &str = r#"
    (module
        (memory (export "memory") 1)
        (global $start (mut i32) (i32.const 0))
        (func (export "init") (result i32)
            (memory.fill (i32.const 0) (i32.const 0x11) (i32.const 16))
            (i32.const 1))
        (func (export "startAddr") (result i32) (global.get $start))
        (func (export "getSize") (result i32) (i32.const 16))
        (func (export "getWidth") (result i32) (i32.const 2))
        (func (export "getHeight") (result i32) (i32.const 2))
        (func (export "update") (result i32)
            (global.set $start (i32.mul (memory.grow (i32.const 1)) (i32.const 65536)))
            (memory.fill (global.get $start) (i32.const 0x22) (i32.const 16))
            (i32.const 1))
    )
"#;

/// Toy whose `update` reports 2, 1, 0, 0, ... changed cells
pub const COUNTDOWN_TOY_WAT: &str = r#"
    (module
        (memory (export "memory") 1)
        (global $left (mut i32) (i32.const 3))
        (global $steps (mut i32) (i32.const 0))
        (func (export "init") (result i32)
            (global.set $left (i32.const 3))
            (i32.const 1))
        (func (export "startAddr") (result i32) (i32.const 0))
        (func (export "getSize") (result i32) (i32.const 4))
        (func (export "getWidth") (result i32) (i32.const 1))
        (func (export "getHeight") (result i32) (i32.const 1))
        (func (export "update") (result i32)
            (global.set $steps (i32.add (global.get $steps) (i32.const 1)))
            (if (i32.gt_u (global.get $left) (i32.const 0))
                (then (global.set $left (i32.sub (global.get $left) (i32.const 1)))))
            (global.get $left))
        (func (export "steps") (result i32) (global.get $steps))
    )
"#;

/// Cell-grid maze toy: 10x10 cells, player at (0, 0) stored as 1, walls as 2
///
/// `update(dir)` records the last direction. `init` takes no arguments and
/// returns nothing.
pub const MAZE_TOY_WAT: &str = r#"
    (module
        (memory (export "memory") 1)
        (global $last_dir (mut i32) (i32.const -1))
        (global $inits (mut i32) (i32.const 0))
        (func (export "init")
            (global.set $inits (i32.add (global.get $inits) (i32.const 1))))
        (func (export "update") (param $dir i32)
            (global.set $last_dir (local.get $dir)))
        (func (export "get_pos") (param $x i32) (param $y i32) (result i32)
            (if (result i32) (i32.and (i32.eqz (local.get $x)) (i32.eqz (local.get $y)))
                (then (i32.const 1))
                (else
                    (if (result i32) (i32.eq (local.get $x) (i32.const 9))
                        (then (i32.const 2))
                        (else (i32.const 0))))))
        (func (export "last_dir") (result i32) (global.get $last_dir))
        (func (export "inits") (result i32) (global.get $inits))
    )
"#;

/// Manifest for [`framebuffer_toy_wat`] with a 10x10 canvas
pub const FRAMEBUFFER_MANIFEST: &str = r#"
    name = "framebuffer-test"
    module = "test.wasm"

    [canvas]
    width = 10
    height = 10

    [init]
    export = "init"

    [input]
    click_export = "handle_input"
"#;
