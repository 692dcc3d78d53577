//! Input mapping through the whole host

use winit::keyboard::KeyCode;

use crate::input::{InputOutcome, PointerEvent};
use crate::surface::SurfaceRect;
use crate::test_utils::{FRAMEBUFFER_MANIFEST, MAZE_TOY_WAT, framebuffer_toy_wat, manifest};

use super::test_utils::*;

/// A click at (k·x, k·y) reaches cell (x, y) for every cell and scale
#[test]
fn test_click_mapping_is_scale_invariant() {
    let manifest = manifest(FRAMEBUFFER_MANIFEST);
    let wasm = wat::parse_str(framebuffer_toy_wat(10, 10, 1)).unwrap();

    for k in [1.0, 2.0, 0.5, 1.5, 3.0, 0.3, 1.7] {
        let mut app = new_app(&manifest, k);
        assert!(load_into(&mut app, &manifest, &wasm));

        for y in 0..10u32 {
            for x in 0..10u32 {
                let event = PointerEvent::new(k * x as f64, k * y as f64);
                let outcome = app.on_pointer(event);
                assert!(
                    matches!(outcome, InputOutcome::Dispatched { .. }),
                    "k={k} cell=({x},{y})"
                );
                assert_eq!(call(&mut app, "last_x"), Some(x), "k={k} cell=({x},{y})");
                assert_eq!(call(&mut app, "last_y"), Some(y), "k={k} cell=({x},{y})");
            }
        }
        assert_eq!(call(&mut app, "clicks"), Some(100));
    }
}

/// Layout changes between events are picked up by the next event
#[test]
fn test_layout_change_between_clicks() {
    let manifest = manifest(FRAMEBUFFER_MANIFEST);
    let mut app = new_app(&manifest, 1.0);
    let wasm = wat::parse_str(framebuffer_toy_wat(10, 10, 1)).unwrap();
    assert!(load_into(&mut app, &manifest, &wasm));

    app.on_pointer(PointerEvent::new(6.0, 8.0));
    assert_eq!(call(&mut app, "last_x"), Some(6));

    app.surface_mut()
        .set_rect(SurfaceRect::new(40.0, 0.0, 20.0, 20.0));
    app.on_pointer(PointerEvent::new(46.0, 8.0));
    assert_eq!(call(&mut app, "last_x"), Some(3));
    assert_eq!(call(&mut app, "last_y"), Some(4));

    // Now outside the moved surface
    assert_eq!(app.on_pointer(PointerEvent::new(6.0, 8.0)), InputOutcome::Ignored);
    assert_eq!(call(&mut app, "clicks"), Some(2));
}

#[test]
fn test_maze_keys_and_reset() {
    let manifest = manifest(
        r#"
        name = "maze"
        module = "maze.wasm"
        [canvas]
        width = 100
        height = 100
        [init]
        [scene]
        kind = "cell_grid"
        palette = [{ value = 1, color = "red" }, { value = 2, color = "grey" }]
        [input]
        key_export = "update"
        "#,
    );
    let mut app = new_app(&manifest, 1.0);
    let wasm = wat::parse_str(MAZE_TOY_WAT).unwrap();
    assert!(load_into(&mut app, &manifest, &wasm));
    app.tick();

    // Player cell (0,0) is red, wall column x=9 grey, the rest background
    assert_eq!(app.surface().pixel(5, 5), Some([255, 0, 0, 255]));
    assert_eq!(app.surface().pixel(95, 50), Some([128, 128, 128, 255]));
    assert_eq!(app.surface().pixel(50, 50), Some([255, 255, 255, 255]));

    for (key, code) in [
        (KeyCode::KeyW, 0),
        (KeyCode::ArrowDown, 1),
        (KeyCode::KeyA, 2),
        (KeyCode::ArrowRight, 3),
    ] {
        app.on_key(key);
        assert_eq!(call(&mut app, "last_dir"), Some(code), "{key:?}");
    }

    // Unbound keys do nothing
    assert_eq!(app.on_key(KeyCode::Space), InputOutcome::Ignored);
    assert_eq!(call(&mut app, "last_dir"), Some(3));

    assert_eq!(app.on_key(KeyCode::KeyR), InputOutcome::ResetRequested);
    assert_eq!(call(&mut app, "inits"), Some(2));
}
