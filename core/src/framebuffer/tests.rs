//! Frame buffer view tests

use super::*;
use crate::test_utils::{GROWING_TOY_WAT, framebuffer_toy_wat, instantiate_wat};

#[test]
fn test_acquire_reads_layout() {
    let mut handle = instantiate_wat(&framebuffer_toy_wat(10, 10, 1)).unwrap();
    handle.call("init", &[]).unwrap();

    let view = FrameBufferView::acquire(&mut handle, &FrameExports::default()).unwrap();
    assert_eq!(
        view.layout(),
        FrameLayout {
            start: 1024,
            size: 400,
            width: 10,
            height: 10
        }
    );

    let pixels = view.pixels(&handle).unwrap();
    assert_eq!(pixels.len(), 400);
    assert_eq!(&pixels[..4], &[0, 0, 255, 255]);
}

#[test]
fn test_view_sees_updates_without_reacquire() {
    let mut handle = instantiate_wat(&framebuffer_toy_wat(2, 2, 1)).unwrap();
    handle.call("init", &[]).unwrap();
    let view = FrameBufferView::acquire(&mut handle, &FrameExports::default()).unwrap();

    handle.call("update", &[]).unwrap();
    handle.call("update", &[]).unwrap();
    assert_eq!(view.pixels(&handle).unwrap()[0], 2);
}

#[test]
fn test_growth_makes_view_stale() {
    let mut handle = instantiate_wat(GROWING_TOY_WAT).unwrap();
    handle.call("init", &[]).unwrap();
    let mut view = FrameBufferView::acquire(&mut handle, &FrameExports::default()).unwrap();
    assert_eq!(view.pixels(&handle).unwrap(), &[0x11; 16]);

    handle.call("update", &[]).unwrap();
    assert!(view.is_stale(&handle));
    assert_eq!(view.pixels(&handle), Err(FrameError::Stale));

    view.reacquire(&mut handle).unwrap();
    assert!(!view.is_stale(&handle));
    assert_eq!(view.layout().start, 65536);
    assert_eq!(view.pixels(&handle).unwrap(), &[0x22; 16]);
}

#[test]
fn test_invalidate_requires_reacquire() {
    let mut handle = instantiate_wat(&framebuffer_toy_wat(2, 2, 1)).unwrap();
    let mut view = FrameBufferView::acquire(&mut handle, &FrameExports::default()).unwrap();

    view.invalidate();
    assert!(view.is_stale(&handle));
    assert!(view.image(&handle).is_err());

    view.reacquire(&mut handle).unwrap();
    let image = view.image(&handle).unwrap();
    assert_eq!((image.width, image.height), (2, 2));
}

#[test]
fn test_policy_decisions() {
    let mut handle = instantiate_wat(GROWING_TOY_WAT).unwrap();
    let view = FrameBufferView::acquire(&mut handle, &FrameExports::default()).unwrap();

    assert!(ReacquirePolicy::EveryFrame.needs_reacquire(&view, &handle));
    assert!(!ReacquirePolicy::OnGrowth.needs_reacquire(&view, &handle));

    handle.call("update", &[]).unwrap();
    assert!(ReacquirePolicy::OnGrowth.needs_reacquire(&view, &handle));
}

#[test]
fn test_shape_mismatch_rejected() {
    let mut handle = instantiate_wat(
        r#"
        (module
            (memory (export "memory") 1)
            (func (export "startAddr") (result i32) (i32.const 0))
            (func (export "getSize") (result i32) (i32.const 10))
            (func (export "getWidth") (result i32) (i32.const 2))
            (func (export "getHeight") (result i32) (i32.const 2))
        )
    "#,
    )
    .unwrap();

    let err = FrameBufferView::acquire(&mut handle, &FrameExports::default()).unwrap_err();
    assert_eq!(
        err,
        FrameError::ShapeMismatch {
            width: 2,
            height: 2,
            size: 10,
            expected: 16
        }
    );
}

#[test]
fn test_out_of_bounds_rejected() {
    let mut handle = instantiate_wat(
        r#"
        (module
            (memory (export "memory") 1)
            (func (export "startAddr") (result i32) (i32.const 65530))
            (func (export "getSize") (result i32) (i32.const 16))
            (func (export "getWidth") (result i32) (i32.const 2))
            (func (export "getHeight") (result i32) (i32.const 2))
        )
    "#,
    )
    .unwrap();

    let err = FrameBufferView::acquire(&mut handle, &FrameExports::default()).unwrap_err();
    assert!(matches!(err, FrameError::OutOfBounds { end: 65546, .. }));
}

#[test]
fn test_missing_layout_export() {
    let mut handle = instantiate_wat(r#"(module (memory (export "memory") 1))"#).unwrap();
    let err = FrameBufferView::acquire(&mut handle, &FrameExports::default()).unwrap_err();
    assert_eq!(
        err,
        FrameError::Call(CallError::MissingExport("startAddr".to_string()))
    );
}

#[test]
fn test_no_memory() {
    let mut handle = instantiate_wat("(module)").unwrap();
    let err = FrameBufferView::acquire(&mut handle, &FrameExports::default()).unwrap_err();
    assert_eq!(err, FrameError::NoMemory);
}
