//! Tests for WASM engine and computation handles

use super::*;
use crate::test_utils::instantiate_wat;

// ============================================================================
// WasmEngine Tests
// ============================================================================

#[test]
fn test_wasm_engine_creation() {
    let engine = WasmEngine::new();
    assert!(engine.is_ok());
}

#[test]
fn test_wasm_engine_load_invalid_module() {
    let engine = WasmEngine::new().unwrap();
    let result = engine.load_module(b"not valid wasm");
    assert!(result.is_err());
}

#[test]
fn test_validate_module_memory_rejects_oversized() {
    let engine = WasmEngine::new().unwrap();
    let wasm = wat::parse_str(r#"(module (memory (export "memory") 64))"#).unwrap();
    let module = engine.load_module(&wasm).unwrap();

    // 64 pages = 4MB
    assert!(WasmEngine::validate_module_memory(&module, 4 * 1024 * 1024).is_ok());
    assert!(WasmEngine::validate_module_memory(&module, 1024 * 1024).is_err());
}

#[test]
fn test_validate_module_memory_checks_imports() {
    let engine = WasmEngine::new().unwrap();
    let wasm = wat::parse_str(r#"(module (import "js" "mem" (memory 10 20)))"#).unwrap();
    let module = engine.load_module(&wasm).unwrap();

    assert!(WasmEngine::validate_module_memory(&module, 10 * WASM_PAGE_SIZE).is_ok());
    assert!(WasmEngine::validate_module_memory(&module, 9 * WASM_PAGE_SIZE).is_err());
}

// ============================================================================
// ComputationHandle Tests
// ============================================================================

#[test]
fn test_handle_exposes_exported_memory() {
    let handle = instantiate_wat(r#"(module (memory (export "memory") 2))"#).unwrap();
    assert!(handle.has_memory());
    assert_eq!(handle.memory_len(), 2 * WASM_PAGE_SIZE);
    assert_eq!(handle.memory_bytes().len(), 2 * WASM_PAGE_SIZE);
}

#[test]
fn test_handle_without_memory() {
    let handle = instantiate_wat("(module)").unwrap();
    assert!(!handle.has_memory());
    assert!(handle.memory_bytes().is_empty());
}

#[test]
fn test_call_returns_first_result() {
    let mut handle = instantiate_wat(
        r#"
        (module
            (func (export "add") (param i32 i32) (result i32)
                local.get 0
                local.get 1
                i32.add)
            (func (export "nothing"))
        )
    "#,
    )
    .unwrap();

    assert_eq!(handle.call("add", &[3, 4]), Ok(Some(7)));
    assert_eq!(handle.call("nothing", &[]), Ok(None));
}

#[test]
fn test_call_missing_export_and_arity() {
    let mut handle = instantiate_wat(
        r#"(module (func (export "one") (param i32)))"#,
    )
    .unwrap();

    assert_eq!(
        handle.call("absent", &[]),
        Err(CallError::MissingExport("absent".to_string()))
    );
    assert_eq!(
        handle.call("one", &[]),
        Err(CallError::Arity {
            export: "one".to_string(),
            expected: 1,
            got: 0
        })
    );
}

#[test]
fn test_call_reports_trap() {
    let mut handle = instantiate_wat(r#"(module (func (export "boom") unreachable))"#).unwrap();
    let err = handle.call("boom", &[]).unwrap_err();
    assert!(matches!(err, CallError::Trap { ref export, .. } if export == "boom"));
}

#[test]
fn test_call_coerces_wide_parameters() {
    let mut handle = instantiate_wat(
        r#"
        (module
            (func (export "widen") (param i64) (result i64)
                local.get 0
                i64.const 1
                i64.add)
        )
    "#,
    )
    .unwrap();
    assert_eq!(handle.call("widen", &[41]), Ok(Some(42)));
}

#[test]
fn test_function_exports_lists_functions_only() {
    let mut handle = instantiate_wat(
        r#"
        (module
            (memory (export "memory") 1)
            (func (export "init") (result i32) i32.const 1)
            (func (export "update"))
        )
    "#,
    )
    .unwrap();
    assert_eq!(handle.function_exports(), vec!["init", "update"]);
}

// ============================================================================
// Memory growth tracking
// ============================================================================

#[test]
fn test_memory_epoch_advances_on_growth() {
    let mut handle = instantiate_wat(
        r#"
        (module
            (memory (export "memory") 1)
            (func (export "grow") (result i32)
                i32.const 1
                memory.grow)
        )
    "#,
    )
    .unwrap();

    let before = handle.memory_epoch();
    assert_eq!(handle.call("grow", &[]), Ok(Some(1)));
    assert!(handle.memory_epoch() > before);
    assert_eq!(handle.memory_len(), 2 * WASM_PAGE_SIZE);
}

#[test]
fn test_memory_growth_beyond_ram_limit_fails() {
    let engine = WasmEngine::new().unwrap();
    let wasm = wat::parse_str(
        r#"
        (module
            (memory (export "memory") 1)
            (func (export "grow") (result i32)
                i32.const 4
                memory.grow)
        )
    "#,
    )
    .unwrap();
    let module = engine.load_module(&wasm).unwrap();
    let imports = HostImports {
        ram_limit: 2 * WASM_PAGE_SIZE,
        ..HostImports::default()
    };
    let mut handle = ComputationHandle::instantiate(&engine, &module, &imports).unwrap();

    let before = handle.memory_epoch();
    // memory.grow reports failure as -1
    assert_eq!(handle.call("grow", &[]), Ok(Some(u32::MAX)));
    assert_eq!(handle.memory_epoch(), before);
    assert_eq!(handle.memory_len(), WASM_PAGE_SIZE);
}

// ============================================================================
// Host imports
// ============================================================================

#[test]
fn test_print_accepts_any_argument_shape() {
    let mut handle = instantiate_wat(
        r#"
        (module
            (import "env" "print" (func $print (param i64 f64 i32)))
            (func (export "run")
                i64.const -5
                f64.const 2.5
                i32.const 9
                call $print)
        )
    "#,
    )
    .unwrap();

    handle.call("run", &[]).unwrap();
    assert_eq!(handle.prints().collect::<Vec<_>>(), vec!["-5 2.5 9"]);
}

#[test]
fn test_print_with_result_returns_zero() {
    let mut handle = instantiate_wat(
        r#"
        (module
            (import "env" "print" (func $print (param i32) (result i32)))
            (func (export "run") (result i32)
                i32.const 77
                call $print)
        )
    "#,
    )
    .unwrap();

    assert_eq!(handle.call("run", &[]), Ok(Some(0)));
    assert_eq!(handle.prints().next(), Some("77"));
}

#[test]
fn test_print_with_reference_results_returns_null() {
    let mut handle = instantiate_wat(
        r#"
        (module
            (import "env" "print" (func $print (param i32) (result externref funcref)))
            (func (export "run") (result i32)
                (local $e externref)
                (local $f funcref)
                i32.const 3
                call $print
                local.set $f
                local.set $e
                (i32.and (ref.is_null (local.get $e)) (ref.is_null (local.get $f))))
        )
    "#,
    )
    .unwrap();

    assert_eq!(handle.call("run", &[]), Ok(Some(1)));
    assert_eq!(handle.prints().next(), Some("3"));
}

#[test]
fn test_print_history_is_bounded() {
    let mut handle = instantiate_wat(
        r#"
        (module
            (import "env" "print" (func $print (param i32)))
            (func (export "say") (param i32)
                local.get 0
                call $print)
        )
    "#,
    )
    .unwrap();

    for i in 0..(PRINT_HISTORY as u32 + 10) {
        handle.call("say", &[i]).unwrap();
    }
    let prints: Vec<_> = handle.prints().collect();
    assert_eq!(prints.len(), PRINT_HISTORY);
    assert_eq!(prints[0], "10");
}

#[test]
fn test_host_memory_import() {
    let engine = WasmEngine::new().unwrap();
    let wasm = wat::parse_str(
        r#"
        (module
            (import "js" "mem" (memory 10 20))
            (func (export "poke")
                i32.const 0
                i32.const 255
                i32.store8)
        )
    "#,
    )
    .unwrap();
    let module = engine.load_module(&wasm).unwrap();
    let imports = HostImports {
        memory: Some(HostMemory {
            module: "js".to_string(),
            name: "mem".to_string(),
            initial: 10,
            maximum: Some(20),
        }),
        ..HostImports::default()
    };

    let mut handle = ComputationHandle::instantiate(&engine, &module, &imports).unwrap();
    assert_eq!(handle.memory_len(), 10 * WASM_PAGE_SIZE);
    handle.call("poke", &[]).unwrap();
    assert_eq!(handle.memory_bytes()[0], 255);
}

#[test]
fn test_missing_import_fails_instantiation() {
    let result = instantiate_wat(r#"(module (import "env" "unknown" (func)))"#);
    assert!(result.is_err());
}
