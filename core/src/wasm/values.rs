//! Conversions between host values and WASM values

use wasmtime::{Val, ValType};

/// Error parsing a textual argument for a WASM parameter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("'{text}' is not a valid {ty}")]
    Invalid { text: String, ty: &'static str },
    #[error("parameters of type {0} cannot be passed from the host")]
    Unsupported(String),
}

fn type_name(ty: &ValType) -> &'static str {
    match ty {
        ValType::I32 => "i32",
        ValType::I64 => "i64",
        ValType::F32 => "f32",
        ValType::F64 => "f64",
        ValType::V128 => "v128",
        ValType::Ref(_) => "ref",
    }
}

/// Parse a command-line style argument according to the declared type
///
/// Integers accept either signed or unsigned spellings so that `u32`
/// exports can be driven with values above `i32::MAX`.
pub fn parse_arg(ty: &ValType, text: &str) -> Result<Val, ValueError> {
    let invalid = || ValueError::Invalid {
        text: text.to_string(),
        ty: type_name(ty),
    };
    match ty {
        ValType::I32 => text
            .parse::<i32>()
            .or_else(|_| text.parse::<u32>().map(|v| v as i32))
            .map(Val::I32)
            .map_err(|_| invalid()),
        ValType::I64 => text
            .parse::<i64>()
            .or_else(|_| text.parse::<u64>().map(|v| v as i64))
            .map(Val::I64)
            .map_err(|_| invalid()),
        ValType::F32 => text
            .parse::<f32>()
            .map(|v| Val::F32(v.to_bits()))
            .map_err(|_| invalid()),
        ValType::F64 => text
            .parse::<f64>()
            .map(|v| Val::F64(v.to_bits()))
            .map_err(|_| invalid()),
        other => Err(ValueError::Unsupported(type_name(other).to_string())),
    }
}

/// Coerce a host integer into a numeric parameter of the given type
pub fn coerce_u32(ty: &ValType, value: u32) -> Option<Val> {
    match ty {
        ValType::I32 => Some(Val::I32(value as i32)),
        ValType::I64 => Some(Val::I64(value as i64)),
        ValType::F32 => Some(Val::F32((value as f32).to_bits())),
        ValType::F64 => Some(Val::F64((value as f64).to_bits())),
        _ => None,
    }
}

/// Read a numeric result as an unsigned 32-bit count
pub fn val_to_u32(val: &Val) -> Option<u32> {
    match val {
        Val::I32(v) => Some(*v as u32),
        Val::I64(v) => Some(*v as u32),
        Val::F32(bits) => Some(f32::from_bits(*bits) as u32),
        Val::F64(bits) => Some(f64::from_bits(*bits) as u32),
        _ => None,
    }
}

/// Zero value for a result slot; nullable references get null.
/// Non-nullable references have no default.
pub fn zero_value(ty: &ValType) -> Option<Val> {
    match ty {
        ValType::I32 => Some(Val::I32(0)),
        ValType::I64 => Some(Val::I64(0)),
        ValType::F32 => Some(Val::F32(0)),
        ValType::F64 => Some(Val::F64(0)),
        _ => Val::default_for_ty(ty),
    }
}

pub fn format_val(val: &Val) -> String {
    match val {
        Val::I32(v) => v.to_string(),
        Val::I64(v) => v.to_string(),
        Val::F32(bits) => f32::from_bits(*bits).to_string(),
        Val::F64(bits) => f64::from_bits(*bits).to_string(),
        Val::V128(v) => format!("{:#034x}", v.as_u128()),
        _ => "<ref>".to_string(),
    }
}

/// Space-separated rendering of a value list
pub fn format_values(vals: &[Val]) -> String {
    vals.iter().map(format_val).collect::<Vec<_>>().join(" ")
}
