// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in hooks for primitives, byte strings and dates.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Number;

use super::{HookTable, StructureHook, UnstructureHook};
use crate::error::{ConvertError, Result};
use crate::value::{Complex, DateTimeValue, Loose, Value};

/// Type names that carry a built-in hook in both directions.
pub const DEFAULT_TYPE_NAMES: &[&str] = &[
    "str", "int", "float", "bool", "complex", "None", "Any", "bytes", "date", "datetime",
];

pub(super) fn install(table: &mut HookTable) {
    for name in DEFAULT_TYPE_NAMES {
        if let Some(hook) = default_structure_hook(name) {
            table.insert_structure(name, hook);
        }
        if let Some(hook) = default_unstructure_hook(name) {
            table.insert_unstructure(name, hook);
        }
    }
}

/// Built-in structure hook for `type_name`, if there is one.
pub fn default_structure_hook(type_name: &str) -> Option<StructureHook> {
    let hook: StructureHook = match type_name {
        "str" => Arc::new(|v: &Loose| structure_str(v).map(Value::Str)),
        "int" => Arc::new(|v: &Loose| structure_int(v).map(Value::Int)),
        "float" => Arc::new(|v: &Loose| structure_float(v).map(Value::Float)),
        "bool" => Arc::new(|v: &Loose| structure_bool(v).map(Value::Bool)),
        "complex" => Arc::new(|v: &Loose| structure_complex(v).map(Value::Complex)),
        "None" => Arc::new(structure_none),
        "Any" => Arc::new(|v: &Loose| Ok(Value::Any(v.clone()))),
        "bytes" => Arc::new(|v: &Loose| structure_bytes(v).map(Value::Bytes)),
        "date" => Arc::new(|v: &Loose| structure_date(v).map(Value::Date)),
        "datetime" => Arc::new(|v: &Loose| structure_datetime(v).map(Value::DateTime)),
        _ => return None,
    };
    Some(hook)
}

/// Built-in unstructure hook for `type_name`, if there is one.
pub fn default_unstructure_hook(type_name: &str) -> Option<UnstructureHook> {
    if !DEFAULT_TYPE_NAMES.contains(&type_name) {
        return None;
    }
    let hook: UnstructureHook = Arc::new(unstructure_scalar);
    Some(hook)
}

// ---------------------------------------------------------------------------
// Structuring
// ---------------------------------------------------------------------------

fn structure_str(v: &Loose) -> Result<String> {
    match v {
        Loose::String(s) => Ok(s.clone()),
        Loose::Number(n) => Ok(n.to_string()),
        Loose::Bool(b) => Ok(b.to_string()),
        other => Err(ConvertError::conversion("str", other, "not a scalar")),
    }
}

fn structure_int(v: &Loose) -> Result<i64> {
    match v {
        Loose::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if n.is_u64() {
                return Err(ConvertError::conversion("int", v, "out of range"));
            }
            match n.as_f64() {
                // Truncates toward zero.
                Some(f) if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    Ok(f as i64)
                }
                _ => Err(ConvertError::conversion("int", v, "out of range")),
            }
        }
        Loose::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| ConvertError::conversion("int", v, e.to_string())),
        Loose::Bool(b) => Ok(i64::from(*b)),
        other => Err(ConvertError::conversion("int", other, "not a number")),
    }
}

fn structure_float(v: &Loose) -> Result<f64> {
    match v {
        Loose::Number(n) => n
            .as_f64()
            .ok_or_else(|| ConvertError::conversion("float", v, "out of range")),
        Loose::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| ConvertError::conversion("float", v, e.to_string())),
        Loose::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(ConvertError::conversion("float", other, "not a number")),
    }
}

/// Strict: only booleans, numbers and the texts `true`/`false`.
fn structure_bool(v: &Loose) -> Result<bool> {
    match v {
        Loose::Bool(b) => Ok(*b),
        Loose::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Loose::String(s) => s
            .trim()
            .parse::<bool>()
            .map_err(|e| ConvertError::conversion("bool", v, e.to_string())),
        other => Err(ConvertError::conversion("bool", other, "not a boolean")),
    }
}

fn structure_complex(v: &Loose) -> Result<Complex> {
    match v {
        Loose::Number(n) => n
            .as_f64()
            .map(|re| Complex::new(re, 0.0))
            .ok_or_else(|| ConvertError::conversion("complex", v, "out of range")),
        Loose::String(s) => s
            .parse::<Complex>()
            .map_err(|e| ConvertError::conversion("complex", v, e)),
        other => Err(ConvertError::conversion("complex", other, "not a number")),
    }
}

fn structure_none(v: &Loose) -> Result<Value> {
    match v {
        Loose::Null => Ok(Value::None),
        other => Err(ConvertError::conversion("None", other, "expected null")),
    }
}

fn structure_bytes(v: &Loose) -> Result<Vec<u8>> {
    match v {
        Loose::String(s) => Ok(s.as_bytes().to_vec()),
        Loose::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| ConvertError::conversion("bytes", item, "not a byte value"))
            })
            .collect(),
        other => Err(ConvertError::conversion("bytes", other, "expected text or byte array")),
    }
}

/// Accepts `YYYY-MM-DD`, and date/time text truncated to its date.
fn structure_date(v: &Loose) -> Result<NaiveDate> {
    let Loose::String(s) = v else {
        return Err(ConvertError::conversion("date", v, "expected ISO-8601 text"));
    };
    let text = s.trim();
    let head = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .map_err(|e| ConvertError::conversion("date", v, e.to_string()))
}

fn structure_datetime(v: &Loose) -> Result<DateTimeValue> {
    let Loose::String(s) = v else {
        return Err(ConvertError::conversion("datetime", v, "expected ISO-8601 text"));
    };
    DateTimeValue::parse(s)
        .ok_or_else(|| ConvertError::conversion("datetime", v, "not an ISO-8601 date/time"))
}

// ---------------------------------------------------------------------------
// Unstructuring
// ---------------------------------------------------------------------------

fn unstructure_scalar(value: &Value) -> Result<Loose> {
    match value {
        Value::None => Ok(Loose::Null),
        Value::Bool(b) => Ok(Loose::Bool(*b)),
        Value::Int(i) => Ok(Loose::from(*i)),
        Value::Float(f) => Number::from_f64(*f).map(Loose::Number).ok_or_else(|| {
            ConvertError::ConversionFailure {
                target: "float".into(),
                value: f.to_string(),
                reason: "non-finite number has no loose form".into(),
            }
        }),
        Value::Complex(c) => Ok(Loose::String(c.to_string())),
        Value::Str(s) => Ok(Loose::String(s.clone())),
        Value::Bytes(b) => String::from_utf8(b.clone()).map(Loose::String).map_err(|e| {
            ConvertError::ConversionFailure {
                target: "bytes".into(),
                value: format!("{b:?}"),
                reason: e.to_string(),
            }
        }),
        Value::Date(d) => Ok(Loose::String(d.format("%Y-%m-%d").to_string())),
        Value::DateTime(dt) => Ok(Loose::String(dt.iso_format())),
        Value::Any(loose) => Ok(loose.clone()),
        other => Err(ConvertError::ConversionFailure {
            target: other.type_name().to_string(),
            value: format!("{other:?}"),
            reason: "not a built-in scalar".into(),
        }),
    }
}
