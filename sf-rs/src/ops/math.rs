//! `Engine.Vector3.*` and `Engine.Mathf.*`.
//!
//! Numeric arguments accept ints and floats; results are always floats.
//! An operation whose result is not finite (`Sqrt(-1)`, `Pow(10, 400)`)
//! fails instead of returning `inf`/`NaN`.

use std::f64::consts::PI;

use super::{get_f64, get_vector3};
use crate::dispatch::NamespaceBuilder;
use crate::error::ScriptError;
use crate::host::Host;
use crate::script::value::Value;

// ── Vector3 ───────────────────────────────────────────────────────────────────

pub fn vector3_namespace() -> NamespaceBuilder {
    NamespaceBuilder::new("Vector3")
        .operation("Create", |_, args| {
            const OP: &str = "Vector3.Create";
            Ok(Value::vector3(get_f64(args, 0, OP)?, get_f64(args, 1, OP)?, get_f64(args, 2, OP)?))
        })
        .operation("Zero", |_, _| Ok(Value::vector3(0.0, 0.0, 0.0)))
        .operation("One", |_, _| Ok(Value::vector3(1.0, 1.0, 1.0)))
        .operation("Distance", |_, args| {
            let a = get_vector3(args, 0, "Vector3.Distance")?;
            let b = get_vector3(args, 1, "Vector3.Distance")?;
            Ok(Value::Float(magnitude(sub(a, b))))
        })
        .operation("Magnitude", |_, args| {
            let v = get_vector3(args, 0, "Vector3.Magnitude")?;
            Ok(Value::Float(magnitude(v)))
        })
        .operation("Normalized", normalized)
        .operation("Dot", |_, args| {
            let a = get_vector3(args, 0, "Vector3.Dot")?;
            let b = get_vector3(args, 1, "Vector3.Dot")?;
            Ok(Value::Float(dot(a, b)))
        })
        .operation("Cross", |_, args| {
            let [ax, ay, az] = get_vector3(args, 0, "Vector3.Cross")?;
            let [bx, by, bz] = get_vector3(args, 1, "Vector3.Cross")?;
            Ok(Value::vector3(ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx))
        })
}

/// A zero-length vector normalizes to zero.
fn normalized(_host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    let v = get_vector3(args, 0, "Vector3.Normalized")?;
    let len = magnitude(v);
    if len <= f64::EPSILON {
        return Ok(Value::vector3(0.0, 0.0, 0.0));
    }
    Ok(Value::vector3(v[0] / len, v[1] / len, v[2] / len))
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn magnitude(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

// ── Mathf ─────────────────────────────────────────────────────────────────────

pub fn mathf_namespace() -> NamespaceBuilder {
    NamespaceBuilder::new("Mathf")
        .operation("Abs", |_, a| unary("Mathf.Abs", a, f64::abs))
        .operation("Sqrt", |_, a| unary("Mathf.Sqrt", a, f64::sqrt))
        .operation("Floor", |_, a| unary("Mathf.Floor", a, f64::floor))
        .operation("Ceil", |_, a| unary("Mathf.Ceil", a, f64::ceil))
        // halves round to even
        .operation("Round", |_, a| unary("Mathf.Round", a, f64::round_ties_even))
        .operation("Sin", |_, a| unary("Mathf.Sin", a, f64::sin))
        .operation("Cos", |_, a| unary("Mathf.Cos", a, f64::cos))
        .operation("Tan", |_, a| unary("Mathf.Tan", a, f64::tan))
        .operation("Min", |_, a| binary("Mathf.Min", a, f64::min))
        .operation("Max", |_, a| binary("Mathf.Max", a, f64::max))
        .operation("Pow", |_, a| binary("Mathf.Pow", a, f64::powf))
        .operation("Atan2", |_, a| binary("Mathf.Atan2", a, f64::atan2))
        .operation("Clamp", clamp)
        .operation("Lerp", lerp)
        .operation("PI", |_, _| Ok(Value::Float(PI)))
        .operation("Deg2Rad", |_, _| Ok(Value::Float(PI / 180.0)))
        .operation("Rad2Deg", |_, _| Ok(Value::Float(180.0 / PI)))
}

fn finite(op: &str, x: f64) -> Result<Value, ScriptError> {
    if x.is_finite() {
        Ok(Value::Float(x))
    } else {
        Err(ScriptError::runtime(format!("{op}: result is not a finite number")))
    }
}

fn unary(op: &str, args: &[Value], f: fn(f64) -> f64) -> Result<Value, ScriptError> {
    finite(op, f(get_f64(args, 0, op)?))
}

fn binary(op: &str, args: &[Value], f: fn(f64, f64) -> f64) -> Result<Value, ScriptError> {
    finite(op, f(get_f64(args, 0, op)?, get_f64(args, 1, op)?))
}

/// `Clamp(value, min, max)`.
fn clamp(_host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Mathf.Clamp";
    let v = get_f64(args, 0, OP)?;
    let lo = get_f64(args, 1, OP)?;
    let hi = get_f64(args, 2, OP)?;
    if lo > hi {
        return Err(ScriptError::argument(format!("{OP}: min {lo} is greater than max {hi}")));
    }
    Ok(Value::Float(v.clamp(lo, hi)))
}

/// `Lerp(a, b, t)` with `t` clamped to `[0, 1]`.
fn lerp(_host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Mathf.Lerp";
    let a = get_f64(args, 0, OP)?;
    let b = get_f64(args, 1, OP)?;
    let t = get_f64(args, 2, OP)?.clamp(0.0, 1.0);
    finite(OP, a + (b - a) * t)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
