//! Standard operation catalog.
//!
//! | Path prefix | Module |
//! |-------------|--------|
//! | `SFScript.Type.*`, `SFScript.Interface.*` | [`types`] |
//! | `System.Console.*` | [`system`] |
//! | `Engine.Vector3.*`, `Engine.Mathf.*` | [`math`] |
//! | `Engine.Debug.*` | [`debug`] |
//! | `Engine.Color.*` | [`color`] |
//! | `Engine.UI.Text.*`, `Engine.UI.Image.*` | [`ui`] |
//!
//! Hosts that expose their own capabilities build a tree with
//! [`NamespaceBuilder`] directly and can mount any of these namespaces in it.

pub mod color;
pub mod debug;
pub mod math;
pub mod system;
pub mod types;
pub mod ui;

use crate::dispatch::{DispatchTree, NamespaceBuilder};
use crate::error::{DispatchBuildError, ScriptError};
use crate::script::value::{ComponentRef, Value};

/// The full standard catalog.
pub fn standard_tree() -> Result<DispatchTree, DispatchBuildError> {
    NamespaceBuilder::root()
        .namespace(
            NamespaceBuilder::new("SFScript")
                .namespace(types::type_namespace())
                .namespace(types::interface_namespace()),
        )
        .namespace(NamespaceBuilder::new("System").namespace(system::console_namespace()))
        .namespace(
            NamespaceBuilder::new("Engine")
                .namespace(math::vector3_namespace())
                .namespace(math::mathf_namespace())
                .namespace(debug::debug_namespace())
                .namespace(color::color_namespace())
                .namespace(ui::ui_namespace()),
        )
        .build_tree()
}

// ── Argument helpers ──────────────────────────────────────────────────────────

fn arg<'a>(args: &'a [Value], idx: usize, op: &str) -> Result<&'a Value, ScriptError> {
    args.get(idx)
        .ok_or_else(|| ScriptError::argument(format!("{op}: missing argument {}", idx + 1)))
}

/// Fail unless at least `n` arguments were passed.
fn need(args: &[Value], n: usize, op: &str) -> Result<(), ScriptError> {
    if args.len() < n {
        return Err(ScriptError::argument(format!(
            "{op} requires {n} argument{}, got {}",
            if n == 1 { "" } else { "s" },
            args.len()
        )));
    }
    Ok(())
}

fn get_str(args: &[Value], idx: usize, op: &str) -> Result<String, ScriptError> {
    match arg(args, idx, op)? {
        Value::Str(s) => Ok(s.clone()),
        other => Err(ScriptError::argument(format!(
            "{op}: argument {} must be a string, got {}",
            idx + 1,
            other.type_name()
        ))),
    }
}

/// Numeric argument.  Missing or `null` reads as `0.0`.
fn get_f64(args: &[Value], idx: usize, op: &str) -> Result<f64, ScriptError> {
    match args.get(idx) {
        None | Some(Value::Null) => Ok(0.0),
        Some(v) => v.as_f64().ok_or_else(|| {
            ScriptError::argument(format!(
                "{op}: argument {} must be a number, got {}",
                idx + 1,
                v.type_name()
            ))
        }),
    }
}

fn get_vector3(args: &[Value], idx: usize, op: &str) -> Result<[f64; 3], ScriptError> {
    let v = arg(args, idx, op)?;
    v.as_vector3().ok_or_else(|| {
        ScriptError::argument(format!(
            "{op}: argument {} must be a Vector3, got {}",
            idx + 1,
            v.type_name()
        ))
    })
}

fn get_color(args: &[Value], idx: usize, op: &str) -> Result<[f64; 4], ScriptError> {
    let v = arg(args, idx, op)?;
    v.as_color().ok_or_else(|| {
        ScriptError::argument(format!(
            "{op}: argument {} must be a Color, got {}",
            idx + 1,
            v.type_name()
        ))
    })
}

fn get_component(args: &[Value], idx: usize, op: &str) -> Result<ComponentRef, ScriptError> {
    let v = arg(args, idx, op)?;
    v.as_component().cloned().ok_or_else(|| {
        ScriptError::argument(format!(
            "{op}: argument {} must be a component, got {}",
            idx + 1,
            v.type_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_tree_builds() {
        let paths = standard_tree().unwrap().paths();
        for p in [
            "SFScript.Type.Define",
            "SFScript.Interface.IsDefined",
            "System.Console.WriteLine",
            "Engine.Vector3.Cross",
            "Engine.Mathf.PI",
            "Engine.Debug.LogError",
            "Engine.Color.magenta",
            "Engine.UI.Text.SetFontSize",
            "Engine.UI.Image.GetFillAmount",
        ] {
            assert!(paths.iter().any(|x| x == p), "missing {p}");
        }
    }

    #[test]
    fn numeric_helper_defaults() {
        assert_eq!(get_f64(&[], 0, "t").unwrap(), 0.0);
        assert_eq!(get_f64(&[Value::Null], 0, "t").unwrap(), 0.0);
        assert_eq!(get_f64(&[Value::Int(2)], 0, "t").unwrap(), 2.0);
        assert!(get_f64(&[Value::Bool(true)], 0, "t").is_err());
    }

    #[test]
    fn string_helper_is_strict() {
        assert_eq!(get_str(&[Value::Str("a".into())], 0, "t").unwrap(), "a");
        assert!(get_str(&[Value::Int(1)], 0, "t").is_err());
        assert!(get_str(&[], 0, "t").is_err());
    }
}
