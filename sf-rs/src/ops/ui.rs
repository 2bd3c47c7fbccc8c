//! `Engine.UI.Text.*` and `Engine.UI.Image.*`: field accessors for the
//! builtin `Text` and `Image` components.
//!
//! Setters return the component so calls can be bound and chained:
//!
//! ```text
//! $label = SFScript.Type.Create('Text')
//! Engine.UI.Text.SetText($label, 'Score: 0')
//! $gold = Engine.Color.yellow()
//! Engine.UI.Text.SetColor($label, $gold)
//! ```

use super::{get_color, get_component, get_f64, need};
use crate::dispatch::NamespaceBuilder;
use crate::error::ScriptError;
use crate::host::Host;
use crate::script::value::{ComponentRef, Value};
use crate::types::{BuiltinKind, Component};

pub fn ui_namespace() -> NamespaceBuilder {
    NamespaceBuilder::new("UI").namespace(text_namespace()).namespace(image_namespace())
}

fn text_namespace() -> NamespaceBuilder {
    NamespaceBuilder::new("Text")
        .operation("SetText", set_text)
        .operation("GetText", |_, args| read(args, BuiltinKind::Text, "text", "Text.GetText"))
        .operation("SetFontSize", set_font_size)
        .operation("GetFontSize", |_, args| read(args, BuiltinKind::Text, "fontSize", "Text.GetFontSize"))
        .operation("SetColor", |_, args| set_color(args, BuiltinKind::Text, "Text.SetColor"))
        .operation("GetColor", |_, args| read(args, BuiltinKind::Text, "color", "Text.GetColor"))
}

fn image_namespace() -> NamespaceBuilder {
    NamespaceBuilder::new("Image")
        .operation("SetColor", |_, args| set_color(args, BuiltinKind::Image, "Image.SetColor"))
        .operation("GetColor", |_, args| read(args, BuiltinKind::Image, "color", "Image.GetColor"))
        .operation("SetFillAmount", set_fill_amount)
        .operation("GetFillAmount", |_, args| {
            read(args, BuiltinKind::Image, "fillAmount", "Image.GetFillAmount")
        })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// The component at `idx`, which must be a builtin of `kind`.
fn builtin_arg(args: &[Value], idx: usize, kind: BuiltinKind, op: &str) -> Result<ComponentRef, ScriptError> {
    let comp = get_component(args, idx, op)?;
    let found = match &*comp.lock() {
        Component::Builtin { kind: k, .. } if *k == kind => None,
        other => Some(other.type_name().to_owned()),
    };
    match found {
        None => Ok(comp),
        Some(name) => Err(ScriptError::argument(format!(
            "{op}: argument {} must be a {} component, got {name}",
            idx + 1,
            kind.name()
        ))),
    }
}

fn read(args: &[Value], kind: BuiltinKind, field: &str, op: &str) -> Result<Value, ScriptError> {
    need(args, 1, op)?;
    let comp = builtin_arg(args, 0, kind, op)?;
    let value = comp.lock().get(field).cloned().unwrap_or_default();
    Ok(value)
}

fn write(comp: ComponentRef, field: &str, value: Value) -> Result<Value, ScriptError> {
    comp.lock().set(field, value)?;
    Ok(Value::Component(comp))
}

// ── Setters ───────────────────────────────────────────────────────────────────

/// `null` clears the text.
fn set_text(_host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Text.SetText";
    need(args, 2, OP)?;
    let comp = builtin_arg(args, 0, BuiltinKind::Text, OP)?;
    let text = match &args[1] {
        Value::Null => String::new(),
        v => v.to_string(),
    };
    write(comp, "text", Value::Str(text))
}

/// Sizes are whole points; fractional input rounds to nearest.
fn set_font_size(_host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Text.SetFontSize";
    need(args, 2, OP)?;
    let comp = builtin_arg(args, 0, BuiltinKind::Text, OP)?;
    let size = get_f64(args, 1, OP)?.round();
    if !(0.0..=i32::MAX as f64).contains(&size) {
        return Err(ScriptError::argument(format!("{OP}: font size out of range: {size}")));
    }
    write(comp, "fontSize", Value::Int(size as i64))
}

fn set_color(args: &[Value], kind: BuiltinKind, op: &str) -> Result<Value, ScriptError> {
    need(args, 2, op)?;
    let comp = builtin_arg(args, 0, kind, op)?;
    let [r, g, b, a] = get_color(args, 1, op)?;
    write(comp, "color", Value::color(r, g, b, a))
}

/// Clamped to `0..=1`.
fn set_fill_amount(_host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Image.SetFillAmount";
    need(args, 2, OP)?;
    let comp = builtin_arg(args, 0, BuiltinKind::Image, OP)?;
    let amount = get_f64(args, 1, OP)?.clamp(0.0, 1.0);
    write(comp, "fillAmount", Value::Float(amount))
}
