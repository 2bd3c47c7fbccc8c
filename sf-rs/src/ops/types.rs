//! `SFScript.Type.*` and `SFScript.Interface.*`: runtime type definitions.
//!
//! ```text
//! SFScript.Interface.Define('IMovable')
//! SFScript.Type.Define('Enemy', 'Component', 'IMovable')
//! SFScript.Type.DefineProperty('Enemy', 'health', 100)
//! $e = SFScript.Type.Create('Enemy')
//! SFScript.Type.SetProperty($e, 'health', 80)
//! SFScript.Type.Is($e, 'IMovable')            → true
//! ```

use std::sync::Arc;

use super::{get_component, get_str, need};
use crate::dispatch::NamespaceBuilder;
use crate::error::ScriptError;
use crate::host::Host;
use crate::script::value::Value;

pub fn type_namespace() -> NamespaceBuilder {
    NamespaceBuilder::new("Type")
        .operation("Define", define)
        .operation("DefineProperty", define_property)
        .operation("Implement", implement)
        .operation("Create", create)
        .operation("Is", is)
        .operation("IsSubclassOf", is_subclass_of)
        .operation("ImplementsInterface", implements_interface)
        .operation("GetTypeName", get_type_name)
        .operation("SetProperty", set_property)
        .operation("GetProperty", get_property)
}

pub fn interface_namespace() -> NamespaceBuilder {
    NamespaceBuilder::new("Interface")
        .operation("Define", define_interface)
        .operation("IsDefined", is_defined)
}

// ── Definitions ───────────────────────────────────────────────────────────────

/// `Define(name, base, iface...)`; a `null` base defines a root type.
fn define(host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Type.Define";
    need(args, 2, OP)?;
    let name = get_str(args, 0, OP)?;
    let base = match &args[1] {
        Value::Null => None,
        _ => Some(get_str(args, 1, OP)?),
    };
    let interfaces = (2..args.len())
        .map(|i| get_str(args, i, OP))
        .collect::<Result<Vec<_>, _>>()?;
    host.registry.write().register_type(&name, base.as_deref(), &interfaces)?;
    Ok(Value::Bool(true))
}

fn define_property(host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Type.DefineProperty";
    need(args, 3, OP)?;
    let ty = get_str(args, 0, OP)?;
    let prop = get_str(args, 1, OP)?;
    host.registry.write().define_property(&ty, &prop, args[2].clone())?;
    Ok(Value::Bool(true))
}

fn implement(host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Type.Implement";
    need(args, 2, OP)?;
    let ty = get_str(args, 0, OP)?;
    let iface = get_str(args, 1, OP)?;
    host.registry.write().add_interface_to_type(&ty, &iface)?;
    Ok(Value::Bool(true))
}

fn define_interface(host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Interface.Define";
    need(args, 1, OP)?;
    let name = get_str(args, 0, OP)?;
    let parents = (1..args.len())
        .map(|i| get_str(args, i, OP))
        .collect::<Result<Vec<_>, _>>()?;
    host.registry.write().register_interface(&name, &parents)?;
    Ok(Value::Bool(true))
}

fn is_defined(host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    let name = get_str(args, 0, "Interface.IsDefined")?;
    Ok(Value::Bool(host.registry.read().has_interface(&name)))
}

// ── Queries ───────────────────────────────────────────────────────────────────

fn is(host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Type.Is";
    need(args, 2, OP)?;
    let comp = get_component(args, 0, OP)?;
    let target = get_str(args, 1, OP)?;
    let ty = comp.lock().type_name().to_owned();
    Ok(Value::Bool(host.registry.read().is_assignable_to(&ty, &target)))
}

fn is_subclass_of(host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Type.IsSubclassOf";
    need(args, 2, OP)?;
    let derived = get_str(args, 0, OP)?;
    let base = get_str(args, 1, OP)?;
    Ok(Value::Bool(host.registry.read().is_subclass_of(&derived, &base)))
}

fn implements_interface(host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Type.ImplementsInterface";
    need(args, 2, OP)?;
    let ty = get_str(args, 0, OP)?;
    let iface = get_str(args, 1, OP)?;
    Ok(Value::Bool(host.registry.read().implements_interface(&ty, &iface)))
}

// ── Components ────────────────────────────────────────────────────────────────

fn create(host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    let ty = get_str(args, 0, "Type.Create")?;
    let component = host.registry.read().create_component(&ty)?;
    Ok(Value::component(component))
}

fn get_type_name(_host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    let comp = get_component(args, 0, "Type.GetTypeName")?;
    let name = comp.lock().type_name().to_owned();
    Ok(Value::Str(name))
}

/// Returns the component so calls can be bound and chained.
/// A component cannot hold itself; the handle would never be freed.
fn set_property(_host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Type.SetProperty";
    need(args, 3, OP)?;
    let comp = get_component(args, 0, OP)?;
    let prop = get_str(args, 1, OP)?;
    if args[2].as_component().is_some_and(|v| Arc::ptr_eq(v, &comp)) {
        return Err(ScriptError::argument(format!("{OP}: a component cannot be stored in itself")));
    }
    comp.lock().set(&prop, args[2].clone())?;
    Ok(Value::Component(comp))
}

/// Unset properties read as `null`.
fn get_property(_host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    const OP: &str = "Type.GetProperty";
    need(args, 2, OP)?;
    let comp = get_component(args, 0, OP)?;
    let prop = get_str(args, 1, OP)?;
    let value = comp.lock().get(&prop).cloned().unwrap_or_default();
    Ok(value)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
