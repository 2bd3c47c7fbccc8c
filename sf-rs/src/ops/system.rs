//! `System.Console.*`: text output to the host's sink.

use crate::dispatch::NamespaceBuilder;
use crate::error::ScriptError;
use crate::host::Host;
use crate::script::value::Value;

pub fn console_namespace() -> NamespaceBuilder {
    NamespaceBuilder::new("Console")
        .operation("WriteLine", |host, args| {
            host.output.write_line(&text_of(args));
            Ok(Value::Null)
        })
        .operation("Write", write)
}

fn write(host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
    host.output.write(&text_of(args));
    Ok(Value::Null)
}

/// First argument as text; nothing or `null` prints as empty.
pub(crate) fn text_of(args: &[Value]) -> String {
    match args.first() {
        None | Some(Value::Null) => String::new(),
        Some(v) => v.to_string(),
    }
}
