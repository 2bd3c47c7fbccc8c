//! `Engine.Debug.*`: script diagnostics.
//!
//! Each call emits a `tracing` event at the matching level and writes the
//! message to the output sink.

use tracing::{error, info, warn};

use super::system::text_of;
use crate::dispatch::NamespaceBuilder;
use crate::script::value::Value;

pub fn debug_namespace() -> NamespaceBuilder {
    NamespaceBuilder::new("Debug")
        .operation("Log", |host, args| {
            let msg = text_of(args);
            info!(target: "sfscript::script", "{msg}");
            host.output.write_line(&msg);
            Ok(Value::Null)
        })
        .operation("LogWarning", |host, args| {
            let msg = text_of(args);
            warn!(target: "sfscript::script", "{msg}");
            host.output.write_line(&format!("[Warning] {msg}"));
            Ok(Value::Null)
        })
        .operation("LogError", |host, args| {
            let msg = text_of(args);
            error!(target: "sfscript::script", "{msg}");
            host.output.write_line(&format!("[Error] {msg}"));
            Ok(Value::Null)
        })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::context::Context;
    use crate::host::Host;
    use crate::ops::standard_tree;
    use crate::script::exec::Executor;

    #[test]
    fn levels_are_prefixed() {
        let host = Host::capturing();
        let ex = Executor::new(Arc::new(Context::new()), Arc::new(standard_tree().unwrap()), host.clone());
        assert!(ex.execute("Engine.Debug.Log('ready')").success());
        assert!(ex.execute("Engine.Debug.LogWarning('low hp')").success());
        assert!(ex.execute("Engine.Debug.LogError(42)").success());
        assert_eq!(host.output.contents(), "ready\n[Warning] low hp\n[Error] 42\n");
    }
}
