//! `Engine.Color.*`: colour construction and named presets.
//!
//! Channels are floats in `0..=1`; `Create` fills missing channels with
//! `0` and a missing alpha with `1`.

use super::get_f64;
use crate::dispatch::NamespaceBuilder;
use crate::script::value::Value;

/// Named presets as `(name, [r, g, b, a])`.
pub const PRESETS: &[(&str, [f64; 4])] = &[
    ("red", [1.0, 0.0, 0.0, 1.0]),
    ("green", [0.0, 1.0, 0.0, 1.0]),
    ("blue", [0.0, 0.0, 1.0, 1.0]),
    ("white", [1.0, 1.0, 1.0, 1.0]),
    ("black", [0.0, 0.0, 0.0, 1.0]),
    ("yellow", [1.0, 0.92, 0.016, 1.0]),
    ("cyan", [0.0, 1.0, 1.0, 1.0]),
    ("magenta", [1.0, 0.0, 1.0, 1.0]),
    ("gray", [0.5, 0.5, 0.5, 1.0]),
    ("clear", [0.0, 0.0, 0.0, 0.0]),
];

pub fn color_namespace() -> NamespaceBuilder {
    let ns = NamespaceBuilder::new("Color").operation("Create", |_, args| {
        const OP: &str = "Color.Create";
        let alpha = match args.get(3) {
            None => 1.0,
            Some(_) => get_f64(args, 3, OP)?,
        };
        Ok(Value::color(get_f64(args, 0, OP)?, get_f64(args, 1, OP)?, get_f64(args, 2, OP)?, alpha))
    });
    PRESETS.iter().fold(ns, |ns, &(name, [r, g, b, a])| {
        ns.operation(name, move |_, _| Ok(Value::color(r, g, b, a)))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::context::Context;
    use crate::error::ErrorKind;
    use crate::host::Host;
    use crate::ops::standard_tree;
    use crate::script::exec::Executor;
    use crate::script::value::Value;

    fn executor() -> Executor {
        Executor::new(Arc::new(Context::new()), Arc::new(standard_tree().unwrap()), Host::capturing())
    }

    fn eval(cmd: &str) -> Value {
        let r = executor().execute(cmd);
        assert!(r.success(), "{r}");
        r.outcome.unwrap()
    }

    #[test]
    fn create_fills_defaults() {
        assert_eq!(eval("Engine.Color.Create(1, 0.5, 0)"), Value::color(1.0, 0.5, 0.0, 1.0));
        assert_eq!(eval("Engine.Color.Create(0, 0, 0, 0.25)"), Value::color(0.0, 0.0, 0.0, 0.25));
        assert_eq!(eval("Engine.Color.Create()"), Value::color(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn create_matches_literal() {
        let literal = crate::script::parse::parse_value("Color(0.2, 0.4, 0.6)").unwrap();
        assert_eq!(eval("Engine.Color.Create(0.2, 0.4, 0.6)"), literal);
    }

    #[test]
    fn presets() {
        assert_eq!(eval("Engine.Color.red()"), Value::color(1.0, 0.0, 0.0, 1.0));
        assert_eq!(eval("Engine.Color.clear()"), Value::color(0.0, 0.0, 0.0, 0.0));
        assert_eq!(eval("Engine.Color.gray()").to_string(), "Color(0.5, 0.5, 0.5, 1.0)");
        for (name, _) in super::PRESETS {
            assert!(executor().execute(&format!("Engine.Color.{name}()")).success(), "{name}");
        }
    }

    #[test]
    fn non_numeric_channel_fails() {
        let r = executor().execute("Engine.Color.Create('red', 0, 0)");
        assert_eq!(r.error_kind(), Some(ErrorKind::Argument));
    }
}
