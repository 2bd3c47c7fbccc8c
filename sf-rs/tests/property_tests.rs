use std::sync::Arc;

use proptest::prelude::*;
use sfscript::context::Context;
use sfscript::dispatch::NamespaceBuilder;
use sfscript::error::ErrorKind;
use sfscript::host::Host;
use sfscript::script::parse::{parse_command, parse_value, split_arguments};
use sfscript::script::{Executor, Value};
use sfscript::types::TypeRegistry;

proptest! {
    /// The parser returns Ok or a syntax error for any input; it never panics.
    #[test]
    fn parser_does_not_panic(s in "\\PC*") {
        if let Err(e) = parse_command(&s) {
            prop_assert_eq!(e.kind(), ErrorKind::Syntax);
        }
    }
}

proptest! {
    /// Every i64 literal parses as Int, never as Float.
    #[test]
    fn integers_parse_as_int(n in any::<i64>()) {
        prop_assert_eq!(parse_value(&n.to_string()).unwrap(), Value::Int(n));
    }
}

proptest! {
    /// Any text without quotes or backslashes survives a single-quoted literal.
    #[test]
    fn quoted_text_is_preserved(s in "[^'\"\\\\]*") {
        let token = format!("'{s}'");
        prop_assert_eq!(parse_value(&token).unwrap(), Value::Str(s));
    }
}

proptest! {
    /// Commas inside strings never split an argument list.
    #[test]
    fn commas_in_strings_do_not_split(parts in prop::collection::vec("[a-z,]{0,8}", 1..6)) {
        let list = parts.iter().map(|p| format!("\"{p}\"")).collect::<Vec<_>>().join(", ");
        let tokens = split_arguments(&list).unwrap();
        prop_assert_eq!(tokens.len(), parts.len());
    }
}

proptest! {
    /// Paths of any depth parse into the same segments.
    #[test]
    fn path_segments_round_trip(segs in prop::collection::vec("[A-Za-z_][A-Za-z0-9_]{0,6}", 1..6)) {
        let cmd = parse_command(&format!("{}()", segs.join("."))).unwrap();
        prop_assert_eq!(cmd.path, segs);
        prop_assert!(cmd.args.is_empty());
    }
}

proptest! {
    /// The last set wins; names never set read as None.
    #[test]
    fn context_latest_value_wins(values in prop::collection::vec(any::<i64>(), 1..10)) {
        let ctx = Context::new();
        for v in &values {
            ctx.set("x", Value::Int(*v));
        }
        prop_assert_eq!(ctx.get("x"), values.last().map(|v| Value::Int(*v)));
        prop_assert_eq!(ctx.get("y"), None);
    }
}

proptest! {
    /// A sequence yields one result per line, failures included, in order.
    #[test]
    fn sequence_yields_one_result_per_line(pattern in prop::collection::vec(any::<bool>(), 0..12)) {
        let tree = NamespaceBuilder::root()
            .namespace(
                NamespaceBuilder::new("T")
                    .operation("Good", |_, _| Ok(Value::Bool(true)))
                    .operation("Bad", |_, _| Err(sfscript::error::ScriptError::runtime("bad"))),
            )
            .build_tree()
            .unwrap();
        let ex = Executor::new(Arc::new(Context::new()), Arc::new(tree), Host::capturing());
        let lines: Vec<&str> = pattern.iter().map(|&ok| if ok { "T.Good()" } else { "T.Bad()" }).collect();
        let results = ex.execute_sequence(&lines);
        prop_assert_eq!(results.len(), lines.len());
        for (r, ok) in results.iter().zip(&pattern) {
            prop_assert_eq!(r.success(), *ok);
        }
    }
}

proptest! {
    /// Along a linear chain every type is a subclass of each ancestor and
    /// never of a descendant.
    #[test]
    fn subclass_chain(depth in 1usize..8) {
        let mut reg = TypeRegistry::new();
        let mut prev = "Component".to_string();
        let mut names = Vec::new();
        for i in 0..depth {
            let name = format!("T{i}");
            reg.register_type(&name, Some(&prev), &[]).unwrap();
            names.push(name.clone());
            prev = name;
        }
        for (i, a) in names.iter().enumerate() {
            prop_assert!(reg.is_subclass_of(a, a));
            prop_assert!(reg.is_subclass_of(a, "Component"));
            for (j, b) in names.iter().enumerate() {
                prop_assert_eq!(reg.is_subclass_of(a, b), j <= i);
            }
        }
    }
}
