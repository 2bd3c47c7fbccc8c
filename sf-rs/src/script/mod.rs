//! Command scripting.
//!
//! A script is a flat list of independent command lines.  Each line names one
//! operation by dotted path and passes literal or `$variable` arguments:
//!
//! ```rust
//! use std::sync::Arc;
//! use sfscript::context::Context;
//! use sfscript::host::Host;
//! use sfscript::ops::standard_tree;
//! use sfscript::script::{Executor, Value};
//!
//! let tree = Arc::new(standard_tree().unwrap());
//! let ex = Executor::new(Arc::new(Context::new()), tree, Host::capturing());
//! let r = ex.execute("$m = Engine.Mathf.Max(3, 7)");
//! assert_eq!(r.value(), Some(&Value::Float(7.0)));
//! assert_eq!(ex.context().get("m"), Some(Value::Float(7.0)));
//! ```

pub mod exec;
pub mod parse;
pub mod value;

// Re-exports for convenience.
pub use exec::{ExecutionResult, Executor};
pub use parse::{parse_command, Command};
pub use value::{CompositeKind, Value};
