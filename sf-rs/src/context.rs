//! Per-session variable store.
//!
//! Holds the values scripts refer to as `$name`.  Interior mutability lets a
//! session hand the same context to its executor and to the host.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use crate::script::value::Value;

/// Name → value mapping for one session.
#[derive(Debug, Default)]
pub struct Context {
    vars: Mutex<HashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) a variable.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.vars.lock().insert(name.into(), value);
    }

    /// A copy of the variable's value; `None` if it was never set.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.vars.lock().get(name).cloned()
    }

    /// Remove a variable.  Returns `true` if it existed.
    pub fn remove(&self, name: &str) -> bool {
        self.vars.lock().remove(name).is_some()
    }

    pub fn clear(&self) {
        self.vars.lock().clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.lock().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.lock().is_empty()
    }

    /// All variables, sorted by name.
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        let mut all: Vec<(String, Value)> =
            self.vars.lock().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Replace every `$name` in `value` with its current binding.
    ///
    /// Composite fields are resolved too.  Unbound names resolve to `Null`.
    pub fn resolve(&self, value: &Value) -> Value {
        match value {
            Value::VarRef(name) => match self.get(name) {
                Some(v) => v,
                None => {
                    debug!(var = %name, "unresolved variable reference, using null");
                    Value::Null
                }
            },
            Value::Composite { kind, fields } => Value::Composite {
                kind: *kind,
                fields: fields.iter().map(|f| self.resolve(f)).collect(),
            },
            other => other.clone(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
