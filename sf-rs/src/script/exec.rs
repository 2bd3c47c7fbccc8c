//! Script executor.
//!
//! The [`Executor`] ties a session's [`Context`] to a [`DispatchTree`]:
//! parse → resolve `$name` arguments → dispatch → wrap the outcome.  Nothing
//! that goes wrong in one command escapes as a Rust error; every outcome is
//! an [`ExecutionResult`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, debug_span};

use crate::context::Context;
use crate::dispatch::DispatchTree;
use crate::error::{ErrorKind, ScriptError};
use crate::host::Host;
use crate::script::parse::parse_command;
use crate::script::value::Value;

// ── ExecutionResult ───────────────────────────────────────────────────────────

/// Outcome of one command.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub command: String,
    pub outcome: Result<Value, ScriptError>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The returned value; `None` on failure.
    pub fn value(&self) -> Option<&Value> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&ScriptError> {
        self.outcome.as_ref().err()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(ScriptError::kind)
    }

    /// The error message; `None` on success.
    pub fn message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(v) => write!(f, "✓ {} → {v}", self.command),
            Err(e) => write!(f, "✗ {} - {e}", self.command),
        }
    }
}

// ── Executor ──────────────────────────────────────────────────────────────────

/// Runs commands against one context.  Cheap to clone.
#[derive(Debug, Clone)]
pub struct Executor {
    context: Arc<Context>,
    tree: Arc<DispatchTree>,
    host: Host,
}

impl Executor {
    pub fn new(context: Arc<Context>, tree: Arc<DispatchTree>, host: Host) -> Self {
        Executor { context, tree, host }
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Run one command line.  A `$name =` binding stores the value on success.
    pub fn execute(&self, text: &str) -> ExecutionResult {
        let text = text.trim();
        let _span = debug_span!("execute", command = %text).entered();
        let outcome = self.run(text, None);
        debug!(ok = outcome.is_ok(), "command finished");
        ExecutionResult { command: text.to_owned(), outcome }
    }

    /// Run one command and bind its value to `name` on success.
    ///
    /// Takes precedence over a `$x =` prefix in `text`.
    pub fn execute_and_store(&self, text: &str, name: &str) -> ExecutionResult {
        let text = text.trim();
        let _span = debug_span!("execute", command = %text, store = name).entered();
        let outcome = self.run(text, Some(name));
        ExecutionResult { command: text.to_owned(), outcome }
    }

    /// Run every line independently, one result per line, in order.
    pub fn execute_sequence<I, S>(&self, lines: I) -> Vec<ExecutionResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines.into_iter().map(|line| self.execute(line.as_ref())).collect()
    }

    fn run(&self, text: &str, store: Option<&str>) -> Result<Value, ScriptError> {
        let cmd = parse_command(text)?;
        let args: Vec<Value> = cmd.args.iter().map(|a| self.context.resolve(a)).collect();
        let value = self.tree.dispatch(&self.host, &cmd.path, &args)?;
        if let Some(name) = store.or(cmd.binding.as_deref()) {
            debug!(var = name, "binding result");
            self.context.set(name, value.clone());
        }
        Ok(value)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
