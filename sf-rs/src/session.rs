//! Sessions: a loaded bundle of scripts with its own variable context.
//!
//! A [`Session`] preprocesses every script once at load time (comment
//! stripping, `@field` markers seeded into its [`Context`]) and then runs
//! commands on demand.  [`SessionManager`] owns the shared dispatch tree and
//! host and keeps loaded sessions by id.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::context::Context;
use crate::dispatch::DispatchTree;
use crate::error::{DispatchBuildError, SessionError};
use crate::host::Host;
use crate::ops::standard_tree;
use crate::script::exec::{ExecutionResult, Executor};
use crate::script::value::Value;
use crate::source::ScriptSource;

// ── Session ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Session {
    id: String,
    /// Bundle order.
    scripts: Vec<ScriptSource>,
    executor: Executor,
    active: bool,
}

impl Session {
    /// Load a bundle of `(script name, script text)` pairs.
    pub fn new(
        id: impl Into<String>,
        bundle: Vec<(String, String)>,
        tree: Arc<DispatchTree>,
        host: Host,
    ) -> Result<Self, SessionError> {
        let id = id.into();
        if bundle.is_empty() {
            return Err(SessionError::EmptyBundle);
        }

        let mut seen = HashSet::new();
        for (name, _) in &bundle {
            if name.is_empty() {
                return Err(SessionError::EmptyScriptName);
            }
            if !seen.insert(name.as_str()) {
                return Err(SessionError::DuplicateScript(name.clone()));
            }
        }

        let context = Arc::new(Context::new());
        let mut scripts = Vec::with_capacity(bundle.len());
        for (name, text) in bundle {
            let (src, errors) = ScriptSource::parse(name, &text);
            for e in &errors {
                warn!(session = %id, script = %src.name, "ignoring malformed field marker, {e}");
            }
            for field in &src.fields {
                debug!(session = %id, var = %field.name, value = %field.value, "seeding field");
                context.set(field.name.clone(), field.value.clone());
            }
            scripts.push(src);
        }

        info!(session = %id, scripts = scripts.len(), "session loaded");
        Ok(Session {
            id,
            scripts,
            executor: Executor::new(context, tree, host),
            active: true,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn context(&self) -> &Arc<Context> {
        self.executor.context()
    }

    /// Script names in bundle order.
    pub fn script_names(&self) -> Vec<&str> {
        self.scripts.iter().map(|s| s.name.as_str()).collect()
    }

    /// The preprocessed command lines of one script.
    pub fn commands(&self, script: &str) -> Result<&[String], SessionError> {
        self.ensure_active()?;
        self.script(script).map(|s| s.commands.as_slice())
    }

    /// Run every command of one script, continuing past failures.
    pub fn execute_script(&self, script: &str) -> Result<Vec<ExecutionResult>, SessionError> {
        self.ensure_active()?;
        let src = self.script(script)?;
        Ok(self.run_lines(&src.name, &src.commands))
    }

    /// Run every script in bundle order.
    pub fn execute_all(&self) -> Result<Vec<ExecutionResult>, SessionError> {
        self.ensure_active()?;
        Ok(self
            .scripts
            .iter()
            .flat_map(|src| self.run_lines(&src.name, &src.commands))
            .collect())
    }

    /// Run one ad-hoc command in this session's context.
    pub fn execute(&self, text: &str) -> Result<ExecutionResult, SessionError> {
        self.ensure_active()?;
        let r = self.executor.execute(text);
        self.log_failure("<inline>", &r);
        Ok(r)
    }

    pub fn set_variable(&self, name: &str, value: Value) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.context().set(name, value);
        Ok(())
    }

    pub fn get_variable(&self, name: &str) -> Option<Value> {
        self.context().get(name)
    }

    /// Drop commands and variables.  Every later execute or set fails.
    pub fn unload(&mut self) {
        if !self.active {
            return;
        }
        self.scripts.clear();
        self.context().clear();
        self.active = false;
        info!(session = %self.id, "session unloaded");
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.active {
            Ok(())
        } else {
            Err(SessionError::Inactive(self.id.clone()))
        }
    }

    fn script(&self, name: &str) -> Result<&ScriptSource, SessionError> {
        self.scripts
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SessionError::ScriptNotFound(name.to_owned()))
    }

    fn run_lines(&self, script: &str, lines: &[String]) -> Vec<ExecutionResult> {
        lines
            .iter()
            .map(|line| {
                let r = self.executor.execute(line);
                self.log_failure(script, &r);
                r
            })
            .collect()
    }

    fn log_failure(&self, script: &str, r: &ExecutionResult) {
        if let Some(e) = r.error() {
            warn!(session = %self.id, script, command = %r.command, error = %e, "command failed");
        }
    }
}

// ── SessionManager ────────────────────────────────────────────────────────────

/// Loaded sessions keyed by id, sharing one tree and one host.
#[derive(Debug)]
pub struct SessionManager {
    tree: Arc<DispatchTree>,
    host: Host,
    sessions: BTreeMap<String, Session>,
}

impl SessionManager {
    pub fn new(tree: Arc<DispatchTree>, host: Host) -> Self {
        SessionManager { tree, host, sessions: BTreeMap::new() }
    }

    /// A manager over the standard operation catalog.
    pub fn with_standard_catalog(host: Host) -> Result<Self, DispatchBuildError> {
        Ok(Self::new(Arc::new(standard_tree()?), host))
    }

    pub fn tree(&self) -> &Arc<DispatchTree> {
        &self.tree
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn load(
        &mut self,
        id: impl Into<String>,
        bundle: Vec<(String, String)>,
    ) -> Result<&mut Session, SessionError> {
        let id = id.into();
        if self.sessions.contains_key(&id) {
            return Err(SessionError::DuplicateSession(id));
        }
        let session = Session::new(id.clone(), bundle, Arc::clone(&self.tree), self.host.clone())?;
        Ok(self.sessions.entry(id).or_insert(session))
    }

    /// Load a single script as a session of the same name.
    pub fn load_text(&mut self, name: &str, text: &str) -> Result<&mut Session, SessionError> {
        if name.is_empty() {
            return Err(SessionError::EmptyScriptName);
        }
        if text.trim().is_empty() {
            return Err(SessionError::EmptyScript(name.to_owned()));
        }
        self.load(name, vec![(name.to_owned(), text.to_owned())])
    }

    pub fn unload(&mut self, id: &str) -> Result<(), SessionError> {
        let mut session = self
            .sessions
            .remove(id)
            .ok_or_else(|| SessionError::SessionNotFound(id.to_owned()))?;
        session.unload();
        Ok(())
    }

    pub fn unload_all(&mut self) {
        for (_, mut session) in std::mem::take(&mut self.sessions) {
            session.unload();
        }
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.get_mut(id)
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Loaded session ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        self.sessions.keys().map(String::as_str).collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
