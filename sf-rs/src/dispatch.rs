//! Dispatch tree: routes a dotted path to one operation.
//!
//! ```text
//! root ─┬─ SFScript ─┬─ Type ─────── Define, Create, …
//!       │            └─ Interface ── Define, IsDefined
//!       ├─ System ──── Console ───── WriteLine, Write
//!       └─ Engine ─┬── Vector3 ───── Create, Dot, …
//!                  └── Mathf ─────── Abs, Clamp, …
//! ```
//!
//! Interior nodes are namespaces, leaves are operations.  A tree is built
//! once with [`NamespaceBuilder`] and never mutated afterwards, so it can be
//! shared through an `Arc` by every session.
//!
//! Every failure inside [`DispatchTree::dispatch`] comes back as a
//! [`ScriptError`], including a panic raised by an operation.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::trace;

use crate::error::{DispatchBuildError, ScriptError};
use crate::host::Host;
use crate::script::value::Value;

/// Signature every exposed operation implements.
pub type OpFn = dyn Fn(&Host, &[Value]) -> Result<Value, ScriptError> + Send + Sync;

// ── Operation ─────────────────────────────────────────────────────────────────

/// A leaf of the tree.
#[derive(Clone)]
pub struct Operation {
    f: Arc<OpFn>,
}

impl Operation {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Host, &[Value]) -> Result<Value, ScriptError> + Send + Sync + 'static,
    {
        Operation { f: Arc::new(f) }
    }

    /// Run the operation, turning a panic into a `RuntimeOperation` error.
    pub fn invoke(&self, host: &Host, args: &[Value]) -> Result<Value, ScriptError> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.f)(host, args))) {
            Ok(result) => result,
            Err(payload) => Err(ScriptError::runtime(format!(
                "operation panicked: {}",
                panic_message(payload.as_ref())
            ))),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Operation")
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

// ── DispatchNode ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum DispatchNode {
    Namespace(BTreeMap<String, DispatchNode>),
    Operation(Operation),
}

impl DispatchNode {
    /// Route `path[offset..]` from this node.
    ///
    /// An operation runs as soon as it is reached, even if segments remain.
    pub fn dispatch(
        &self,
        host: &Host,
        path: &[String],
        offset: usize,
        args: &[Value],
    ) -> Result<Value, ScriptError> {
        match self {
            DispatchNode::Operation(op) => {
                trace!(path = %path.join("."), "invoking operation");
                op.invoke(host, args)
            }
            DispatchNode::Namespace(children) => {
                let Some(segment) = path.get(offset) else {
                    return Err(ScriptError::MethodNotFound { path: path.join(".") });
                };
                match children.get(segment) {
                    Some(child) => {
                        trace!(segment = %segment, depth = offset, "dispatch hop");
                        child.dispatch(host, path, offset + 1, args)
                    }
                    None => Err(ScriptError::NamespaceNotFound {
                        segment: segment.clone(),
                        path: path.join("."),
                    }),
                }
            }
        }
    }

    fn collect_paths(&self, prefix: &mut Vec<String>, out: &mut Vec<String>) {
        match self {
            DispatchNode::Operation(_) => out.push(prefix.join(".")),
            DispatchNode::Namespace(children) => {
                for (key, child) in children {
                    prefix.push(key.clone());
                    child.collect_paths(prefix, out);
                    prefix.pop();
                }
            }
        }
    }
}

// ── DispatchTree ──────────────────────────────────────────────────────────────

/// The root namespace of an operation catalog.
#[derive(Debug, Clone)]
pub struct DispatchTree {
    root: DispatchNode,
}

impl DispatchTree {
    pub fn new(root: DispatchNode) -> Self {
        DispatchTree { root }
    }

    /// Route `path` from the root and run the operation it names.
    pub fn dispatch(&self, host: &Host, path: &[String], args: &[Value]) -> Result<Value, ScriptError> {
        self.root.dispatch(host, path, 0, args)
    }

    /// Every operation path in the tree, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.root.collect_paths(&mut Vec::new(), &mut out);
        out
    }

    pub fn root(&self) -> &DispatchNode {
        &self.root
    }
}

// ── NamespaceBuilder ──────────────────────────────────────────────────────────

/// Collects the children of one namespace.
///
/// Methods chain; the first construction error is kept and returned by
/// [`build`](Self::build).
#[derive(Debug)]
pub struct NamespaceBuilder {
    name: String,
    children: BTreeMap<String, DispatchNode>,
    error: Option<DispatchBuildError>,
}

impl NamespaceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        NamespaceBuilder { name: name.into(), children: BTreeMap::new(), error: None }
    }

    /// Builder for an unnamed root namespace.
    pub fn root() -> Self {
        Self::new("")
    }

    pub fn operation<F>(self, key: &str, f: F) -> Self
    where
        F: Fn(&Host, &[Value]) -> Result<Value, ScriptError> + Send + Sync + 'static,
    {
        self.node(key, DispatchNode::Operation(Operation::new(f)))
    }

    /// Add a child namespace, keyed by its own name.
    pub fn namespace(mut self, child: NamespaceBuilder) -> Self {
        let key = child.name.clone();
        match child.build() {
            Ok(node) => self.node(&key, node),
            Err(e) => {
                self.error.get_or_insert(e);
                self
            }
        }
    }

    pub fn node(mut self, key: &str, node: DispatchNode) -> Self {
        if self.error.is_some() {
            return self;
        }
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            self.error = Some(DispatchBuildError::InvalidKey(key.to_owned()));
        } else if self.children.contains_key(key) {
            self.error = Some(DispatchBuildError::DuplicateKey {
                parent: self.display_name().to_owned(),
                key: key.to_owned(),
            });
        } else {
            self.children.insert(key.to_owned(), node);
        }
        self
    }

    pub fn build(self) -> Result<DispatchNode, DispatchBuildError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(DispatchNode::Namespace(self.children)),
        }
    }

    pub fn build_tree(self) -> Result<DispatchTree, DispatchBuildError> {
        self.build().map(DispatchTree::new)
    }

    fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "<root>"
        } else {
            &self.name
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn path(s: &str) -> Vec<String> {
        s.split('.').map(str::to_owned).collect()
    }

    fn sample() -> DispatchTree {
        NamespaceBuilder::root()
            .namespace(
                NamespaceBuilder::new("A").namespace(
                    NamespaceBuilder::new("B")
                        .namespace(
                            NamespaceBuilder::new("C")
                                .operation("Echo", |_, args| Ok(args.first().cloned().unwrap_or_default())),
                        )
                        .operation("Fail", |_, _| Err(ScriptError::argument("nope")))
                        .operation("Boom", |_, _| panic!("kaboom")),
                ),
            )
            .operation("Top", |_, _| Ok(Value::Int(1)))
            .build_tree()
            .unwrap()
    }

    #[test]
    fn reaches_deep_operation() {
        let host = Host::capturing();
        let out = sample().dispatch(&host, &path("A.B.C.Echo"), &[Value::Int(7)]).unwrap();
        assert_eq!(out, Value::Int(7));
    }

    #[test]
    fn namespace_not_found_at_any_depth() {
        let host = Host::capturing();
        let tree = sample();
        for (p, seg) in [("X.B.C.Echo", "X"), ("A.X.C.Echo", "X"), ("A.B.C.Missing", "Missing")] {
            match tree.dispatch(&host, &path(p), &[]) {
                Err(ScriptError::NamespaceNotFound { segment, .. }) => assert_eq!(segment, seg, "{p}"),
                other => panic!("{p}: {other:?}"),
            }
        }
    }

    #[test]
    fn ending_on_namespace_is_method_not_found() {
        let host = Host::capturing();
        let err = sample().dispatch(&host, &path("A.B"), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MethodNotFound);
    }

    #[test]
    fn operation_runs_despite_trailing_segments() {
        let host = Host::capturing();
        let out = sample().dispatch(&host, &path("Top.Extra"), &[]).unwrap();
        assert_eq!(out, Value::Int(1));
    }

    #[test]
    fn errors_and_panics_come_back_as_data() {
        let host = Host::capturing();
        let tree = sample();
        let err = tree.dispatch(&host, &path("A.B.Fail"), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
        let err = tree.dispatch(&host, &path("A.B.Boom"), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RuntimeOperation);
        assert!(err.to_string().contains("kaboom"));
    }

    #[test]
    fn duplicate_key_rejected() {
        let err = NamespaceBuilder::new("Math")
            .operation("Abs", |_, _| Ok(Value::Null))
            .operation("Abs", |_, _| Ok(Value::Null))
            .build()
            .unwrap_err();
        assert_eq!(err, DispatchBuildError::DuplicateKey { parent: "Math".into(), key: "Abs".into() });
    }

    #[test]
    fn nested_error_propagates() {
        let err = NamespaceBuilder::root()
            .namespace(NamespaceBuilder::new("Bad").operation("a.b", |_, _| Ok(Value::Null)))
            .build_tree()
            .unwrap_err();
        assert_eq!(err, DispatchBuildError::InvalidKey("a.b".into()));
    }

    #[test]
    fn paths_sorted() {
        assert_eq!(sample().paths(), ["A.B.Boom", "A.B.C.Echo", "A.B.Fail", "Top"]);
    }
}
