//! Error types.
//!
//! Three families, matching the three places things can go wrong:
//!
//! | Type | Raised by | Surfaced as |
//! |------|-----------|-------------|
//! | [`ScriptError`] | parser, dispatch tree, type registry, operations | a failed [`ExecutionResult`](crate::script::exec::ExecutionResult) |
//! | [`SessionError`] | session loading and lifecycle | `Err` to the host |
//! | [`DispatchBuildError`] | dispatch-tree construction at startup | `Err` to the host |

use std::fmt;

use thiserror::Error;

// ── ErrorKind ─────────────────────────────────────────────────────────────────

/// Fieldless discriminant of a [`ScriptError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    NamespaceNotFound,
    MethodNotFound,
    Argument,
    TypeRegistration,
    RuntimeOperation,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::NamespaceNotFound => "NamespaceNotFound",
            ErrorKind::MethodNotFound => "MethodNotFound",
            ErrorKind::Argument => "ArgumentError",
            ErrorKind::TypeRegistration => "TypeRegistrationError",
            ErrorKind::RuntimeOperation => "RuntimeOperationError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── ScriptError ───────────────────────────────────────────────────────────────

/// A failure while parsing, routing, or running a single command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScriptError {
    /// The command text does not match the command grammar.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A namespace node has no child named `segment`.
    #[error("namespace not found: '{segment}' in '{path}'")]
    NamespaceNotFound { segment: String, path: String },

    /// The path ended on a namespace instead of an operation.
    #[error("method not found: '{path}' names a namespace, not an operation")]
    MethodNotFound { path: String },

    /// Operation-specific arity or type mismatch.
    #[error("argument error: {0}")]
    Argument(String),

    /// Duplicate name or missing parent/interface at registration.
    #[error("type registration error: {0}")]
    TypeRegistration(String),

    /// Operation logic failure.
    #[error("runtime error: {0}")]
    RuntimeOperation(String),
}

impl ScriptError {
    pub fn syntax(msg: impl Into<String>) -> Self {
        ScriptError::Syntax(msg.into())
    }

    pub fn argument(msg: impl Into<String>) -> Self {
        ScriptError::Argument(msg.into())
    }

    pub fn registration(msg: impl Into<String>) -> Self {
        ScriptError::TypeRegistration(msg.into())
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        ScriptError::RuntimeOperation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScriptError::Syntax(_) => ErrorKind::Syntax,
            ScriptError::NamespaceNotFound { .. } => ErrorKind::NamespaceNotFound,
            ScriptError::MethodNotFound { .. } => ErrorKind::MethodNotFound,
            ScriptError::Argument(_) => ErrorKind::Argument,
            ScriptError::TypeRegistration(_) => ErrorKind::TypeRegistration,
            ScriptError::RuntimeOperation(_) => ErrorKind::RuntimeOperation,
        }
    }
}

// ── SessionError ──────────────────────────────────────────────────────────────

/// Load-time and lifecycle failures of a [`Session`](crate::session::Session).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("at least one script is required")]
    EmptyBundle,

    #[error("script name cannot be empty")]
    EmptyScriptName,

    #[error("script '{0}' has no text")]
    EmptyScript(String),

    #[error("duplicate script name: {0}")]
    DuplicateScript(String),

    #[error("session '{0}' is already loaded; unload it first")]
    DuplicateSession(String),

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("script not found: {0}")]
    ScriptNotFound(String),

    #[error("session '{0}' is not active")]
    Inactive(String),
}

// ── DispatchBuildError ────────────────────────────────────────────────────────

/// A malformed operation catalog, detected while building the dispatch tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchBuildError {
    #[error("duplicate dispatch key '{key}' under '{parent}'")]
    DuplicateKey { parent: String, key: String },

    #[error("dispatch key must be a non-empty identifier, got '{0}'")]
    InvalidKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(ScriptError::syntax("x").kind(), ErrorKind::Syntax);
        assert_eq!(ScriptError::argument("x").kind(), ErrorKind::Argument);
        assert_eq!(ScriptError::registration("x").kind(), ErrorKind::TypeRegistration);
        assert_eq!(ScriptError::runtime("x").kind(), ErrorKind::RuntimeOperation);
        let e = ScriptError::MethodNotFound { path: "A.B".into() };
        assert_eq!(e.kind(), ErrorKind::MethodNotFound);
    }

    #[test]
    fn display_includes_segment_and_path() {
        let e = ScriptError::NamespaceNotFound {
            segment: "Nope".into(),
            path: "System.Nope.Write".into(),
        };
        let s = e.to_string();
        assert!(s.contains("'Nope'"), "{s}");
        assert!(s.contains("System.Nope.Write"), "{s}");
    }

    #[test]
    fn kind_names() {
        assert_eq!(ErrorKind::Syntax.to_string(), "SyntaxError");
        assert_eq!(ErrorKind::Argument.name(), "ArgumentError");
    }
}
