//! Capabilities the host hands to every operation call.
//!
//! | Capability | Type | Used by |
//! |------------|------|---------|
//! | type registry | [`SharedRegistry`] | `SFScript.Type.*`, `SFScript.Interface.*` |
//! | output sink | [`Output`] | `System.Console.*`, `Engine.Debug.*` |

use std::io::Write as _;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::{SharedRegistry, TypeRegistry};

// ── Output ────────────────────────────────────────────────────────────────────

/// Where console-style operations write text.
///
/// Cloning shares the underlying buffer, so a host can keep one clone and
/// read back what scripts wrote through another.
#[derive(Debug, Clone, Default)]
pub enum Output {
    #[default]
    Stdout,
    Buffer(Arc<Mutex<String>>),
    /// Discards everything.
    Silent,
}

impl Output {
    /// A fresh capture buffer.
    pub fn buffer() -> Self {
        Output::Buffer(Arc::new(Mutex::new(String::new())))
    }

    pub fn write_line(&self, msg: &str) {
        match self {
            Output::Stdout => {
                let mut out = std::io::stdout().lock();
                // a closed pipe is not the script's failure
                let _ = writeln!(out, "{msg}");
                let _ = out.flush();
            }
            Output::Buffer(buf) => {
                let mut buf = buf.lock();
                buf.push_str(msg);
                buf.push('\n');
            }
            Output::Silent => {}
        }
    }

    pub fn write(&self, msg: &str) {
        match self {
            Output::Stdout => {
                let mut out = std::io::stdout().lock();
                let _ = out.write_all(msg.as_bytes());
                let _ = out.flush();
            }
            Output::Buffer(buf) => buf.lock().push_str(msg),
            Output::Silent => {}
        }
    }

    /// Everything captured so far.  Empty for `Stdout` and `Silent`.
    pub fn contents(&self) -> String {
        match self {
            Output::Buffer(buf) => buf.lock().clone(),
            _ => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Output::Buffer(buf) = self {
            buf.lock().clear();
        }
    }
}

// ── Host ──────────────────────────────────────────────────────────────────────

/// Shared state passed to each operation.  Cheap to clone.
#[derive(Debug, Clone)]
pub struct Host {
    pub registry: SharedRegistry,
    pub output: Output,
}

impl Host {
    pub fn new(registry: SharedRegistry, output: Output) -> Self {
        Host { registry, output }
    }

    /// A host with its own registry that captures output.
    pub fn capturing() -> Self {
        Host::new(TypeRegistry::shared(), Output::buffer())
    }
}

impl Default for Host {
    fn default() -> Self {
        Host::new(TypeRegistry::shared(), Output::Stdout)
    }
}
