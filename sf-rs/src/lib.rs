//! sfscript: an embeddable command-dispatch interpreter.
//!
//! Scripts are flat lists of commands such as
//! `Engine.Vector3.Distance(Vector3(0, 0, 0), $target)`.  Each command is
//! parsed, its `$variables` resolved against the session context, and the
//! dotted path routed through a [`DispatchTree`](dispatch::DispatchTree) to
//! one host-exposed operation.  A dynamic [`TypeRegistry`](types::TypeRegistry)
//! lets scripts define component types with inheritance and interfaces.

pub mod cli;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod ops;
pub mod script;
pub mod session;
pub mod source;
pub mod terminal;
pub mod types;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the stderr `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` (default `warn`); `debug` forces the
/// `sfscript` target to `debug`.  Later calls are no-ops.
pub fn init_tracing(debug: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        if debug {
            if let Ok(directive) = "sfscript=debug".parse() {
                filter = filter.add_directive(directive);
            }
        }
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    });
}
