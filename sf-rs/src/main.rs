use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use sfscript::cli::{self, CliArgs};
use sfscript::context::Context;
use sfscript::dispatch::DispatchTree;
use sfscript::error::SessionError;
use sfscript::host::{Host, Output};
use sfscript::ops::standard_tree;
use sfscript::script::exec::{ExecutionResult, Executor};
use sfscript::session::Session;
use sfscript::terminal::ResultPrinter;
use sfscript::types::TypeRegistry;

const USAGE: &str = "Usage: sfscript [-d] [-l] [-L<dir>] [-c<cmd>] [-s<script>] [-t<ms>] [<file|dir> ...]";

#[tokio::main]
async fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("sfscript: {e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    sfscript::init_tracing(args.debug);

    let tree = match standard_tree() {
        Ok(t) => Arc::new(t),
        Err(e) => {
            eprintln!("sfscript: {e}");
            std::process::exit(1);
        }
    };

    // ── -l: list the catalog ──────────────────────────────────────────────────
    if args.list {
        for path in tree.paths() {
            println!("{path}");
        }
        return;
    }

    // ── Gather scripts ────────────────────────────────────────────────────────
    let bundle = match load_bundle(&args).await {
        Ok(b) => b,
        Err(e) => {
            eprintln!("sfscript: {e}");
            std::process::exit(1);
        }
    };

    let host = Host::new(TypeRegistry::shared(), Output::Stdout);
    let job = match build_job(&args, bundle, tree, host) {
        Ok(job) => job,
        Err(e) => {
            eprintln!("sfscript: {e}");
            std::process::exit(1);
        }
    };

    // ── Run ───────────────────────────────────────────────────────────────────
    let handle = tokio::task::spawn_blocking(job);
    let joined = match args.timeout {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(j) => j,
            Err(_) => {
                eprintln!("sfscript: timed out after {}ms", limit.as_millis());
                std::process::exit(1);
            }
        },
        None => handle.await,
    };
    let results = match joined {
        Ok(Ok(r)) => r,
        Ok(Err(e)) => {
            eprintln!("sfscript: {e}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("sfscript: execution aborted: {e}");
            std::process::exit(1);
        }
    };

    // ── Report ────────────────────────────────────────────────────────────────
    let mut printer = ResultPrinter::stdout();
    match printer.print_all(&results) {
        Ok(0) => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            eprintln!("sfscript: {e}");
            std::process::exit(1);
        }
    }
}

/// Read every script named on the command line (or in the default script
/// directory).  Falls back to stdin when nothing was found and stdin is piped.
async fn load_bundle(args: &CliArgs) -> Result<Vec<(String, String)>, String> {
    let inputs: Vec<PathBuf> = if args.inputs.is_empty() {
        let dir = cli::resolve_script_dir(args.script_dir.as_ref());
        if dir.is_dir() {
            vec![dir]
        } else {
            Vec::new()
        }
    } else {
        args.inputs.clone()
    };

    let paths = cli::collect_script_paths(&inputs).map_err(|e| format!("reading scripts: {e}"))?;
    let mut bundle = Vec::with_capacity(paths.len());
    for path in paths {
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| format!("{}: {e}", path.display()))?;
        bundle.push((cli::script_name(&path), text));
    }

    if bundle.is_empty() && args.command.is_none() && !std::io::stdin().is_terminal() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut text = String::new();
        while let Some(line) = lines.next_line().await.map_err(|e| format!("stdin: {e}"))? {
            text.push_str(&line);
            text.push('\n');
        }
        bundle.push(("stdin".to_owned(), text));
    }

    if bundle.is_empty() && args.command.is_none() {
        return Err("no scripts found".to_owned());
    }
    Ok(bundle)
}

type Job = Box<dyn FnOnce() -> Result<Vec<ExecutionResult>, SessionError> + Send>;

/// Decide what runs: `-c` alone, `-c` inside the loaded session, one `-s`
/// script, or the whole bundle.
fn build_job(
    args: &CliArgs,
    bundle: Vec<(String, String)>,
    tree: Arc<DispatchTree>,
    host: Host,
) -> Result<Job, SessionError> {
    if bundle.is_empty() {
        let ex = Executor::new(Arc::new(Context::new()), tree, host);
        let cmd = args.command.clone().unwrap_or_default();
        let job: Job = Box::new(move || Ok::<_, SessionError>(vec![ex.execute(&cmd)]));
        return Ok(job);
    }

    let session = Session::new("cli", bundle, tree, host)?;
    let job: Job = match (args.command.clone(), args.script.clone()) {
        (Some(cmd), _) => Box::new(move || session.execute(&cmd).map(|r| vec![r])),
        (None, Some(script)) => Box::new(move || session.execute_script(&script)),
        (None, None) => Box::new(move || session.execute_all()),
    };
    Ok(job)
}
