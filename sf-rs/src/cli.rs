//! Command-line argument parsing.
//!
//! Usage:
//!   sfscript [-d] [-l] [-L<dir>] [-c<cmd>] [-s<script>] [-t<ms>] [<file|dir> …]

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;

/// File extension of script files.
pub const SCRIPT_EXT: &str = "sfs";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Script directory override (`-L<dir>`).
    pub script_dir: Option<PathBuf>,
    /// Single command to run instead of the loaded scripts (`-c<cmd>`).
    pub command: Option<String>,
    /// Run only this script of the bundle (`-s<script>`).
    pub script: Option<String>,
    /// Wall-clock limit for the whole run (`-t<ms>`).
    pub timeout: Option<Duration>,
    /// List the operation catalog and exit (`-l`).
    pub list: bool,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Script files or directories.
    pub inputs: Vec<PathBuf>,
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(&raw[1..])
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            args.inputs.extend(argv[i + 1..].iter().map(PathBuf::from));
            break;
        }

        if !arg.starts_with('-') || arg == "-" {
            args.inputs.push(PathBuf::from(arg));
            i += 1;
            continue;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,
                'l' => args.list = true,

                // Flags taking a value, embedded (`-Ldir`) or separate (`-L dir`).
                flag @ ('L' | 'c' | 's' | 't') => {
                    let value = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err(format!("-{flag} requires an argument"));
                    };
                    match flag {
                        'L' => args.script_dir = Some(PathBuf::from(value)),
                        'c' => args.command = Some(value),
                        's' => args.script = Some(value),
                        _ => {
                            let ms: u64 = value
                                .parse()
                                .map_err(|_| format!("invalid timeout (milliseconds): {value}"))?;
                            args.timeout = Some(Duration::from_millis(ms));
                        }
                    }
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    Ok(args)
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Determine the default script directory.
///
/// Priority: `-L<dir>` CLI flag → `SFSCRIPT_DIR` env var → per-user data
/// directory (`…/sfscript/scripts`, when it exists) → `./scripts`.
pub fn resolve_script_dir(cli_override: Option<&PathBuf>) -> PathBuf {
    if let Some(d) = cli_override {
        return d.clone();
    }
    if let Ok(d) = std::env::var("SFSCRIPT_DIR") {
        return PathBuf::from(d);
    }
    if let Some(dirs) = ProjectDirs::from("", "", "sfscript") {
        let data = dirs.data_dir().join("scripts");
        if data.is_dir() {
            return data;
        }
    }
    PathBuf::from("./scripts")
}

/// Expand inputs into script files.
///
/// A file is taken as-is; a directory contributes its `.sfs` files sorted by
/// name (not recursive).
pub fn collect_script_paths(inputs: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut files: Vec<PathBuf> = std::fs::read_dir(input)?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|x| x == SCRIPT_EXT))
                .collect();
            files.sort();
            out.extend(files);
        } else {
            out.push(input.clone());
        }
    }
    Ok(out)
}

/// Script name for a path: its file stem.
pub fn script_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
