//! Script source preprocessing.
//!
//! Turns raw script text into the pieces a session needs:
//!
//! | Line | Meaning |
//! |------|---------|
//! | blank | ignored |
//! | starts with `//` or `/*` (after trimming) | comment, ignored |
//! | `// @field:<type> <name> = <value>` | comment that also seeds a variable |
//! | anything else | one command |
//!
//! Field types are matched case-insensitively: `int`, `float`/`double`,
//! `bool`, `string`.  Values that fail to convert fall back to `0`, `0.0` or
//! `false`; an unknown type keeps the raw text as a string.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::script::value::Value;

pub const FIELD_MARKER: &str = "// @field:";

/// A malformed marker line.  Non-fatal: the session still loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for MarkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for MarkerError {}

/// A variable declared by a `@field` marker.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMarker {
    pub line: usize,
    pub name: String,
    pub value: Value,
}

/// One script, split into commands and field markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptSource {
    pub name: String,
    pub commands: Vec<String>,
    pub fields: Vec<FieldMarker>,
}

impl ScriptSource {
    /// Preprocess `text`.  Returns the source and any malformed marker lines.
    pub fn parse(name: impl Into<String>, text: &str) -> (Self, Vec<MarkerError>) {
        let mut src = ScriptSource { name: name.into(), ..Default::default() };
        let mut errors = Vec::new();

        for (i, raw) in text.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() {
                continue;
            }
            if let Some(decl) = line.strip_prefix(FIELD_MARKER) {
                match parse_field(decl) {
                    Ok((name, value)) => src.fields.push(FieldMarker { line: lineno, name, value }),
                    Err(message) => errors.push(MarkerError { line: lineno, message }),
                }
                continue;
            }
            if is_comment(line) {
                continue;
            }
            src.commands.push(line.to_owned());
        }

        (src, errors)
    }
}

/// `true` for a trimmed line that starts a `//` or `/*` comment.
pub fn is_comment(line: &str) -> bool {
    line.starts_with("//") || line.starts_with("/*")
}

// ── Field markers ─────────────────────────────────────────────────────────────

fn field_regex() -> Result<&'static Regex, String> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w+)\s+(\w+)\s*=\s*(.+)$"))
        .as_ref()
        .map_err(|e| format!("field marker pattern: {e}"))
}

/// Parse the text after [`FIELD_MARKER`]: `<type> <name> = <value>`.
fn parse_field(decl: &str) -> Result<(String, Value), String> {
    let re = field_regex()?;
    let caps = re
        .captures(decl.trim())
        .ok_or_else(|| format!("expected '<type> <name> = <value>', got '{}'", decl.trim()))?;
    let ty = &caps[1];
    let name = caps[2].to_owned();
    let raw = caps[3].trim();
    Ok((name, convert_field(ty, raw)))
}

/// Convert marker text by its declared type.
pub fn convert_field(ty: &str, raw: &str) -> Value {
    match ty.to_ascii_lowercase().as_str() {
        "int" => Value::Int(raw.parse().unwrap_or(0)),
        "float" | "double" => {
            Value::Float(raw.parse::<f64>().ok().filter(|x| x.is_finite()).unwrap_or(0.0))
        }
        "bool" => Value::Bool(raw.eq_ignore_ascii_case("true")),
        "string" => Value::Str(strip_quotes(raw).to_owned()),
        _ => Value::Str(raw.to_owned()),
    }
}

/// Remove one pair of matching surrounding quotes.
fn strip_quotes(s: &str) -> &str {
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

// ── Tests ─────────────────────────────────────────────────────────────────────
