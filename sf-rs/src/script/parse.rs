//! Command-line parser.
//!
//! One line of script text is one command:
//!
//! ```text
//! [$name =] Segment(.Segment)*( [Value (, Value)*] )
//! ```
//!
//! Argument tokens resolve in this order, first match wins:
//!
//! | Token | Value |
//! |-------|-------|
//! | `null` (any case) | `Null` |
//! | `'text'` / `"text"` | `Str`, with `\n \t \\ \' \"` unescaped |
//! | `true` / `false` (any case) | `Bool` |
//! | `-42` | `Int` |
//! | `1.5`, `-2e3`, `.5`, digits beyond `i64` | `Float` |
//! | `Vector3(..)`, `Color(..)`, `Bounds(..)` | `Composite` |
//! | `$name` | `VarRef` |

use crate::error::ScriptError;
use crate::script::value::{CompositeKind, Value};

/// One parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub path: Vec<String>,
    pub args: Vec<Value>,
    /// Variable that receives the result on success (`$name = ...`).
    pub binding: Option<String>,
}

impl Command {
    /// The dotted path as written, without whitespace.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

pub fn parse_command(text: &str) -> Result<Command, ScriptError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ScriptError::syntax("empty command"));
    }

    let (binding, rest) = split_binding(text)?;

    let open = rest
        .find('(')
        .ok_or_else(|| ScriptError::syntax(format!("expected '(' after operation path: {rest}")))?;
    let Some(inner) = rest[open + 1..].strip_suffix(')') else {
        return Err(ScriptError::syntax(format!("expected ')' at end of command: {rest}")));
    };

    let path = parse_path(&rest[..open])?;
    let args = split_arguments(inner)?
        .iter()
        .map(|tok| parse_value_at(tok, 0))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Command { path, args, binding })
}

/// Strip a leading `$name =` if present.
fn split_binding(text: &str) -> Result<(Option<String>, &str), ScriptError> {
    let Some(after) = text.strip_prefix('$') else {
        return Ok((None, text));
    };
    let name_len = after.find(|c: char| !is_word_char(c)).unwrap_or(after.len());
    let name = &after[..name_len];
    let Some(rest) = after[name_len..].trim_start().strip_prefix('=') else {
        return Err(ScriptError::syntax(format!("expected '=' after ${name}")));
    };
    if name.is_empty() {
        return Err(ScriptError::syntax("binding needs a variable name"));
    }
    Ok((Some(name.to_owned()), rest.trim_start()))
}

fn parse_path(s: &str) -> Result<Vec<String>, ScriptError> {
    s.split('.')
        .map(|seg| {
            let seg = seg.trim();
            if is_identifier(seg) {
                Ok(seg.to_owned())
            } else {
                Err(ScriptError::syntax(format!("invalid path segment '{seg}' in '{}'", s.trim())))
            }
        })
        .collect()
}

// ── Argument splitting ────────────────────────────────────────────────────────

/// Split an argument list on top-level commas.
///
/// Commas inside parentheses or quoted strings do not split.  Tokens are
/// returned trimmed but otherwise raw (quotes and escapes intact).  A blank
/// list yields no tokens; a blank token between commas is an error.
pub fn split_arguments(s: &str) -> Result<Vec<String>, ScriptError> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut tokens = Vec::new();
    let mut cur = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(_), '\\') => {
                cur.push(ch);
                if let Some(escaped) = chars.next() {
                    cur.push(escaped);
                }
                continue;
            }
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ScriptError::syntax(format!("unbalanced ')' in arguments: {s}")))?;
            }
            (None, ',') if depth == 0 => {
                tokens.push(take_token(&mut cur, s)?);
                continue;
            }
            (None, _) => {}
        }
        cur.push(ch);
    }

    if quote.is_some() {
        return Err(ScriptError::syntax(format!("unterminated string in arguments: {s}")));
    }
    if depth != 0 {
        return Err(ScriptError::syntax(format!("unbalanced '(' in arguments: {s}")));
    }
    tokens.push(take_token(&mut cur, s)?);
    Ok(tokens)
}

fn take_token(cur: &mut String, whole: &str) -> Result<String, ScriptError> {
    let tok = std::mem::take(cur).trim().to_owned();
    if tok.is_empty() {
        return Err(ScriptError::syntax(format!("empty argument in: {whole}")));
    }
    Ok(tok)
}

// ── Values ────────────────────────────────────────────────────────────────────

/// Parse a single argument token.
pub fn parse_value(token: &str) -> Result<Value, ScriptError> {
    parse_value_at(token, 0)
}

/// `nesting` is the number of composite literals enclosing `token`.
fn parse_value_at(token: &str, nesting: usize) -> Result<Value, ScriptError> {
    let token = token.trim();

    if token.eq_ignore_ascii_case("null") {
        return Ok(Value::Null);
    }
    if let Some(s) = unquote(token) {
        return Ok(Value::Str(s));
    }
    if token.eq_ignore_ascii_case("true") {
        return Ok(Value::Bool(true));
    }
    if token.eq_ignore_ascii_case("false") {
        return Ok(Value::Bool(false));
    }
    // Digits that overflow i64 fall through to the float rule.
    if is_integer_literal(token) {
        if let Ok(n) = token.parse::<i64>() {
            return Ok(Value::Int(n));
        }
    }
    if let Some(x) = parse_float(token) {
        return Ok(Value::Float(x));
    }
    if let Some((name, inner)) = split_constructor(token) {
        return parse_composite(name, inner, nesting);
    }
    if let Some(name) = token.strip_prefix('$') {
        if is_identifier(name) {
            return Ok(Value::VarRef(name.to_owned()));
        }
    }
    Err(ScriptError::syntax(format!("cannot parse value: {token}")))
}

/// Contents of a string literal, if `token` is exactly one.
fn unquote(token: &str) -> Option<String> {
    let q = token.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let body = token.strip_prefix(q)?.strip_suffix(q)?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                c @ ('\\' | '\'' | '"') => out.push(c),
                c => {
                    out.push('\\');
                    out.push(c);
                }
            },
            c if c == q => return None,
            c => out.push(c),
        }
    }
    Some(out)
}

fn is_integer_literal(token: &str) -> bool {
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Decimal floats only: `inf`, `nan` and friends are rejected.
fn parse_float(token: &str) -> Option<f64> {
    let charset_ok = token
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    let has_digit = token.bytes().any(|b| b.is_ascii_digit());
    if !charset_ok || !has_digit {
        return None;
    }
    token.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// `Name(inner)` → `("Name", "inner")`.
fn split_constructor(token: &str) -> Option<(&str, &str)> {
    let open = token.find('(')?;
    let inner = token[open + 1..].strip_suffix(')')?;
    let name = token[..open].trim();
    is_identifier(name).then_some((name, inner))
}

fn parse_composite(name: &str, inner: &str, nesting: usize) -> Result<Value, ScriptError> {
    let kind = CompositeKind::from_name(name)
        .ok_or_else(|| ScriptError::syntax(format!("unknown composite type '{name}'")))?;
    if nesting > 1 {
        return Err(ScriptError::syntax(format!(
            "{name}(..) nested too deeply; composites nest at most one level"
        )));
    }

    let fields = split_arguments(inner)?
        .iter()
        .map(|tok| parse_value_at(tok, nesting + 1))
        .collect::<Result<Vec<_>, _>>()?;

    let fields = match kind {
        CompositeKind::Vector3 => {
            expect_arity(kind, &fields, &[3])?;
            numeric_fields(kind, fields)?
        }
        CompositeKind::Color => {
            expect_arity(kind, &fields, &[3, 4])?;
            let mut fields = numeric_fields(kind, fields)?;
            if fields.len() == 3 {
                fields.push(Value::Float(1.0));
            }
            fields
        }
        CompositeKind::Bounds => {
            expect_arity(kind, &fields, &[2])?;
            for f in &fields {
                let ok = matches!(
                    f,
                    Value::Composite { kind: CompositeKind::Vector3, .. } | Value::VarRef(_)
                );
                if !ok {
                    return Err(ScriptError::syntax(format!(
                        "Bounds fields must be Vector3, got {}",
                        f.type_name()
                    )));
                }
            }
            fields
        }
    };

    Ok(Value::Composite { kind, fields })
}

fn expect_arity(kind: CompositeKind, fields: &[Value], allowed: &[usize]) -> Result<(), ScriptError> {
    if allowed.contains(&fields.len()) {
        return Ok(());
    }
    let want = allowed.iter().map(usize::to_string).collect::<Vec<_>>().join(" or ");
    Err(ScriptError::syntax(format!(
        "{kind} takes {want} fields, got {}",
        fields.len()
    )))
}

/// Ints widen to Float; variable references pass through for later resolution.
fn numeric_fields(kind: CompositeKind, fields: Vec<Value>) -> Result<Vec<Value>, ScriptError> {
    fields
        .into_iter()
        .map(|f| match f {
            Value::Int(n) => Ok(Value::Float(n as f64)),
            Value::Float(_) | Value::VarRef(_) => Ok(f),
            other => Err(ScriptError::syntax(format!(
                "{kind} fields must be numbers, got {}",
                other.type_name()
            ))),
        })
        .collect()
}

// ── Identifiers ───────────────────────────────────────────────────────────────

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_word_char)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
