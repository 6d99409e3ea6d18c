//! Static signature reflection.
//!
//! Instead of loading discovered code and reflecting it at runtime, the
//! parameter-list text captured by the structural parser is analyzed in
//! place: names, optionality, variadics and default expressions all come
//! straight from the declaration.

use anyhow::{anyhow, Result};
use regex::Regex;
use std::sync::LazyLock;

// `type? &? ...? $name (= default)?` — one declared parameter.
static RE_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*(?:[?\w\\|]+\s+)?(&\s*)?(\.\.\.)?\$([A-Za-z_]\w*)\s*(?:=\s*(.+?)\s*)?$")
        .unwrap()
});

/// One parameter of a located function, as reflection would report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedParameter {
    pub name: String,
    pub is_optional: bool,
    pub is_variadic: bool,
    /// Raw source text of the default expression, if any.
    pub default_value: Option<String>,
}

impl ReflectedParameter {
    /// Render the default expression as a display literal: `null`,
    /// `true`/`false`, a single-quoted string, `[]` for any array, the raw
    /// text otherwise (numbers, constants).
    pub fn default_literal(&self) -> Option<String> {
        self.default_value.as_deref().map(render_literal)
    }
}

/// Parse a raw parameter-list (the text between the declaration's outer
/// parentheses) into reflected parameters.
pub fn reflect_params(raw: &str) -> Result<Vec<ReflectedParameter>> {
    let mut params = Vec::new();
    for piece in split_top_level(raw) {
        let caps = RE_PARAM
            .captures(piece)
            .ok_or_else(|| anyhow!("unparsable parameter: {}", piece.trim()))?;
        let is_variadic = caps.get(2).is_some();
        let default_value = caps.get(4).map(|m| m.as_str().to_string());
        params.push(ReflectedParameter {
            name: caps[3].to_string(),
            is_optional: is_variadic || default_value.is_some(),
            is_variadic,
            default_value,
        });
    }
    Ok(params)
}

fn render_literal(raw: &str) -> String {
    let t = raw.trim();
    if t.eq_ignore_ascii_case("null") {
        return "null".to_string();
    }
    if t.eq_ignore_ascii_case("true") {
        return "true".to_string();
    }
    if t.eq_ignore_ascii_case("false") {
        return "false".to_string();
    }
    if t.starts_with('\'') || t.starts_with('"') {
        return format!("'{}'", unquote(t));
    }
    if t.starts_with('[') || t.to_ascii_lowercase().starts_with("array(") {
        return "[]".to_string();
    }
    t.to_string()
}

/// Strip the delimiters from a quoted string literal, resolving quote and
/// backslash escapes.
fn unquote(quoted: &str) -> String {
    let mut chars = quoted.chars();
    let Some(delim) = chars.next() else {
        return String::new();
    };
    let mut out = String::new();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) if next == delim || next == '\\' => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else if c == delim {
            break;
        } else {
            out.push(c);
        }
    }
    out
}

/// Split a parameter list on top-level commas, respecting brackets and
/// string literals (default arrays and strings contain commas).
fn split_top_level(raw: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let bytes = raw.as_bytes();
    let mut depth = 0i32;
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => i = skip_quoted(bytes, i),
            b'(' | b'[' | b'{' => {
                depth += 1;
                i += 1;
            }
            b')' | b']' | b'}' => {
                depth -= 1;
                i += 1;
            }
            b',' if depth == 0 => {
                pieces.push(&raw[start..i]);
                start = i + 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    if !raw[start..].trim().is_empty() {
        pieces.push(&raw[start..]);
    }
    pieces
}

fn skip_quoted(bytes: &[u8], mut i: usize) -> usize {
    let quote = bytes[i];
    i += 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    i
}
