//! Doc-comment parsing — `/** … */` blocks with `@` tags.
//!
//! Produces the summary, the free-form description, and the ordered tag
//! list consumed by the merge step. Also owns the serializer that writes
//! the synthetic doc-comments spliced into the regenerated files.

use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;

// `@param <type> $<name> <description>`, `...$name` marks a variadic,
// `&$name` a by-reference parameter.
static RE_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(\S+)\s+&?(\.\.\.)?\$([A-Za-z_]\w*)\s*(.*)$").unwrap()
});

// `@return/@throws <type> <description>` and `@since <version> <description>`
// share the same token-then-text shape.
static RE_TOKEN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(\S+)\s*(.*)$").unwrap());

/// One parsed tag occurrence, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Param {
        type_: String,
        name: String,
        description: String,
        is_variadic: bool,
    },
    Return {
        type_: String,
        description: String,
    },
    Throws {
        type_: String,
        description: String,
    },
    Since {
        version: String,
        description: String,
    },
    Internal,
}

/// A parsed doc-comment. Immutable once built.
#[derive(Debug, Default)]
pub struct DocBlock {
    pub summary: String,
    pub description: String,
    pub tags: Vec<Tag>,
}

impl DocBlock {
    /// Parse the raw text of a `/** … */` comment.
    ///
    /// A tag that does not match its documented shape makes the whole
    /// comment malformed; callers treat that as a per-function skip.
    pub fn parse(raw: &str) -> Result<DocBlock> {
        let lines = strip_delimiters(raw)?;

        let tag_start = lines
            .iter()
            .position(|l| l.trim_start().starts_with('@'))
            .unwrap_or(lines.len());
        let (text_lines, tag_lines) = lines.split_at(tag_start);

        let (summary, description) = split_summary(text_lines);

        let mut tags = Vec::new();
        let mut current: Option<(String, String)> = None;
        for line in tag_lines {
            if let Some(rest) = line.trim_start().strip_prefix('@') {
                if let Some((name, body)) = current.take() {
                    tags.extend(parse_tag(&name, body.trim())?);
                }
                let (name, first) = match rest.split_once(char::is_whitespace) {
                    Some((name, first)) => (name.to_string(), first.to_string()),
                    None => (rest.to_string(), String::new()),
                };
                current = Some((name, first));
            } else if let Some((_, body)) = current.as_mut() {
                body.push('\n');
                body.push_str(line);
            }
        }
        if let Some((name, body)) = current.take() {
            tags.extend(parse_tag(&name, body.trim())?);
        }

        Ok(DocBlock {
            summary,
            description,
            tags,
        })
    }

    pub fn is_internal(&self) -> bool {
        self.tags.iter().any(|t| matches!(t, Tag::Internal))
    }
}

/// Serialize a doc-comment from a summary and pre-rendered tag lines.
/// No line wrapping; `@method` lines are long on purpose.
pub fn serialize(summary: &str, tag_lines: &[String]) -> String {
    let mut out = String::from("/**\n");
    if !summary.is_empty() {
        for line in summary.lines() {
            out.push_str(" * ");
            out.push_str(line);
            out.push('\n');
        }
        if !tag_lines.is_empty() {
            out.push_str(" *\n");
        }
    }
    for line in tag_lines {
        out.push_str(" * ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(" */");
    out
}

// -- Parsing helpers ----------------------------------------------------------

/// Strip `/** … */` delimiters and the ` * ` left margin, one entry per line.
fn strip_delimiters(raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix("/**").context("not a doc-comment")?;
    let body = body.strip_suffix("*/").context("unterminated doc-comment")?;

    let mut lines: Vec<String> = body.lines().map(strip_margin).collect();
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    Ok(lines)
}

fn strip_margin(line: &str) -> String {
    let l = line.trim_start();
    let l = l.strip_prefix('*').unwrap_or(l);
    l.strip_prefix(' ').unwrap_or(l).to_string()
}

/// The summary ends at the first blank line or after a line ending with a
/// period; everything after it (up to the tags) is the description.
fn split_summary(text: &[String]) -> (String, String) {
    let mut summary_lines: Vec<&str> = Vec::new();
    let mut rest_start = text.len();
    for (i, line) in text.iter().enumerate() {
        if line.trim().is_empty() {
            rest_start = i + 1;
            break;
        }
        summary_lines.push(line);
        if line.trim_end().ends_with('.') {
            rest_start = i + 1;
            break;
        }
    }

    let mut rest = &text[rest_start..];
    while rest.first().is_some_and(|l| l.trim().is_empty()) {
        rest = &rest[1..];
    }

    (
        summary_lines.join("\n"),
        rest.join("\n").trim_end().to_string(),
    )
}

/// Parse one tag group. Unknown tags are ignored, malformed known tags
/// are errors.
fn parse_tag(name: &str, body: &str) -> Result<Option<Tag>> {
    let tag = match name {
        "param" => {
            let caps = RE_PARAM
                .captures(body)
                .with_context(|| format!("malformed @param tag: {body}"))?;
            Tag::Param {
                type_: caps[1].to_string(),
                is_variadic: caps.get(2).is_some(),
                name: caps[3].to_string(),
                description: caps[4].trim().to_string(),
            }
        }
        "return" => {
            let caps = RE_TOKEN_TEXT
                .captures(body)
                .with_context(|| format!("malformed @return tag: {body}"))?;
            Tag::Return {
                type_: caps[1].to_string(),
                description: caps[2].trim().to_string(),
            }
        }
        "throws" => {
            let caps = RE_TOKEN_TEXT
                .captures(body)
                .with_context(|| format!("malformed @throws tag: {body}"))?;
            Tag::Throws {
                type_: caps[1].to_string(),
                description: caps[2].trim().to_string(),
            }
        }
        "since" => {
            let caps = RE_TOKEN_TEXT
                .captures(body)
                .with_context(|| format!("malformed @since tag: {body}"))?;
            Tag::Since {
                version: caps[1].to_string(),
                description: caps[2].trim().to_string(),
            }
        }
        "internal" => Tag::Internal,
        _ => return Ok(None),
    };
    Ok(Some(tag))
}
