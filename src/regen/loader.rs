//! Loader regenerator.
//!
//! Rebuilds the loader class's aggregated `@method` doc-comment and the
//! per-namespace counters embedded in the conditional branch's leading
//! comment, then normalizes whitespace across the rewritten file.

use crate::docblock;
use crate::parser::php::{self, Span, Statement, StmtKind};
use crate::regen::{self, Edit};
use crate::registry::DocumentationRegistry;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

// `** Name [count]` tokens inside the branch comment.
static RE_COUNTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\s([a-zA-Z]+)\s+\[(\d+)\]").unwrap());

static RE_TRAILING_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());

// A closing brace line followed by an indented word-initial line gets
// exactly one blank line between them.
static RE_BRACE_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\}\n+([ \t]+\w)").unwrap());

pub fn regenerate(registry: &DocumentationRegistry, path: &Path) -> Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let stmts = php::parse(&source)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let tag_lines: Vec<String> = registry
        .methods
        .iter()
        .map(|func| func.as_method_tag().render())
        .collect();
    let docblock = docblock::serialize("", &tag_lines);

    let mut edits = Vec::new();
    let mut found_class = false;
    for stmt in &stmts {
        match &stmt.kind {
            StmtKind::Class { .. } => {
                found_class = true;
                match doc_comment_span(stmt, &source) {
                    Some(span) => edits.push(Edit {
                        span,
                        text: docblock.clone(),
                    }),
                    None => edits.push(Edit {
                        span: Span {
                            start: stmt.span.start,
                            end: stmt.span.start,
                        },
                        text: format!("{docblock}\n"),
                    }),
                }
            }
            StmtKind::If => {
                if let Some(first) = stmt.comments.first() {
                    edits.push(Edit {
                        span: *first,
                        text: rewrite_counters(first.text(&source), registry),
                    });
                }
            }
            _ => {}
        }
    }
    if !found_class {
        bail!("no class declaration found in {}", path.display());
    }

    let output = postprocess(&regen::splice(&source, edits));
    fs::write(path, output).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// The class's existing doc-comment: its last leading comment, when that
/// comment is a `/** … */` block. Other leading comments stay untouched.
fn doc_comment_span(stmt: &Statement, src: &str) -> Option<Span> {
    stmt.comments
        .last()
        .filter(|s| s.text(src).starts_with("/**"))
        .copied()
}

/// Replace the bracketed number of every `** Name [n]` token with the live
/// count for that namespace; unknown names are left byte-identical.
fn rewrite_counters(comment: &str, registry: &DocumentationRegistry) -> String {
    RE_COUNTER
        .replace_all(comment, |caps: &regex::Captures| {
            let namespace = caps[1].to_lowercase();
            match registry.namespace_count.get(&namespace) {
                Some(count) => caps[0].replacen(&caps[2], &count.to_string(), 1),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Strip trailing blanks from every line and normalize the gap after a
/// closing brace to a single blank line; the file ends with one newline.
fn postprocess(text: &str) -> String {
    let text = RE_TRAILING_WS.replace_all(text, "");
    let text = RE_BRACE_GAP.replace_all(&text, "}\n\n$1");
    format!("{}\n", text.trim_end())
}
