//! File regeneration — span-splice editing shared by both regenerators.

pub mod loader;
pub mod wrapper;

use crate::parser::php::{Span, Statement, StmtKind};
use anyhow::{bail, Result};

/// One span replacement in a source file.
pub struct Edit {
    pub span: Span,
    pub text: String,
}

/// Apply non-overlapping edits to the source; everything outside the
/// edited spans survives byte-for-byte.
pub fn splice(src: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| e.span.start);
    let mut out = String::with_capacity(src.len());
    let mut pos = 0;
    for edit in edits {
        out.push_str(&src[pos..edit.span.start]);
        out.push_str(&edit.text);
        pos = edit.span.end;
    }
    out.push_str(&src[pos..]);
    out
}

/// Find the sole class declaration among top-level statements.
pub fn find_class<'a>(stmts: &'a [Statement], label: &str) -> Result<(&'a Statement, &'a str)> {
    for stmt in stmts {
        if let StmtKind::Class { name } = &stmt.kind {
            return Ok((stmt, name));
        }
    }
    bail!("no class declaration found in {label}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_replaces_spans_in_order() {
        let src = "aaa bbb ccc";
        let edits = vec![
            Edit {
                span: Span { start: 8, end: 11 },
                text: "C".to_string(),
            },
            Edit {
                span: Span { start: 0, end: 3 },
                text: "A".to_string(),
            },
        ];
        assert_eq!(splice(src, edits), "A bbb C");
    }

    #[test]
    fn splice_supports_pure_insertion() {
        let src = "class X";
        let edits = vec![Edit {
            span: Span { start: 0, end: 0 },
            text: "/** doc */\n".to_string(),
        }];
        assert_eq!(splice(src, edits), "/** doc */\nclass X");
    }

    #[test]
    fn splice_without_edits_is_identity() {
        assert_eq!(splice("unchanged", Vec::new()), "unchanged");
    }
}
