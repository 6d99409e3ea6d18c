//! Structural PHP parser — a span-preserving statement scanner.
//!
//! Classifies only the top-level shapes the tool cares about (namespace
//! blocks, functions, `return <closure>;` files, class declarations, `if`
//! statements) and records byte spans for every statement and its leading
//! comments. Rewriting happens by splicing replacement text into the
//! original source at those spans, so untouched regions survive
//! byte-for-byte.

use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

#[derive(Debug)]
pub enum StmtKind {
    Namespace { name: String, body: Vec<Statement> },
    Function { name: String, params: String },
    Return { closure_params: Option<String> },
    Class { name: String },
    If,
    Other,
}

#[derive(Debug)]
pub struct Statement {
    pub kind: StmtKind,
    /// Leading comments, in source order.
    pub comments: Vec<Span>,
    /// The statement itself, excluding leading comments.
    pub span: Span,
}

impl Statement {
    /// The doc-comment attached to this statement: its last leading comment.
    pub fn doc_comment<'a>(&self, src: &'a str) -> Option<&'a str> {
        self.comments.last().map(|s| s.text(src))
    }
}

/// Parse a PHP source file into its top-level statements.
pub fn parse(src: &str) -> Result<Vec<Statement>> {
    let mut scanner = Scanner {
        src: src.as_bytes(),
        pos: 0,
    };
    scanner.skip_prelude();
    scanner.statements(false)
}

struct Scanner<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn cur(&self) -> u8 {
        self.src[self.pos]
    }

    fn skip_prelude(&mut self) {
        if self.src.starts_with(b"#!") {
            while !self.eof() && self.cur() != b'\n' {
                self.pos += 1;
            }
        }
        self.skip_ws();
        if self.src[self.pos..].starts_with(b"<?php") {
            self.pos += 5;
        }
    }

    fn skip_ws(&mut self) {
        while !self.eof() && self.cur().is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn at_comment(&self) -> bool {
        let rest = &self.src[self.pos..];
        rest.starts_with(b"//") || rest.starts_with(b"#") || rest.starts_with(b"/*")
    }

    fn skip_comment(&mut self) -> Span {
        let start = self.pos;
        if self.src[self.pos..].starts_with(b"/*") {
            self.pos += 2;
            while !self.eof() {
                if self.src[self.pos..].starts_with(b"*/") {
                    self.pos += 2;
                    break;
                }
                self.pos += 1;
            }
        } else {
            while !self.eof() && self.cur() != b'\n' {
                self.pos += 1;
            }
        }
        Span {
            start,
            end: self.pos,
        }
    }

    fn collect_comments(&mut self) -> Vec<Span> {
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            if !self.eof() && self.at_comment() {
                out.push(self.skip_comment());
            } else {
                break;
            }
        }
        out
    }

    fn peek_word(&self) -> Option<&'a str> {
        if self.eof() {
            return None;
        }
        let b = self.cur();
        if !(b.is_ascii_alphabetic() || b == b'_') {
            return None;
        }
        let mut end = self.pos;
        while end < self.src.len()
            && (self.src[end].is_ascii_alphanumeric() || self.src[end] == b'_')
        {
            end += 1;
        }
        std::str::from_utf8(&self.src[self.pos..end]).ok()
    }

    fn consume_word(&mut self) -> Option<&'a str> {
        let word = self.peek_word()?;
        self.pos += word.len();
        Some(word)
    }

    fn statements(&mut self, stop_at_brace: bool) -> Result<Vec<Statement>> {
        let mut out = Vec::new();
        loop {
            let comments = self.collect_comments();
            if self.eof() {
                break;
            }
            if stop_at_brace && self.cur() == b'}' {
                break;
            }
            let before = self.pos;
            let stmt = self.statement(comments)?;
            if self.pos == before {
                bail!("unexpected token at byte {}", self.pos);
            }
            out.push(stmt);
        }
        Ok(out)
    }

    fn statement(&mut self, comments: Vec<Span>) -> Result<Statement> {
        let start = self.pos;
        let kind = match self.peek_word() {
            Some("namespace") => self.namespace_stmt()?,
            Some("return") => self.return_stmt()?,
            Some("abstract") | Some("final") | Some("class") => self.class_stmt()?,
            Some("if") => {
                self.if_stmt()?;
                StmtKind::If
            }
            Some("function") => self.function_stmt()?,
            _ => {
                self.generic_stmt()?;
                StmtKind::Other
            }
        };
        Ok(Statement {
            kind,
            comments,
            span: Span {
                start,
                end: self.pos,
            },
        })
    }

    // -- Statement kinds ------------------------------------------------------

    fn namespace_stmt(&mut self) -> Result<StmtKind> {
        self.consume_word();
        self.skip_ws();
        let name_start = self.pos;
        while !self.eof()
            && (self.cur().is_ascii_alphanumeric() || self.cur() == b'_' || self.cur() == b'\\')
        {
            self.pos += 1;
        }
        let name = String::from_utf8_lossy(&self.src[name_start..self.pos]).into_owned();
        self.skip_ws();
        if self.eof() {
            bail!("malformed namespace declaration");
        }
        let body = match self.cur() {
            b';' => {
                // Header form: the rest of the file is the namespace body.
                self.pos += 1;
                self.statements(false)?
            }
            b'{' => {
                self.pos += 1;
                let body = self.statements(true)?;
                if self.eof() {
                    bail!("unbalanced braces in namespace block");
                }
                self.pos += 1;
                body
            }
            _ => bail!("malformed namespace declaration"),
        };
        Ok(StmtKind::Namespace { name, body })
    }

    fn function_stmt(&mut self) -> Result<StmtKind> {
        self.consume_word();
        self.skip_ws();
        if !self.eof() && self.cur() == b'&' {
            self.pos += 1;
            self.skip_ws();
        }
        let Some(name) = self.consume_word() else {
            bail!("expected function name");
        };
        let name = name.to_string();
        self.skip_ws();
        if self.eof() || self.cur() != b'(' {
            bail!("expected parameter list for function {name}");
        }
        let params = self.paren_content()?;
        // Return type hints etc. between the parameter list and the body.
        while !self.eof() && self.cur() != b'{' {
            if self.at_comment() {
                self.skip_comment();
            } else {
                self.pos += 1;
            }
        }
        if self.eof() {
            bail!("missing body for function {name}");
        }
        self.skip_block()?;
        Ok(StmtKind::Function { name, params })
    }

    fn return_stmt(&mut self) -> Result<StmtKind> {
        self.consume_word();
        let mut closure_params = None;
        let mut depth = 0i32;
        while !self.eof() {
            if self.at_comment() {
                self.skip_comment();
                continue;
            }
            let b = self.cur();
            if b == b'\'' || b == b'"' {
                self.skip_string();
                continue;
            }
            if b == b'$' {
                // Consume variables whole so `$function` is not mistaken
                // for the closure keyword.
                self.pos += 1;
                self.consume_word();
                continue;
            }
            if b.is_ascii_alphabetic() || b == b'_' {
                let word = self.consume_word().unwrap_or_default();
                if word == "function" && closure_params.is_none() {
                    self.skip_ws();
                    if !self.eof() && self.cur() == b'&' {
                        self.pos += 1;
                        self.skip_ws();
                    }
                    if !self.eof() && self.cur() == b'(' {
                        closure_params = Some(self.paren_content()?);
                    }
                }
                continue;
            }
            match b {
                b'(' | b'[' | b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b')' | b']' | b'}' => {
                    depth -= 1;
                    self.pos += 1;
                }
                b';' if depth == 0 => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        Ok(StmtKind::Return { closure_params })
    }

    fn class_stmt(&mut self) -> Result<StmtKind> {
        while matches!(self.peek_word(), Some("abstract") | Some("final")) {
            self.consume_word();
            self.skip_ws();
        }
        if self.peek_word() != Some("class") {
            self.generic_stmt()?;
            return Ok(StmtKind::Other);
        }
        self.consume_word();
        self.skip_ws();
        let Some(name) = self.consume_word() else {
            bail!("expected class name");
        };
        let name = name.to_string();
        // `extends` / `implements` clauses before the body.
        while !self.eof() && self.cur() != b'{' {
            if self.at_comment() {
                self.skip_comment();
            } else {
                self.pos += 1;
            }
        }
        if self.eof() {
            bail!("missing body for class {name}");
        }
        self.skip_block()?;
        Ok(StmtKind::Class { name })
    }

    fn if_stmt(&mut self) -> Result<()> {
        self.consume_word();
        self.skip_ws();
        if self.eof() || self.cur() != b'(' {
            bail!("malformed if statement");
        }
        self.paren_content()?;
        self.branch_body()?;
        loop {
            let save = self.pos;
            self.skip_ws();
            match self.peek_word() {
                Some("elseif") => {
                    self.consume_word();
                    self.skip_ws();
                    if self.eof() || self.cur() != b'(' {
                        bail!("malformed elseif branch");
                    }
                    self.paren_content()?;
                    self.branch_body()?;
                }
                Some("else") => {
                    self.consume_word();
                    self.skip_ws();
                    if self.peek_word() == Some("if") {
                        self.consume_word();
                        self.skip_ws();
                        if self.eof() || self.cur() != b'(' {
                            bail!("malformed else if branch");
                        }
                        self.paren_content()?;
                    }
                    self.branch_body()?;
                }
                _ => {
                    self.pos = save;
                    break;
                }
            }
        }
        Ok(())
    }

    fn branch_body(&mut self) -> Result<()> {
        self.skip_ws();
        if self.eof() {
            bail!("missing branch body");
        }
        if self.cur() == b'{' {
            self.skip_block()
        } else {
            self.generic_stmt()
        }
    }

    /// Any statement the scanner does not classify: ends at a top-level
    /// `;`, or after a `{…}` block (with an optional trailing `;`).
    fn generic_stmt(&mut self) -> Result<()> {
        while !self.eof() {
            if self.at_comment() {
                self.skip_comment();
                continue;
            }
            match self.cur() {
                b'\'' | b'"' => self.skip_string(),
                b'(' => self.skip_bracketed(b'(', b')')?,
                b'[' => self.skip_bracketed(b'[', b']')?,
                b'{' => {
                    self.skip_block()?;
                    let save = self.pos;
                    self.skip_ws();
                    if !self.eof() && self.cur() == b';' {
                        self.pos += 1;
                    } else {
                        self.pos = save;
                    }
                    return Ok(());
                }
                b';' => {
                    self.pos += 1;
                    return Ok(());
                }
                // Stray close: the end of an enclosing block.
                b'}' => return Ok(()),
                _ => self.pos += 1,
            }
        }
        Ok(())
    }

    // -- Token helpers --------------------------------------------------------

    /// Consume a balanced `(…)` group and return the inner text.
    fn paren_content(&mut self) -> Result<String> {
        let open = self.pos;
        let mut depth = 0i32;
        while !self.eof() {
            if self.at_comment() {
                self.skip_comment();
                continue;
            }
            match self.cur() {
                b'\'' | b'"' => self.skip_string(),
                b'(' => {
                    depth += 1;
                    self.pos += 1;
                }
                b')' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        let inner = &self.src[open + 1..self.pos - 1];
                        return Ok(String::from_utf8_lossy(inner).into_owned());
                    }
                }
                _ => self.pos += 1,
            }
        }
        bail!("unbalanced parentheses")
    }

    /// Consume a balanced `{…}` block.
    fn skip_block(&mut self) -> Result<()> {
        let mut depth = 0i32;
        while !self.eof() {
            if self.at_comment() {
                self.skip_comment();
                continue;
            }
            match self.cur() {
                b'\'' | b'"' => self.skip_string(),
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => self.pos += 1,
            }
        }
        bail!("unbalanced braces")
    }

    fn skip_bracketed(&mut self, open: u8, close: u8) -> Result<()> {
        let mut depth = 0i32;
        while !self.eof() {
            if self.at_comment() {
                self.skip_comment();
                continue;
            }
            let b = self.cur();
            if b == b'\'' || b == b'"' {
                self.skip_string();
                continue;
            }
            self.pos += 1;
            if b == open {
                depth += 1;
            } else if b == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        bail!("unbalanced brackets")
    }

    fn skip_string(&mut self) {
        let quote = self.cur();
        self.pos += 1;
        while !self.eof() {
            let b = self.cur();
            if b == b'\\' {
                self.pos += 2;
                continue;
            }
            self.pos += 1;
            if b == quote {
                break;
            }
        }
    }
}
