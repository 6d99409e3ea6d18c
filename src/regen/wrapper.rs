//! Wrapper regenerator.
//!
//! Rebuilds the doc-comment of the fluent wrapper class so IDEs see one
//! chainable `@method` per non-void library function. The wrapper supplies
//! the wrapped value itself, so each method loses its first argument and
//! returns the wrapper's own type.

use crate::docblock;
use crate::parser::php;
use crate::regen;
use crate::registry::DocumentationRegistry;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const GENERATED_NOTE: &str = "// Do NOT modify this doc block, it is automatically generated.";

const WRAPPER_SUMMARY: &str = "An abstract base class for documenting the fluent sequence wrapper";

pub fn regenerate(registry: &DocumentationRegistry, path: &Path) -> Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let stmts = php::parse(&source)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let (class_stmt, class_name) = regen::find_class(&stmts, &path.display().to_string())?;

    let wrapper_type = format!("\\{class_name}");
    let tag_lines: Vec<String> = registry
        .methods
        .iter()
        .filter(|func| !func.return_type.eq_ignore_ascii_case("void"))
        .map(|func| {
            let mut method = func.as_method_tag();
            // The first argument is the wrapped value, supplied implicitly
            // by the wrapper instance.
            if !method.arguments.is_empty() {
                method.arguments.remove(0);
            }
            method.return_type = wrapper_type.clone();
            method.render()
        })
        .collect();

    // All existing leading comments of the class are dropped; the file is
    // rebuilt from the class keyword onward.
    let docblock = docblock::serialize(WRAPPER_SUMMARY, &tag_lines);
    let tail = &source[class_stmt.span.start..];
    let output = format!("<?php\n\n{GENERATED_NOTE}\n{docblock}\n{}\n", tail.trim_end());

    fs::write(path, output).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
