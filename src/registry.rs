//! Documentation registry — discovery over the library tree.
//!
//! Walks one file at a time: classifies it by naming convention, counts it
//! toward its namespace, extracts candidate functions from its structural
//! form, and runs the merge step on each candidate. A failing candidate is
//! reported on standard output and skipped; the walk never aborts for one
//! bad function.

use crate::docblock::DocBlock;
use crate::model::FunctionDocumentation;
use crate::parser::php::{self, StmtKind};
use crate::parser::signature;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub struct DocumentationRegistry {
    /// namespace (lowercased directory name) → function-file count.
    pub namespace_count: HashMap<String, usize>,
    /// All retained functions, in discovery order.
    pub methods: Vec<FunctionDocumentation>,
    display_prefix: String,
}

impl DocumentationRegistry {
    pub fn new(display_prefix: impl Into<String>) -> DocumentationRegistry {
        DocumentationRegistry {
            namespace_count: HashMap::new(),
            methods: Vec::new(),
            display_prefix: display_prefix.into(),
        }
    }

    /// Register one library file. Returns whether the file counted as a
    /// function file.
    pub fn register_file(&mut self, path: &Path) -> Result<bool> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("invalid file name: {}", path.display()))?;
        let namespace = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .to_string();

        // An upper-case first letter means a class file: not counted and
        // not scanned for functions.
        if file_name.chars().next().is_some_and(|c| c.is_uppercase()) {
            return Ok(false);
        }

        *self
            .namespace_count
            .entry(namespace.to_lowercase())
            .or_insert(0) += 1;

        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let stmts = php::parse(&source)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let Some(root) = stmts.first() else {
            return Ok(true);
        };
        match &root.kind {
            StmtKind::Namespace { name, body } => {
                for stmt in body {
                    if let StmtKind::Function {
                        name: fn_name,
                        params,
                    } = &stmt.kind
                    {
                        self.register_function(
                            fn_name,
                            stmt.doc_comment(&source),
                            Some(name.as_str()),
                            Some(params.as_str()),
                        );
                    }
                }
            }
            StmtKind::Return { closure_params } => {
                let fn_name = path
                    .file_stem()
                    .and_then(|n| n.to_str())
                    .unwrap_or(file_name)
                    .to_string();
                self.register_function(
                    &fn_name,
                    root.doc_comment(&source),
                    None,
                    closure_params.as_deref(),
                );
            }
            // Neither a namespace block nor a return statement: no
            // candidates, no error.
            _ => {}
        }
        Ok(true)
    }

    fn register_function(
        &mut self,
        name: &str,
        doc: Option<&str>,
        namespace: Option<&str>,
        params: Option<&str>,
    ) {
        // A leading underscore marks a private helper, not part of the API.
        if name.starts_with('_') {
            return;
        }

        match self.build_function(name, doc, namespace, params) {
            Ok(Some(func)) => self.methods.push(func),
            Ok(None) => {}
            Err(err) => {
                println!("Exception message: {err}");
                println!("  {name}\n");
            }
        }
    }

    fn build_function(
        &self,
        name: &str,
        doc: Option<&str>,
        namespace: Option<&str>,
        params: Option<&str>,
    ) -> Result<Option<FunctionDocumentation>> {
        let raw = doc.context("missing doc-comment")?;
        let block = DocBlock::parse(raw)?;
        if block.is_internal() {
            return Ok(None);
        }
        let params = signature::reflect_params(params.context("function is not reflectable")?)?;
        Ok(Some(FunctionDocumentation::new(
            name,
            namespace,
            &block,
            &params,
            &self.display_prefix,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, rel: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    const CHUNK: &str = "<?php\n\nnamespace arrays;\n\n/**\n * Creates chunks.\n *\n * @param array $array input\n * @param int $size size\n *\n * @return array\n */\nfunction chunk(array $array, $size = 1)\n{\n    return array_chunk($array, $size);\n}\n";

    #[test]
    fn registers_namespace_function() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "arrays/chunk.php", CHUNK);

        let mut registry = DocumentationRegistry::new("fn_");
        assert!(registry.register_file(&path).unwrap());
        assert_eq!(registry.namespace_count.get("arrays"), Some(&1));
        assert_eq!(registry.methods.len(), 1);
        assert_eq!(registry.methods[0].name, "chunk");
        assert_eq!(registry.methods[0].namespace.as_deref(), Some("arrays"));
    }

    #[test]
    fn uppercase_file_is_skipped_and_uncounted() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "arrays/Helper.php", "<?php\nclass Helper\n{\n}\n");

        let mut registry = DocumentationRegistry::new("");
        assert!(!registry.register_file(&path).unwrap());
        assert!(registry.namespace_count.is_empty());
        assert!(registry.methods.is_empty());
    }

    #[test]
    fn internal_function_is_counted_but_not_registered() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "math/probe.php",
            "<?php\n\nnamespace math;\n\n/**\n * Dumps state.\n *\n * @internal\n */\nfunction probe()\n{\n    return 1;\n}\n",
        );

        let mut registry = DocumentationRegistry::new("");
        assert!(registry.register_file(&path).unwrap());
        assert_eq!(registry.namespace_count.get("math"), Some(&1));
        assert!(registry.methods.is_empty());
    }

    #[test]
    fn helper_functions_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "math/sum.php",
            "<?php\nnamespace math;\n/** helper */\nfunction _carry($a)\n{\n    return $a;\n}\n/**\n * Sums values.\n *\n * @param array $values input\n *\n * @return int\n */\nfunction sum(array $values)\n{\n    return array_sum($values);\n}\n",
        );

        let mut registry = DocumentationRegistry::new("");
        registry.register_file(&path).unwrap();
        assert_eq!(registry.methods.len(), 1);
        assert_eq!(registry.methods[0].name, "sum");
    }

    #[test]
    fn return_closure_file_uses_file_stem() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "sequences/chain.php",
            "<?php\n\n/**\n * Wraps a value.\n *\n * @param mixed $value the value\n *\n * @return \\Wrapper\n */\nreturn function ($value = null) {\n    return new \\Wrapper($value);\n};\n",
        );

        let mut registry = DocumentationRegistry::new("");
        registry.register_file(&path).unwrap();
        assert_eq!(registry.methods.len(), 1);
        assert_eq!(registry.methods[0].name, "chain");
        assert_eq!(registry.methods[0].namespace, None);
        assert_eq!(registry.methods[0].arguments[0].signature(), "value = null");
    }

    #[test]
    fn malformed_doc_comment_skips_function_but_counts_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "math/broken.php",
            "<?php\nnamespace math;\n/**\n * Broken.\n *\n * @param not-a-variable\n */\nfunction broken()\n{\n    return 1;\n}\n",
        );

        let mut registry = DocumentationRegistry::new("");
        registry.register_file(&path).unwrap();
        assert_eq!(registry.namespace_count.get("math"), Some(&1));
        assert!(registry.methods.is_empty());
    }

    #[test]
    fn structurally_foreign_file_is_silently_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "misc/bootstrap.php", "<?php\n$x = 1;\necho $x;\n");

        let mut registry = DocumentationRegistry::new("");
        assert!(registry.register_file(&path).unwrap());
        assert_eq!(registry.namespace_count.get("misc"), Some(&1));
        assert!(registry.methods.is_empty());
    }

    #[test]
    fn display_prefix_applies_to_registered_names() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "math/fn_max.php",
            "<?php\nnamespace math;\n/**\n * Largest value.\n *\n * @param array $collection input\n *\n * @return int|null\n */\nfunction fn_max(array $collection)\n{\n    return max($collection);\n}\n",
        );

        let mut registry = DocumentationRegistry::new("fn_");
        registry.register_file(&path).unwrap();
        assert_eq!(registry.methods[0].name, "max");
    }
}
