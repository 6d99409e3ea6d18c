//! stubdoc — regenerate IDE stub doc-comments for a fluent PHP function
//! library.
//!
//! Walks a tree of one-function-per-file sources, merges each function's
//! doc-comment with its statically-analyzed signature, and rewrites two
//! files in place:
//!
//! - the **wrapper** class doc-comment: one chainable `@method` per
//!   non-void function, minus the implicitly supplied first argument
//! - the **loader** class doc-comment: every function as a `@method`,
//!   plus live per-namespace counters in the branch comment

mod docblock;
mod markdown;
mod model;
mod parser;
mod regen;
mod registry;

use anyhow::{Context, Result};
use clap::Parser;
use registry::DocumentationRegistry;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stubdoc",
    about = "Regenerate IDE stub doc-comments for a fluent PHP function library"
)]
struct Cli {
    /// Root of the library tree (one subdirectory per namespace)
    #[arg(default_value = "src")]
    root: PathBuf,

    /// Wrapper class file to regenerate (default: ROOT/sequences/Wrapper.php)
    #[arg(short = 'w', long)]
    wrapper: Option<PathBuf>,

    /// Loader file to regenerate (default: ROOT/load.php)
    #[arg(short = 'l', long)]
    loader: Option<PathBuf>,

    /// File-name prefix stripped from display names
    #[arg(short = 'p', long, default_value = "fn_")]
    prefix: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let wrapper = cli
        .wrapper
        .unwrap_or_else(|| cli.root.join("sequences/Wrapper.php"));
    let loader = cli.loader.unwrap_or_else(|| cli.root.join("load.php"));

    let pattern = format!("{}/*/*.php", cli.root.display());
    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("invalid source pattern: {pattern}"))?
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();

    let mut registry = DocumentationRegistry::new(cli.prefix);
    for file in &files {
        registry.register_file(file)?;
    }

    regen::wrapper::regenerate(&registry, &wrapper)?;
    regen::loader::regenerate(&registry, &loader)?;

    Ok(())
}
