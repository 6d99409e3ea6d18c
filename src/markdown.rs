//! Markdown → HTML rendering for doc-comment text.
//!
//! Summaries, descriptions and tag bodies are written in markdown; IDE
//! tooltips expect inline HTML, so everything user-visible passes through
//! here before it lands in a `@method` line.

use pulldown_cmark::{html, Options, Parser};
use regex::Regex;
use std::sync::LazyLock;

static RE_PRE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<pre>.*?</pre>").unwrap());

/// Render a markdown fragment to HTML, without a trailing newline.
pub fn to_html(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(text, options));
    out.trim_end().to_string()
}

/// Insert explicit `<br />` markers before every newline inside each
/// `<pre>…</pre>` region of rendered HTML.
///
/// Downstream the whole description is collapsed onto one line, which
/// would destroy preformatted layout without the markers.
pub fn reflow_pre_blocks(html: &str) -> String {
    RE_PRE_BLOCK
        .replace_all(html, |caps: &regex::Captures| nl2br(&caps[0]))
        .into_owned()
}

/// `nl2br`: keep the newline, add a break marker in front of it.
fn nl2br(text: &str) -> String {
    text.replace('\n', "<br />\n")
}
