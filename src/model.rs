//! Data model for merged function documentation.
//!
//! `FunctionDocumentation::new` is the normalization step: it pairs the
//! documented parameters against the reflected signature, renders the
//! prose through markdown, and collects changelog/exception/return data
//! into one canonical record per function.

use crate::docblock::{DocBlock, Tag};
use crate::markdown;
use crate::parser::signature::ReflectedParameter;
use indexmap::IndexMap;
use std::collections::HashMap;

/// One documented argument, paired with its reflected parameter when one
/// exists (a documented variadic may stand alone).
#[derive(Debug, Clone)]
pub struct ArgumentDocumentation {
    pub name: String,
    pub is_variadic: bool,
    pub description: String,
    pub type_: String,
    pub default_value: Option<String>,
    pub default_value_as_string: Option<String>,
}

impl ArgumentDocumentation {
    fn new(
        type_: &str,
        name: &str,
        description: &str,
        is_variadic: bool,
        reflected: Option<&ReflectedParameter>,
    ) -> ArgumentDocumentation {
        let mut default_value = None;
        let mut default_value_as_string = None;
        if let Some(param) = reflected {
            if param.is_optional {
                default_value = param.default_value.clone();
                default_value_as_string = param.default_literal();
            }
        }
        ArgumentDocumentation {
            name: name.to_string(),
            is_variadic,
            description: description.to_string(),
            type_: type_.to_string(),
            default_value,
            default_value_as_string,
        }
    }

    /// Signature text: `name = value` with a default, `name,...` for a
    /// variadic without one, bare `name` otherwise.
    pub fn signature(&self) -> String {
        if let Some(value) = self
            .default_value_as_string
            .as_deref()
            .filter(|v| !v.is_empty())
        {
            return format!("{} = {}", self.name, value);
        }
        if self.is_variadic {
            return format!("{},...", self.name);
        }
        self.name.clone()
    }
}

/// The canonical record for one publicly discovered function.
#[derive(Debug)]
pub struct FunctionDocumentation {
    pub name: String,
    pub namespace: Option<String>,
    /// Rendered HTML.
    pub summary: String,
    /// Rendered HTML with `<pre>` regions reflowed.
    pub description: String,
    pub arguments: Vec<ArgumentDocumentation>,
    /// version → raw markdown, insertion order = tag order.
    pub changelog: IndexMap<String, String>,
    /// exception type name → raw markdown.
    pub exceptions: IndexMap<String, String>,
    pub return_type: String,
    pub return_description: String,
}

impl FunctionDocumentation {
    /// Merge one parsed doc-comment with one reflected signature.
    pub fn new(
        function_name: &str,
        namespace: Option<&str>,
        doc: &DocBlock,
        params: &[ReflectedParameter],
        display_prefix: &str,
    ) -> FunctionDocumentation {
        let reflected: HashMap<&str, &ReflectedParameter> =
            params.iter().map(|p| (p.name.as_str(), p)).collect();

        let mut arguments = Vec::new();
        let mut changelog = IndexMap::new();
        let mut exceptions = IndexMap::new();
        let mut return_tag: Option<(&str, &str)> = None;

        for tag in &doc.tags {
            match tag {
                Tag::Param {
                    type_,
                    name,
                    description,
                    is_variadic,
                } => match reflected.get(name.as_str()).copied() {
                    Some(param) => arguments.push(ArgumentDocumentation::new(
                        type_,
                        name,
                        description,
                        *is_variadic,
                        Some(param),
                    )),
                    // A variadic may be documented without a reflected
                    // counterpart; anything else refers to a parameter
                    // that no longer exists and is dropped.
                    None if *is_variadic => arguments.push(ArgumentDocumentation::new(
                        type_,
                        name,
                        description,
                        true,
                        None,
                    )),
                    None => {}
                },
                Tag::Since {
                    version,
                    description,
                } => {
                    changelog.insert(version.clone(), description.clone());
                }
                Tag::Throws {
                    type_,
                    description,
                } => {
                    exceptions.insert(type_.clone(), description.clone());
                }
                Tag::Return {
                    type_,
                    description,
                } => {
                    if return_tag.is_none() {
                        return_tag = Some((type_.as_str(), description.as_str()));
                    }
                }
                Tag::Internal => {}
            }
        }

        let (return_type, return_description) = match return_tag {
            Some((type_, description)) => (type_.to_string(), markdown::to_html(description)),
            None => ("mixed".to_string(), String::new()),
        };

        let name = function_name
            .strip_prefix(display_prefix)
            .filter(|_| !display_prefix.is_empty())
            .unwrap_or(function_name);

        FunctionDocumentation {
            name: name.to_string(),
            namespace: namespace.map(str::to_string),
            summary: markdown::to_html(&doc.summary),
            description: markdown::reflow_pre_blocks(&markdown::to_html(&doc.description)),
            arguments,
            changelog,
            exceptions,
            return_type,
            return_description,
        }
    }

    /// Build the `@method` descriptor for this function: name, argument
    /// signatures, return type, and the flattened one-line description.
    pub fn as_method_tag(&self) -> MethodTag {
        let mut description = self.description.clone();

        if !self.changelog.is_empty() {
            description.push_str("<h2>Changelog</h2><ul>");
            for (version, text) in &self.changelog {
                description.push_str(&format!(
                    "<li>{}</li>",
                    markdown::to_html(&format!("`{version}` - {text}"))
                ));
            }
            description.push_str("</ul>");
        }

        if !self.exceptions.is_empty() {
            description.push_str("<h2>Exceptions</h2><ul>");
            for (name, text) in &self.exceptions {
                description.push_str(&format!(
                    "<li>{}</li>",
                    markdown::to_html(&format!("`{name}` - {text}"))
                ));
            }
            description.push_str("</ul>");
        }

        if !self.return_description.is_empty() {
            description.push_str("<h2>Returns</h2>");
            description.push_str(&self.return_description);
        }

        let mut body = format!("{}<br>{}", self.summary, description)
            .replace('\n', " ")
            .trim()
            .to_string();
        if let Some(stripped) = body.strip_suffix("<br>") {
            body = stripped.to_string();
        }

        MethodTag {
            name: self.name.clone(),
            arguments: self
                .arguments
                .iter()
                .map(|arg| MethodArg {
                    type_: arg.type_.clone(),
                    name: arg.signature(),
                })
                .collect(),
            return_type: self.return_type.clone(),
            description: body,
        }
    }
}

/// One argument of a `@method` tag: a type and the rendered signature text.
#[derive(Debug, Clone)]
pub struct MethodArg {
    pub type_: String,
    pub name: String,
}

/// A `@method static <ret> <name>(<args>) <description>` descriptor.
#[derive(Debug, Clone)]
pub struct MethodTag {
    pub name: String,
    pub arguments: Vec<MethodArg>,
    pub return_type: String,
    pub description: String,
}

impl MethodTag {
    pub fn render(&self) -> String {
        let args = self
            .arguments
            .iter()
            .map(|arg| {
                if arg.type_.is_empty() {
                    format!("${}", arg.name)
                } else {
                    format!("{} ${}", arg.type_, arg.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let mut line = format!("@method static {} {}({})", self.return_type, self.name, args);
        if !self.description.is_empty() {
            line.push(' ');
            line.push_str(&self.description);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::signature::reflect_params;

    fn doc(raw: &str) -> DocBlock {
        DocBlock::parse(raw).unwrap()
    }

    #[test]
    fn pairs_documented_and_reflected_params() {
        let block = doc(
            "/**\n * Chunks.\n *\n * @param array $array the input\n * @param int $size the size\n *\n * @return array\n */",
        );
        let params = reflect_params("array $array, $size = 1").unwrap();
        let func = FunctionDocumentation::new("chunk", Some("arrays"), &block, &params, "fn_");
        assert_eq!(func.arguments.len(), 2);
        assert_eq!(func.arguments[0].signature(), "array");
        assert_eq!(func.arguments[1].signature(), "size = 1");
    }

    #[test]
    fn unmatched_param_is_dropped_silently() {
        let block = doc(
            "/**\n * S.\n *\n * @param array $array input\n * @param bool $gone removed\n */",
        );
        let params = reflect_params("array $array").unwrap();
        let func = FunctionDocumentation::new("f", None, &block, &params, "");
        assert_eq!(func.arguments.len(), 1);
        assert_eq!(func.arguments[0].name, "array");
    }

    #[test]
    fn unmatched_variadic_is_kept_standalone() {
        let block = doc("/**\n * S.\n *\n * @param mixed ...$args extras\n */");
        let func = FunctionDocumentation::new("f", None, &block, &[], "");
        assert_eq!(func.arguments.len(), 1);
        assert_eq!(func.arguments[0].signature(), "args,...");
        assert_eq!(func.arguments[0].default_value_as_string, None);
    }

    #[test]
    fn reflected_variadic_renders_ellipsis() {
        let block = doc("/**\n * S.\n *\n * @param int ...$n numbers\n */");
        let params = reflect_params("...$n").unwrap();
        let func = FunctionDocumentation::new("f", None, &block, &params, "");
        assert_eq!(func.arguments[0].signature(), "n,...");
    }

    #[test]
    fn first_return_tag_wins() {
        let block = doc("/**\n * S.\n *\n * @return int the count\n * @return string ignored\n */");
        let func = FunctionDocumentation::new("f", None, &block, &[], "");
        assert_eq!(func.return_type, "int");
        assert_eq!(func.return_description, "<p>the count</p>");
    }

    #[test]
    fn missing_return_tag_defaults_to_mixed() {
        let block = doc("/**\n * S.\n */");
        let func = FunctionDocumentation::new("f", None, &block, &[], "");
        assert_eq!(func.return_type, "mixed");
        assert_eq!(func.return_description, "");
    }

    #[test]
    fn display_prefix_is_stripped() {
        let block = doc("/**\n * S.\n */");
        let func = FunctionDocumentation::new("fn_max", Some("math"), &block, &[], "fn_");
        assert_eq!(func.name, "max");
    }

    #[test]
    fn prefix_only_strips_when_present() {
        let block = doc("/**\n * S.\n */");
        let func = FunctionDocumentation::new("sum", Some("math"), &block, &[], "fn_");
        assert_eq!(func.name, "sum");
    }

    #[test]
    fn duplicate_since_version_overwrites_in_place() {
        let block = doc(
            "/**\n * S.\n *\n * @since 0.1.0 first\n * @since 0.2.0 second\n * @since 0.1.0 revised\n */",
        );
        let func = FunctionDocumentation::new("f", None, &block, &[], "");
        let entries: Vec<_> = func.changelog.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "0.1.0");
        assert_eq!(entries[0].1, "revised");
        assert_eq!(entries[1].0, "0.2.0");
    }

    #[test]
    fn method_tag_flattens_description_onto_one_line() {
        let block = doc(
            "/**\n * Sums values.\n *\n * First paragraph.\n *\n * Second paragraph.\n *\n * @return int\n */",
        );
        let func = FunctionDocumentation::new("sum", None, &block, &[], "");
        let tag = func.as_method_tag();
        assert!(!tag.description.contains('\n'));
        assert!(tag.description.starts_with("<p>Sums values.</p><br>"));
    }

    #[test]
    fn method_tag_appends_changelog_and_exceptions_sections() {
        let block = doc(
            "/**\n * S.\n *\n * @since 0.2.0 added\n * @throws \\RuntimeException on failure\n * @return int the count\n */",
        );
        let func = FunctionDocumentation::new("f", None, &block, &[], "");
        let tag = func.as_method_tag();
        assert!(tag.description.contains("<h2>Changelog</h2><ul><li><p><code>0.2.0</code> - added</p></li></ul>"));
        assert!(tag
            .description
            .contains("<h2>Exceptions</h2><ul><li><p><code>\\RuntimeException</code> - on failure</p></li></ul>"));
        assert!(tag.description.ends_with("<h2>Returns</h2><p>the count</p>"));
    }

    #[test]
    fn method_tag_trims_single_trailing_break() {
        let block = doc("/**\n * Only a summary.\n */");
        let func = FunctionDocumentation::new("f", None, &block, &[], "");
        let tag = func.as_method_tag();
        assert_eq!(tag.description, "<p>Only a summary.</p>");
    }

    #[test]
    fn method_tag_renders_typed_arguments() {
        let block = doc(
            "/**\n * S.\n *\n * @param array $array input\n * @param int $size size\n *\n * @return array\n */",
        );
        let params = reflect_params("array $array, $size = 1").unwrap();
        let func = FunctionDocumentation::new("chunk", None, &block, &params, "");
        let line = func.as_method_tag().render();
        assert!(
            line.starts_with("@method static array chunk(array $array, int $size = 1) "),
            "got: {line}"
        );
    }

    #[test]
    fn method_tag_without_description_has_no_trailing_space() {
        let tag = MethodTag {
            name: "noop".into(),
            arguments: Vec::new(),
            return_type: "void".into(),
            description: String::new(),
        };
        assert_eq!(tag.render(), "@method static void noop()");
    }
}
