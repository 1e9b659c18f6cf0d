//! Component definition discovery, classification and prop extraction.
//!
//! Only top-level and exported definitions are considered:
//!   function Card({ title }) { ... }
//!   export const Card = ({ title }) => <div>{title}</div>;
//!   const Card = memo(function Card(props) { ... });
//!   export default function () { return <main/>; }

use std::path::Path;

use super::{is_component_name, push_unique, Classification, PropDecl};
use crate::config::ExtractorConfig;
use crate::parser::syntax::{SyntaxKind, SyntaxNode, Walk};

/// A top-level function definition that may turn out to be a component.
#[derive(Debug)]
pub(crate) struct Definition<'t> {
    pub name: String,
    pub function: SyntaxNode<'t>,
    pub line_start: usize,
    pub default_export: bool,
    /// Name taken from the file because the function has none.
    pub anonymous: bool,
}

/// Collect top-level and exported function definitions, in source order.
pub(crate) fn find_definitions<'t>(
    root: &SyntaxNode<'t>,
    path: &Path,
    config: &ExtractorConfig,
) -> Vec<Definition<'t>> {
    let mut definitions = Vec::new();
    for item in root.named_children() {
        collect_definition(&item, path, config, false, &mut definitions);
    }
    definitions
}

fn collect_definition<'t>(
    item: &SyntaxNode<'t>,
    path: &Path,
    config: &ExtractorConfig,
    default_export: bool,
    definitions: &mut Vec<Definition<'t>>,
) {
    match item.raw_kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name) = item.field("name") {
                definitions.push(Definition {
                    name: name.text().to_string(),
                    function: *item,
                    line_start: item.line(),
                    default_export,
                    anonymous: false,
                });
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            for declarator in item.named_children() {
                if !declarator.is("variable_declarator") {
                    continue;
                }
                let (Some(name), Some(value)) = (declarator.field("name"), declarator.field("value"))
                else {
                    continue;
                };
                if name.kind() != SyntaxKind::Identifier {
                    continue;
                }
                if let Some(function) = unwrap_function(&value, config) {
                    definitions.push(Definition {
                        name: name.text().to_string(),
                        function,
                        line_start: item.line(),
                        default_export: false,
                        anonymous: false,
                    });
                }
            }
        }
        "export_statement" => {
            let is_default = item.has_token("default");
            if let Some(declaration) = item.field("declaration") {
                collect_definition(&declaration, path, config, is_default, definitions);
            } else if is_default {
                let Some(function) = item.field("value").and_then(|v| unwrap_function(&v, config))
                else {
                    return;
                };
                let own_name = function.field("name").map(|n| n.text().to_string());
                let anonymous = own_name.is_none();
                if let Some(name) = own_name.or_else(|| name_from_path(path)) {
                    definitions.push(Definition {
                        name,
                        function,
                        line_start: item.line(),
                        default_export: true,
                        anonymous,
                    });
                }
            }
        }
        _ => {}
    }
}

/// Peel wrapper calls (`memo(...)`, `React.forwardRef(...)`) and parentheses
/// off a value until a function definition appears.
fn unwrap_function<'t>(value: &SyntaxNode<'t>, config: &ExtractorConfig) -> Option<SyntaxNode<'t>> {
    match value.kind() {
        SyntaxKind::FunctionDef => Some(*value),
        SyntaxKind::Call => {
            let callee = value.callee_name()?;
            if !config.hooks.is_wrapper(callee) {
                return None;
            }
            let first = value.call_arguments().into_iter().next()?;
            unwrap_function(&first, config)
        }
        _ if value.is("parenthesized_expression") => {
            let inner = value.named_children().into_iter().next()?;
            unwrap_function(&inner, config)
        }
        _ => None,
    }
}

/// `src/Card.jsx` names its anonymous default export `Card`;
/// `src/Card/index.jsx` does too.
fn name_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let stem = if stem == "index" {
        path.parent()?.file_name()?.to_str()?
    } else {
        stem
    };
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Local name bound by `export default Name`, `export default memo(Name)`
/// or `export { Name as default }`.
pub(crate) fn default_export_name(root: &SyntaxNode<'_>) -> Option<String> {
    for item in root.named_children() {
        if !item.is("export_statement") {
            continue;
        }
        if item.has_token("default") {
            let mut value = item.field("value");
            while let Some(call) = value.filter(|v| v.kind() == SyntaxKind::Call) {
                value = call.call_arguments().into_iter().next();
            }
            if let Some(ident) = value.filter(|v| v.kind() == SyntaxKind::Identifier) {
                return Some(ident.text().to_string());
            }
            continue;
        }
        let Some(clause) = item.child_of_kind("export_clause") else {
            continue;
        };
        for specifier in clause.named_children() {
            let alias = specifier.field("alias").map(|a| a.text());
            if alias == Some("default") {
                if let Some(name) = specifier.field("name") {
                    return Some(name.text().to_string());
                }
            }
        }
    }
    None
}

/// Decide whether a definition is a component.
///
/// Rendering markup wins over the naming convention. Anonymous default
/// exports only count when they render markup, since their name is borrowed
/// from the file.
pub(crate) fn classify(definition: &Definition<'_>, config: &ExtractorConfig) -> Option<Classification> {
    let renders_markup = definition
        .function
        .function_body()
        .is_some_and(|body| body.contains_kind(SyntaxKind::MarkupElement));

    if renders_markup {
        Some(Classification::Markup)
    } else if config.classification.naming_heuristic
        && !definition.anonymous
        && is_component_name(&definition.name)
    {
        Some(Classification::Naming)
    } else {
        None
    }
}

/// Props declared by destructuring the first parameter.
///
/// A plain `props` parameter yields nothing; field access on it is not
/// tracked.
pub(crate) fn extract_props(function: &SyntaxNode<'_>) -> Vec<PropDecl> {
    let Some(param) = function.first_parameter() else {
        return Vec::new();
    };
    let Some(pattern) = object_pattern_of(&param) else {
        return Vec::new();
    };

    let mut props = Vec::new();
    for field in pattern.named_children() {
        match field.raw_kind() {
            "shorthand_property_identifier_pattern" => {
                let name = field.text().to_string();
                props.push(PropDecl {
                    binding: Some(name.clone()),
                    name,
                });
            }
            "object_assignment_pattern" => {
                if let Some(left) = field.field("left") {
                    let name = left.text().to_string();
                    props.push(PropDecl {
                        binding: Some(name.clone()),
                        name,
                    });
                }
            }
            "pair_pattern" => {
                let Some(key) = field.field("key") else {
                    continue;
                };
                let name = key.text().trim_matches(|c| c == '"' || c == '\'').to_string();
                let binding = field.field("value").and_then(|value| match value.raw_kind() {
                    "identifier" => Some(value.text().to_string()),
                    "assignment_pattern" => value
                        .field("left")
                        .filter(|left| left.kind() == SyntaxKind::Identifier)
                        .map(|left| left.text().to_string()),
                    _ => None,
                });
                props.push(PropDecl { name, binding });
            }
            // rest_pattern and comments
            _ => {}
        }
    }
    props
}

/// Every name bound anywhere inside a component: its own parameters,
/// declarations in its body, and parameters of nested functions.
pub(crate) fn extract_local_names(function: &SyntaxNode<'_>) -> Vec<String> {
    let mut names = Vec::new();
    for name in function.parameter_names() {
        push_unique(&mut names, name);
    }
    let Some(body) = function.function_body() else {
        return names;
    };

    body.walk(&mut |node| {
        let bound = match node.raw_kind() {
            "variable_declarator" => node.field("name").map(|n| n.bound_names()),
            "function_declaration" | "generator_function_declaration" | "class_declaration" => {
                node.field("name").map(|n| vec![n.text()])
            }
            "catch_clause" => node.field("parameter").map(|n| n.bound_names()),
            _ => None,
        };
        for name in bound.into_iter().flatten() {
            push_unique(&mut names, name);
        }
        for name in node.parameter_names() {
            push_unique(&mut names, name);
        }
        Walk::Continue
    });
    names
}

fn object_pattern_of<'t>(param: &SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
    match param.raw_kind() {
        "object_pattern" => Some(*param),
        // TypeScript wraps patterns with their annotation
        "required_parameter" | "optional_parameter" => {
            param.field("pattern").and_then(|p| object_pattern_of(&p))
        }
        // `({ a } = {}) => ...`
        "assignment_pattern" => param.field("left").and_then(|p| object_pattern_of(&p)),
        _ => None,
    }
}
