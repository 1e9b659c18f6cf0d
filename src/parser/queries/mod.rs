//! AST-walking recognizers for component source files.
//!
//! Each submodule walks the syntax tree directly for one concern:
//! component definitions and props, hook calls, markup usage, imports.
//! The results are plain names; the graph builder turns them into ids.

pub mod components;
pub mod hooks;
pub mod imports;
pub mod markup;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

use super::syntax::{SyntaxKind, SyntaxNode};
use super::ParsedSource;
use crate::config::ExtractorConfig;

/// Everything pass 1 learns about one file.
#[derive(Debug, Clone, Default)]
pub struct FileSkeleton {
    pub path: PathBuf,
    /// Recognized components, in declaration order.
    pub components: Vec<ComponentSkeleton>,
    pub imports: Vec<ImportBinding>,
    /// Local name of the component exported as `default`, if any.
    pub default_export: Option<String>,
    /// Names declared more than once; later declarations were merged away.
    pub merged_duplicates: Vec<String>,
}

impl FileSkeleton {
    pub fn component(&self, name: &str) -> Option<&ComponentSkeleton> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn import(&self, local: &str) -> Option<&ImportBinding> {
        self.imports.iter().find(|i| i.local == local)
    }
}

/// Why a function was taken to be a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// The body renders markup.
    Markup,
    /// Capitalized name only.
    Naming,
}

/// A component as declared in its own file, before ids are assigned.
#[derive(Debug, Clone)]
pub struct ComponentSkeleton {
    pub name: String,
    pub classification: Classification,
    pub line_start: usize,
    pub line_end: usize,
    pub props: Vec<PropDecl>,
    pub states: Vec<StateDecl>,
    pub effects: Vec<EffectDecl>,
    /// Component elements rendered in this component's template.
    pub instantiations: Vec<Instantiation>,
    /// Capitalized identifiers used as values (outside tag position).
    pub value_references: Vec<String>,
    /// Names bound inside the component: parameters, declarations and the
    /// parameters of nested functions. A tag or value with one of these
    /// names denotes a local, never a project component.
    pub local_names: Vec<String>,
}

/// One destructured prop field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropDecl {
    /// The field name callers pass (`onChange` in `{ onChange: handle }`).
    pub name: String,
    /// The local binding inside the component (`handle`); `None` when the
    /// field is destructured further.
    pub binding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDecl {
    /// Value binding name.
    pub name: String,
    /// Setter binding name.
    pub setter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectDecl {
    pub line: usize,
    /// Identifier names in the dependency list, in order.
    pub dependencies: Vec<String>,
    /// Identifier names called inside the effect callback.
    pub invoked: Vec<String>,
}

/// Where a component element appears relative to the enclosing template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Part of the rendered tree.
    Rendered,
    /// Inside another element's attribute value.
    Attribute,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instantiation {
    pub tag: String,
    pub placement: Placement,
    pub line: usize,
    pub attributes: Vec<AttributeBinding>,
}

/// One attribute passed at an instantiation site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
    pub name: String,
    /// Identifiers read by the value expression.
    pub reads: Vec<String>,
    /// Identifiers called by a function-valued attribute.
    pub invokes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Name bound in the importing file.
    pub local: String,
    pub imported: ImportedName,
    /// Module specifier as written.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    Default,
    Named(String),
    Namespace,
}

/// Run every recognizer over one parsed file.
pub fn recognize(parsed: &ParsedSource<'_>, config: &ExtractorConfig) -> FileSkeleton {
    let root = parsed.root();
    let mut skeleton = FileSkeleton {
        path: parsed.path.to_path_buf(),
        imports: imports::extract_imports(&root),
        ..Default::default()
    };

    let definitions = components::find_definitions(&root, parsed.path, config);
    skeleton.default_export = definitions
        .iter()
        .find(|d| d.default_export)
        .map(|d| d.name.clone())
        .or_else(|| components::default_export_name(&root));

    for definition in definitions {
        let Some(classification) = components::classify(&definition, config) else {
            continue;
        };
        if skeleton.component(&definition.name).is_some() {
            debug!(
                file = %parsed.path.display(),
                name = %definition.name,
                "duplicate component declaration merged"
            );
            skeleton.merged_duplicates.push(definition.name);
            continue;
        }

        let function = definition.function;
        skeleton.components.push(ComponentSkeleton {
            classification,
            line_start: definition.line_start,
            line_end: function.end_line(),
            props: components::extract_props(&function),
            states: hooks::extract_states(&function, &config.hooks),
            effects: hooks::extract_effects(&function, &config.hooks),
            instantiations: markup::extract_instantiations(&function),
            value_references: markup::extract_value_references(&function),
            local_names: components::extract_local_names(&function),
            name: definition.name,
        });
    }

    skeleton
}

/// Components are capitalized, intrinsic elements are not.
pub fn is_component_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// A definition nested in a component body (`function Inner() {}`,
/// `const Inner = () => ...`, a class). Hooks inside it belong to it.
pub(crate) fn is_nested_definition(node: &SyntaxNode<'_>) -> bool {
    match node.raw_kind() {
        "function_declaration" | "generator_function_declaration" | "class_declaration" => true,
        "variable_declarator" => node
            .field("value")
            .is_some_and(|value| value.kind() == SyntaxKind::FunctionDef),
        _ => false,
    }
}

/// Push `item` unless it is already present.
pub(crate) fn push_unique(items: &mut Vec<String>, item: &str) {
    if !items.iter().any(|i| i == item) {
        items.push(item.to_string());
    }
}
