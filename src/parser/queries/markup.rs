//! Markup usage inside a component: which components it instantiates, with
//! which attribute values, and which components it only mentions as values.

use super::hooks::invoked_identifiers;
use super::{is_component_name, push_unique, AttributeBinding, Instantiation, Placement};
use crate::parser::syntax::{SyntaxKind, SyntaxNode};

/// Component elements (capitalized tags) in a function body, in source order.
pub(crate) fn extract_instantiations(function: &SyntaxNode<'_>) -> Vec<Instantiation> {
    let mut found = Vec::new();
    if let Some(body) = function.function_body() {
        let mut shadowed = Vec::new();
        collect_instantiations(&body, Placement::Rendered, &mut shadowed, &mut found);
    }
    found
}

/// `shadowed` holds the parameters of the nested functions enclosing
/// `node`; attribute values naming them do not reach the caller's scope.
fn collect_instantiations<'t>(
    node: &SyntaxNode<'t>,
    placement: Placement,
    shadowed: &mut Vec<&'t str>,
    found: &mut Vec<Instantiation>,
) {
    if node.is("jsx_attribute") {
        for child in node.named_children() {
            collect_instantiations(&child, Placement::Attribute, shadowed, found);
        }
        return;
    }

    if node.kind() == SyntaxKind::MarkupElement {
        if let Some(tag) = node.markup_tag_name().filter(|t| is_component_name(t)) {
            found.push(Instantiation {
                tag: tag.to_string(),
                placement,
                line: node.line(),
                attributes: node
                    .markup_attributes()
                    .iter()
                    .filter_map(|a| attribute_binding(a, &shadowed[..]))
                    .collect(),
            });
        }
    }

    let depth = shadowed.len();
    shadowed.extend(node.parameter_names());
    for child in node.named_children() {
        collect_instantiations(&child, placement, shadowed, found);
    }
    shadowed.truncate(depth);
}

/// What an attribute value reads or calls.
///
/// `onClick={() => setOpen(true)}` calls `setOpen`; `value={count + 1}`
/// reads `count`. String and valueless attributes bind nothing, and names
/// bound by an enclosing or inline function's parameters are left out.
fn attribute_binding<'t>(
    attribute: &SyntaxNode<'t>,
    shadowed: &[&'t str],
) -> Option<AttributeBinding> {
    let mut parts = attribute.named_children().into_iter();
    let name = parts.next()?.text().to_string();

    let mut binding = AttributeBinding {
        name,
        reads: Vec::new(),
        invokes: Vec::new(),
    };

    let Some(value) = parts.next() else {
        return Some(binding);
    };
    let expression = if value.is("jsx_expression") {
        value.named_children().into_iter().next()
    } else if value.kind() == SyntaxKind::MarkupElement {
        Some(value)
    } else {
        None
    };

    match expression {
        Some(expr) if expr.kind() == SyntaxKind::FunctionDef => {
            let params = expr.parameter_names();
            binding.invokes = invoked_identifiers(&expr)
                .into_iter()
                .filter(|n| !shadowed.contains(&n.as_str()) && !params.contains(&n.as_str()))
                .collect();
        }
        Some(expr) => {
            let mut scope = shadowed.to_vec();
            collect_reads(&expr, &mut scope, &mut binding.reads);
        }
        None => {}
    }
    Some(binding)
}

/// Every free identifier in an expression, skipping markup tag names.
fn collect_reads<'t>(node: &SyntaxNode<'t>, shadowed: &mut Vec<&'t str>, reads: &mut Vec<String>) {
    if node.kind() == SyntaxKind::Identifier {
        if !shadowed.contains(&node.text()) {
            push_unique(reads, node.text());
        }
        return;
    }
    let depth = shadowed.len();
    shadowed.extend(node.parameter_names());
    for child in children_outside_tag_names(node) {
        collect_reads(&child, shadowed, reads);
    }
    shadowed.truncate(depth);
}

/// Capitalized identifiers used as values rather than rendered as tags:
/// `<Route component={Home}/>`, `const Active = Panel`, `lazy(() => Page)`.
///
/// Binding positions (declared names, parameters, destructuring patterns)
/// and member-expression objects (`React.useState`) are skipped.
pub(crate) fn extract_value_references(function: &SyntaxNode<'_>) -> Vec<String> {
    let mut references = Vec::new();
    if let Some(body) = function.function_body() {
        collect_value_references(&body, &mut references);
    }
    references
}

fn collect_value_references(node: &SyntaxNode<'_>, references: &mut Vec<String>) {
    match node.raw_kind() {
        "identifier" | "shorthand_property_identifier" => {
            if is_component_name(node.text()) {
                push_unique(references, node.text());
            }
            return;
        }
        "variable_declarator" => {
            if let Some(value) = node.field("value") {
                collect_value_references(&value, references);
            }
            return;
        }
        // `new Map()` names a class, not a component
        "new_expression" => {
            if let Some(arguments) = node.field("arguments") {
                collect_value_references(&arguments, references);
            }
            return;
        }
        "member_expression" => {
            if let Some(property) = node.field("property") {
                collect_value_references(&property, references);
            }
            if let Some(object) = node.field("object").filter(|o| o.kind() != SyntaxKind::Identifier) {
                collect_value_references(&object, references);
            }
            return;
        }
        "formal_parameters"
        | "function_declaration"
        | "function_expression"
        | "arrow_function"
        | "class_declaration" => {
            if let Some(body) = node.field("body") {
                collect_value_references(&body, references);
            }
            return;
        }
        _ => {}
    }
    if node.kind() == SyntaxKind::DestructuringPattern {
        return;
    }

    for child in children_outside_tag_names(node) {
        collect_value_references(&child, references);
    }
}

/// Named children, minus the tag name when `node` is a markup tag.
fn children_outside_tag_names<'t>(node: &SyntaxNode<'t>) -> Vec<SyntaxNode<'t>> {
    let children = node.named_children();
    match node.raw_kind() {
        "jsx_opening_element" | "jsx_closing_element" | "jsx_self_closing_element" => {
            let Some(name) = node.field("name") else {
                return children;
            };
            children.into_iter().filter(|c| !c.same_as(&name)).collect()
        }
        _ => children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::parser::parse_source;
    use crate::parser::queries::components::find_definitions;
    use std::path::Path;

    fn with_component<R>(source: &str, f: impl FnOnce(&SyntaxNode<'_>) -> R) -> R {
        let config = ExtractorConfig::default();
        let path = Path::new("markup.jsx");
        let parsed = parse_source(path, source).unwrap();
        let root = parsed.root();
        let defs = find_definitions(&root, path, &config);
        f(&defs[0].function)
    }

    #[test]
    fn test_instantiations_and_placement() {
        let source = r#"
function Page({ items }) {
    return (
        <Layout header={<Header/>}>
            {items.map(item => <Row key={item.id} />)}
            {open && <Modal />}
            <div><UI.Button /></div>
        </Layout>
    );
}
"#;
        let found = with_component(source, extract_instantiations);
        let tags: Vec<(&str, Placement)> =
            found.iter().map(|i| (i.tag.as_str(), i.placement)).collect();
        assert_eq!(
            tags,
            vec![
                ("Layout", Placement::Rendered),
                ("Header", Placement::Attribute),
                ("Row", Placement::Rendered),
                ("Modal", Placement::Rendered),
                ("Button", Placement::Rendered),
            ]
        );
    }

    #[test]
    fn test_attribute_bindings() {
        let source = r#"
function Form() {
    return (
        <Field
            value={count + offset}
            onChange={setCount}
            onReset={() => { setCount(0); onDone(); }}
            label="static"
            disabled
            user={user.profile}
        />
    );
}
"#;
        let found = with_component(source, extract_instantiations);
        let attrs = &found[0].attributes;
        let by_name = |n: &str| attrs.iter().find(|a| a.name == n).unwrap();

        assert_eq!(by_name("value").reads, vec!["count", "offset"]);
        assert_eq!(by_name("onChange").reads, vec!["setCount"]);
        assert_eq!(by_name("onReset").invokes, vec!["setCount", "onDone"]);
        assert!(by_name("onReset").reads.is_empty());
        assert!(by_name("label").reads.is_empty());
        assert!(by_name("disabled").reads.is_empty());
        assert_eq!(by_name("user").reads, vec!["user"]);
    }

    #[test]
    fn test_callback_parameters_shadow_caller_names() {
        let source = r#"
function List({ items, onPick }) {
    const [v, setV] = useState(0);
    return (
        <ul>
            {items.map(v => <Row v={v} total={items.length} />)}
            <Picker select={x => onPick(x)} match={items.find(i => i === v)} />
        </ul>
    );
}
"#;
        let found = with_component(source, extract_instantiations);
        let row = &found[0].attributes;
        assert!(row[0].reads.is_empty(), "`v` is the map parameter");
        assert_eq!(row[1].reads, vec!["items"]);

        let picker = &found[1].attributes;
        assert_eq!(picker[0].invokes, vec!["onPick"]);
        assert_eq!(picker[1].reads, vec!["items", "v"]);
    }

    #[test]
    fn test_constructed_classes_are_not_references() {
        let source = r#"
function Cache() {
    const store = new Map(Seed);
    const ready = Promise.resolve(store);
    return <div data={store} />;
}
"#;
        let refs = with_component(source, extract_value_references);
        assert_eq!(refs, vec!["Seed"]);
    }

    #[test]
    fn test_value_references() {
        let source = r#"
function Router() {
    const Active = pick(Home, About);
    const [View, setView] = useState(null);
    const theme = React.useContext(Theme);
    return <Route component={Dashboard} fallback={Active}><Nav /></Route>;
}
"#;
        let refs = with_component(source, extract_value_references);
        assert_eq!(refs, vec!["Home", "About", "Theme", "Dashboard", "Active"]);
        assert!(!refs.contains(&"Route".to_string()));
        assert!(!refs.contains(&"Nav".to_string()));
        assert!(!refs.contains(&"React".to_string()));
    }
}
