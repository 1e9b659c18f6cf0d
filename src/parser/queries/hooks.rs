//! State and effect hook detection inside a component body.
//!
//!   const [count, setCount] = useState(0);
//!   useEffect(() => { setCount(step); }, [step]);

use super::{is_nested_definition, push_unique, EffectDecl, StateDecl};
use crate::config::HookConfig;
use crate::parser::syntax::{SyntaxKind, SyntaxNode, Walk};

/// State declarations, in source order. Nested definitions are not
/// entered; their hooks are their own.
pub(crate) fn extract_states(function: &SyntaxNode<'_>, hooks: &HookConfig) -> Vec<StateDecl> {
    let Some(body) = function.function_body() else {
        return Vec::new();
    };

    let mut states = Vec::new();
    body.walk(&mut |node| {
        if is_nested_definition(&node) {
            return Walk::Skip;
        }
        if !node.is("variable_declarator") {
            return Walk::Continue;
        }
        let is_state_call = node
            .field("value")
            .and_then(|v| v.callee_name())
            .is_some_and(|callee| hooks.is_state_hook(callee));
        if !is_state_call {
            return Walk::Continue;
        }
        if let Some(pattern) = node.field("name").filter(|n| n.is("array_pattern")) {
            let slots = array_slots(&pattern);
            let value = slots.first().copied().flatten();
            let setter = slots.get(1).copied().flatten();
            if let Some(value) = value {
                states.push(StateDecl {
                    name: value.to_string(),
                    setter: setter.map(str::to_string),
                });
            }
        }
        Walk::Continue
    });
    states
}

/// Identifier bound at each position of an array pattern. Holes and
/// nested patterns give `None`.
fn array_slots<'t>(pattern: &SyntaxNode<'t>) -> Vec<Option<&'t str>> {
    let mut slots = vec![None];
    for child in pattern.children() {
        match child.raw_kind() {
            "," => slots.push(None),
            "identifier" => {
                if let Some(last) = slots.last_mut() {
                    *last = Some(child.text());
                }
            }
            // `[value = 0, setValue]`
            "assignment_pattern" => {
                let left = child.field("left").filter(|l| l.kind() == SyntaxKind::Identifier);
                if let (Some(last), Some(left)) = (slots.last_mut(), left) {
                    *last = Some(left.text());
                }
            }
            _ => {}
        }
    }
    slots
}

/// Effect declarations, in source order.
///
/// A hook call counts when its first argument is a callback. The dependency
/// list is optional; when absent the effect has no dependencies.
pub(crate) fn extract_effects(function: &SyntaxNode<'_>, hooks: &HookConfig) -> Vec<EffectDecl> {
    let Some(body) = function.function_body() else {
        return Vec::new();
    };

    let mut effects = Vec::new();
    body.walk(&mut |node| {
        if is_nested_definition(&node) {
            return Walk::Skip;
        }
        let Some(callee) = node.callee_name() else {
            return Walk::Continue;
        };
        if !hooks.is_effect_hook(callee) {
            return Walk::Continue;
        }

        let args = node.call_arguments();
        let Some(callback) = args.first().filter(|a| a.kind() == SyntaxKind::FunctionDef) else {
            return Walk::Continue;
        };

        let mut dependencies = Vec::new();
        if let Some(list) = args.get(1).filter(|a| a.is("array")) {
            for element in list.named_children() {
                if let Some(ident) = element.root_identifier() {
                    push_unique(&mut dependencies, ident.text());
                }
            }
        }

        effects.push(EffectDecl {
            line: node.line(),
            dependencies,
            invoked: invoked_identifiers(callback),
        });
        Walk::Skip
    });
    effects
}

/// Names of plain identifiers called anywhere under `node`, first call first.
pub(crate) fn invoked_identifiers(node: &SyntaxNode<'_>) -> Vec<String> {
    let mut invoked = Vec::new();
    node.walk(&mut |n| {
        if n.kind() == SyntaxKind::Call {
            if let Some(callee) = n.field("function").filter(|f| f.kind() == SyntaxKind::Identifier) {
                push_unique(&mut invoked, callee.text());
            }
        }
        Walk::Continue
    });
    invoked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfig;
    use crate::parser::parse_source;
    use crate::parser::queries::components::find_definitions;
    use std::path::Path;

    fn with_component<R>(source: &str, f: impl FnOnce(&SyntaxNode<'_>, &HookConfig) -> R) -> R {
        let config = ExtractorConfig::default();
        let path = Path::new("hooks.jsx");
        let parsed = parse_source(path, source).unwrap();
        let root = parsed.root();
        let defs = find_definitions(&root, path, &config);
        f(&defs[0].function, &config.hooks)
    }

    #[test]
    fn test_state_pairs() {
        let source = r#"
function Counter() {
    const [count, setCount] = useState(0);
    const [open, setOpen] = React.useState(false);
    const [state, dispatch] = useReducer(reducer, {});
    const [onlyValue] = useState();
    const [, hiddenSetter] = useState();
    const memo = useMemo(() => 1, []);
    return null;
}
"#;
        let states = with_component(source, extract_states);
        assert_eq!(
            states,
            vec![
                StateDecl { name: "count".into(), setter: Some("setCount".into()) },
                StateDecl { name: "open".into(), setter: Some("setOpen".into()) },
                StateDecl { name: "state".into(), setter: Some("dispatch".into()) },
                StateDecl { name: "onlyValue".into(), setter: None },
            ]
        );
    }

    #[test]
    fn test_effect_dependencies_and_calls() {
        let source = r#"
function Timer({ step, onTick }) {
    const [value, setValue] = useState(0);
    useEffect(() => {
        const id = setInterval(() => setValue(step), 1000);
        onTick(value);
        return () => clearInterval(id);
    }, [step, value, config.delay]);
    return null;
}
"#;
        let effects = with_component(source, extract_effects);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].dependencies, vec!["step", "value", "config"]);
        assert_eq!(
            effects[0].invoked,
            vec!["setInterval", "setValue", "onTick", "clearInterval"]
        );
    }

    #[test]
    fn test_nested_definitions_keep_their_hooks() {
        let source = r#"
function Outer() {
    function Inner() {
        const [a, setA] = useState(0);
        useEffect(() => { setA(1); }, [a]);
        return <p/>;
    }
    const Row = () => { const [b] = useState(); return null; };
    const [c, setC] = useState(0);
    useEffect(() => { setC(0); }, [c]);
    return <div><Inner/></div>;
}
"#;
        let states = with_component(source, extract_states);
        let names: Vec<&str> = states.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["c"]);

        let effects = with_component(source, extract_effects);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].dependencies, vec!["c"]);
        assert_eq!(effects[0].invoked, vec!["setC"]);
    }

    #[test]
    fn test_effect_without_dependency_list() {
        let source = r#"
function Logger() {
    useLayoutEffect(() => { log(); });
    useEffect(handler, []);
    return null;
}
"#;
        let effects = with_component(source, extract_effects);
        assert_eq!(effects.len(), 1, "non-callback argument is not an effect");
        assert!(effects[0].dependencies.is_empty());
        assert_eq!(effects[0].invoked, vec!["log"]);
    }
}
