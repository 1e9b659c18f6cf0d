//! Uniform view over tree-sitter nodes.
//!
//! The recognizer only cares about a handful of node shapes. Every grammar
//! node is folded into one of the [`SyntaxKind`] variants, and the
//! recognizer matches on those instead of on grammar-specific kind strings.

use tree_sitter::Node;

/// The closed set of node shapes the extractor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Any function form: declaration, expression, or arrow.
    FunctionDef,
    /// A call expression.
    Call,
    /// A markup element, paired or self-closing.
    MarkupElement,
    /// A plain identifier in expression or binding position.
    Identifier,
    /// An object or array destructuring pattern.
    DestructuringPattern,
    /// Anything else.
    Other,
}

/// Traversal control returned by [`SyntaxNode::walk`] visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    /// Do not descend into the current node.
    Skip,
}

/// A syntax node together with the source text it was parsed from.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    node: Node<'t>,
    source: &'t str,
}

impl std::fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.node.kind(), self.line())
    }
}

impl<'t> SyntaxNode<'t> {
    pub fn new(node: Node<'t>, source: &'t str) -> Self {
        Self { node, source }
    }

    pub fn kind(&self) -> SyntaxKind {
        match self.node.kind() {
            "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function" => SyntaxKind::FunctionDef,
            "call_expression" => SyntaxKind::Call,
            "jsx_element" | "jsx_self_closing_element" | "jsx_fragment" => {
                SyntaxKind::MarkupElement
            }
            "identifier" => SyntaxKind::Identifier,
            "object_pattern" | "array_pattern" => SyntaxKind::DestructuringPattern,
            _ => SyntaxKind::Other,
        }
    }

    /// The grammar's own kind string, for the few shapes outside [`SyntaxKind`].
    pub fn raw_kind(&self) -> &'static str {
        self.node.kind()
    }

    pub fn is(&self, raw_kind: &str) -> bool {
        self.node.kind() == raw_kind
    }

    pub fn text(&self) -> &'t str {
        self.source.get(self.node.byte_range()).unwrap_or_default()
    }

    /// 1-indexed start line.
    pub fn line(&self) -> usize {
        self.node.start_position().row + 1
    }

    /// 1-indexed end line.
    pub fn end_line(&self) -> usize {
        self.node.end_position().row + 1
    }

    pub fn has_error(&self) -> bool {
        self.node.has_error()
    }

    pub fn field(&self, name: &str) -> Option<Self> {
        self.node
            .child_by_field_name(name)
            .map(|n| Self::new(n, self.source))
    }

    pub fn parent(&self) -> Option<Self> {
        self.node.parent().map(|n| Self::new(n, self.source))
    }

    /// Same underlying node?
    pub fn same_as(&self, other: &Self) -> bool {
        self.node.id() == other.node.id()
    }

    /// All children, anonymous tokens included.
    pub fn children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .map(|n| Self::new(n, self.source))
            .collect()
    }

    pub fn named_children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .map(|n| Self::new(n, self.source))
            .collect()
    }

    /// First named child with the given grammar kind.
    pub fn child_of_kind(&self, raw_kind: &str) -> Option<Self> {
        self.named_children().into_iter().find(|c| c.is(raw_kind))
    }

    /// Does this node have an unnamed child token with this text (e.g. `default`)?
    pub fn has_token(&self, token: &str) -> bool {
        let mut cursor = self.node.walk();
        let found = self
            .node
            .children(&mut cursor)
            .any(|c| !c.is_named() && c.kind() == token);
        found
    }

    /// Preorder walk over named descendants, this node included.
    pub fn walk(&self, visit: &mut dyn FnMut(SyntaxNode<'t>) -> Walk) {
        if visit(*self) == Walk::Skip {
            return;
        }
        for child in self.named_children() {
            child.walk(visit);
        }
    }

    /// Does any node in this subtree have the given kind?
    pub fn contains_kind(&self, kind: SyntaxKind) -> bool {
        let mut found = false;
        self.walk(&mut |n| {
            if found {
                return Walk::Skip;
            }
            if n.kind() == kind {
                found = true;
                return Walk::Skip;
            }
            Walk::Continue
        });
        found
    }

    // ─── Shape helpers ──────────────────────────────────────────

    /// Name of the function a call invokes: `f(...)` gives `f`,
    /// `React.useState(...)` gives `useState`.
    pub fn callee_name(&self) -> Option<&'t str> {
        if self.kind() != SyntaxKind::Call {
            return None;
        }
        let callee = self.field("function")?;
        match callee.raw_kind() {
            "identifier" => Some(callee.text()),
            "member_expression" => callee.field("property").map(|p| p.text()),
            _ => None,
        }
    }

    /// Positional arguments of a call.
    pub fn call_arguments(&self) -> Vec<Self> {
        self.field("arguments")
            .map(|args| args.named_children())
            .unwrap_or_default()
    }

    /// The opening tag of a markup element (the element itself when self-closing).
    pub fn markup_open_tag(&self) -> Option<Self> {
        match self.raw_kind() {
            "jsx_self_closing_element" => Some(*self),
            "jsx_element" => self.child_of_kind("jsx_opening_element"),
            _ => None,
        }
    }

    /// Tag name of a markup element. Member tags (`UI.Button`) yield their
    /// last segment; fragments yield `None`.
    pub fn markup_tag_name(&self) -> Option<&'t str> {
        let name = self.markup_open_tag()?.field("name")?;
        match name.raw_kind() {
            "identifier" => Some(name.text()),
            "member_expression" | "nested_identifier" => name.text().rsplit('.').next(),
            _ => None,
        }
    }

    /// Attribute nodes (`jsx_attribute`) on a markup element's opening tag.
    pub fn markup_attributes(&self) -> Vec<Self> {
        self.markup_open_tag()
            .map(|tag| {
                tag.named_children()
                    .into_iter()
                    .filter(|c| c.is("jsx_attribute"))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Body of a function definition.
    pub fn function_body(&self) -> Option<Self> {
        if self.kind() != SyntaxKind::FunctionDef {
            return None;
        }
        self.field("body")
    }

    /// First declared parameter of a function definition.
    pub fn first_parameter(&self) -> Option<Self> {
        if self.kind() != SyntaxKind::FunctionDef {
            return None;
        }
        // `x => ...` has a bare identifier parameter
        if let Some(single) = self.field("parameter") {
            return Some(single);
        }
        self.field("parameters")?.named_children().into_iter().next()
    }

    /// Names bound by every parameter of a function definition.
    pub fn parameter_names(&self) -> Vec<&'t str> {
        let mut names = Vec::new();
        if self.kind() != SyntaxKind::FunctionDef {
            return names;
        }
        if let Some(single) = self.field("parameter") {
            single.collect_bound_names(&mut names);
        } else if let Some(params) = self.field("parameters") {
            params.collect_bound_names(&mut names);
        }
        names
    }

    /// Names bound by a binding pattern: `a`, `{ a, b: c }`, `[x, ...rest]`.
    /// Default values and property keys bind nothing.
    pub fn bound_names(&self) -> Vec<&'t str> {
        let mut names = Vec::new();
        self.collect_bound_names(&mut names);
        names
    }

    fn collect_bound_names(&self, names: &mut Vec<&'t str>) {
        match self.raw_kind() {
            "identifier" | "shorthand_property_identifier_pattern" => names.push(self.text()),
            "pair_pattern" => {
                if let Some(value) = self.field("value") {
                    value.collect_bound_names(names);
                }
            }
            "assignment_pattern" | "object_assignment_pattern" => {
                if let Some(left) = self.field("left") {
                    left.collect_bound_names(names);
                }
            }
            "required_parameter" | "optional_parameter" => {
                if let Some(pattern) = self.field("pattern") {
                    pattern.collect_bound_names(names);
                }
            }
            "formal_parameters" | "object_pattern" | "array_pattern" | "rest_pattern" => {
                for child in self.named_children() {
                    child.collect_bound_names(names);
                }
            }
            _ => {}
        }
    }

    /// The identifier at the root of a member chain (`a.b.c` gives `a`).
    pub fn root_identifier(&self) -> Option<Self> {
        match self.raw_kind() {
            "identifier" => Some(*self),
            "member_expression" | "subscript_expression" => {
                self.field("object")?.root_identifier()
            }
            "parenthesized_expression" | "non_null_expression" => {
                self.named_children().into_iter().next()?.root_identifier()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use std::path::Path;

    #[test]
    fn test_kind_folding() {
        let source = "const f = () => g(x);";
        let parsed = parse_source(Path::new("a.js"), source).unwrap();
        let root = parsed.root();

        let mut kinds = Vec::new();
        root.walk(&mut |n| {
            kinds.push(n.kind());
            Walk::Continue
        });

        assert!(kinds.contains(&SyntaxKind::FunctionDef));
        assert!(kinds.contains(&SyntaxKind::Call));
        assert!(kinds.contains(&SyntaxKind::Identifier));
    }

    #[test]
    fn test_callee_name_member() {
        let source = "React.useState(0);";
        let parsed = parse_source(Path::new("a.js"), source).unwrap();

        let mut names = Vec::new();
        parsed.root().walk(&mut |n| {
            if let Some(name) = n.callee_name() {
                names.push(name.to_string());
            }
            Walk::Continue
        });
        assert_eq!(names, vec!["useState"]);
    }

    #[test]
    fn test_markup_tag_names() {
        let source = "const v = <Layout><UI.Button label=\"x\" /><div /></Layout>;";
        let parsed = parse_source(Path::new("a.jsx"), source).unwrap();

        let mut tags = Vec::new();
        parsed.root().walk(&mut |n| {
            if n.kind() == SyntaxKind::MarkupElement {
                if let Some(tag) = n.markup_tag_name() {
                    tags.push(tag.to_string());
                }
            }
            Walk::Continue
        });
        assert_eq!(tags, vec!["Layout", "Button", "div"]);
    }

    #[test]
    fn test_parameter_names() {
        let source = "const f = ({ a, b: c, d = 1, ...rest }, [x, , y], z = a) => a;";
        let parsed = parse_source(Path::new("a.js"), source).unwrap();

        let mut names = Vec::new();
        parsed.root().walk(&mut |n| {
            if n.kind() == SyntaxKind::FunctionDef {
                names = n.parameter_names();
                return Walk::Skip;
            }
            Walk::Continue
        });
        assert_eq!(names, vec!["a", "c", "d", "rest", "x", "y", "z"]);
    }

    #[test]
    fn test_root_identifier() {
        let source = "user.profile.name;";
        let parsed = parse_source(Path::new("a.js"), source).unwrap();

        let mut root_name = None;
        parsed.root().walk(&mut |n| {
            if n.is("member_expression") && root_name.is_none() {
                root_name = n.root_identifier().map(|i| i.text().to_string());
                return Walk::Skip;
            }
            Walk::Continue
        });
        assert_eq!(root_name.as_deref(), Some("user"));
    }
}
