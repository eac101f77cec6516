//! Structural classification of parse tree nodes.
//!
//! The stylus tree has no single discriminant for "what this declares": a
//! variable and a function are both `ident` nodes and only differ in the tag
//! of their value payload. These predicates spell out each shape.

use crate::ast::Node;
use crate::named_colors;
use crate::symbols::SymbolKind;

/// Tags treated as at-rule like for symbol purposes.
pub const AT_RULE_TAGS: &[&str] =
    &["media", "keyframes", "atrule", "import", "require", "supports", "literal"];

/// Call names recognised as color constructors by [`is_color_node`].
const COLOR_CALLS: &[&str] = &["rgb", "rgba", "hsl", "hsla"];

/// `ident` whose value payload is an expression (`$gutter = 10px`).
pub fn is_variable_node(node: &Node) -> bool {
    match node {
        Node::Ident(ident) => matches!(ident.val.as_deref(), Some(Node::Expression(_))),
        _ => false,
    }
}

/// `ident` whose value payload is a function (`foo()` with a body).
pub fn is_function_node(node: &Node) -> bool {
    match node {
        Node::Ident(ident) => matches!(ident.val.as_deref(), Some(Node::Function(_))),
        _ => false,
    }
}

pub fn is_selector_node(node: &Node) -> bool {
    matches!(node, Node::Selector(_))
}

/// Selector interpolation, e.g. `{mySelectors}`.
pub fn is_selector_call_node(node: &Node) -> bool {
    matches!(node, Node::Call(call) if call.name == "selector")
}

pub fn is_at_rule_node(node: &Node) -> bool {
    matches!(
        node,
        Node::Media(_)
            | Node::Keyframes(_)
            | Node::Atrule(_)
            | Node::Import(_)
            | Node::Require(_)
            | Node::Supports(_)
            | Node::Literal(_)
    )
}

/// Named color ident, rgba literal, or an rgb/rgba/hsl/hsla call.
pub fn is_color_node(node: &Node) -> bool {
    match node {
        Node::Ident(ident) => named_colors::is_named_color(&ident.name),
        Node::Rgba(_) => true,
        Node::Call(call) => COLOR_CALLS.contains(&call.name.as_str()),
        _ => false,
    }
}

/// Symbol kind of a node, first matching predicate wins.
pub fn classify(node: &Node) -> Option<SymbolKind> {
    if is_variable_node(node) {
        Some(SymbolKind::Variable)
    } else if is_function_node(node) {
        Some(SymbolKind::Function)
    } else if is_selector_node(node) || is_selector_call_node(node) {
        Some(SymbolKind::Class)
    } else if is_at_rule_node(node) {
        Some(SymbolKind::Namespace)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AtRule, Call, Expression, Function, Ident, RgbaLiteral};

    fn ident(name: &str, val: Option<Node>) -> Node {
        Node::Ident(Ident { name: name.to_string(), val: val.map(Box::new), lineno: 1, column: 1 })
    }

    fn call(name: &str) -> Node {
        Node::Call(Call { name: name.to_string(), args: Default::default(), lineno: 1, column: 1 })
    }

    fn function(name: &str) -> Node {
        Node::Function(Function {
            name: name.to_string(),
            params: vec![],
            block: None,
            lineno: 1,
            column: 1,
        })
    }

    #[test]
    fn test_variable_and_function_differ_by_payload() {
        let var = ident("$gutter", Some(Node::Expression(Expression::default())));
        let func = ident("foo", Some(function("foo")));
        let bare = ident("foo", None);

        assert!(is_variable_node(&var));
        assert!(!is_function_node(&var));
        assert!(is_function_node(&func));
        assert!(!is_variable_node(&func));
        assert!(!is_variable_node(&bare) && !is_function_node(&bare));
    }

    #[test]
    fn test_selector_call_requires_selector_name() {
        assert!(is_selector_call_node(&call("selector")));
        assert!(!is_selector_call_node(&call("rgba")));
    }

    #[test]
    fn test_at_rule_tags() {
        for node in [Node::Media(AtRule::default()), Node::Literal(AtRule::default())] {
            assert!(is_at_rule_node(&node));
            assert!(AT_RULE_TAGS.contains(&node.node_name()));
        }
        assert!(!is_at_rule_node(&Node::Other));
    }

    #[test]
    fn test_color_nodes() {
        assert!(is_color_node(&ident("red", None)));
        assert!(!is_color_node(&ident("$red", None)));
        assert!(is_color_node(&call("hsla")));
        assert!(!is_color_node(&call("hwb")));
        let literal = Node::Rgba(RgbaLiteral {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
            raw: "#000".to_string(),
            lineno: 1,
            column: 1,
        });
        assert!(is_color_node(&literal));
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(
            classify(&ident("$x", Some(Node::Expression(Expression::default())))),
            Some(SymbolKind::Variable)
        );
        assert_eq!(classify(&ident("mixin", Some(function("mixin")))), Some(SymbolKind::Function));
        assert_eq!(classify(&call("selector")), Some(SymbolKind::Class));
        assert_eq!(classify(&Node::Keyframes(AtRule::default())), Some(SymbolKind::Namespace));
        assert_eq!(classify(&call("url")), None);
    }
}
