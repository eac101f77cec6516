//! Inline color swatches
//!
//! A lighter pass than [`crate::normalize`]: every color-looking value of a
//! variable or property gets a swatch whose background is the value's own
//! source text, left for the editor to interpret.

use crate::ast::{Expression, Node};
use crate::classify::is_color_node;
use crate::document::Document;
use crate::flatten::flatten;
use crate::parser::{build_ast, StylusParser};
use crate::position::{find_column, line_index};
use serde::{Deserialize, Serialize};

/// Swatch count above which decorations are dropped.
pub const MAX_DECORATIONS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub line: usize,
    pub column: usize,
    /// CSS color text for the swatch
    pub background: String,
}

fn collect<'a>(expr: &'a Expression, out: &mut Vec<&'a Node>) {
    for node in &expr.nodes {
        if is_color_node(node) {
            out.push(node);
        } else if let Node::Object(object) = node {
            for val in object.vals.values() {
                if let Node::Expression(inner) = val {
                    collect(inner, out);
                }
            }
        }
    }
}

/// Color nodes in variable and property values of flattened nodes.
pub fn color_nodes<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Vec<&'a Node> {
    let mut out = Vec::new();
    for node in nodes {
        match node {
            Node::Ident(ident) => {
                if let Some(Node::Expression(expr)) = ident.val.as_deref() {
                    collect(expr, &mut out);
                }
            }
            Node::Property(property) => {
                if let Some(expr) = &property.expr {
                    collect(expr, &mut out);
                }
            }
            _ => {}
        }
    }
    out
}

pub fn decoration(node: &Node, document: &Document<'_>) -> Decoration {
    let line = line_index(node.lineno());
    let text = document.line(line);
    let (search, background) = match node {
        Node::Ident(ident) => (ident.name.clone(), ident.name.clone()),
        Node::Rgba(literal) => (literal.raw.clone(), literal.raw.clone()),
        Node::Call(call) => (call.name.clone(), node.to_string()),
        _ => return Decoration { line, column: 0, background: "transparent".to_string() },
    };
    Decoration { line, column: find_column(&search, text), background }
}

/// Swatches for a document, at most `max` of them.
pub fn document_decorations(parser: &dyn StylusParser, text: &str, max: usize) -> Vec<Decoration> {
    let document = Document::new(text);
    let tree = build_ast(parser, text);
    color_nodes(flatten(&tree))
        .into_iter()
        .take(max)
        .map(|node| decoration(node, &document))
        .collect()
}
