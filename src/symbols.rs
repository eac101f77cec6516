//! Symbol building
//!
//! Turns classified nodes into outline symbols with positions recovered
//! from the document text.

use crate::ast::{Node, Segment};
use crate::classify::classify;
use crate::document::Document;
use crate::flatten::flatten;
use crate::parser::{build_ast, StylusParser};
use crate::position::{find_column, line_index, prepare_name, Span};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What a symbol declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Variable,
    Function,
    /// Selectors and selector interpolations
    Class,
    /// At-rules
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub range: Span,
}

/// Build a selector name from its segments, without separators.
pub fn selector_name(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|segment| match &segment.string {
            Some(text) => text.clone(),
            None => segment.nodes.iter().filter_map(node_name).collect(),
        })
        .collect()
}

fn node_name(node: &Node) -> Option<&str> {
    match node {
        Node::Ident(ident) => Some(&ident.name),
        Node::Call(call) => Some(&call.name),
        _ => None,
    }
}

/// Line of a declaration: the value payload's line when it has one.
fn declaration_line(node: &Node) -> usize {
    match node {
        Node::Ident(ident) => match ident.val.as_deref().map(Node::lineno) {
            Some(lineno) if lineno > 0 => lineno,
            _ => ident.lineno,
        },
        other => other.lineno(),
    }
}

/// Symbol for one node, `None` when the node declares nothing.
pub fn build_symbol(node: &Node, document: &Document<'_>) -> Option<Symbol> {
    let kind = classify(node)?;

    let (name, line, column) = match (kind, node) {
        (SymbolKind::Variable | SymbolKind::Function, Node::Ident(ident)) => {
            let line = line_index(declaration_line(node));
            let column = find_column(&ident.name, document.line(line));
            (ident.name.clone(), line, column)
        }
        (SymbolKind::Class, Node::Selector(selector)) => {
            let name = selector_name(&selector.segments);
            (name, line_index(selector.lineno), selector.column.saturating_sub(1))
        }
        // Selector interpolations and at-rules are named by their source line
        (SymbolKind::Class | SymbolKind::Namespace, _) => {
            let line = line_index(node.lineno());
            let name = prepare_name(document.line(line));
            let column = find_column(&name, document.line(line));
            (name, line, column)
        }
        _ => return None,
    };

    let range = Span::on_line(line, column, name.len());
    Some(Symbol { name, kind, range })
}

/// Map nodes to symbols, dropping nodes that declare nothing.
pub fn build_symbols<'a>(nodes: impl IntoIterator<Item = &'a Node>, document: &Document<'_>) -> Vec<Symbol> {
    nodes.into_iter().filter_map(|node| build_symbol(node, document)).collect()
}

/// Keep the first symbol per kind, name and line span.
pub fn dedupe_symbols(symbols: Vec<Symbol>) -> Vec<Symbol> {
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .filter(|s| seen.insert((s.kind, s.name.clone(), s.range.start.line, s.range.end.line)))
        .collect()
}

/// All symbols of a document, in source order.
pub fn document_symbols(parser: &dyn StylusParser, text: &str) -> Vec<Symbol> {
    let document = Document::new(text);
    let tree = build_ast(parser, text);
    dedupe_symbols(build_symbols(flatten(&tree), &document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::IndentParser;
    use crate::position::Position;

    fn symbols(text: &str) -> Vec<Symbol> {
        document_symbols(&IndentParser, text)
    }

    fn symbol(name: &str, kind: SymbolKind, line: usize, column: usize) -> Symbol {
        Symbol { name: name.to_string(), kind, range: Span::on_line(line, column, name.len()) }
    }

    #[test]
    fn test_function_declaration() {
        assert_eq!(symbols("foo()\n  bar: 1px"), vec![symbol("foo", SymbolKind::Function, 0, 0)]);
    }

    #[test]
    fn test_block_variable() {
        let found = symbols("$b = @block\n  color green\n.a\n  color red");
        assert_eq!(found[0], symbol("$b", SymbolKind::Variable, 0, 0));
    }

    #[test]
    fn test_variable_position_from_text() {
        let found = symbols("\n  $gutter = 10px");
        assert_eq!(found, vec![symbol("$gutter", SymbolKind::Variable, 1, 2)]);
        assert_eq!(found[0].range.end, Position::new(1, 9));
    }

    #[test]
    fn test_selectors_use_parser_column() {
        let found = symbols(".a, .b\n  color red");
        assert_eq!(
            found,
            vec![symbol(".a", SymbolKind::Class, 0, 0), symbol(".b", SymbolKind::Class, 0, 4)]
        );
    }

    #[test]
    fn test_interpolated_selector_name() {
        let found = symbols(".col-{$size}\n  width 1px");
        assert_eq!(found[0].name, ".col-$size");
    }

    #[test]
    fn test_selector_call_and_at_rule_named_by_line() {
        let found = symbols("{mySelectors}\n  color red\n@media screen {\n  .a\n    color red\n}");
        let names: Vec<(&str, SymbolKind)> = found.iter().map(|s| (s.name.as_str(), s.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("mySelectors", SymbolKind::Class),
                ("@media screen", SymbolKind::Namespace),
                (".a", SymbolKind::Class),
            ]
        );
        assert_eq!(found[0].range.start, Position::new(0, 1));
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let first = symbol("$a", SymbolKind::Variable, 0, 0);
        let moved = symbol("$a", SymbolKind::Variable, 0, 5);
        let other_kind = symbol("$a", SymbolKind::Function, 0, 0);
        let deduped = dedupe_symbols(vec![first.clone(), moved, other_kind.clone(), first.clone()]);
        assert_eq!(deduped, vec![first, other_kind]);
    }

    #[test]
    fn test_unparseable_document_has_no_symbols() {
        assert!(symbols("$a = (1px\n.b\n  color red").is_empty());
    }

    #[test]
    fn test_expression_values_are_not_symbols() {
        assert!(symbols(".a\n  color red\n  foo()").iter().all(|s| s.kind == SymbolKind::Class));
    }
}
