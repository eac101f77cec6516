//! Color extraction
//!
//! Finds color values inside the values of variables, properties and
//! ternaries, however deeply they are nested in calls, objects and `@block`
//! values. Each occurrence carries its evaluated channels, or the reason
//! they could not be computed.

use crate::ast::{Arguments, Call, Expression, Ident, Node};
use crate::color::{color_from_call, from_name, is_color_constructor, ColorError, Rgba};
use crate::named_colors::is_named_color;
use crate::position::line_index;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorKind {
    /// CSS color keyword (`red`)
    NamedColor,
    /// Literal produced by the parser, e.g. from hex notation
    RgbaLiteral,
    /// `rgb()`, `rgba()`, `hsl()`, `hsla()` or `hwb()` with literal channels
    FunctionColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorOccurrence {
    pub kind: ColorKind,
    /// 0-based line reported by the parser
    pub line: usize,
    /// 0-based column reported by the parser
    pub column: usize,
    /// Text to locate on the line: the color name, the literal text or the
    /// constructor name
    pub text: String,
    pub color: Result<Rgba, ColorError>,
}

impl ColorOccurrence {
    fn new(kind: ColorKind, node: &Node, text: &str, color: Result<Rgba, ColorError>) -> Self {
        Self {
            kind,
            line: line_index(node.lineno()),
            column: node.column().saturating_sub(1),
            text: text.to_string(),
            color,
        }
    }
}

fn is_unit(node: &Node) -> bool {
    matches!(node, Node::Unit(_))
}

fn argument_terms(arg: &Node) -> &[Node] {
    match arg {
        Node::Expression(expr) => &expr.nodes,
        _ => &[],
    }
}

/// Every argument is a literal number.
///
/// A single space separated argument may contain binary operations between
/// two numbers (`hwb(0 0% 0% / 0.5)`); otherwise only the first term of each
/// argument is considered.
fn has_only_units(args: &Arguments) -> bool {
    match args.nodes.as_slice() {
        [single] => argument_terms(single).iter().all(|term| match term {
            Node::BinOp(op) => is_unit(&op.left) && is_unit(&op.right),
            other => is_unit(other),
        }),
        many => many.iter().all(|arg| argument_terms(arg).first().is_some_and(is_unit)),
    }
}

fn unit_value(node: &Node) -> Option<(f64, Option<&str>)> {
    match node {
        Node::Unit(unit) => Some((unit.val, unit.unit.as_deref())),
        _ => None,
    }
}

/// Channel values of a call that passed [`has_only_units`].
fn channel_units(args: &Arguments) -> Vec<(f64, Option<&str>)> {
    match args.nodes.as_slice() {
        [single] => argument_terms(single)
            .iter()
            .flat_map(|term| match term {
                Node::BinOp(op) => vec![unit_value(&op.left), unit_value(&op.right)],
                other => vec![unit_value(other)],
            })
            .flatten()
            .collect(),
        many => many.iter().filter_map(|arg| argument_terms(arg).first().and_then(unit_value)).collect(),
    }
}

struct Extractor {
    out: Vec<ColorOccurrence>,
}

impl Extractor {
    fn values(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Ident(ident) if is_named_color(&ident.name) => {
                    let color = from_name(&ident.name);
                    self.out.push(ColorOccurrence::new(ColorKind::NamedColor, node, &ident.name, color));
                }
                Node::Rgba(literal) => {
                    let color = Ok(Rgba::new(literal.r, literal.g, literal.b, literal.a));
                    self.out.push(ColorOccurrence::new(ColorKind::RgbaLiteral, node, &literal.raw, color));
                }
                Node::Call(call) => self.call(node, call),
                Node::Object(object) => {
                    for val in object.vals.values() {
                        self.node(val);
                    }
                }
                Node::Atblock(atblock) => {
                    for statement in &atblock.nodes {
                        if let Node::Property(property) = statement {
                            if let Some(expr) = &property.expr {
                                self.expression(expr);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn call(&mut self, node: &Node, call: &Call) {
        if is_color_constructor(&call.name) && has_only_units(&call.args) {
            let color = color_from_call(&call.name, &channel_units(&call.args));
            self.out.push(ColorOccurrence::new(ColorKind::FunctionColor, node, &call.name, color));
        } else {
            for arg in &call.args.nodes {
                self.node(arg);
            }
        }
    }

    fn expression(&mut self, expr: &Expression) {
        self.values(&expr.nodes);
    }

    /// Only `expression` nodes hold values to search.
    fn node(&mut self, node: &Node) {
        if let Node::Expression(expr) = node {
            self.expression(expr);
        }
    }

    /// Outer stage over one flattened node.
    fn declaration(&mut self, node: &Node) {
        match node {
            Node::Ident(ident) => {
                if let Some(val) = &ident.val {
                    self.node(val);
                }
            }
            Node::Property(property) => {
                if let Some(expr) = &property.expr {
                    self.expression(expr);
                }
            }
            // The true branch is deliberately not searched
            Node::Ternary(ternary) => match &*ternary.false_expr {
                Node::Expression(expr) => self.expression(expr),
                Node::Ident(Ident { val: Some(val), .. }) => self.node(val),
                other => self.values(std::slice::from_ref(other)),
            },
            _ => {}
        }
    }
}

/// Colors inside one value subtree (an `expression` node).
pub fn extract_colors(value: &Node) -> Vec<ColorOccurrence> {
    let mut extractor = Extractor { out: Vec::new() };
    extractor.node(value);
    extractor.out
}

/// Colors declared by flattened tree nodes, in discovery order.
pub fn colors_in_nodes<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Vec<ColorOccurrence> {
    let mut extractor = Extractor { out: Vec::new() };
    for node in nodes {
        extractor.declaration(node);
    }
    extractor.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::parser::{IndentParser, StylusParser};

    fn occurrences(text: &str) -> Vec<ColorOccurrence> {
        let tree = IndentParser.parse(text).unwrap();
        colors_in_nodes(flatten(&tree))
    }

    fn assert_channels(found: &ColorOccurrence, expected: (f64, f64, f64, f64)) {
        let color = found.color.clone().unwrap();
        let actual = (color.red, color.green, color.blue, color.alpha);
        assert!(
            (actual.0 - expected.0).abs() < 1e-6
                && (actual.1 - expected.1).abs() < 1e-6
                && (actual.2 - expected.2).abs() < 1e-6
                && (actual.3 - expected.3).abs() < 1e-6,
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    fn texts(found: &[ColorOccurrence]) -> Vec<&str> {
        found.iter().map(|o| o.text.as_str()).collect()
    }

    #[test]
    fn test_named_color_property() {
        let found = occurrences("color red");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, ColorKind::NamedColor);
        assert_eq!((found[0].line, found[0].column), (0, 6));
        assert_eq!(found[0].color, Ok(Rgba::new(255.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_function_color_channels() {
        let found = occurrences("background rgba(10, 20, 30, 0.5)");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, ColorKind::FunctionColor);
        assert_channels(&found[0], (10.0, 20.0, 30.0, 0.5));
    }

    #[test]
    fn test_variable_argument_fails_unit_guard() {
        assert!(occurrences("padding rgba($gutter, 1)").is_empty());
    }

    #[test]
    fn test_non_literal_call_is_searched() {
        let found = occurrences("border darken(#ff0000, 10%) mix(rgb(0, 0, 255), blue)");
        assert_eq!(texts(&found), vec!["#ff0000", "rgb", "blue"]);
    }

    #[test]
    fn test_hex_literal() {
        let found = occurrences("$accent = #0a141e80");
        assert_eq!(found[0].kind, ColorKind::RgbaLiteral);
        assert_eq!(found[0].text, "#0a141e80");
        let color = found[0].color.clone().unwrap();
        assert_eq!((color.red, color.green, color.blue), (10.0, 20.0, 30.0));
        assert!((color.alpha - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_ternary_searches_false_branch_only() {
        let found = occurrences(".a\n  $dark ? red : blue");
        assert_eq!(texts(&found), vec!["blue"]);
    }

    #[test]
    fn test_object_and_atblock_values() {
        let found = occurrences("$theme = { primary: red, accent: #fff }\n$b = @block\n  color green");
        assert_eq!(texts(&found), vec!["red", "#fff", "green"]);
    }

    #[test]
    fn test_space_separated_hwb() {
        let found = occurrences("color hwb(0 0% 0% / 0.5)");
        assert_channels(&found[0], (255.0, 0.0, 0.0, 0.5));
    }

    #[test]
    fn test_bad_channels_are_reported_not_dropped() {
        let found = occurrences("color rgb(10px, 0, 0)\ncolor rgb()");
        assert_eq!(found.len(), 2);
        assert!(matches!(found[0].color, Err(ColorError::UnsupportedUnit(_))));
        assert_eq!(found[1].color, Err(ColorError::ChannelCount(0)));
    }

    #[test]
    fn test_function_bodies_and_plain_idents_ignored() {
        assert!(occurrences("foo()\n  color red").is_empty());
        assert!(occurrences(".a\n  foo(red)").is_empty());
    }

    #[test]
    fn test_extract_colors_from_value() {
        let tree = IndentParser.parse("$c = red blue").unwrap();
        let Node::Ident(ident) = &tree.children()[0] else { panic!("expected ident") };
        let found = extract_colors(ident.val.as_deref().unwrap());
        assert_eq!(texts(&found), vec!["red", "blue"]);
    }
}
