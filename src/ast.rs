//! Parse tree model for Stylus sources
//!
//! Mirrors the node shapes produced by the stylus parser. Every node carries
//! its tag in a `nodeName` field when serialized, so trees dumped by an
//! external parser can be loaded directly.
//!
//! Rule bodies are shared: a `group` and each of its selectors point at the
//! same [`Rc`] block, exactly like the upstream tree. Consumers that walk both
//! must track visited blocks (see [`crate::flatten`]).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// A node of the Stylus parse tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodeName", rename_all = "lowercase")]
pub enum Node {
    Ident(Ident),
    Selector(Selector),
    Call(Call),
    Function(Function),
    Rgba(RgbaLiteral),
    Unit(Unit),
    BinOp(BinOp),
    String(Str),
    Expression(Expression),
    Object(Object),
    Ternary(Ternary),
    Property(Property),
    Atblock(Atblock),
    Group(Container),
    Root(Container),
    Block(Container),
    Media(AtRule),
    Keyframes(AtRule),
    Atrule(AtRule),
    Import(AtRule),
    Require(AtRule),
    Supports(AtRule),
    Literal(AtRule),
    /// Any tag the core does not inspect
    #[serde(other)]
    Other,
}

/// Identifier; carries a value payload when it is an assignment or a
/// function definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<Box<Node>>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

/// One selector of a rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    pub segments: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Rc<Node>>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

/// A selector or property name fragment.
///
/// Plain text fragments carry `string`; interpolated fragments (`{$name}`)
/// carry the interpolated nodes instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub name: String,
    #[serde(default)]
    pub args: Arguments,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

/// Call arguments. Each entry is an `expression` node; a space separated
/// argument list (`hwb(0 0% 0%)`) is a single expression.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Rc<Node>>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

/// Color literal produced directly by the parser (hex notation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RgbaLiteral {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
    pub raw: String,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

/// Number with an optional unit suffix (`10px`, `50%`, `.5`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub val: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinOp {
    pub op: String,
    pub left: Box<Node>,
    pub right: Box<Node>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Str {
    pub val: String,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Expression {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

/// Map literal, values keep their declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    #[serde(default)]
    pub vals: IndexMap<String, Node>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ternary {
    pub cond: Box<Node>,
    pub true_expr: Box<Node>,
    pub false_expr: Box<Node>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub segments: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<Expression>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

/// Inline `@block` value; its statements are properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atblock {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

/// `group`, `root` and `block` nodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Container {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Rc<Node>>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

/// Directive nodes (`@media`, `@keyframes`, `@import`, ...).
///
/// `val` holds the directive's text after the keyword: the media query,
/// the keyframes name, the import path, the raw `@css` body, ...
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AtRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Rc<Node>>,
    #[serde(default)]
    pub lineno: usize,
    #[serde(default)]
    pub column: usize,
}

impl Node {
    /// An empty `root`, the tree substituted for unparseable input.
    pub fn empty_root() -> Self {
        Node::Root(Container::default())
    }

    /// The node's tag as it appears in `nodeName`.
    pub fn node_name(&self) -> &'static str {
        match self {
            Node::Ident(_) => "ident",
            Node::Selector(_) => "selector",
            Node::Call(_) => "call",
            Node::Function(_) => "function",
            Node::Rgba(_) => "rgba",
            Node::Unit(_) => "unit",
            Node::BinOp(_) => "binop",
            Node::String(_) => "string",
            Node::Expression(_) => "expression",
            Node::Object(_) => "object",
            Node::Ternary(_) => "ternary",
            Node::Property(_) => "property",
            Node::Atblock(_) => "atblock",
            Node::Group(_) => "group",
            Node::Root(_) => "root",
            Node::Block(_) => "block",
            Node::Media(_) => "media",
            Node::Keyframes(_) => "keyframes",
            Node::Atrule(_) => "atrule",
            Node::Import(_) => "import",
            Node::Require(_) => "require",
            Node::Supports(_) => "supports",
            Node::Literal(_) => "literal",
            Node::Other => "other",
        }
    }

    /// The node's child list (`nodes`), empty for leaf kinds.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Group(c) | Node::Root(c) | Node::Block(c) => &c.nodes,
            Node::Expression(e) => &e.nodes,
            Node::Atblock(a) => &a.nodes,
            _ => &[],
        }
    }

    /// The node's nested rule body, if any.
    pub fn block(&self) -> Option<&Rc<Node>> {
        match self {
            Node::Selector(s) => s.block.as_ref(),
            Node::Function(f) => f.block.as_ref(),
            Node::Group(c) | Node::Root(c) | Node::Block(c) => c.block.as_ref(),
            Node::Media(r)
            | Node::Keyframes(r)
            | Node::Atrule(r)
            | Node::Import(r)
            | Node::Require(r)
            | Node::Supports(r)
            | Node::Literal(r) => r.block.as_ref(),
            _ => None,
        }
    }

    /// `group`, `root` and `block` only structure the tree.
    pub fn is_wrapper(&self) -> bool {
        matches!(self, Node::Group(_) | Node::Root(_) | Node::Block(_))
    }

    /// 1-based line reported by the parser, 0 when unknown.
    pub fn lineno(&self) -> usize {
        match self {
            Node::Ident(n) => n.lineno,
            Node::Selector(n) => n.lineno,
            Node::Call(n) => n.lineno,
            Node::Function(n) => n.lineno,
            Node::Rgba(n) => n.lineno,
            Node::Unit(n) => n.lineno,
            Node::BinOp(n) => n.lineno,
            Node::String(n) => n.lineno,
            Node::Expression(n) => n.lineno,
            Node::Object(n) => n.lineno,
            Node::Ternary(n) => n.lineno,
            Node::Property(n) => n.lineno,
            Node::Atblock(n) => n.lineno,
            Node::Group(n) | Node::Root(n) | Node::Block(n) => n.lineno,
            Node::Media(n)
            | Node::Keyframes(n)
            | Node::Atrule(n)
            | Node::Import(n)
            | Node::Require(n)
            | Node::Supports(n)
            | Node::Literal(n) => n.lineno,
            Node::Other => 0,
        }
    }

    /// 1-based column reported by the parser, 0 when unknown.
    pub fn column(&self) -> usize {
        match self {
            Node::Ident(n) => n.column,
            Node::Selector(n) => n.column,
            Node::Call(n) => n.column,
            Node::Function(n) => n.column,
            Node::Rgba(n) => n.column,
            Node::Unit(n) => n.column,
            Node::BinOp(n) => n.column,
            Node::String(n) => n.column,
            Node::Expression(n) => n.column,
            Node::Object(n) => n.column,
            Node::Ternary(n) => n.column,
            Node::Property(n) => n.column,
            Node::Atblock(n) => n.column,
            Node::Group(n) | Node::Root(n) | Node::Block(n) => n.column,
            Node::Media(n)
            | Node::Keyframes(n)
            | Node::Atrule(n)
            | Node::Import(n)
            | Node::Require(n)
            | Node::Supports(n)
            | Node::Literal(n) => n.column,
            Node::Other => 0,
        }
    }
}

impl Property {
    /// Property name with interpolated fragments left out.
    pub fn name(&self) -> String {
        self.segments.iter().filter_map(|s| s.string.as_deref()).collect()
    }
}

/// Renders value nodes back to Stylus source; structural nodes render as
/// their tag.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Ident(n) => write!(f, "{}", n.name),
            Node::Rgba(n) => write!(f, "{}", n.raw),
            Node::Unit(n) => write!(f, "{}{}", n.val, n.unit.as_deref().unwrap_or("")),
            Node::String(n) => write!(f, "'{}'", n.val),
            Node::BinOp(n) => write!(f, "{} {} {}", n.left, n.op, n.right),
            Node::Call(n) => {
                write!(f, "{}(", n.name)?;
                for (i, arg) in n.args.nodes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Node::Expression(n) => {
                for (i, node) in n.nodes.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", node)?;
                }
                Ok(())
            }
            Node::Ternary(n) => write!(f, "{} ? {} : {}", n.cond, n.true_expr, n.false_expr),
            Node::Object(n) => {
                write!(f, "{{")?;
                for (i, (key, val)) in n.vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, val)?;
                }
                write!(f, "}}")
            }
            other => write!(f, "[{}]", other.node_name()),
        }
    }
}
