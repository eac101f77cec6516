//! Line structure: indentation, statements and rule bodies
//!
//! Source is read as logical lines (a physical line plus any continuation
//! lines needed to close open brackets or a trailing comma), arranged into a
//! tree by indentation, and each tree node becomes one statement.

use super::expr::{parse_expression, parse_terms};
use super::lexer::{tokenize, Token};
use super::ParseError;
use crate::ast::{
    Arguments, AtRule, Atblock, Call, Container, Expression, Function, Ident, Node, Property,
    Segment, Selector,
};
use regex::Regex;
use std::rc::Rc;
use std::sync::LazyLock;

static ASSIGNMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w$-]+)\s*(\?=|:=|=)(?:[^=]|$)").unwrap());
static FUNCTION_DEF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w$-]+)\(([^()]*)\)$").unwrap());
static INTERPOLATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\{([^{}]+)\}$").unwrap());
static PROPERTY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((?:[-\w]|\{[^{}]*\})+)(?::\s*|\s+)(\S.*)$").unwrap());

/// Leading words of control flow lines; their bodies are kept, the
/// conditions are not.
const CONTROL_KEYWORDS: &[&str] = &["if", "else", "unless", "for"];

/// Operators that make `name <op> ...` an expression rather than a property.
const INFIX_PREFIXES: &[&str] =
    &["?", "=", "!=", "<", ">", "*", "/", "%", "+", "- ", "&&", "||", "..."];
const INFIX_WORDS: &[&str] = &["and", "or", "is", "in", "isnt"];

/// A piece of source on a single physical line.
#[derive(Debug, Clone)]
struct Fragment {
    lineno: usize,
    /// Byte offset of `text` within the physical line
    offset: usize,
    text: String,
}

#[derive(Debug)]
struct Line {
    indent: usize,
    head: Fragment,
    tail: Vec<Fragment>,
}

impl Line {
    fn lineno(&self) -> usize {
        self.head.lineno
    }

    fn column(&self) -> usize {
        self.head.offset + 1
    }

    fn fragments(&self) -> impl Iterator<Item = &Fragment> {
        std::iter::once(&self.head).chain(self.tail.iter())
    }

    /// Tokens from byte `start` of the head through the last continuation line.
    fn tokens_from(&self, start: usize) -> Result<Vec<Token>, ParseError> {
        let head = self.head.text.get(start..).unwrap_or("");
        let mut tokens = tokenize(head, self.head.lineno, self.head.offset + start)?;
        for fragment in &self.tail {
            tokens.extend(tokenize(&fragment.text, fragment.lineno, fragment.offset)?);
        }
        Ok(tokens)
    }
}

#[derive(Debug)]
struct LineTree {
    line: Line,
    children: Vec<LineTree>,
}

/// Replace comment text with spaces so byte offsets stay valid.
fn blank_comments(raw: &str, in_comment: &mut bool) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut quote: Option<char> = None;
    let mut chars = raw.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = bytes.get(i + 1).copied();
        if *in_comment {
            if c == '*' && next == Some(b'/') {
                chars.next();
                out.push_str("  ");
                *in_comment = false;
            } else {
                out.extend(std::iter::repeat(' ').take(c.len_utf8()));
            }
            continue;
        }
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '/') if next == Some(b'*') => {
                chars.next();
                out.push_str("  ");
                *in_comment = true;
                continue;
            }
            // `//` starts a comment unless it is part of a URL scheme
            (None, '/') if next == Some(b'/') && !raw[..i].ends_with(':') => {
                out.extend(std::iter::repeat(' ').take(raw.len() - i));
                break;
            }
            _ => {}
        }
        out.push(c);
    }
    out
}

/// Net count of opening brackets outside strings.
fn bracket_depth(text: &str, count_braces: bool) -> i32 {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    for c in text.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, '{') if count_braces => depth += 1,
            (None, '}') if count_braces => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// An assignment whose value may span lines (`$map = {` ...).
fn is_value_line(text: &str) -> bool {
    ASSIGNMENT_RE
        .captures(text)
        .and_then(|caps| caps.get(2))
        .is_some_and(|op| !text[op.end()..].trim_start().starts_with("@block"))
}

/// One statement of a line that packs several, such as
/// `a { color: red; margin: 0 }`. `depth` counts the inline braces around it.
#[derive(Debug, PartialEq)]
struct Piece<'a> {
    depth: usize,
    offset: usize,
    text: &'a str,
}

fn push_piece<'a>(pieces: &mut Vec<Piece<'a>>, text: &'a str, start: usize, end: usize, depth: usize) {
    let part = &text[start..end];
    let trimmed = part.trim();
    if !trimmed.is_empty() {
        let offset = start + part.len() - part.trim_start().len();
        pieces.push(Piece { depth, offset, text: trimmed });
    }
}

/// Split a line on top-level `;` and on inline `{ ... }` rule bodies.
///
/// A brace opens a body when it follows whitespace and is followed by
/// whitespace or the end of the line; any other brace is an interpolation.
fn split_statements(text: &str) -> Vec<Piece<'_>> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    // true for a rule body, false for an interpolation
    let mut braces: Vec<bool> = Vec::new();
    let mut depth = 0;
    let mut nesting = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => nesting += 1,
            (None, ')' | ']') => nesting -= 1,
            (None, '{') => {
                let opens_body = nesting == 0
                    && !text[start..i].trim().is_empty()
                    && text[..i].ends_with(char::is_whitespace)
                    && bytes.get(i + 1).map_or(true, u8::is_ascii_whitespace);
                if opens_body {
                    push_piece(&mut pieces, text, start, i, depth);
                    depth += 1;
                    start = i + 1;
                } else {
                    nesting += 1;
                }
                braces.push(opens_body);
            }
            (None, '}') => match braces.pop() {
                Some(true) => {
                    push_piece(&mut pieces, text, start, i, depth);
                    depth -= 1;
                    start = i + 1;
                }
                Some(false) => nesting -= 1,
                // Closer of a body opened on an earlier line
                None => {
                    push_piece(&mut pieces, text, start, i, depth);
                    start = i + 1;
                }
            },
            (None, ';') if nesting == 0 => {
                push_piece(&mut pieces, text, start, i, depth);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_piece(&mut pieces, text, start, text.len(), depth);
    pieces
}

/// Queue a complete line, expanding packed statements into lines of their
/// own one indentation step below the line per inline brace.
fn push_line(lines: &mut Vec<Line>, line: Line, verbatim: bool) {
    if verbatim || !line.tail.is_empty() {
        lines.push(line);
        return;
    }

    let pieces: Vec<(usize, usize, String)> = split_statements(&line.head.text)
        .into_iter()
        .map(|piece| (piece.depth, piece.offset, piece.text.to_string()))
        .collect();
    if let [(0, 0, text)] = pieces.as_slice() {
        if *text == line.head.text {
            lines.push(line);
            return;
        }
    }
    for (depth, offset, text) in pieces {
        lines.push(Line {
            indent: line.indent + depth,
            head: Fragment { lineno: line.head.lineno, offset: line.head.offset + offset, text },
            tail: Vec::new(),
        });
    }
}

struct Pending {
    line: Line,
    depth: i32,
    count_braces: bool,
}

impl Pending {
    fn is_open(&self) -> bool {
        let last = self.line.tail.last().unwrap_or(&self.line.head);
        self.depth > 0 || last.text.ends_with(',')
    }
}

fn scan_lines(text: &str) -> Result<Vec<Line>, ParseError> {
    let mut lines = Vec::new();
    let mut in_comment = false;
    let mut pending: Option<Pending> = None;
    let mut raw_indent: Option<usize> = None;

    for (index, raw) in text.split('\n').enumerate() {
        let lineno = index + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let cleaned = blank_comments(raw, &mut in_comment);
        let content = cleaned.trim_end();
        let trimmed = content.trim_start();
        let indent = content.len() - trimmed.len();

        if let Some(open) = pending.as_mut() {
            if !trimmed.is_empty() {
                let text = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
                open.depth += bracket_depth(text, open.count_braces);
                open.line.tail.push(Fragment { lineno, offset: indent, text: text.to_string() });
            }
            if !open.is_open() {
                if let Some(done) = pending.take() {
                    if raw_indent.is_some_and(|outer| done.line.indent <= outer) {
                        raw_indent = None;
                    }
                    lines.push(done.line);
                }
            }
            continue;
        }

        // `} else {` style closers
        let unbraced = trimmed.trim_start_matches('}').trim_start();
        let offset = indent + (trimmed.len() - unbraced.len());
        let mut text = unbraced.strip_suffix(';').unwrap_or(unbraced).trim_end();
        if text.is_empty() {
            continue;
        }

        let value_line = is_value_line(text);
        if !value_line {
            text = text.strip_suffix('{').unwrap_or(text).trim_end();
            if text.is_empty() {
                continue;
            }
        }

        let line = Line {
            indent,
            head: Fragment { lineno, offset, text: text.to_string() },
            tail: Vec::new(),
        };
        let open = Pending { depth: bracket_depth(text, value_line), line, count_braces: value_line };
        if open.is_open() {
            pending = Some(open);
        } else {
            // `@css` bodies are passed through untouched
            let literal = raw_indent.is_some_and(|outer| open.line.indent > outer);
            if !literal {
                raw_indent = open.line.head.text.starts_with("@css").then_some(open.line.indent);
            }
            push_line(&mut lines, open.line, value_line || literal);
        }
    }

    match pending {
        Some(open) if open.depth > 0 => {
            Err(ParseError::new("unclosed bracket", open.line.lineno(), open.line.column()))
        }
        // A dangling trailing comma is harmless
        Some(open) => {
            lines.push(open.line);
            Ok(lines)
        }
        None => Ok(lines),
    }
}

fn build_tree<I>(lines: &mut std::iter::Peekable<I>, parent_indent: Option<usize>) -> Vec<LineTree>
where
    I: Iterator<Item = Line>,
{
    let mut trees = Vec::new();
    while let Some(line) = lines.next_if(|l| parent_indent.map_or(true, |p| l.indent > p)) {
        let children = build_tree(lines, Some(line.indent));
        trees.push(LineTree { line, children });
    }
    trees
}

/// Parse a whole document into a `root` node.
pub fn parse_document(text: &str) -> Result<Node, ParseError> {
    let lines = scan_lines(text)?;
    let trees = build_tree(&mut lines.into_iter().peekable(), None);
    Ok(Node::Root(Container { nodes: statements(&trees)?, block: None, lineno: 1, column: 1 }))
}

fn statements(trees: &[LineTree]) -> Result<Vec<Node>, ParseError> {
    trees.iter().map(statement).collect()
}

fn block(tree: &LineTree) -> Result<Rc<Node>, ParseError> {
    Ok(Rc::new(Node::Block(Container {
        nodes: statements(&tree.children)?,
        block: None,
        lineno: tree.line.lineno(),
        column: tree.line.column(),
    })))
}

/// Reject an indented body under a statement that cannot own one.
fn leaf(tree: &LineTree) -> Result<(), ParseError> {
    match tree.children.first() {
        Some(child) => {
            Err(ParseError::new("unexpected indentation", child.line.lineno(), child.line.column()))
        }
        None => Ok(()),
    }
}

fn statement(tree: &LineTree) -> Result<Node, ParseError> {
    let line = &tree.line;
    let text = line.head.text.as_str();
    let first_word = text.split_whitespace().next().unwrap_or("");

    if text.starts_with('@') {
        return at_rule(tree);
    }
    if let Some(caps) = ASSIGNMENT_RE.captures(text) {
        let name = caps.get(1).map_or("", |m| m.as_str());
        let op_end = caps.get(2).map_or(text.len(), |m| m.end());
        return assignment(tree, name, op_end);
    }
    if first_word == "return" {
        leaf(tree)?;
        return expression_statement(line, "return".len());
    }
    if CONTROL_KEYWORDS.contains(&first_word) {
        return Ok(Node::Block(Container {
            nodes: statements(&tree.children)?,
            block: None,
            lineno: line.lineno(),
            column: line.column(),
        }));
    }

    if !tree.children.is_empty() {
        if let Some(caps) = FUNCTION_DEF_RE.captures(text) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            let params = caps.get(2).map_or("", |m| m.as_str());
            return function(tree, name, params);
        }
    }
    if INTERPOLATION_RE.is_match(text) {
        return selector_call(tree);
    }
    if !tree.children.is_empty() || text.starts_with(['.', '#', '&', '>', '+', '~', '*', '[', ':']) {
        return selector_group(tree);
    }

    leaf(tree)?;
    match property_parts(text) {
        Some((name, value_start)) => property(line, name, value_start),
        None => expression_statement(line, 0),
    }
}

fn expression_statement(line: &Line, start: usize) -> Result<Node, ParseError> {
    let tokens = line.tokens_from(start)?;
    Ok(Node::Expression(parse_expression(&tokens, line.lineno(), line.column())?))
}

fn assignment(tree: &LineTree, name: &str, op_end: usize) -> Result<Node, ParseError> {
    let line = &tree.line;
    let rest = line.head.text[op_end..].trim();

    let val = if rest.trim_end_matches('{').trim_end() == "@block" {
        let value = &line.head.text[op_end..];
        let column = line.head.offset + op_end + (value.len() - value.trim_start().len()) + 1;
        let atblock = Node::Atblock(Atblock { nodes: statements(&tree.children)?, lineno: line.lineno(), column });
        Node::Expression(Expression { nodes: vec![atblock], lineno: line.lineno(), column })
    } else {
        leaf(tree)?;
        let tokens = line.tokens_from(op_end)?;
        Node::Expression(parse_expression(&tokens, line.lineno(), line.head.offset + op_end + 1)?)
    };

    Ok(Node::Ident(Ident {
        name: name.to_string(),
        val: Some(Box::new(val)),
        lineno: line.lineno(),
        column: line.column(),
    }))
}

fn function(tree: &LineTree, name: &str, params: &str) -> Result<Node, ParseError> {
    let line = &tree.line;
    let params = params
        .split(',')
        .filter_map(|param| param.split(['=', ' ']).find(|s| !s.is_empty()))
        .map(|param| param.trim_end_matches("...").to_string())
        .collect();

    let function = Function {
        name: name.to_string(),
        params,
        block: Some(block(tree)?),
        lineno: line.lineno(),
        column: line.column(),
    };
    Ok(Node::Ident(Ident {
        name: name.to_string(),
        val: Some(Box::new(Node::Function(function))),
        lineno: line.lineno(),
        column: line.column(),
    }))
}

/// `{expr}` on its own line: a computed selector.
fn selector_call(tree: &LineTree) -> Result<Node, ParseError> {
    let line = &tree.line;
    let inner_end = line.head.text.len() - 1;
    let tokens = tokenize(&line.head.text[1..inner_end], line.lineno(), line.head.offset + 1)?;
    let expr = parse_expression(&tokens, line.lineno(), line.column() + 1)?;

    let call = Node::Call(Call {
        name: "selector".to_string(),
        args: Arguments { nodes: vec![Node::Expression(expr)] },
        lineno: line.lineno(),
        column: line.column(),
    });
    Ok(Node::Group(Container {
        nodes: vec![call],
        block: Some(block(tree)?),
        lineno: line.lineno(),
        column: line.column(),
    }))
}

/// Split on commas outside brackets, keeping each part's byte offset.
fn split_selectors(text: &str) -> Vec<(usize, &str)> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push((start, &text[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push((start, &text[start..]));

    parts
        .into_iter()
        .filter_map(|(offset, part)| {
            let trimmed = part.trim_start();
            let offset = offset + part.len() - trimmed.len();
            let trimmed = trimmed.trim_end();
            (!trimmed.is_empty()).then_some((offset, trimmed))
        })
        .collect()
}

/// Literal text and `{expr}` interpolations of a selector or property name.
fn segments(text: &str, lineno: usize, offset: usize) -> Result<Vec<Segment>, ParseError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = text;
    let mut consumed = 0;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let close = rest[open..]
            .find('}')
            .map(|c| open + c)
            .ok_or_else(|| ParseError::new("unclosed interpolation", lineno, offset + consumed + open + 1))?;
        if !literal.is_empty() {
            segments.push(Segment { string: Some(std::mem::take(&mut literal)), lineno, nodes: vec![] });
        }
        let inner_offset = offset + consumed + open + 1;
        let tokens = tokenize(&rest[open + 1..close], lineno, inner_offset)?;
        segments.push(Segment { string: None, lineno, nodes: parse_terms(&tokens)? });

        consumed += close + 1;
        rest = &rest[close + 1..];
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment { string: Some(literal), lineno, nodes: vec![] });
    }
    Ok(segments)
}

fn selector_group(tree: &LineTree) -> Result<Node, ParseError> {
    let line = &tree.line;
    let body = block(tree)?;

    let mut selectors = Vec::new();
    for fragment in line.fragments() {
        for (offset, part) in split_selectors(&fragment.text) {
            let column = fragment.offset + offset;
            selectors.push(Node::Selector(Selector {
                segments: segments(part, fragment.lineno, column)?,
                block: Some(Rc::clone(&body)),
                lineno: fragment.lineno,
                column: column + 1,
            }));
        }
    }

    Ok(Node::Group(Container {
        nodes: selectors,
        block: Some(body),
        lineno: line.lineno(),
        column: line.column(),
    }))
}

/// Property name and the byte offset of its value, if `text` reads as
/// `name value` or `name: value`.
fn property_parts(text: &str) -> Option<(&str, usize)> {
    let caps = PROPERTY_RE.captures(text)?;
    let name = caps.get(1)?;
    let value = caps.get(2)?;
    let value_text = value.as_str();

    let first_word = value_text.split_whitespace().next().unwrap_or("");
    if INFIX_PREFIXES.iter().any(|op| value_text.starts_with(op)) || INFIX_WORDS.contains(&first_word) {
        return None;
    }
    Some((name.as_str(), value.start()))
}

fn property(line: &Line, name: &str, value_start: usize) -> Result<Node, ParseError> {
    let tokens = line.tokens_from(value_start)?;
    let expr = parse_expression(&tokens, line.lineno(), line.head.offset + value_start + 1)?;
    Ok(Node::Property(Property {
        segments: segments(name, line.lineno(), line.head.offset)?,
        expr: Some(expr),
        lineno: line.lineno(),
        column: line.column(),
    }))
}

/// Raw text of every line nested under `tree`, for `@css` passthrough.
fn raw_body(tree: &LineTree, out: &mut Vec<String>) {
    for child in &tree.children {
        for fragment in child.line.fragments() {
            out.push(fragment.text.clone());
        }
        raw_body(child, out);
    }
}

fn at_rule(tree: &LineTree) -> Result<Node, ParseError> {
    let line = &tree.line;
    let text = line.head.text.as_str();
    let (keyword, rest) = match text[1..].find(|c: char| c.is_whitespace() || c == '(') {
        Some(end) => (&text[1..end + 1], text[end + 1..].trim()),
        None => (&text[1..], ""),
    };
    let val = (!rest.is_empty()).then(|| rest.to_string());
    let (lineno, column) = (line.lineno(), line.column());

    let with_block = |val: Option<String>| -> Result<AtRule, ParseError> {
        Ok(AtRule { val, block: Some(block(tree)?), lineno, column })
    };

    let node = match keyword {
        "media" => Node::Media(with_block(val)?),
        "supports" => Node::Supports(with_block(val)?),
        k if k == "keyframes" || (k.starts_with('-') && k.ends_with("-keyframes")) => {
            Node::Keyframes(with_block(val)?)
        }
        "import" | "require" => {
            leaf(tree)?;
            let rule = AtRule { val, block: None, lineno, column };
            if keyword == "import" {
                Node::Import(rule)
            } else {
                Node::Require(rule)
            }
        }
        "css" => {
            let mut body = Vec::new();
            raw_body(tree, &mut body);
            Node::Literal(AtRule { val: Some(body.join("\n")), block: None, lineno, column })
        }
        // Stylus specific directives that declare nothing
        "extend" | "extends" | "charset" | "block" | "return" => {
            leaf(tree)?;
            Node::Other
        }
        _ => Node::Atrule(with_block(Some(text[1..].to_string()))?),
    };
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_nodes(text: &str) -> Vec<Node> {
        match parse_document(text).unwrap() {
            Node::Root(root) => root.nodes,
            other => panic!("expected root, got {}", other.node_name()),
        }
    }

    #[test]
    fn test_blank_comments_keeps_offsets() {
        let mut in_comment = false;
        let line = "color red // note";
        let cleaned = blank_comments(line, &mut in_comment);
        assert_eq!(cleaned.len(), line.len());
        assert_eq!(cleaned.trim_end(), "color red");

        let url = blank_comments("background url(http://x.y/z.png)", &mut in_comment);
        assert!(url.contains("http://"));

        let opened = blank_comments("a /* start", &mut in_comment);
        assert!(in_comment);
        assert_eq!(opened.trim_end(), "a");
        let closed = blank_comments("end */ b", &mut in_comment);
        assert!(!in_comment);
        assert_eq!(closed.trim(), "b");
    }

    #[test]
    fn test_variable_assignment() {
        let nodes = root_nodes("$gutter = 10px\n$accent ?= #f00");
        assert_eq!(nodes.len(), 2);
        let Node::Ident(ident) = &nodes[0] else { panic!("expected ident") };
        assert_eq!(ident.name, "$gutter");
        assert_eq!(ident.lineno, 1);
        assert!(matches!(ident.val.as_deref(), Some(Node::Expression(e)) if e.nodes.len() == 1));
        let Node::Ident(accent) = &nodes[1] else { panic!("expected ident") };
        assert_eq!(accent.lineno, 2);
    }

    #[test]
    fn test_function_definition_with_body() {
        let nodes = root_nodes("foo(a, b = 2)\n  bar: 1px");
        let Node::Ident(ident) = &nodes[0] else { panic!("expected ident") };
        let Some(Node::Function(function)) = ident.val.as_deref() else { panic!("expected function") };
        assert_eq!(function.name, "foo");
        assert_eq!(function.params, vec!["a", "b"]);
        let body = function.block.as_ref().unwrap();
        assert!(matches!(&body.children()[0], Node::Property(p) if p.name() == "bar"));
    }

    #[test]
    fn test_mixin_call_without_body_is_expression() {
        let nodes = root_nodes(".a\n  foo()");
        let block = nodes[0].block().unwrap();
        assert!(matches!(&block.children()[0], Node::Expression(e) if matches!(e.nodes[0], Node::Call(_))));
    }

    #[test]
    fn test_selector_group_shares_block() {
        let nodes = root_nodes(".a, .b {\n  color red\n}");
        let Node::Group(group) = &nodes[0] else { panic!("expected group") };
        assert_eq!(group.nodes.len(), 2);
        let Node::Selector(second) = &group.nodes[1] else { panic!("expected selector") };
        assert_eq!(second.column, 5);
        assert!(Rc::ptr_eq(second.block.as_ref().unwrap(), group.block.as_ref().unwrap()));
    }

    #[test]
    fn test_selector_list_over_lines() {
        let nodes = root_nodes(".a,\n.b\n  color red");
        let Node::Group(group) = &nodes[0] else { panic!("expected group") };
        let lines: Vec<usize> = group.nodes.iter().map(Node::lineno).collect();
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn test_selector_interpolation_segments() {
        let nodes = root_nodes(".col-{$size}\n  width 10px");
        let Node::Group(group) = &nodes[0] else { panic!("expected group") };
        let Node::Selector(selector) = &group.nodes[0] else { panic!("expected selector") };
        assert_eq!(selector.segments.len(), 2);
        assert_eq!(selector.segments[0].string.as_deref(), Some(".col-"));
        assert!(matches!(&selector.segments[1].nodes[0], Node::Ident(i) if i.name == "$size"));
    }

    #[test]
    fn test_selector_call_line() {
        let nodes = root_nodes("{mySelectors}\n  color red");
        let Node::Group(group) = &nodes[0] else { panic!("expected group") };
        assert!(matches!(&group.nodes[0], Node::Call(c) if c.name == "selector"));
    }

    #[test]
    fn test_property_forms() {
        let nodes = root_nodes(".a\n  color: red\n  margin -5px 0\n  $dark ? red : blue");
        let body = nodes[0].block().unwrap().children();
        assert!(matches!(&body[0], Node::Property(p) if p.name() == "color"));
        let Node::Property(margin) = &body[1] else { panic!("expected property") };
        assert_eq!(margin.expr.as_ref().unwrap().nodes.len(), 2);
        assert!(matches!(&body[2], Node::Expression(e) if matches!(e.nodes[0], Node::Ternary(_))));
    }

    #[test]
    fn test_split_statements_keeps_interpolation() {
        let pieces = split_statements(".col-{$size} { width: 10px }");
        assert_eq!(
            pieces,
            vec![
                Piece { depth: 0, offset: 0, text: ".col-{$size}" },
                Piece { depth: 1, offset: 15, text: "width: 10px" },
            ]
        );
        assert_eq!(split_statements("margin 0 {$x}").len(), 1);
        assert_eq!(split_statements("background url('a;b')").len(), 1);
    }

    #[test]
    fn test_inline_rule_body() {
        let nodes = root_nodes(".a\n  color red\n.b { color: blue }");
        assert_eq!(nodes.len(), 2);
        let body = nodes[1].block().unwrap().children();
        assert_eq!(body.len(), 1);
        assert!(matches!(&body[0], Node::Property(p) if p.name() == "color"));
    }

    #[test]
    fn test_semicolon_separated_declarations() {
        let nodes = root_nodes("a { color: red; background: blue; }");
        let body = nodes[0].block().unwrap().children();
        let names: Vec<String> = body
            .iter()
            .filter_map(|node| match node {
                Node::Property(p) => Some(p.name()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["color", "background"]);
        assert!(matches!(&body[1], Node::Property(p) if p.column == 17));

        let nodes = root_nodes("a\n  color red; background blue");
        assert_eq!(nodes[0].block().unwrap().children().len(), 2);
    }

    #[test]
    fn test_nested_inline_bodies() {
        let nodes = root_nodes("@media screen { .a { color: red } }\n.b\n  color blue");
        assert_eq!(nodes.len(), 2);
        let media = nodes[0].block().unwrap().children();
        assert!(matches!(&media[0], Node::Group(_)));
        assert_eq!(media[0].block().unwrap().children().len(), 1);
    }

    #[test]
    fn test_at_rules() {
        let text = "@import 'base'\n@media screen\n  .a\n    color red\n@keyframes spin\n  from\n    opacity 0\n@css {\n  .raw { x: y }\n}\n@font-face\n  font-family x";
        let nodes = root_nodes(text);
        let tags: Vec<&str> = nodes.iter().map(Node::node_name).collect();
        assert_eq!(tags, vec!["import", "media", "keyframes", "literal", "atrule"]);
        let Node::Media(media) = &nodes[1] else { panic!("expected media") };
        assert_eq!(media.val.as_deref(), Some("screen"));
        let Node::Literal(css) = &nodes[3] else { panic!("expected literal") };
        assert_eq!(css.val.as_deref(), Some(".raw { x: y }"));
    }

    #[test]
    fn test_atblock_value() {
        let nodes = root_nodes("$b = @block\n  color red\n  width 1px");
        let Node::Ident(ident) = &nodes[0] else { panic!("expected ident") };
        let Some(Node::Expression(expr)) = ident.val.as_deref() else { panic!("expected expression") };
        assert!(matches!(&expr.nodes[0], Node::Atblock(a) if a.nodes.len() == 2 && a.column == 6));
    }

    #[test]
    fn test_object_literal_spanning_lines() {
        let nodes = root_nodes("$theme = {\n  primary: red,\n  accent: #fff\n}\n.a\n  color red");
        assert_eq!(nodes.len(), 2);
        let Node::Ident(ident) = &nodes[0] else { panic!("expected ident") };
        let Some(Node::Expression(expr)) = ident.val.as_deref() else { panic!("expected expression") };
        assert!(matches!(&expr.nodes[0], Node::Object(o) if o.vals.len() == 2));
    }

    #[test]
    fn test_control_flow_keeps_body() {
        let nodes = root_nodes("if $dark\n  .a\n    color red\nelse\n  .b\n    color blue");
        assert_eq!(nodes.len(), 2);
        assert!(matches!(&nodes[0].children()[0], Node::Group(_)));
    }

    #[test]
    fn test_errors_carry_line() {
        let err = parse_document("$a = 1px\n  color red").unwrap_err();
        assert_eq!(err.line, 2);
        let err = parse_document(".a\n  color rgba(1, 2").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(parse_document(".a\n  content 'open").is_err());
    }
}
