//! Recursive descent over value tokens
//!
//! Precedence, loosest first: ternary, `and`/`or`, equality, relational,
//! additive, multiplicative, unary. A value is a list of such terms; commas
//! at the top level only separate terms.

use super::lexer::{Token, TokenKind};
use super::ParseError;
use crate::ast::{Arguments, BinOp, Call, Expression, Ident, Node, Object, RgbaLiteral, Str, Ternary, Unit};
use crate::color::parse_hex_color;
use indexmap::IndexMap;

struct ExprParser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> ExprParser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, ahead: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + ahead)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn last_line(&self) -> usize {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)).map_or(0, |t| t.line)
    }

    fn error_at(&self, token: Option<&Token>, message: impl Into<String>) -> ParseError {
        let fallback = self.tokens.last();
        match token.or(fallback) {
            Some(t) => ParseError::new(message, t.line, t.column),
            None => ParseError::new(message, 0, 0),
        }
    }

    fn expect_op(&mut self, op: &str) -> Result<(), ParseError> {
        match self.peek() {
            Some(t) if t.is_op(op) => {
                self.pos += 1;
                Ok(())
            }
            other => Err(self.error_at(other, format!("expected '{}'", op))),
        }
    }

    /// Token closes the enclosing construct or separates terms.
    fn at_boundary(&self) -> bool {
        matches!(
            self.peek().map(|t| &t.kind),
            None | Some(TokenKind::Comma)
                | Some(TokenKind::RParen)
                | Some(TokenKind::RBrace)
                | Some(TokenKind::RBracket)
        )
    }

    fn list(&mut self) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Comma {
                self.pos += 1;
                continue;
            }
            nodes.push(self.ternary()?);
        }
        Ok(nodes)
    }

    fn ternary(&mut self) -> Result<Node, ParseError> {
        let cond = self.logical()?;
        if !self.peek().is_some_and(|t| t.is_op("?")) {
            return Ok(cond);
        }
        self.pos += 1;
        let true_expr = self.branch(true)?;
        self.expect_op(":")?;
        let false_expr = self.branch(false)?;
        Ok(Node::Ternary(Ternary {
            lineno: cond.lineno(),
            column: cond.column(),
            cond: Box::new(cond),
            true_expr: Box::new(Node::Expression(true_expr)),
            false_expr: Box::new(Node::Expression(false_expr)),
        }))
    }

    /// Terms of one ternary branch; the true branch ends at its `:`.
    fn branch(&mut self, until_colon: bool) -> Result<Expression, ParseError> {
        let start = self.peek();
        let mut expr = Expression {
            nodes: Vec::new(),
            lineno: start.map_or(0, |t| t.line),
            column: start.map_or(0, |t| t.column),
        };
        while !self.at_boundary() && !(until_colon && self.peek().is_some_and(|t| t.is_op(":"))) {
            expr.nodes.push(self.ternary()?);
        }
        if expr.nodes.is_empty() {
            return Err(self.error_at(self.peek(), "expected expression"));
        }
        Ok(expr)
    }

    fn binary(left: Node, op: &str, right: Node) -> Node {
        Node::BinOp(BinOp {
            lineno: left.lineno(),
            column: left.column(),
            op: op.to_string(),
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn logical(&mut self) -> Result<Node, ParseError> {
        let mut left = self.equality()?;
        loop {
            let op = match self.peek() {
                Some(t) if t.is_op("&&") || t.is_ident("and") => "&&",
                Some(t) if t.is_op("||") || t.is_ident("or") => "||",
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.equality()?;
            left = Self::binary(left, op, right);
        }
    }

    fn equality(&mut self) -> Result<Node, ParseError> {
        let mut left = self.relational()?;
        loop {
            let op = match self.peek() {
                Some(t) if t.is_op("==") => "==",
                Some(t) if t.is_op("!=") => "!=",
                Some(t) if t.is_ident("is") => {
                    if self.peek_at(1).is_some_and(|n| n.is_ident("not")) {
                        self.pos += 1;
                        "!="
                    } else {
                        "=="
                    }
                }
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.relational()?;
            left = Self::binary(left, op, right);
        }
    }

    fn relational(&mut self) -> Result<Node, ParseError> {
        let mut left = self.additive()?;
        while let Some(op) = self.peek().and_then(|t| match t.kind {
            TokenKind::Op(op @ ("<" | ">" | "<=" | ">=")) => Some(op),
            _ => None,
        }) {
            self.pos += 1;
            let right = self.additive()?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    /// `a - b` and `a-b` subtract; `a -b` starts a new negative term.
    fn is_binary_minus(&self) -> bool {
        match (self.peek(), self.peek_at(1)) {
            (Some(minus), Some(next)) if minus.is_op("-") => minus.space_before == next.space_before,
            _ => false,
        }
    }

    fn additive(&mut self) -> Result<Node, ParseError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = if self.peek().is_some_and(|t| t.is_op("+")) {
                "+"
            } else if self.is_binary_minus() {
                "-"
            } else {
                return Ok(left);
            };
            self.pos += 1;
            let right = self.multiplicative()?;
            left = Self::binary(left, op, right);
        }
    }

    fn multiplicative(&mut self) -> Result<Node, ParseError> {
        let mut left = self.unary()?;
        while let Some(op) = self.peek().and_then(|t| match t.kind {
            TokenKind::Op(op @ ("*" | "/" | "%")) => Some(op),
            _ => None,
        }) {
            self.pos += 1;
            let right = self.unary()?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Node, ParseError> {
        match self.peek() {
            Some(t) if t.is_op("-") => {
                self.pos += 1;
                Ok(match self.unary()? {
                    Node::Unit(mut unit) => {
                        unit.val = -unit.val;
                        unit.column = t.column;
                        Node::Unit(unit)
                    }
                    _ => Node::Other,
                })
            }
            Some(t) if t.is_op("+") => {
                self.pos += 1;
                self.unary()
            }
            Some(t) if t.is_op("!") || t.is_ident("not") => {
                self.pos += 1;
                self.unary()?;
                Ok(Node::Other)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.advance() else {
            return Err(self.error_at(None, "unexpected end of expression"));
        };
        let (lineno, column) = (token.line, token.column);

        match &token.kind {
            TokenKind::Number { value, unit } => {
                Ok(Node::Unit(Unit { val: *value, unit: unit.clone(), lineno, column }))
            }
            TokenKind::Hash(raw) => Ok(match parse_hex_color(raw) {
                Ok(color) => Node::Rgba(RgbaLiteral {
                    r: color.red,
                    g: color.green,
                    b: color.blue,
                    a: color.alpha,
                    raw: raw.clone(),
                    lineno,
                    column,
                }),
                Err(_) => Node::Ident(Ident { name: raw.clone(), val: None, lineno, column }),
            }),
            TokenKind::Str(val) => Ok(Node::String(Str { val: val.clone(), lineno, column })),
            TokenKind::Url(body) => {
                let arg = Expression {
                    nodes: vec![Node::String(Str { val: body.clone(), lineno, column })],
                    lineno,
                    column,
                };
                Ok(Node::Call(Call {
                    name: "url".to_string(),
                    args: Arguments { nodes: vec![Node::Expression(arg)] },
                    lineno,
                    column,
                }))
            }
            TokenKind::Ident(name) => self.ident(name, lineno, column),
            TokenKind::LParen => {
                let mut expr = Expression { nodes: Vec::new(), lineno, column };
                loop {
                    match self.peek().map(|t| &t.kind) {
                        None => return Err(ParseError::new("unclosed '('", lineno, column)),
                        Some(TokenKind::RParen) => {
                            self.pos += 1;
                            break;
                        }
                        Some(TokenKind::Comma) => self.pos += 1,
                        Some(_) => expr.nodes.push(self.ternary()?),
                    }
                }
                Ok(Node::Expression(expr))
            }
            TokenKind::LBrace => self.object(lineno, column),
            _ => Err(self.error_at(Some(token), "unexpected token")),
        }
    }

    fn ident(&mut self, name: &str, lineno: usize, column: usize) -> Result<Node, ParseError> {
        let glued = |t: &Token| !t.space_before;

        if self.peek().is_some_and(|t| glued(t) && t.kind == TokenKind::LParen) {
            self.pos += 1;
            let args = self.arguments(lineno, column)?;
            return Ok(Node::Call(Call { name: name.to_string(), args, lineno, column }));
        }

        let mut name = name.to_string();
        // Member access: `$theme.primary`
        while let (Some(dot), Some(member)) = (self.peek(), self.peek_at(1)) {
            match &member.kind {
                TokenKind::Ident(key) if dot.is_op(".") && glued(dot) && glued(member) => {
                    name.push('.');
                    name.push_str(key);
                    self.pos += 2;
                }
                _ => break,
            }
        }
        // Subscript: `$list[0]`
        if self.peek().is_some_and(|t| glued(t) && t.kind == TokenKind::LBracket) {
            let (open_line, open_column) = self.peek().map_or((lineno, column), |t| (t.line, t.column));
            self.pos += 1;
            while !matches!(self.peek().map(|t| &t.kind), Some(TokenKind::RBracket)) {
                if self.peek().is_none() {
                    return Err(ParseError::new("unclosed '['", open_line, open_column));
                }
                self.ternary()?;
            }
            self.pos += 1;
        }
        // Rest parameter: `args...`
        if self.peek().is_some_and(|t| glued(t) && t.is_op("...")) {
            self.pos += 1;
        }

        Ok(Node::Ident(Ident { name, val: None, lineno, column }))
    }

    /// Arguments after `(`: one expression per comma separated argument.
    fn arguments(&mut self, lineno: usize, column: usize) -> Result<Arguments, ParseError> {
        let mut args = Vec::new();
        let mut current: Option<Expression> = None;
        loop {
            let Some(token) = self.peek() else {
                return Err(ParseError::new("unclosed '('", lineno, column));
            };
            match token.kind {
                TokenKind::RParen => {
                    self.pos += 1;
                    break;
                }
                TokenKind::Comma => {
                    self.pos += 1;
                    args.push(Node::Expression(current.take().unwrap_or_default()));
                }
                _ => {
                    let node = self.ternary()?;
                    current
                        .get_or_insert_with(|| Expression {
                            nodes: Vec::new(),
                            lineno: token.line,
                            column: token.column,
                        })
                        .nodes
                        .push(node);
                }
            }
        }
        if let Some(last) = current {
            args.push(Node::Expression(last));
        }
        Ok(Arguments { nodes: args })
    }

    /// Object literal after `{`. Entries end at a comma, the closing brace
    /// or a line break.
    fn object(&mut self, lineno: usize, column: usize) -> Result<Node, ParseError> {
        let mut vals = IndexMap::new();
        loop {
            let Some(token) = self.advance() else {
                return Err(ParseError::new("unclosed object literal", lineno, column));
            };
            let key = match &token.kind {
                TokenKind::RBrace => break,
                TokenKind::Comma => continue,
                TokenKind::Ident(key) | TokenKind::Str(key) => key.clone(),
                _ => return Err(self.error_at(Some(token), "expected object key")),
            };
            self.expect_op(":")?;

            let mut value = Expression { nodes: Vec::new(), lineno: token.line, column: token.column };
            while !self.at_boundary() {
                let next_line = self.peek().map_or(0, |t| t.line);
                if !value.nodes.is_empty() && next_line != self.last_line() {
                    break;
                }
                value.nodes.push(self.ternary()?);
            }
            vals.insert(key, Node::Expression(value));
        }
        Ok(Node::Object(Object { vals, lineno, column }))
    }
}

/// Parse a complete value into its list of terms.
pub fn parse_terms(tokens: &[Token]) -> Result<Vec<Node>, ParseError> {
    ExprParser { tokens, pos: 0 }.list()
}

/// Parse a complete value into an `expression` node.
///
/// `line` and `column` locate an empty value.
pub fn parse_expression(tokens: &[Token], line: usize, column: usize) -> Result<Expression, ParseError> {
    let (lineno, column) = tokens.first().map_or((line, column), |t| (t.line, t.column));
    Ok(Expression { nodes: parse_terms(tokens)?, lineno, column })
}
