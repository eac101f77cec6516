//! Token extraction for Stylus value expressions
//!
//! Lines are tokenized one at a time; every token carries the 1-based line
//! and column it starts at so that nodes built from it report the same
//! positions as the upstream parser.

use super::ParseError;
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier, including `$var`, `-webkit-x`, `!important` and `@lookup`
    Ident(String),
    Number { value: f64, unit: Option<String> },
    /// `#` followed by name characters, raw text including the hash
    Hash(String),
    Str(String),
    /// `url(...)` body, kept verbatim
    Url(String),
    Op(&'static str),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
    /// Whitespace (or the start of the fragment) precedes the token
    pub space_before: bool,
}

impl Token {
    pub fn is_op(&self, op: &str) -> bool {
        matches!(self.kind, TokenKind::Op(o) if o == op)
    }

    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(n) if n == name)
    }
}

/// Multi-character operators first so the longest match wins.
const OPERATORS: &[&str] = &[
    "...", "==", "!=", ">=", "<=", "&&", "||", "?=", ":=", "+", "-", "*", "/", "%", "<", ">", "=",
    "!", "?", ":", ".", "&", "~",
];

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '$'
}

struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    offset: usize,
}

impl<'a> Lexer<'a> {
    fn column(&self, index: usize) -> usize {
        self.offset + index + 1
    }

    fn error(&self, index: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.line, self.column(index))
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn rest(&self, index: usize) -> &'a str {
        &self.src[index..]
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        while let Some(&(i, c)) = self.chars.peek() {
            if !pred(c) {
                return i;
            }
            self.chars.next();
        }
        self.src.len()
    }

    fn name(&mut self, start: usize) -> String {
        let end = self.take_while(is_name_char);
        self.src[start..end].to_string()
    }

    fn number(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        let mut end = self.take_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.') {
            let mut ahead = self.chars.clone();
            ahead.next();
            if ahead.peek().is_some_and(|&(_, c)| c.is_ascii_digit()) {
                self.chars.next();
                end = self.take_while(|c| c.is_ascii_digit());
            }
        }
        let value: f64 = self.src[start..end]
            .parse()
            .map_err(|_| self.error(start, format!("invalid number '{}'", &self.src[start..end])))?;

        let unit = match self.peek_char() {
            Some('%') => {
                self.chars.next();
                Some("%".to_string())
            }
            Some(c) if c.is_alphabetic() => {
                let unit_end = self.take_while(|c| c.is_alphabetic());
                Some(self.src[end..unit_end].to_string())
            }
            _ => None,
        };
        Ok(TokenKind::Number { value, unit })
    }

    fn string(&mut self, start: usize, quote: char) -> Result<TokenKind, ParseError> {
        let mut value = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                '\\' => {
                    if let Some((_, escaped)) = self.chars.next() {
                        value.push(escaped);
                    }
                }
                c if c == quote => return Ok(TokenKind::Str(value)),
                c => value.push(c),
            }
        }
        Err(self.error(start, "unterminated string"))
    }

    fn url_body(&mut self, start: usize) -> Result<TokenKind, ParseError> {
        // Opening paren
        self.chars.next();
        let body_start = start + 1;
        let end = self.take_while(|c| c != ')');
        if self.chars.next().is_none() {
            return Err(self.error(start, "unclosed url("));
        }
        let body = self.src[body_start..end].trim().trim_matches(|c| c == '"' || c == '\'');
        Ok(TokenKind::Url(body.to_string()))
    }

    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        let mut space_before = false;
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    space_before = true;
                    self.chars.next();
                }
                Some('/') => {
                    let Some(&(start, _)) = self.chars.peek() else { break };
                    if !self.rest(start).starts_with("/*") {
                        break;
                    }
                    match self.rest(start).find("*/") {
                        Some(close) => {
                            let resume = start + close + 2;
                            while self.chars.peek().is_some_and(|&(i, _)| i < resume) {
                                self.chars.next();
                            }
                            space_before = true;
                        }
                        None => return Err(self.error(start, "unclosed comment")),
                    }
                }
                _ => break,
            }
        }

        let Some((start, c)) = self.chars.next() else {
            return Ok(None);
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '\'' | '"' => self.string(start, c)?,
            '#' => {
                let end = self.take_while(is_name_char);
                TokenKind::Hash(self.src[start..end].to_string())
            }
            '@' if self.peek_char().is_some_and(is_name_start) => TokenKind::Ident(self.name(start)),
            '!' if self.peek_char().is_some_and(char::is_alphabetic) => {
                TokenKind::Ident(self.name(start))
            }
            '-' if self.peek_char().is_some_and(|n| is_name_start(n) || n == '-') => {
                TokenKind::Ident(self.name(start))
            }
            c if c.is_ascii_digit() => self.number(start)?,
            '.' if self.peek_char().is_some_and(|n| n.is_ascii_digit()) => self.number(start)?,
            c if is_name_start(c) => {
                let name = self.name(start);
                if name == "url" && self.peek_char() == Some('(') {
                    let paren = start + name.len();
                    self.url_body(paren)?
                } else {
                    TokenKind::Ident(name)
                }
            }
            _ => {
                let rest = self.rest(start);
                let op = OPERATORS
                    .iter()
                    .find(|op| rest.starts_with(**op))
                    .ok_or_else(|| self.error(start, format!("unexpected character '{}'", c)))?;
                for _ in 1..op.len() {
                    self.chars.next();
                }
                TokenKind::Op(*op)
            }
        };

        Ok(Some(Token { kind, line: self.line, column: self.column(start), space_before }))
    }
}

/// Tokenize a fragment of source line `line` that starts at byte `offset`.
pub fn tokenize(src: &str, line: usize, offset: usize) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer { src, chars: src.char_indices().peekable(), line, offset };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src, 1, 0).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn number(value: f64, unit: Option<&str>) -> TokenKind {
        TokenKind::Number { value, unit: unit.map(str::to_string) }
    }

    #[test]
    fn test_units_and_idents() {
        assert_eq!(
            kinds("1px solid $border-color"),
            vec![
                number(1.0, Some("px")),
                TokenKind::Ident("solid".to_string()),
                TokenKind::Ident("$border-color".to_string()),
            ]
        );
        assert_eq!(kinds(".5 50% 120deg"), vec![
            number(0.5, None),
            number(50.0, Some("%")),
            number(120.0, Some("deg")),
        ]);
    }

    #[test]
    fn test_call_tokens() {
        assert_eq!(
            kinds("rgba(10, 20)"),
            vec![
                TokenKind::Ident("rgba".to_string()),
                TokenKind::LParen,
                number(10.0, None),
                TokenKind::Comma,
                number(20.0, None),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            kinds("a == b ? c : d"),
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Op("=="),
                TokenKind::Ident("b".to_string()),
                TokenKind::Op("?"),
                TokenKind::Ident("c".to_string()),
                TokenKind::Op(":"),
                TokenKind::Ident("d".to_string()),
            ]
        );
    }

    #[test]
    fn test_minus_spacing_is_recorded() {
        let tokens = tokenize("10px -5px", 1, 0).unwrap();
        assert!(tokens[1].is_op("-"));
        assert!(tokens[1].space_before);
        assert!(!tokens[2].space_before);
    }

    #[test]
    fn test_hash_string_url_important() {
        assert_eq!(
            kinds("#fff 'a b' url(\"img.png\") !important -webkit-box"),
            vec![
                TokenKind::Hash("#fff".to_string()),
                TokenKind::Str("a b".to_string()),
                TokenKind::Url("img.png".to_string()),
                TokenKind::Ident("!important".to_string()),
                TokenKind::Ident("-webkit-box".to_string()),
            ]
        );
    }

    #[test]
    fn test_columns_include_offset() {
        let tokens = tokenize("red blue", 3, 6).unwrap();
        assert_eq!(tokens[0].column, 7);
        assert_eq!(tokens[1].column, 11);
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn test_inline_block_comment_skipped() {
        assert_eq!(kinds("a /* note */ b").len(), 2);
    }

    #[test]
    fn test_errors() {
        let err = tokenize("'open", 4, 2).unwrap_err();
        assert_eq!(err.line, 4);
        assert_eq!(err.column, 3);
        assert!(tokenize("a ^ b", 1, 0).is_err());
    }
}
