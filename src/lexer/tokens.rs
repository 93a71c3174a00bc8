use lazy_static::lazy_static;
use std::{collections::HashMap, fmt::Display};

use crate::Span;

lazy_static! {
    /// Keywords; every other word lexes as an identifier.
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, TokenKind> = [
        ("let", TokenKind::Let),
        ("const", TokenKind::Const),
        ("fn", TokenKind::Fn),
        ("return", TokenKind::Return),
        ("if", TokenKind::If),
        ("else", TokenKind::Else),
        ("true", TokenKind::True),
        ("false", TokenKind::False),
        ("print", TokenKind::Print),
    ]
    .into_iter()
    .collect();
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,

    // Literals and names
    Number,
    String,
    Char,
    Identifier,

    // Grouping
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,

    // Operators
    Plus,
    Dash,
    Star,
    Slash,
    Assignment,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    // Punctuation
    Colon,
    Comma,
    Semicolon,

    // Keywords
    Let,
    Const,
    Fn,
    Return,
    If,
    Else,
    True,
    False,
    Print,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text, with escapes already resolved for string and char literals
    pub value: String,
    pub span: Span,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}' at line {}", self.kind, self.value, self.span.line())
    }
}
