use std::fmt;

use crate::Keyword;

/// Lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Keyword(Keyword),
    Identifier(String),
    Integer(i64),
    /// Comparison operator text: =, !=, <, <=, >, >=
    Operator(String),
    Plus,
    /// `-` - unary minus for negative integer literals
    Minus,
    /// `*` - multiplication or the select-list wildcard
    Star,
    Comma,
    Dot,
    LParen,
    RParen,
    Semicolon,
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(kw) => write!(f, "{}", kw),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Integer(value) => write!(f, "{}", value),
            Token::Operator(op) => write!(f, "{}", op),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Semicolon => write!(f, ";"),
            Token::Eof => write!(f, "<eof>"),
        }
    }
}
