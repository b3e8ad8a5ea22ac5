use std::fmt;

use crate::keywords::Keyword;
use crate::token::Token;

/// Lexer error returned when tokenization fails.
#[derive(Debug, Clone, PartialEq)]
pub struct LexerError {
    pub message: String,
    pub position: usize,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lexer error at position {}: {}", self.position, self.message)
    }
}

impl std::error::Error for LexerError {}

/// SQL Lexer - converts SQL text into tokens.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    /// Create a new lexer from SQL input.
    pub fn new(input: &str) -> Self {
        Lexer { input: input.chars().collect(), position: 0 }
    }

    /// Tokenize the entire input.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_eof() {
                tokens.push(Token::Eof);
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Get the next token.
    fn next_token(&mut self) -> Result<Token, LexerError> {
        let ch = self.current_char();

        match ch {
            ';' => {
                self.advance();
                Ok(Token::Semicolon)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            '.' => {
                self.advance();
                Ok(Token::Dot)
            }
            '(' => {
                self.advance();
                Ok(Token::LParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RParen)
            }
            '+' => {
                self.advance();
                Ok(Token::Plus)
            }
            '-' => {
                self.advance();
                Ok(Token::Minus)
            }
            '*' => {
                self.advance();
                Ok(Token::Star)
            }
            '=' => {
                self.advance();
                Ok(Token::Operator("=".to_string()))
            }
            '<' | '>' | '!' => {
                self.advance();
                if !self.is_eof() {
                    match (ch, self.current_char()) {
                        ('<', '=') => {
                            self.advance();
                            return Ok(Token::Operator("<=".to_string()));
                        }
                        ('>', '=') => {
                            self.advance();
                            return Ok(Token::Operator(">=".to_string()));
                        }
                        ('!', '=') => {
                            self.advance();
                            return Ok(Token::Operator("!=".to_string()));
                        }
                        ('<', '>') => {
                            self.advance();
                            return Ok(Token::Operator("!=".to_string()));
                        }
                        _ => {}
                    }
                }
                match ch {
                    '<' => Ok(Token::Operator("<".to_string())),
                    '>' => Ok(Token::Operator(">".to_string())),
                    _ => Err(self.error("expected '=' after '!'")),
                }
            }
            c if c.is_ascii_digit() => self.lex_number(),
            c if c.is_alphabetic() || c == '_' => Ok(self.lex_identifier()),
            c => Err(self.error(&format!("unexpected character '{}'", c))),
        }
    }

    fn lex_number(&mut self) -> Result<Token, LexerError> {
        let start = self.position;
        while !self.is_eof() && self.current_char().is_ascii_digit() {
            self.advance();
        }
        let text: String = self.input[start..self.position].iter().collect();
        let value = text
            .parse::<i64>()
            .map_err(|_| self.error(&format!("integer literal '{}' out of range", text)))?;
        Ok(Token::Integer(value))
    }

    fn lex_identifier(&mut self) -> Token {
        let start = self.position;
        while !self.is_eof() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.input[start..self.position].iter().collect();

        match Keyword::from_ident(&text) {
            Some(keyword) => Token::Keyword(keyword),
            None => Token::Identifier(text),
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.is_eof() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    fn error(&self, message: &str) -> LexerError {
        LexerError { message: message.to_string(), position: self.position }
    }
}
