//! SQL Parser - Lexer and recursive-descent parser
//!
//! Turns SQL text into the `ast` crate's query representation. Only the
//! supported dialect is accepted:
//!
//! ```text
//! SELECT [DISTINCT] * | item {, item}
//! FROM table {, table | [INNER] JOIN table}
//! [WHERE comparison {AND comparison}]
//! [GROUP BY column {, column}]
//! [ORDER BY column {, column}]
//! ```
//!
//! Everything else (OR, subqueries, outer joins, strings, floats) is a
//! `ParseError`.

mod keywords;
mod lexer;
mod parser;
mod token;

pub use keywords::Keyword;
pub use lexer::{Lexer, LexerError};
pub use parser::{parse_select, ParseError, Parser};
pub use token::Token;
