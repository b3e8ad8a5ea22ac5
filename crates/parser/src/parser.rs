use std::fmt;

use ast::{AggregateFunc, ArithOp, ColumnRef, CompareOp, Expression, SelectItem, SelectStmt};

use crate::keywords::Keyword;
use crate::lexer::{Lexer, LexerError};
use crate::token::Token;

/// Parser error returned when the input is outside the supported dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    fn new(message: impl Into<String>) -> Self {
        ParseError { message: message.into() }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<LexerError> for ParseError {
    fn from(err: LexerError) -> Self {
        ParseError::new(err.to_string())
    }
}

/// Parse a single SELECT statement from SQL text.
pub fn parse_select(sql: &str) -> Result<SelectStmt, ParseError> {
    let tokens = Lexer::new(sql).tokenize()?;
    let mut parser = Parser::new(tokens);
    let stmt = parser.parse_select()?;
    parser.expect_end()?;
    Ok(stmt)
}

/// Recursive-descent parser over the token stream.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, position: 0 }
    }

    /// Parse a SELECT statement.
    pub fn parse_select(&mut self) -> Result<SelectStmt, ParseError> {
        self.expect_keyword(Keyword::Select)?;
        let distinct = self.consume_keyword(Keyword::Distinct);
        let select_list = self.parse_select_list()?;

        self.expect_keyword(Keyword::From)?;
        let from = self.parse_table_name()?;
        let mut joins = Vec::new();
        loop {
            if self.consume_token(&Token::Comma) {
                joins.push(self.parse_table_name()?);
            } else if self.peek_keyword(Keyword::Inner) || self.peek_keyword(Keyword::Join) {
                self.consume_keyword(Keyword::Inner);
                self.expect_keyword(Keyword::Join)?;
                joins.push(self.parse_table_name()?);
            } else {
                break;
            }
        }

        let where_clause = if self.consume_keyword(Keyword::Where) {
            Some(self.parse_condition()?)
        } else {
            None
        };

        let group_by = if self.consume_keyword(Keyword::Group) {
            self.expect_keyword(Keyword::By)?;
            self.parse_column_list()?
        } else {
            Vec::new()
        };

        let order_by = if self.consume_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By)?;
            self.parse_order_column_list()?
        } else {
            Vec::new()
        };

        self.consume_token(&Token::Semicolon);
        Ok(SelectStmt { distinct, select_list, from, joins, where_clause, group_by, order_by })
    }

    // ------------------------------------------------------------------
    // SELECT list
    // ------------------------------------------------------------------

    fn parse_select_list(&mut self) -> Result<Vec<SelectItem>, ParseError> {
        if self.consume_token(&Token::Star) {
            // `SELECT *` must stand alone
            if self.peek() == &Token::Comma {
                return Err(ParseError::new("'*' cannot be combined with other select items"));
            }
            return Ok(vec![SelectItem::Wildcard]);
        }

        let mut items = vec![self.parse_select_item()?];
        while self.consume_token(&Token::Comma) {
            items.push(self.parse_select_item()?);
        }
        Ok(items)
    }

    fn parse_select_item(&mut self) -> Result<SelectItem, ParseError> {
        if let Token::Identifier(name) = self.peek() {
            // Function call: identifier directly followed by '('
            if self.peek_at(1) == &Token::LParen {
                let name = name.clone();
                if !name.eq_ignore_ascii_case("SUM") {
                    return Err(ParseError::new(format!("unsupported function '{}'", name)));
                }
                self.advance(); // function name
                self.advance(); // (
                let arg = self.parse_additive()?;
                self.expect_token(&Token::RParen)?;
                return Ok(SelectItem::Aggregate { func: AggregateFunc::Sum, arg });
            }
        }
        Ok(SelectItem::Column(self.parse_column_ref()?))
    }

    // ------------------------------------------------------------------
    // WHERE tree
    // ------------------------------------------------------------------

    /// `comparison {AND comparison}` - OR is rejected up front.
    fn parse_condition(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_comparison()?;
        loop {
            if self.consume_keyword(Keyword::And) {
                let right = self.parse_comparison()?;
                expr = Expression::and(expr, right);
            } else if self.peek_keyword(Keyword::Or) {
                return Err(ParseError::new("OR is not supported"));
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expression, ParseError> {
        if self.peek_keyword(Keyword::Not) {
            return Err(ParseError::new("NOT is not supported"));
        }
        let left = self.parse_additive()?;
        let op = match self.peek() {
            Token::Operator(op) => {
                let op = parse_compare_op(op)?;
                self.advance();
                op
            }
            other => {
                return Err(ParseError::new(format!(
                    "expected comparison operator, found '{}'",
                    other
                )))
            }
        };
        let right = self.parse_additive()?;
        Ok(Expression::compare(op, left, right))
    }

    // ------------------------------------------------------------------
    // Arithmetic ('+' and '*', with the usual precedence)
    // ------------------------------------------------------------------

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_multiplicative()?;
        while self.consume_token(&Token::Plus) {
            let right = self.parse_multiplicative()?;
            expr = Expression::arith(ArithOp::Add, expr, right);
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.consume_token(&Token::Star) {
            let right = self.parse_primary()?;
            expr = Expression::arith(ArithOp::Multiply, expr, right);
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        match self.peek().clone() {
            Token::Integer(value) => {
                self.advance();
                Ok(Expression::Literal(value))
            }
            Token::Minus => {
                self.advance();
                // unary minus applies to integer literals only
                match self.peek().clone() {
                    Token::Integer(value) => {
                        self.advance();
                        Ok(Expression::Literal(-value))
                    }
                    other => Err(ParseError::new(format!(
                        "expected integer after '-', found '{}'",
                        other
                    ))),
                }
            }
            Token::Identifier(_) => Ok(Expression::Column(self.parse_column_ref()?)),
            Token::LParen => {
                self.advance();
                let expr = self.parse_additive()?;
                self.expect_token(&Token::RParen)?;
                Ok(expr)
            }
            other => Err(ParseError::new(format!(
                "expected literal, column, or '(', found '{}'",
                other
            ))),
        }
    }

    // ------------------------------------------------------------------
    // Names
    // ------------------------------------------------------------------

    fn parse_column_ref(&mut self) -> Result<ColumnRef, ParseError> {
        let first = self.parse_identifier()?;
        if self.consume_token(&Token::Dot) {
            let column = self.parse_identifier()?;
            Ok(ColumnRef::qualified(first, column))
        } else {
            Ok(ColumnRef::unqualified(first))
        }
    }

    fn parse_column_list(&mut self) -> Result<Vec<ColumnRef>, ParseError> {
        let mut columns = vec![self.parse_column_ref()?];
        while self.consume_token(&Token::Comma) {
            columns.push(self.parse_column_ref()?);
        }
        Ok(columns)
    }

    fn parse_order_column_list(&mut self) -> Result<Vec<ColumnRef>, ParseError> {
        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_ref()?);
            // ascending only in this dialect; ASC is accepted as a no-op
            self.consume_keyword(Keyword::Asc);
            if self.peek_keyword(Keyword::Desc) {
                return Err(ParseError::new("ORDER BY ... DESC is not supported"));
            }
            if !self.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(columns)
    }

    fn parse_table_name(&mut self) -> Result<String, ParseError> {
        self.parse_identifier()
    }

    fn parse_identifier(&mut self) -> Result<String, ParseError> {
        match self.peek().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(ParseError::new(format!("expected identifier, found '{}'", other))),
        }
    }

    // ------------------------------------------------------------------
    // Token stream helpers
    // ------------------------------------------------------------------

    fn expect_end(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            Token::Eof => Ok(()),
            other => Err(ParseError::new(format!("unexpected trailing input at '{}'", other))),
        }
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.position + offset).unwrap_or(&Token::Eof)
    }

    fn peek_keyword(&self, keyword: Keyword) -> bool {
        self.peek() == &Token::Keyword(keyword)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn consume_token(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        self.consume_token(&Token::Keyword(keyword))
    }

    fn expect_token(&mut self, token: &Token) -> Result<(), ParseError> {
        if self.consume_token(token) {
            Ok(())
        } else {
            Err(ParseError::new(format!("expected '{}', found '{}'", token, self.peek())))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        self.expect_token(&Token::Keyword(keyword))
    }
}

fn parse_compare_op(op: &str) -> Result<CompareOp, ParseError> {
    match op {
        "=" => Ok(CompareOp::Equal),
        "!=" => Ok(CompareOp::NotEqual),
        "<" => Ok(CompareOp::LessThan),
        "<=" => Ok(CompareOp::LessOrEqual),
        ">" => Ok(CompareOp::GreaterThan),
        ">=" => Ok(CompareOp::GreaterOrEqual),
        other => Err(ParseError::new(format!("unknown operator '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select_star() {
        let stmt = parse_select("SELECT * FROM Student").unwrap();
        assert!(!stmt.distinct);
        assert_eq!(stmt.select_list, vec![SelectItem::Wildcard]);
        assert_eq!(stmt.from, "Student");
        assert!(stmt.joins.is_empty());
        assert!(stmt.where_clause.is_none());
    }

    #[test]
    fn parses_columns_and_where() {
        let stmt =
            parse_select("SELECT Student.A, Student.D FROM Student WHERE Student.D > 30").unwrap();
        assert_eq!(
            stmt.select_list,
            vec![
                SelectItem::Column(ColumnRef::qualified("Student", "A")),
                SelectItem::Column(ColumnRef::qualified("Student", "D")),
            ]
        );
        let expected = Expression::compare(
            CompareOp::GreaterThan,
            Expression::Column(ColumnRef::qualified("Student", "D")),
            Expression::Literal(30),
        );
        assert_eq!(stmt.where_clause, Some(expected));
    }

    #[test]
    fn parses_joins_in_from_order() {
        let stmt = parse_select("SELECT * FROM A JOIN B, C INNER JOIN D").unwrap();
        assert_eq!(stmt.from, "A");
        assert_eq!(stmt.joins, vec!["B", "C", "D"]);
    }

    #[test]
    fn parses_and_chain_left_associative() {
        let stmt = parse_select("SELECT * FROM T WHERE a = 1 AND b = 2 AND c = 3").unwrap();
        let Some(Expression::And { left, .. }) = stmt.where_clause else {
            panic!("expected AND at the root");
        };
        assert!(matches!(*left, Expression::And { .. }));
    }

    #[test]
    fn parses_sum_with_arithmetic_argument() {
        let stmt = parse_select("SELECT T.g, SUM(T.a + T.b * 2) FROM T GROUP BY T.g").unwrap();
        let SelectItem::Aggregate { func, arg } = &stmt.select_list[1] else {
            panic!("expected aggregate item");
        };
        assert_eq!(*func, AggregateFunc::Sum);
        // '*' binds tighter than '+'
        let Expression::Arith { op: ArithOp::Add, right, .. } = arg else {
            panic!("expected addition at the root of the argument");
        };
        assert!(matches!(**right, Expression::Arith { op: ArithOp::Multiply, .. }));
        assert_eq!(stmt.group_by, vec![ColumnRef::qualified("T", "g")]);
    }

    #[test]
    fn parses_distinct_and_order_by() {
        let stmt =
            parse_select("SELECT DISTINCT Student.D FROM Student ORDER BY Student.D").unwrap();
        assert!(stmt.distinct);
        assert_eq!(stmt.order_by, vec![ColumnRef::qualified("Student", "D")]);
    }

    #[test]
    fn parses_negative_integer_literals() {
        let stmt = parse_select("SELECT * FROM Student WHERE Student.A > -5").unwrap();
        let expected = Expression::compare(
            CompareOp::GreaterThan,
            Expression::Column(ColumnRef::qualified("Student", "A")),
            Expression::Literal(-5),
        );
        assert_eq!(stmt.where_clause, Some(expected));

        // also valid inside aggregate arguments
        let stmt = parse_select("SELECT SUM(T.a * -1) FROM T").unwrap();
        let SelectItem::Aggregate { arg, .. } = &stmt.select_list[0] else {
            panic!("expected aggregate item");
        };
        let Expression::Arith { op: ArithOp::Multiply, right, .. } = arg else {
            panic!("expected multiplication");
        };
        assert_eq!(**right, Expression::Literal(-1));
    }

    #[test]
    fn minus_without_integer_is_an_error() {
        assert!(parse_select("SELECT * FROM T WHERE a > -b").is_err());
    }

    #[test]
    fn accepts_trailing_semicolon() {
        assert!(parse_select("SELECT * FROM T;").is_ok());
    }

    #[test]
    fn rejects_or() {
        let err = parse_select("SELECT * FROM T WHERE a = 1 OR b = 2").unwrap_err();
        assert!(err.message.contains("OR"));
    }

    #[test]
    fn rejects_not() {
        let err = parse_select("SELECT * FROM T WHERE NOT a = 1").unwrap_err();
        assert!(err.message.contains("NOT"));
        let err = parse_select("SELECT * FROM T WHERE a = 1 AND NOT b = 2").unwrap_err();
        assert!(err.message.contains("NOT"));
    }

    #[test]
    fn rejects_descending_order() {
        assert!(parse_select("SELECT * FROM T ORDER BY a DESC").is_err());
    }

    #[test]
    fn rejects_unknown_function() {
        assert!(parse_select("SELECT AVG(a) FROM T").is_err());
    }

    #[test]
    fn rejects_wildcard_mixed_with_columns() {
        assert!(parse_select("SELECT *, a FROM T").is_err());
    }

    #[test]
    fn rejects_bare_column_condition() {
        // predicates must be comparisons
        assert!(parse_select("SELECT * FROM T WHERE a").is_err());
    }
}
