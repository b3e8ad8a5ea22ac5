//! Expression types for WHERE trees and aggregate arguments

use std::fmt;

use crate::{ArithOp, CompareOp};

/// A column reference, optionally qualified with a table name
/// (`id` or `users.id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: Option<String>, column: String) -> Self {
        ColumnRef { table, column }
    }

    /// Unqualified reference (`column`).
    pub fn unqualified(column: impl Into<String>) -> Self {
        ColumnRef { table: None, column: column.into() }
    }

    /// Qualified reference (`table.column`).
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        ColumnRef { table: Some(table.into()), column: column.into() }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "{}.{}", table, self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

/// Expression tree for predicates and aggregate arguments.
///
/// The supported grammar is deliberately small: integer literals, column
/// references, binary comparisons, AND conjunction, and `+`/`*` arithmetic.
/// Anything outside this shape is rejected at planning time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Integer literal (42)
    Literal(i64),

    /// Column reference (id, users.id)
    Column(ColumnRef),

    /// Binary comparison (a = b, x < 5)
    Compare { op: CompareOp, left: Box<Expression>, right: Box<Expression> },

    /// Conjunction (p AND q); the only supported connective
    And { left: Box<Expression>, right: Box<Expression> },

    /// Binary arithmetic (a + b, a * 2), used inside aggregate arguments
    Arith { op: ArithOp, left: Box<Expression>, right: Box<Expression> },

    /// Function call (SUM(x)); only valid in the select list
    Call { name: String, args: Vec<Expression> },
}

impl Expression {
    pub fn compare(op: CompareOp, left: Expression, right: Expression) -> Self {
        Expression::Compare { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::And { left: Box::new(left), right: Box::new(right) }
    }

    pub fn arith(op: ArithOp, left: Expression, right: Expression) -> Self {
        Expression::Arith { op, left: Box::new(left), right: Box::new(right) }
    }

    /// Collect every column reference in this expression, left to right.
    pub fn column_refs(&self) -> Vec<&ColumnRef> {
        let mut refs = Vec::new();
        self.collect_column_refs(&mut refs);
        refs
    }

    fn collect_column_refs<'a>(&'a self, refs: &mut Vec<&'a ColumnRef>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Column(col) => refs.push(col),
            Expression::Compare { left, right, .. }
            | Expression::And { left, right }
            | Expression::Arith { left, right, .. } => {
                left.collect_column_refs(refs);
                right.collect_column_refs(refs);
            }
            Expression::Call { args, .. } => {
                for arg in args {
                    arg.collect_column_refs(refs);
                }
            }
        }
    }
}

/// Canonical text form, used for error messages and derived column keys.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Column(col) => write!(f, "{}", col),
            Expression::Compare { op, left, right } => {
                write!(f, "{} {} {}", left, op, right)
            }
            Expression::And { left, right } => write!(f, "{} AND {}", left, right),
            Expression::Arith { op, left, right } => {
                write!(f, "{} {} {}", left, op, right)
            }
            Expression::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
