//! SELECT statement types
//!
//! The planner input contract: select items, one FROM table, zero or more
//! joined tables (base tables only), an AND-combined WHERE tree, optional
//! GROUP BY and ORDER BY column lists, and a DISTINCT flag.

use std::fmt;

use crate::{ColumnRef, Expression};

/// SELECT statement structure
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub distinct: bool,
    pub select_list: Vec<SelectItem>,
    /// Primary FROM table
    pub from: String,
    /// Joined tables, in FROM-clause order
    pub joins: Vec<String>,
    pub where_clause: Option<Expression>,
    pub group_by: Vec<ColumnRef>,
    /// ORDER BY columns; ascending only in this dialect
    pub order_by: Vec<ColumnRef>,
}

impl SelectStmt {
    /// All base tables named by the query, FROM table first.
    pub fn tables(&self) -> Vec<&str> {
        let mut tables = vec![self.from.as_str()];
        tables.extend(self.joins.iter().map(|t| t.as_str()));
        tables
    }
}

/// Item in the SELECT list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// SELECT *
    Wildcard,
    /// SELECT col / table.col
    Column(ColumnRef),
    /// SELECT SUM(expr)
    Aggregate { func: AggregateFunc, arg: Expression },
}

/// Aggregate functions; SUM is the only one in the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Sum,
}

impl fmt::Display for AggregateFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateFunc::Sum => write!(f, "SUM"),
        }
    }
}
