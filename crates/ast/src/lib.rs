//! Query AST - structured representation of the supported SELECT dialect
//!
//! This crate defines the abstract query representation consumed by the
//! planner: select items, FROM/JOIN tables, the WHERE tree, GROUP BY and
//! ORDER BY columns, and the DISTINCT flag. Expressions are a tagged union
//! evaluated by exhaustive pattern match; there is no visitor machinery.

mod expression;
mod operators;
mod select;

pub use expression::{ColumnRef, Expression};
pub use operators::{ArithOp, CompareOp};
pub use select::{AggregateFunc, SelectItem, SelectStmt};
