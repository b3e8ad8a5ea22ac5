//! Expression binding and evaluation
//!
//! Column references are resolved against the catalog exactly once, when an
//! expression is bound to an operator's input schema. The resulting
//! [`BoundExpr`] carries tuple indices instead of names, so per-tuple
//! evaluation is a pure structural walk with no catalog access.

use ast::{ArithOp, CompareOp, Expression};
use catalog::{Catalog, SchemaId};
use storage::Tuple;

use crate::errors::ExecutorError;

/// Expression with every column reference resolved to a tuple index.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundExpr {
    Literal(i64),
    Column(usize),
    Compare { op: CompareOp, left: Box<BoundExpr>, right: Box<BoundExpr> },
    And { left: Box<BoundExpr>, right: Box<BoundExpr> },
    Arith { op: ArithOp, left: Box<BoundExpr>, right: Box<BoundExpr> },
}

/// Bind an expression against `schema`, resolving all column references.
///
/// Aggregate calls are not valid here: they are split out by the planner
/// before binding, so encountering one is an unsupported shape.
pub fn bind_expr(
    expr: &Expression,
    catalog: &Catalog,
    schema: SchemaId,
) -> Result<BoundExpr, ExecutorError> {
    match expr {
        Expression::Literal(value) => Ok(BoundExpr::Literal(*value)),
        Expression::Column(col) => {
            let index = catalog.resolve(schema, col.table.as_deref(), &col.column)?;
            Ok(BoundExpr::Column(index))
        }
        Expression::Compare { op, left, right } => Ok(BoundExpr::Compare {
            op: *op,
            left: Box::new(bind_expr(left, catalog, schema)?),
            right: Box::new(bind_expr(right, catalog, schema)?),
        }),
        Expression::And { left, right } => Ok(BoundExpr::And {
            left: Box::new(bind_expr(left, catalog, schema)?),
            right: Box::new(bind_expr(right, catalog, schema)?),
        }),
        Expression::Arith { op, left, right } => Ok(BoundExpr::Arith {
            op: *op,
            left: Box::new(bind_expr(left, catalog, schema)?),
            right: Box::new(bind_expr(right, catalog, schema)?),
        }),
        Expression::Call { name, .. } => Err(ExecutorError::UnsupportedExpression(format!(
            "call to '{}' is not valid here",
            name
        ))),
    }
}

/// Evaluate a predicate over a tuple. AND short-circuits: when the left
/// operand is false the right is never evaluated.
pub fn eval_predicate(expr: &BoundExpr, tuple: &Tuple) -> Result<bool, ExecutorError> {
    match expr {
        BoundExpr::And { left, right } => {
            if !eval_predicate(left, tuple)? {
                return Ok(false);
            }
            eval_predicate(right, tuple)
        }
        BoundExpr::Compare { op, left, right } => {
            let left = eval_value(left, tuple)?;
            let right = eval_value(right, tuple)?;
            Ok(compare(*op, left, right))
        }
        BoundExpr::Literal(_) | BoundExpr::Column(_) | BoundExpr::Arith { .. } => {
            Err(ExecutorError::UnsupportedExpression(
                "predicate must be a comparison or a conjunction".to_string(),
            ))
        }
    }
}

/// Evaluate an arithmetic expression over a tuple.
///
/// Overflow follows native wrapping integer semantics; it is not treated as
/// an error.
pub fn eval_value(expr: &BoundExpr, tuple: &Tuple) -> Result<i64, ExecutorError> {
    match expr {
        BoundExpr::Literal(value) => Ok(*value),
        BoundExpr::Column(index) => tuple
            .get(*index)
            .ok_or(ExecutorError::ColumnIndexOutOfBounds { index: *index }),
        BoundExpr::Arith { op, left, right } => {
            let left = eval_value(left, tuple)?;
            let right = eval_value(right, tuple)?;
            Ok(match op {
                ArithOp::Add => left.wrapping_add(right),
                ArithOp::Multiply => left.wrapping_mul(right),
            })
        }
        BoundExpr::Compare { .. } | BoundExpr::And { .. } => {
            Err(ExecutorError::UnsupportedExpression(
                "boolean expression in value position".to_string(),
            ))
        }
    }
}

fn compare(op: CompareOp, left: i64, right: i64) -> bool {
    match op {
        CompareOp::Equal => left == right,
        CompareOp::NotEqual => left != right,
        CompareOp::LessThan => left < right,
        CompareOp::LessOrEqual => left <= right,
        CompareOp::GreaterThan => left > right,
        CompareOp::GreaterOrEqual => left >= right,
    }
}
