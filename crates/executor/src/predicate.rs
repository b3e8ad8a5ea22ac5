//! WHERE-tree decomposition and predicate classification helpers
//!
//! The planner splits an AND-combined WHERE tree into conjuncts and
//! classifies each by the set of tables it references: zero or one table
//! makes a filter predicate, two or more makes a join predicate. The
//! optimizer reuses the same table-membership analysis for pushdown.

use std::collections::BTreeSet;

use ast::Expression;
use catalog::Catalog;

use crate::errors::ExecutorError;

/// Split an AND tree into its comparison conjuncts, left to right.
pub(crate) fn decompose_conjuncts(expr: &Expression) -> Vec<Expression> {
    let mut conjuncts = Vec::new();
    collect_conjuncts(expr, &mut conjuncts);
    conjuncts
}

fn collect_conjuncts(expr: &Expression, conjuncts: &mut Vec<Expression>) {
    match expr {
        Expression::And { left, right } => {
            collect_conjuncts(left, conjuncts);
            collect_conjuncts(right, conjuncts);
        }
        other => conjuncts.push(other.clone()),
    }
}

/// Combine conjuncts back into a left-associated AND tree.
pub(crate) fn conjoin(conjuncts: Vec<Expression>) -> Option<Expression> {
    let mut iter = conjuncts.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, Expression::and))
}

/// The set of base tables (lowercased) referenced by an expression.
///
/// Qualified references name their table directly. Unqualified references
/// are attributed by probing the candidate tables' base schemas: exactly
/// one candidate must own the column, otherwise the reference is ambiguous
/// or unknown and the query is rejected.
pub(crate) fn referenced_tables(
    expr: &Expression,
    catalog: &Catalog,
    candidates: &[String],
) -> Result<BTreeSet<String>, ExecutorError> {
    let mut tables = BTreeSet::new();
    for col in expr.column_refs() {
        match &col.table {
            Some(table) => {
                tables.insert(table.to_lowercase());
            }
            None => {
                let mut owners = candidates.iter().filter(|candidate| {
                    catalog
                        .base_schema(candidate)
                        .map(|schema| schema.column_index(&col.column).is_some())
                        .unwrap_or(false)
                });
                let owner = owners.next().ok_or_else(|| {
                    ExecutorError::Catalog(catalog::CatalogError::ColumnNotFound(
                        col.column.clone(),
                    ))
                })?;
                if owners.next().is_some() {
                    return Err(ExecutorError::Plan(format!(
                        "column reference '{}' is ambiguous",
                        col.column
                    )));
                }
                tables.insert(owner.to_lowercase());
            }
        }
    }
    Ok(tables)
}

/// Check that an expression only uses the shapes the dialect supports in a
/// WHERE tree: AND nodes over comparisons of literal/column/arith operands.
pub(crate) fn check_predicate_shape(expr: &Expression) -> Result<(), ExecutorError> {
    match expr {
        Expression::And { left, right } => {
            check_predicate_shape(left)?;
            check_predicate_shape(right)
        }
        Expression::Compare { left, right, .. } => {
            check_operand_shape(left)?;
            check_operand_shape(right)
        }
        other => Err(ExecutorError::UnsupportedExpression(format!(
            "'{}' is not a comparison or conjunction",
            other
        ))),
    }
}

/// Valid comparison/aggregate operand: literal, column, or `+`/`*` tree.
pub(crate) fn check_operand_shape(expr: &Expression) -> Result<(), ExecutorError> {
    match expr {
        Expression::Literal(_) | Expression::Column(_) => Ok(()),
        Expression::Arith { left, right, .. } => {
            check_operand_shape(left)?;
            check_operand_shape(right)
        }
        other => Err(ExecutorError::UnsupportedExpression(format!(
            "'{}' is not valid inside a comparison",
            other
        ))),
    }
}
