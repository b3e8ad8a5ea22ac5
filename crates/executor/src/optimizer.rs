//! Rule-based plan optimizer
//!
//! Pure logical-plan rewrites, applied bottom-up to a fixpoint:
//!
//! - drop constant-true filter conjuncts (and empty filters)
//! - drop identity projections
//! - push filters below joins, splitting the conjuncts by table membership
//! - push filters below projections when the predicate's columns survive
//!
//! No schema registration happens here; the binder sees only the rewritten
//! tree.

use ast::Expression;
use catalog::Catalog;

use crate::errors::ExecutorError;
use crate::plan::{Plan, PlanColumn};
use crate::predicate::{conjoin, decompose_conjuncts, referenced_tables};

/// Rewrite a plan to a fixpoint of the rule set.
pub fn optimize(plan: Plan, catalog: &Catalog) -> Result<Plan, ExecutorError> {
    let plan = optimize_children(plan, catalog)?;
    match rewrite_once(plan, catalog)? {
        Rewrite::Changed(plan) => optimize(plan, catalog),
        Rewrite::Unchanged(plan) => Ok(plan),
    }
}

enum Rewrite {
    Changed(Plan),
    Unchanged(Plan),
}

fn optimize_children(plan: Plan, catalog: &Catalog) -> Result<Plan, ExecutorError> {
    Ok(match plan {
        Plan::Scan { table } => Plan::Scan { table },
        Plan::Filter { input, predicate } => {
            Plan::Filter { input: Box::new(optimize(*input, catalog)?), predicate }
        }
        Plan::Project { input, columns } => {
            Plan::Project { input: Box::new(optimize(*input, catalog)?), columns }
        }
        Plan::Join { outer, inner, condition } => Plan::Join {
            outer: Box::new(optimize(*outer, catalog)?),
            inner: Box::new(optimize(*inner, catalog)?),
            condition,
        },
        Plan::Sort { input, columns } => {
            Plan::Sort { input: Box::new(optimize(*input, catalog)?), columns }
        }
        Plan::Distinct { input } => Plan::Distinct { input: Box::new(optimize(*input, catalog)?) },
        Plan::Aggregate { input, group_by, aggregates, output_columns } => Plan::Aggregate {
            input: Box::new(optimize(*input, catalog)?),
            group_by,
            aggregates,
            output_columns,
        },
    })
}

/// Apply the first rule that fires at this node.
fn rewrite_once(plan: Plan, catalog: &Catalog) -> Result<Rewrite, ExecutorError> {
    match plan {
        Plan::Filter { input, predicate } => rewrite_filter(*input, predicate, catalog),
        Plan::Project { input, columns } => {
            // Identity projection: same column identities in the same order
            let projected: Vec<PlanColumn> = columns
                .iter()
                .map(|col| {
                    (col.table.as_ref().map(|t| t.to_lowercase()), col.column.to_lowercase())
                })
                .collect();
            if projected == input.output_columns(catalog)? {
                return Ok(Rewrite::Changed(*input));
            }
            Ok(Rewrite::Unchanged(Plan::Project { input, columns }))
        }
        other => Ok(Rewrite::Unchanged(other)),
    }
}

fn rewrite_filter(
    input: Plan,
    predicate: Expression,
    catalog: &Catalog,
) -> Result<Rewrite, ExecutorError> {
    // Constant-true conjuncts contribute nothing
    let conjuncts = decompose_conjuncts(&predicate);
    let live: Vec<Expression> =
        conjuncts.into_iter().filter(|c| !is_constant_true(c)).collect();
    let Some(predicate) = conjoin(live) else {
        return Ok(Rewrite::Changed(input));
    };

    match input {
        Plan::Join { outer, inner, condition } => {
            push_below_join(*outer, *inner, condition, predicate, catalog)
        }
        Plan::Project { input, columns } => {
            // Swap only when every predicate column survives the projection
            let survives = predicate.column_refs().iter().all(|col| {
                columns.iter().any(|kept| {
                    kept.column.eq_ignore_ascii_case(&col.column)
                        && match (&col.table, &kept.table) {
                            (Some(want), Some(have)) => want.eq_ignore_ascii_case(have),
                            _ => true,
                        }
                })
            });
            if survives {
                return Ok(Rewrite::Changed(Plan::Project {
                    input: Box::new(Plan::Filter { input, predicate }),
                    columns,
                }));
            }
            Ok(Rewrite::Unchanged(Plan::Filter {
                input: Box::new(Plan::Project { input, columns }),
                predicate,
            }))
        }
        other => Ok(Rewrite::Unchanged(Plan::Filter { input: Box::new(other), predicate })),
    }
}

/// Split the filter's conjuncts across a join: conjuncts touching only the
/// outer (or only the inner) side move below the join; everything else,
/// including table-free conjuncts, stays above it.
fn push_below_join(
    outer: Plan,
    inner: Plan,
    condition: Option<Expression>,
    predicate: Expression,
    catalog: &Catalog,
) -> Result<Rewrite, ExecutorError> {
    let candidates: Vec<String> = outer.tables().into_iter().chain(inner.tables()).collect();
    let outer_tables = outer.tables();
    let inner_tables = inner.tables();

    let mut outer_parts = Vec::new();
    let mut inner_parts = Vec::new();
    let mut remainder = Vec::new();
    for conjunct in decompose_conjuncts(&predicate) {
        let referenced = referenced_tables(&conjunct, catalog, &candidates)?;
        if !referenced.is_empty() && referenced.is_subset(&outer_tables) {
            outer_parts.push(conjunct);
        } else if !referenced.is_empty() && referenced.is_subset(&inner_tables) {
            inner_parts.push(conjunct);
        } else {
            remainder.push(conjunct);
        }
    }

    if outer_parts.is_empty() && inner_parts.is_empty() {
        let join = Plan::Join { outer: Box::new(outer), inner: Box::new(inner), condition };
        return Ok(Rewrite::Unchanged(Plan::Filter { input: Box::new(join), predicate }));
    }

    let outer = match conjoin(outer_parts) {
        Some(predicate) => Plan::Filter { input: Box::new(outer), predicate },
        None => outer,
    };
    let inner = match conjoin(inner_parts) {
        Some(predicate) => Plan::Filter { input: Box::new(inner), predicate },
        None => inner,
    };
    let mut plan = Plan::Join { outer: Box::new(outer), inner: Box::new(inner), condition };
    if let Some(predicate) = conjoin(remainder) {
        plan = Plan::Filter { input: Box::new(plan), predicate };
    }
    Ok(Rewrite::Changed(plan))
}

/// A comparison of two literals that always holds.
fn is_constant_true(expr: &Expression) -> bool {
    if let Expression::Compare { op, left, right } = expr {
        if let (Expression::Literal(l), Expression::Literal(r)) = (left.as_ref(), right.as_ref()) {
            return match op {
                ast::CompareOp::Equal => l == r,
                ast::CompareOp::NotEqual => l != r,
                ast::CompareOp::LessThan => l < r,
                ast::CompareOp::LessOrEqual => l <= r,
                ast::CompareOp::GreaterThan => l > r,
                ast::CompareOp::GreaterOrEqual => l >= r,
            };
        }
    }
    false
}
