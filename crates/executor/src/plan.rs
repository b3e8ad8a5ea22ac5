//! Logical query plan
//!
//! The planner produces this tree, the optimizer rewrites it purely (no
//! schema registration happens here), and the binder turns it into physical
//! operators in one bottom-up pass.

use std::collections::BTreeSet;

use ast::{ColumnRef, Expression};
use catalog::Catalog;

use crate::errors::ExecutorError;

/// Logical plan node.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Stream a base table's CSV file
    Scan { table: String },
    /// Keep tuples satisfying the predicate
    Filter { input: Box<Plan>, predicate: Expression },
    /// Copy the named columns, in order (duplicates allowed)
    Project { input: Box<Plan>, columns: Vec<ColumnRef> },
    /// Nested-loop join; `None` condition is a cross product
    Join { outer: Box<Plan>, inner: Box<Plan>, condition: Option<Expression> },
    /// Stable ascending sort by column priority
    Sort { input: Box<Plan>, columns: Vec<ColumnRef> },
    /// Duplicate elimination keeping first-occurrence order
    Distinct { input: Box<Plan> },
    /// Grouped SUM aggregation: output is group columns then sums
    Aggregate {
        input: Box<Plan>,
        group_by: Vec<ColumnRef>,
        aggregates: Vec<Expression>,
        output_columns: Vec<ColumnRef>,
    },
}

/// Output column identity: (lowercased table qualifier, lowercased name).
/// Aggregate outputs use their canonical expression text as the name.
pub(crate) type PlanColumn = (Option<String>, String);

impl Plan {
    /// Base tables contributing tuples to this subtree (lowercased).
    pub fn tables(&self) -> BTreeSet<String> {
        match self {
            Plan::Scan { table } => {
                let mut set = BTreeSet::new();
                set.insert(table.to_lowercase());
                set
            }
            Plan::Filter { input, .. }
            | Plan::Project { input, .. }
            | Plan::Sort { input, .. }
            | Plan::Distinct { input }
            | Plan::Aggregate { input, .. } => input.tables(),
            Plan::Join { outer, inner, .. } => {
                let mut set = outer.tables();
                set.extend(inner.tables());
                set
            }
        }
    }

    /// The column identities this subtree emits, in tuple order.
    ///
    /// Used by the optimizer for identity-projection detection and for
    /// checking whether a predicate's columns survive a projection.
    pub(crate) fn output_columns(&self, catalog: &Catalog) -> Result<Vec<PlanColumn>, ExecutorError> {
        match self {
            Plan::Scan { table } => {
                let schema = catalog.base_schema(table)?;
                let qualifier = Some(schema.name.to_lowercase());
                Ok(schema
                    .columns
                    .iter()
                    .map(|col| (qualifier.clone(), col.to_lowercase()))
                    .collect())
            }
            Plan::Filter { input, .. } | Plan::Sort { input, .. } | Plan::Distinct { input } => {
                input.output_columns(catalog)
            }
            Plan::Project { columns, .. } => Ok(columns
                .iter()
                .map(|col| {
                    (col.table.as_ref().map(|t| t.to_lowercase()), col.column.to_lowercase())
                })
                .collect()),
            Plan::Join { outer, inner, .. } => {
                let mut columns = outer.output_columns(catalog)?;
                columns.extend(inner.output_columns(catalog)?);
                Ok(columns)
            }
            Plan::Aggregate { output_columns, aggregates, .. } => {
                let mut columns: Vec<PlanColumn> = output_columns
                    .iter()
                    .map(|col| {
                        (col.table.as_ref().map(|t| t.to_lowercase()), col.column.to_lowercase())
                    })
                    .collect();
                columns.extend(
                    aggregates.iter().map(|agg| (None, format!("sum({})", agg).to_lowercase())),
                );
                Ok(columns)
            }
        }
    }
}
