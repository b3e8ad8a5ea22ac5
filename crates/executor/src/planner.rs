//! Query planner
//!
//! Consumes the parsed [`SelectStmt`] and the catalog's base schemas and
//! assembles a left-deep logical [`Plan`]. The attachment order is fixed:
//! scan, joins (with classified join predicates), residual filter,
//! aggregate or projection, distinct, sort. Join order always follows the
//! FROM clause; there is no cost-based reordering.

use std::collections::BTreeSet;

use ast::{ColumnRef, Expression, SelectItem, SelectStmt};
use catalog::Catalog;

use crate::errors::ExecutorError;
use crate::plan::Plan;
use crate::predicate::{
    check_operand_shape, check_predicate_shape, conjoin, decompose_conjuncts, referenced_tables,
};

/// Build a logical plan for a SELECT statement.
pub fn plan_select(stmt: &SelectStmt, catalog: &Catalog) -> Result<Plan, ExecutorError> {
    // Every FROM/JOIN target must be a known base table, listed once
    let tables: Vec<String> = stmt.tables().iter().map(|t| t.to_string()).collect();
    let mut seen = BTreeSet::new();
    for table in &tables {
        catalog.base_schema(table)?;
        if !seen.insert(table.to_lowercase()) {
            return Err(ExecutorError::Plan(format!(
                "table '{}' is listed more than once",
                table
            )));
        }
    }

    if let Some(where_clause) = &stmt.where_clause {
        check_predicate_shape(where_clause)?;
    }

    let mut root = Plan::Scan { table: stmt.from.clone() };

    if !stmt.joins.is_empty() {
        root = plan_joins(stmt, catalog, &tables, root)?;
    } else if let Some(where_clause) = &stmt.where_clause {
        root = Plan::Filter { input: Box::new(root), predicate: where_clause.clone() };
    }

    root = plan_output(stmt, root)?;

    if stmt.distinct {
        root = Plan::Distinct { input: Box::new(root) };
    }
    if !stmt.order_by.is_empty() {
        root = Plan::Sort { input: Box::new(root), columns: stmt.order_by.clone() };
    }
    Ok(root)
}

/// Attach the join chain in FROM-clause order.
///
/// The WHERE tree is split into join predicates (referencing two or more
/// distinct tables) and filter predicates (zero or one table; constant
/// comparisons count as filters). Each join predicate is attached to the
/// first join at which all its tables are available; filters are conjoined
/// into one Filter above the chain.
fn plan_joins(
    stmt: &SelectStmt,
    catalog: &Catalog,
    tables: &[String],
    mut root: Plan,
) -> Result<Plan, ExecutorError> {
    let conjuncts = match &stmt.where_clause {
        Some(where_clause) => decompose_conjuncts(where_clause),
        None => Vec::new(),
    };

    let mut join_predicates = Vec::new();
    let mut filters = Vec::new();
    for conjunct in conjuncts {
        let referenced = referenced_tables(&conjunct, catalog, tables)?;
        if referenced.len() >= 2 {
            join_predicates.push((conjunct, referenced, false));
        } else {
            filters.push(conjunct);
        }
    }

    let mut joined: BTreeSet<String> = BTreeSet::new();
    joined.insert(stmt.from.to_lowercase());

    for join_table in &stmt.joins {
        let key = join_table.to_lowercase();
        joined.insert(key.clone());

        let mut parts = Vec::new();
        for (conjunct, referenced, used) in join_predicates.iter_mut() {
            if !*used && referenced.contains(&key) && referenced.is_subset(&joined) {
                parts.push(conjunct.clone());
                *used = true;
            }
        }

        root = Plan::Join {
            outer: Box::new(root),
            inner: Box::new(Plan::Scan { table: join_table.clone() }),
            condition: conjoin(parts),
        };
    }

    // Join predicates that never became attachable reference tables outside
    // the query; left in the residual filter they fail resolution at bind
    for (conjunct, _, used) in join_predicates {
        if !used {
            filters.push(conjunct);
        }
    }

    if let Some(residual) = conjoin(filters) {
        root = Plan::Filter { input: Box::new(root), predicate: residual };
    }
    Ok(root)
}

/// Attach the output-shaping operator: Aggregate when the query groups or
/// sums (mutually exclusive with plain projection), otherwise a Project for
/// any select list that is not `*`.
fn plan_output(stmt: &SelectStmt, root: Plan) -> Result<Plan, ExecutorError> {
    let has_aggregate =
        stmt.select_list.iter().any(|item| matches!(item, SelectItem::Aggregate { .. }));

    if has_aggregate || !stmt.group_by.is_empty() {
        let mut output_columns: Vec<ColumnRef> = Vec::new();
        let mut aggregates: Vec<Expression> = Vec::new();
        for item in &stmt.select_list {
            match item {
                SelectItem::Wildcard => {
                    return Err(ExecutorError::Plan(
                        "SELECT * cannot be combined with aggregation".to_string(),
                    ))
                }
                SelectItem::Column(col) => output_columns.push(col.clone()),
                SelectItem::Aggregate { arg, .. } => {
                    check_operand_shape(arg)?;
                    aggregates.push(arg.clone());
                }
            }
        }
        return Ok(Plan::Aggregate {
            input: Box::new(root),
            group_by: stmt.group_by.clone(),
            aggregates,
            output_columns,
        });
    }

    match stmt.select_list.as_slice() {
        [SelectItem::Wildcard] => Ok(root),
        items => {
            let columns = items
                .iter()
                .map(|item| match item {
                    SelectItem::Column(col) => Ok(col.clone()),
                    SelectItem::Wildcard => Err(ExecutorError::Plan(
                        "'*' cannot be combined with other select items".to_string(),
                    )),
                    SelectItem::Aggregate { .. } => unreachable!("handled above"),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Plan::Project { input: Box::new(root), columns })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ast::CompareOp;

    use super::*;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog
            .register_base(
                "Student",
                vec!["A".into(), "B".into(), "C".into(), "D".into()],
                PathBuf::from("data/Student.csv"),
            )
            .unwrap();
        catalog
            .register_base(
                "Course",
                vec!["Sid".into(), "Grade".into()],
                PathBuf::from("data/Course.csv"),
            )
            .unwrap();
        catalog
            .register_base("Room", vec!["Rid".into()], PathBuf::from("data/Room.csv"))
            .unwrap();
        catalog
    }

    fn col(table: &str, column: &str) -> Expression {
        Expression::Column(ColumnRef::qualified(table, column))
    }

    fn base_stmt(from: &str) -> SelectStmt {
        SelectStmt {
            distinct: false,
            select_list: vec![SelectItem::Wildcard],
            from: from.to_string(),
            joins: Vec::new(),
            where_clause: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
        }
    }

    #[test]
    fn select_star_plans_to_bare_scan() {
        let plan = plan_select(&base_stmt("Student"), &catalog()).unwrap();
        assert_eq!(plan, Plan::Scan { table: "Student".to_string() });
    }

    #[test]
    fn where_without_joins_is_one_filter_with_the_full_tree() {
        let mut stmt = base_stmt("Student");
        let predicate = Expression::and(
            Expression::compare(CompareOp::GreaterThan, col("Student", "D"), Expression::Literal(30)),
            Expression::compare(CompareOp::LessThan, col("Student", "A"), Expression::Literal(5)),
        );
        stmt.where_clause = Some(predicate.clone());

        let plan = plan_select(&stmt, &catalog()).unwrap();
        assert_eq!(
            plan,
            Plan::Filter {
                input: Box::new(Plan::Scan { table: "Student".to_string() }),
                predicate,
            }
        );
    }

    #[test]
    fn join_predicates_attach_to_joins_and_filters_stay_above() {
        let mut stmt = base_stmt("Student");
        stmt.joins = vec!["Course".to_string()];
        let join_pred =
            Expression::compare(CompareOp::Equal, col("Student", "A"), col("Course", "Sid"));
        let filter_pred =
            Expression::compare(CompareOp::GreaterThan, col("Student", "D"), Expression::Literal(30));
        stmt.where_clause = Some(Expression::and(join_pred.clone(), filter_pred.clone()));

        let plan = plan_select(&stmt, &catalog()).unwrap();
        assert_eq!(
            plan,
            Plan::Filter {
                input: Box::new(Plan::Join {
                    outer: Box::new(Plan::Scan { table: "Student".to_string() }),
                    inner: Box::new(Plan::Scan { table: "Course".to_string() }),
                    condition: Some(join_pred),
                }),
                predicate: filter_pred,
            }
        );
    }

    #[test]
    fn join_predicate_waits_until_all_its_tables_are_joined() {
        let mut stmt = base_stmt("Student");
        stmt.joins = vec!["Course".to_string(), "Room".to_string()];
        // references Course and Room: only attachable at the Room join
        let late_pred = Expression::compare(CompareOp::Equal, col("Course", "Sid"), col("Room", "Rid"));
        stmt.where_clause = Some(late_pred.clone());

        let plan = plan_select(&stmt, &catalog()).unwrap();
        let Plan::Join { outer, condition, .. } = plan else { panic!("expected join root") };
        assert_eq!(condition, Some(late_pred));
        let Plan::Join { condition: first_condition, .. } = *outer else {
            panic!("expected inner join");
        };
        assert_eq!(first_condition, None);
    }

    #[test]
    fn constant_comparison_classifies_as_filter() {
        let mut stmt = base_stmt("Student");
        stmt.joins = vec!["Course".to_string()];
        let constant =
            Expression::compare(CompareOp::Equal, Expression::Literal(1), Expression::Literal(1));
        stmt.where_clause = Some(constant.clone());

        let plan = plan_select(&stmt, &catalog()).unwrap();
        let Plan::Filter { input, predicate } = plan else { panic!("expected filter root") };
        assert_eq!(predicate, constant);
        assert!(matches!(*input, Plan::Join { condition: None, .. }));
    }

    #[test]
    fn aggregation_replaces_projection() {
        let mut stmt = base_stmt("Student");
        stmt.select_list = vec![
            SelectItem::Column(ColumnRef::qualified("Student", "D")),
            SelectItem::Aggregate {
                func: ast::AggregateFunc::Sum,
                arg: col("Student", "C"),
            },
        ];
        stmt.group_by = vec![ColumnRef::qualified("Student", "D")];

        let plan = plan_select(&stmt, &catalog()).unwrap();
        let Plan::Aggregate { group_by, aggregates, output_columns, .. } = plan else {
            panic!("expected aggregate root");
        };
        assert_eq!(group_by, vec![ColumnRef::qualified("Student", "D")]);
        assert_eq!(aggregates, vec![col("Student", "C")]);
        assert_eq!(output_columns, vec![ColumnRef::qualified("Student", "D")]);
    }

    #[test]
    fn distinct_and_order_by_stack_in_fixed_order() {
        let mut stmt = base_stmt("Student");
        stmt.distinct = true;
        stmt.select_list = vec![SelectItem::Column(ColumnRef::qualified("Student", "D"))];
        stmt.order_by = vec![ColumnRef::qualified("Student", "D")];

        let plan = plan_select(&stmt, &catalog()).unwrap();
        let Plan::Sort { input, .. } = plan else { panic!("expected sort root") };
        let Plan::Distinct { input } = *input else { panic!("expected distinct below sort") };
        assert!(matches!(*input, Plan::Project { .. }));
    }

    #[test]
    fn wildcard_with_group_by_is_rejected() {
        let mut stmt = base_stmt("Student");
        stmt.group_by = vec![ColumnRef::qualified("Student", "D")];
        assert!(matches!(
            plan_select(&stmt, &catalog()),
            Err(ExecutorError::Plan(_))
        ));
    }

    #[test]
    fn unknown_table_is_rejected_up_front() {
        assert!(matches!(
            plan_select(&base_stmt("Nope"), &catalog()),
            Err(ExecutorError::Catalog(_))
        ));
    }

    #[test]
    fn duplicate_table_is_rejected() {
        let mut stmt = base_stmt("Student");
        stmt.joins = vec!["student".to_string()];
        assert!(matches!(
            plan_select(&stmt, &catalog()),
            Err(ExecutorError::Plan(_))
        ));
    }
}
