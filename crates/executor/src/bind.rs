//! Plan binding
//!
//! One bottom-up pass turning the optimized logical plan into a physical
//! operator tree. All column resolution happens here: schema-transforming
//! operators (projection, join, aggregation) register their derived schemas
//! as they are built, pass-through operators reuse their child's schema id,
//! and every expression is bound against the schema of its operator's
//! input.

use std::collections::BTreeMap;

use ast::{ColumnRef, Expression};
use catalog::{Catalog, SchemaId, TransformKind};

use crate::errors::ExecutorError;
use crate::eval::bind_expr;
use crate::operators::{
    Aggregate, Distinct, Filter, NestedLoopJoin, Operator, Projection, Scan, Sort,
};
use crate::plan::Plan;

/// Bind a logical plan to a physical operator tree.
pub fn bind(plan: &Plan, catalog: &mut Catalog) -> Result<Box<dyn Operator>, ExecutorError> {
    match plan {
        Plan::Scan { table } => {
            let id = catalog.base_id(table)?;
            let schema = catalog.base_schema(table)?;
            let scan = Scan::open(&schema.location, schema.column_count(), id)?;
            Ok(Box::new(scan))
        }
        Plan::Filter { input, predicate } => {
            let input = bind(input, catalog)?;
            let predicate = bind_expr(predicate, catalog, input.schema_id())?;
            Ok(Box::new(Filter::new(input, predicate)))
        }
        Plan::Project { input, columns } => {
            let input = bind(input, catalog)?;
            let input_schema = input.schema_id();
            let mut indices = Vec::with_capacity(columns.len());
            let mut keys = BTreeMap::new();
            for (position, col) in columns.iter().enumerate() {
                let index = catalog.resolve(input_schema, col.table.as_deref(), &col.column)?;
                indices.push(index);
                // first occurrence wins when an output name repeats
                keys.entry(column_key(col)).or_insert(position);
            }
            let schema = catalog.register_derived(
                keys,
                Vec::new(),
                TransformKind::Projection,
                columns.len(),
            );
            Ok(Box::new(Projection::new(input, indices, schema)))
        }
        Plan::Join { outer, inner, condition } => {
            let outer = bind(outer, catalog)?;
            let inner = bind(inner, catalog)?;
            let outer_width = catalog.width(outer.schema_id());
            let width = outer_width + catalog.width(inner.schema_id());
            let schema = catalog.register_derived(
                BTreeMap::new(),
                vec![(outer.schema_id(), 0), (inner.schema_id(), outer_width)],
                TransformKind::Join,
                width,
            );
            let condition = condition
                .as_ref()
                .map(|expr| bind_expr(expr, catalog, schema))
                .transpose()?;
            Ok(Box::new(NestedLoopJoin::new(outer, inner, condition, schema)))
        }
        Plan::Sort { input, columns } => {
            let input = bind(input, catalog)?;
            let input_schema = input.schema_id();
            let keys = resolve_columns(columns, catalog, input_schema)?;
            Ok(Box::new(Sort::new(input, keys)))
        }
        Plan::Distinct { input } => {
            let input = bind(input, catalog)?;
            Ok(Box::new(Distinct::new(input)))
        }
        Plan::Aggregate { input, group_by, aggregates, output_columns } => {
            let input = bind(input, catalog)?;
            let input_schema = input.schema_id();
            let group_keys = resolve_columns(group_by, catalog, input_schema)?;
            let output_indices = resolve_columns(output_columns, catalog, input_schema)?;
            let bound_aggregates = aggregates
                .iter()
                .map(|expr| bind_expr(expr, catalog, input_schema))
                .collect::<Result<Vec<_>, _>>()?;

            let mut keys = BTreeMap::new();
            for (position, col) in output_columns.iter().enumerate() {
                keys.entry(column_key(col)).or_insert(position);
            }
            for (offset, aggregate) in aggregates.iter().enumerate() {
                keys.entry(aggregate_key(aggregate))
                    .or_insert(output_columns.len() + offset);
            }
            let width = output_columns.len() + aggregates.len();
            let schema =
                catalog.register_derived(keys, Vec::new(), TransformKind::Aggregation, width);

            Ok(Box::new(Aggregate::new(
                input,
                group_keys,
                output_indices,
                bound_aggregates,
                schema,
            )))
        }
    }
}

fn resolve_columns(
    columns: &[ColumnRef],
    catalog: &Catalog,
    schema: SchemaId,
) -> Result<Vec<usize>, ExecutorError> {
    columns
        .iter()
        .map(|col| {
            catalog
                .resolve(schema, col.table.as_deref(), &col.column)
                .map_err(ExecutorError::from)
        })
        .collect()
}

fn column_key(col: &ColumnRef) -> String {
    match &col.table {
        Some(table) => format!("{}.{}", table, col.column).to_lowercase(),
        None => col.column.to_lowercase(),
    }
}

fn aggregate_key(expr: &Expression) -> String {
    format!("sum({})", expr).to_lowercase()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use ast::CompareOp;

    use super::*;

    fn student_db() -> (tempfile::TempDir, Catalog) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Student.csv");
        fs::write(&path, "1,25,85,30\n2,30,22,40\n3,35,19,20\n").unwrap();

        let mut catalog = Catalog::new();
        catalog
            .register_base(
                "Student",
                vec!["A".into(), "B".into(), "C".into(), "D".into()],
                path,
            )
            .unwrap();
        (dir, catalog)
    }

    fn drain(mut operator: Box<dyn Operator>) -> Vec<Vec<i64>> {
        let mut rows = Vec::new();
        while let Some(tuple) = operator.next().unwrap() {
            rows.push(tuple.values().to_vec());
        }
        rows
    }

    #[test]
    fn binds_scan_and_streams_rows() {
        let (_dir, mut catalog) = student_db();
        let plan = Plan::Scan { table: "Student".to_string() };
        let operator = bind(&plan, &mut catalog).unwrap();
        assert_eq!(
            drain(operator),
            vec![vec![1, 25, 85, 30], vec![2, 30, 22, 40], vec![3, 35, 19, 20]]
        );
    }

    #[test]
    fn projection_registers_schema_that_hides_dropped_columns() {
        let (_dir, mut catalog) = student_db();
        let plan = Plan::Project {
            input: Box::new(Plan::Scan { table: "Student".to_string() }),
            columns: vec![ColumnRef::qualified("Student", "D")],
        };
        let operator = bind(&plan, &mut catalog).unwrap();
        let schema = operator.schema_id();

        assert_eq!(catalog.resolve(schema, Some("Student"), "D").unwrap(), 0);
        assert!(catalog.resolve(schema, Some("Student"), "A").is_err());
        assert_eq!(drain(operator), vec![vec![30], vec![40], vec![20]]);
    }

    #[test]
    fn join_schema_resolves_both_sides_with_offsets() {
        let (_dir, mut catalog) = student_db();
        let path = catalog.base_schema("Student").unwrap().location.clone();
        // second table reusing the same file
        catalog
            .register_base(
                "Course",
                vec!["Sid".into(), "X".into(), "Y".into(), "Z".into()],
                path,
            )
            .unwrap();

        let plan = Plan::Join {
            outer: Box::new(Plan::Scan { table: "Student".to_string() }),
            inner: Box::new(Plan::Scan { table: "Course".to_string() }),
            condition: Some(Expression::compare(
                CompareOp::Equal,
                Expression::Column(ColumnRef::qualified("Student", "A")),
                Expression::Column(ColumnRef::qualified("Course", "Sid")),
            )),
        };
        let operator = bind(&plan, &mut catalog).unwrap();
        let schema = operator.schema_id();

        assert_eq!(catalog.resolve(schema, Some("Student"), "A").unwrap(), 0);
        assert_eq!(catalog.resolve(schema, Some("Course"), "Sid").unwrap(), 4);
        assert_eq!(catalog.resolve(schema, Some("Course"), "Z").unwrap(), 7);

        // condition matches each row against itself only
        assert_eq!(
            drain(operator),
            vec![
                vec![1, 25, 85, 30, 1, 25, 85, 30],
                vec![2, 30, 22, 40, 2, 30, 22, 40],
                vec![3, 35, 19, 20, 3, 35, 19, 20],
            ]
        );
    }

    #[test]
    fn aggregate_schema_names_sums_canonically() {
        let (_dir, mut catalog) = student_db();
        let agg = Expression::Column(ColumnRef::qualified("Student", "C"));
        let plan = Plan::Aggregate {
            input: Box::new(Plan::Scan { table: "Student".to_string() }),
            group_by: vec![],
            aggregates: vec![agg],
            output_columns: vec![],
        };
        let operator = bind(&plan, &mut catalog).unwrap();
        let schema = operator.schema_id();

        assert_eq!(catalog.resolve(schema, None, "sum(Student.C)").unwrap(), 0);
        assert_eq!(drain(operator), vec![vec![126]]);
    }

    #[test]
    fn unknown_column_fails_binding() {
        let (_dir, mut catalog) = student_db();
        let plan = Plan::Project {
            input: Box::new(Plan::Scan { table: "Student".to_string() }),
            columns: vec![ColumnRef::qualified("Student", "Nope")],
        };
        assert!(matches!(bind(&plan, &mut catalog), Err(ExecutorError::Catalog(_))));
    }

    #[test]
    fn missing_data_file_fails_at_bind_time() {
        let mut catalog = Catalog::new();
        catalog
            .register_base("T", vec!["a".into()], PathBuf::from("/nonexistent/T.csv"))
            .unwrap();
        let plan = Plan::Scan { table: "T".to_string() };
        assert!(matches!(bind(&plan, &mut catalog), Err(ExecutorError::Storage(_))));
    }
}
