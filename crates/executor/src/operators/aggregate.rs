//! Grouped SUM aggregation

use std::collections::HashMap;

use catalog::SchemaId;
use storage::Tuple;

use crate::errors::ExecutorError;
use crate::eval::{eval_value, BoundExpr};
use crate::operators::Operator;

/// Single-pass hash aggregation over bound SUM expressions.
///
/// Tuples are grouped by the values at the group-key indices; each output
/// tuple is the group's output-column values followed by one sum per
/// aggregate expression, in select-list order. Groups are emitted in
/// first-occurrence order. Without group columns the whole input is one
/// group, except that an empty input produces no rows at all.
pub struct Aggregate {
    input: Box<dyn Operator>,
    group_keys: Vec<usize>,
    output_indices: Vec<usize>,
    aggregates: Vec<BoundExpr>,
    schema: SchemaId,
    groups: Option<Vec<(Vec<i64>, Vec<i64>)>>,
    cursor: usize,
}

impl Aggregate {
    pub fn new(
        input: Box<dyn Operator>,
        group_keys: Vec<usize>,
        output_indices: Vec<usize>,
        aggregates: Vec<BoundExpr>,
        schema: SchemaId,
    ) -> Self {
        Aggregate {
            input,
            group_keys,
            output_indices,
            aggregates,
            schema,
            groups: None,
            cursor: 0,
        }
    }

    fn fill(&mut self) -> Result<(), ExecutorError> {
        let mut positions: HashMap<Vec<i64>, usize> = HashMap::new();
        let mut groups: Vec<(Vec<i64>, Vec<i64>)> = Vec::new();

        while let Some(tuple) = self.input.next()? {
            let mut key = Vec::with_capacity(self.group_keys.len());
            for &index in &self.group_keys {
                let value =
                    tuple.get(index).ok_or(ExecutorError::ColumnIndexOutOfBounds { index })?;
                key.push(value);
            }

            let position = match positions.get(&key) {
                Some(&position) => position,
                None => {
                    // output values are taken from the group's first row
                    let mut output = Vec::with_capacity(self.output_indices.len());
                    for &index in &self.output_indices {
                        let value = tuple
                            .get(index)
                            .ok_or(ExecutorError::ColumnIndexOutOfBounds { index })?;
                        output.push(value);
                    }
                    positions.insert(key, groups.len());
                    groups.push((output, vec![0; self.aggregates.len()]));
                    groups.len() - 1
                }
            };

            let sums = &mut groups[position].1;
            for (sum, aggregate) in sums.iter_mut().zip(&self.aggregates) {
                *sum = sum.wrapping_add(eval_value(aggregate, &tuple)?);
            }
        }

        self.groups = Some(groups);
        Ok(())
    }
}

impl Operator for Aggregate {
    fn next(&mut self) -> Result<Option<Tuple>, ExecutorError> {
        if self.groups.is_none() {
            self.fill()?;
        }
        let groups = match &self.groups {
            Some(groups) => groups,
            None => return Ok(None),
        };
        match groups.get(self.cursor) {
            Some((output, sums)) => {
                self.cursor += 1;
                let mut values = output.clone();
                values.extend_from_slice(sums);
                Ok(Some(Tuple::new(values)))
            }
            None => Ok(None),
        }
    }

    fn reset(&mut self) -> Result<(), ExecutorError> {
        self.groups = None;
        self.cursor = 0;
        self.input.reset()
    }

    fn schema_id(&self) -> SchemaId {
        self.schema
    }
}
