//! Duplicate elimination

use std::collections::HashSet;

use catalog::SchemaId;
use storage::Tuple;

use crate::errors::ExecutorError;
use crate::operators::Operator;

/// Emits each distinct tuple once, in first-occurrence order.
///
/// The first `next()` call drains the input into a seen-set; `reset()`
/// discards the buffer and resets the input so mutated data would be
/// re-read.
pub struct Distinct {
    input: Box<dyn Operator>,
    rows: Option<Vec<Tuple>>,
    cursor: usize,
}

impl Distinct {
    pub fn new(input: Box<dyn Operator>) -> Self {
        Distinct { input, rows: None, cursor: 0 }
    }

    fn fill(&mut self) -> Result<(), ExecutorError> {
        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        while let Some(tuple) = self.input.next()? {
            if seen.insert(tuple.clone()) {
                rows.push(tuple);
            }
        }
        self.rows = Some(rows);
        Ok(())
    }
}

impl Operator for Distinct {
    fn next(&mut self) -> Result<Option<Tuple>, ExecutorError> {
        if self.rows.is_none() {
            self.fill()?;
        }
        let rows = match &self.rows {
            Some(rows) => rows,
            None => return Ok(None),
        };
        match rows.get(self.cursor) {
            Some(tuple) => {
                self.cursor += 1;
                Ok(Some(tuple.clone()))
            }
            None => Ok(None),
        }
    }

    fn reset(&mut self) -> Result<(), ExecutorError> {
        self.rows = None;
        self.cursor = 0;
        self.input.reset()
    }

    fn schema_id(&self) -> SchemaId {
        self.input.schema_id()
    }
}
