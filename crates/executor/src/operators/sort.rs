//! Blocking sort

use catalog::SchemaId;
use storage::Tuple;

use crate::errors::ExecutorError;
use crate::operators::Operator;

/// Ascending stable sort by a fixed key-column priority list.
///
/// The first `next()` call drains the input and sorts the buffered rows;
/// later calls stream them back. `reset()` rewinds to the first buffered
/// row without re-reading the input.
pub struct Sort {
    input: Box<dyn Operator>,
    keys: Vec<usize>,
    rows: Option<Vec<Tuple>>,
    cursor: usize,
}

impl Sort {
    pub fn new(input: Box<dyn Operator>, keys: Vec<usize>) -> Self {
        Sort { input, keys, rows: None, cursor: 0 }
    }

    fn fill(&mut self) -> Result<(), ExecutorError> {
        let mut rows = Vec::new();
        while let Some(tuple) = self.input.next()? {
            for &index in &self.keys {
                if tuple.get(index).is_none() {
                    return Err(ExecutorError::ColumnIndexOutOfBounds { index });
                }
            }
            rows.push(tuple);
        }
        let keys = &self.keys;
        rows.sort_by(|a, b| {
            for &index in keys {
                let ordering = a.get(index).cmp(&b.get(index));
                if ordering != std::cmp::Ordering::Equal {
                    return ordering;
                }
            }
            std::cmp::Ordering::Equal
        });
        self.rows = Some(rows);
        Ok(())
    }
}

impl Operator for Sort {
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
        self.cursor = 0;
        Ok(())
    }

    fn schema_id(&self) -> SchemaId {
        self.input.schema_id()
    }
}
