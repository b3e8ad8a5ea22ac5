//! Column projection

use catalog::SchemaId;
use storage::Tuple;

use crate::errors::ExecutorError;
use crate::operators::Operator;

/// Copies a fixed set of input columns, in order, into each output tuple.
///
/// Bag semantics: no duplicate elimination, and the same input column may
/// appear more than once. The indices were resolved against the input
/// schema at bind time.
pub struct Projection {
    input: Box<dyn Operator>,
    indices: Vec<usize>,
    schema: SchemaId,
}

impl Projection {
    pub fn new(input: Box<dyn Operator>, indices: Vec<usize>, schema: SchemaId) -> Self {
        Projection { input, indices, schema }
    }
}

impl Operator for Projection {
    fn next(&mut self) -> Result<Option<Tuple>, ExecutorError> {
        let Some(tuple) = self.input.next()? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(self.indices.len());
        for &index in &self.indices {
            let value =
                tuple.get(index).ok_or(ExecutorError::ColumnIndexOutOfBounds { index })?;
            values.push(value);
        }
        Ok(Some(Tuple::new(values)))
    }

    fn reset(&mut self) -> Result<(), ExecutorError> {
        self.input.reset()
    }

    fn schema_id(&self) -> SchemaId {
        self.schema
    }
}
