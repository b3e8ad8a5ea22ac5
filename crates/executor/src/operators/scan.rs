//! Base table scan

use std::path::Path;

use catalog::SchemaId;
use storage::{Tuple, TupleReader};

use crate::errors::ExecutorError;
use crate::operators::Operator;

/// Streams a base table's data file in row order.
pub struct Scan {
    reader: TupleReader,
    schema: SchemaId,
}

impl Scan {
    /// Open the table's data file. Fails immediately if the file is missing
    /// or unreadable.
    pub fn open(path: &Path, arity: usize, schema: SchemaId) -> Result<Self, ExecutorError> {
        let reader = TupleReader::open(path, arity)?;
        Ok(Scan { reader, schema })
    }
}

impl Operator for Scan {
    fn next(&mut self) -> Result<Option<Tuple>, ExecutorError> {
        Ok(self.reader.next_tuple()?)
    }

    fn reset(&mut self) -> Result<(), ExecutorError> {
        Ok(self.reader.reset()?)
    }

    fn schema_id(&self) -> SchemaId {
        self.schema
    }
}
