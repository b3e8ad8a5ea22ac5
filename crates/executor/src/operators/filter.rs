//! Predicate filter

use catalog::SchemaId;
use storage::Tuple;

use crate::errors::ExecutorError;
use crate::eval::{eval_predicate, BoundExpr};
use crate::operators::Operator;

/// Passes through tuples satisfying a bound predicate.
///
/// Tuples are unchanged, so the operator shares its input's schema.
pub struct Filter {
    input: Box<dyn Operator>,
    predicate: BoundExpr,
}

impl Filter {
    pub fn new(input: Box<dyn Operator>, predicate: BoundExpr) -> Self {
        Filter { input, predicate }
    }
}

impl Operator for Filter {
    fn next(&mut self) -> Result<Option<Tuple>, ExecutorError> {
        while let Some(tuple) = self.input.next()? {
            if eval_predicate(&self.predicate, &tuple)? {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> Result<(), ExecutorError> {
        self.input.reset()
    }

    fn schema_id(&self) -> SchemaId {
        self.input.schema_id()
    }
}
