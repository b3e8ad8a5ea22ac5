//! Nested-loop join

use catalog::SchemaId;
use storage::Tuple;

use crate::errors::ExecutorError;
use crate::eval::{eval_predicate, BoundExpr};
use crate::operators::Operator;

/// Tuple-at-a-time nested-loop join.
///
/// For each outer tuple the inner side is reset and fully re-scanned.
/// Output is the outer tuple's attributes followed by the inner tuple's;
/// without a condition this is the cross product. The condition, when
/// present, was bound against the join's own schema.
pub struct NestedLoopJoin {
    outer: Box<dyn Operator>,
    inner: Box<dyn Operator>,
    condition: Option<BoundExpr>,
    current_outer: Option<Tuple>,
    schema: SchemaId,
}

impl NestedLoopJoin {
    pub fn new(
        outer: Box<dyn Operator>,
        inner: Box<dyn Operator>,
        condition: Option<BoundExpr>,
        schema: SchemaId,
    ) -> Self {
        NestedLoopJoin { outer, inner, condition, current_outer: None, schema }
    }
}

impl Operator for NestedLoopJoin {
    fn next(&mut self) -> Result<Option<Tuple>, ExecutorError> {
        loop {
            if self.current_outer.is_none() {
                match self.outer.next()? {
                    Some(tuple) => {
                        self.current_outer = Some(tuple);
                        self.inner.reset()?;
                    }
                    None => return Ok(None),
                }
            }
            // current_outer is always Some here
            let outer = match &self.current_outer {
                Some(outer) => outer,
                None => return Ok(None),
            };

            while let Some(inner) = self.inner.next()? {
                let combined = outer.concat(&inner);
                let keep = match &self.condition {
                    Some(condition) => eval_predicate(condition, &combined)?,
                    None => true,
                };
                if keep {
                    return Ok(Some(combined));
                }
            }
            // inner exhausted for this outer tuple
            self.current_outer = None;
        }
    }

    fn reset(&mut self) -> Result<(), ExecutorError> {
        self.outer.reset()?;
        self.inner.reset()?;
        self.current_outer = None;
        Ok(())
    }

    fn schema_id(&self) -> SchemaId {
        self.schema
    }
}
