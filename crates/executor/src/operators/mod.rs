//! Physical operators
//!
//! Pull-model execution: each operator produces one tuple per `next()` call
//! and drains its children on demand. Operators are built fully bound - the
//! binder has already resolved every column reference to a tuple index and
//! registered the schema each operator emits.

use catalog::SchemaId;
use storage::Tuple;

use crate::errors::ExecutorError;

mod aggregate;
mod distinct;
mod filter;
mod join;
mod projection;
mod scan;
mod sort;

pub use aggregate::Aggregate;
pub use distinct::Distinct;
pub use filter::Filter;
pub use join::NestedLoopJoin;
pub use projection::Projection;
pub use scan::Scan;
pub use sort::Sort;

/// A pull-model operator.
pub trait Operator {
    /// Produce the next tuple, or `None` when the stream is exhausted.
    ///
    /// After exhaustion, further calls keep returning `None` until the
    /// operator is reset.
    fn next(&mut self) -> Result<Option<Tuple>, ExecutorError>;

    /// Restart the stream from its first tuple.
    fn reset(&mut self) -> Result<(), ExecutorError>;

    /// The schema describing the tuples this operator emits.
    fn schema_id(&self) -> SchemaId;
}
