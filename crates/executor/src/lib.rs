//! Query Executor
//!
//! Turns a parsed SELECT statement into results in three stages:
//!
//! 1. **Plan** - [`planner`] builds a left-deep logical [`Plan`], splitting
//!    the WHERE tree into join predicates and filters.
//! 2. **Optimize** - [`optimizer`] rewrites the plan: constant-true filter
//!    and identity-projection removal, filter pushdown below joins and
//!    projections.
//! 3. **Bind** - [`bind`] resolves every column reference against the
//!    catalog exactly once and produces the physical [`Operator`] tree,
//!    registering derived schemas along the way.
//!
//! Execution is pull-model: the caller drains the root operator with
//! `next()` until it returns `None`.

mod bind;
mod errors;
mod eval;
mod operators;
mod optimizer;
mod plan;
mod planner;
mod predicate;

pub use bind::bind;
pub use errors::ExecutorError;
pub use eval::{bind_expr, eval_predicate, eval_value, BoundExpr};
pub use operators::{
    Aggregate, Distinct, Filter, NestedLoopJoin, Operator, Projection, Scan, Sort,
};
pub use optimizer::optimize;
pub use plan::Plan;
pub use planner::plan_select;

use ast::SelectStmt;
use catalog::Catalog;
use storage::Tuple;

/// One-stop SELECT execution over a per-query catalog.
pub struct SelectExecutor<'a> {
    catalog: &'a mut Catalog,
}

impl<'a> SelectExecutor<'a> {
    pub fn new(catalog: &'a mut Catalog) -> Self {
        SelectExecutor { catalog }
    }

    /// Plan, optimize, and bind a statement into a ready operator tree.
    pub fn build(&mut self, stmt: &SelectStmt) -> Result<Box<dyn Operator>, ExecutorError> {
        let plan = plan_select(stmt, self.catalog)?;
        let plan = optimize(plan, self.catalog)?;
        bind(&plan, self.catalog)
    }

    /// Execute a statement and collect all result rows.
    pub fn execute(&mut self, stmt: &SelectStmt) -> Result<Vec<Tuple>, ExecutorError> {
        let mut root = self.build(stmt)?;
        let mut rows = Vec::new();
        while let Some(tuple) = root.next()? {
            rows.push(tuple);
        }
        Ok(rows)
    }
}
