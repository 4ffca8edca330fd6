//! Tree-walking evaluator for parsed formulas.
//!
//! Two entry points share one interpreter:
//!
//! - [`Interpreter::get_value`] evaluates a term once, for the host's current
//!   instance.
//! - [`Interpreter::get_values_for_list`] evaluates a term for every active
//!   instance of a [`ListEvaluationAid`], returning one value per instance.
//!   Batch mode is an optimization: its results equal a single evaluation per
//!   instance with the host's index set accordingly.
//!
//! ## Design Principles
//!
//! - **Never panic**: malformed host answers and hostile formulas fail with
//!   an [`ExecutionError`].
//! - **Stack-safe**: depth tracking turns runaway recursion into
//!   [`EvalError::StackOverflow`].
//!
//! ## Example
//!
//! ```
//! use shaperule_core::evaluator::TableEvaluator;
//! use shaperule_core::parser::parse;
//! use shaperule_core::values::Value;
//!
//! let expr = parse("width * 2").unwrap();
//! let mut host = TableEvaluator::with_seed(0);
//! host.set_global("width", 4.0);
//! assert_eq!(expr.root().get_value(&mut host).unwrap(), Value::Float(8.0));
//! ```

mod aid;
mod condition;
mod error;
mod eval;
mod host;
mod list;
mod operators;



pub use aid::{IndexCursor, ListEvaluationAid};
pub use error::{EvalError, ExecutionError};
pub use host::{CombinedEvaluator, TableEvaluator, TermEvaluator, is_unresolved};

use crate::api::ExecutionOptions;
use crate::ast::{Expression, Term, TermId};
use crate::values::{ObjectRegistry, Value};

/// Evaluation state for one expression and one host.
pub struct Interpreter<'a> {
    expr: &'a Expression,
    registry: &'a ObjectRegistry,
    evaluator: &'a mut dyn TermEvaluator,
    options: ExecutionOptions,
    depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        expr: &'a Expression,
        registry: &'a ObjectRegistry,
        evaluator: &'a mut dyn TermEvaluator,
        options: ExecutionOptions,
    ) -> Self {
        Self {
            expr,
            registry,
            evaluator,
            options,
            depth: 0,
        }
    }

    pub fn expression(&self) -> &'a Expression {
        self.expr
    }

    fn fail(&self, term: TermId, error: EvalError) -> ExecutionError {
        ExecutionError::at(self.expr, term, error)
    }

    /// Runs `f` one level deeper, failing once the configured depth is
    /// reached.
    fn nested<T>(
        &mut self,
        term: TermId,
        f: impl FnOnce(&mut Self) -> Result<T, ExecutionError>,
    ) -> Result<T, ExecutionError> {
        if self.depth >= self.options.max_depth {
            return Err(self.fail(
                term,
                EvalError::StackOverflow {
                    depth: self.depth,
                    max_depth: self.options.max_depth,
                },
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

impl Term<'_> {
    /// Evaluates this term once, with no registered objects and default
    /// limits.
    pub fn get_value(&self, evaluator: &mut dyn TermEvaluator) -> Result<Value, ExecutionError> {
        self.get_value_with(evaluator, &ObjectRegistry::new(), &ExecutionOptions::default())
    }

    pub fn get_value_with(
        &self,
        evaluator: &mut dyn TermEvaluator,
        registry: &ObjectRegistry,
        options: &ExecutionOptions,
    ) -> Result<Value, ExecutionError> {
        Interpreter::new(self.expression(), registry, evaluator, options.clone())
            .get_value(self.id())
    }

    /// Evaluates this term once per active instance of `aid`.
    pub fn get_values_for_list(
        &self,
        evaluator: &mut dyn TermEvaluator,
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<Value>, ExecutionError> {
        self.get_values_for_list_with(
            evaluator,
            aid,
            &ObjectRegistry::new(),
            &ExecutionOptions::default(),
        )
    }

    pub fn get_values_for_list_with(
        &self,
        evaluator: &mut dyn TermEvaluator,
        aid: &mut ListEvaluationAid,
        registry: &ObjectRegistry,
        options: &ExecutionOptions,
    ) -> Result<Vec<Value>, ExecutionError> {
        Interpreter::new(self.expression(), registry, evaluator, options.clone())
            .get_values_for_list(self.id(), aid)
    }

    /// Folds a constant sub-tree to its value. `None` when the term depends
    /// on the host. The tree itself is left untouched.
    pub fn constant_value(&self) -> Option<Result<Value, ExecutionError>> {
        if !self.is_constant() {
            return None;
        }
        let mut host = TableEvaluator::with_seed(0);
        Some(self.get_value(&mut host))
    }
}
