//! Conditions: comparisons, truthiness and `&&`/`||` chains.
//!
//! Chains short-circuit in both modes. In batch mode a chain narrows the
//! active set after each operand, so later operands are only evaluated for
//! the instances whose outcome is still open.

use super::{ExecutionError, Interpreter, ListEvaluationAid, operators};
use crate::ast::{CombinedInequality, Expression, Inequality, TermId};
use crate::evaluator::EvalError;

/// Locates a comparison failure across both operands.
fn comparison_error(
    expr: &Expression,
    left: TermId,
    right: TermId,
    error: EvalError,
) -> ExecutionError {
    let mut located = ExecutionError::at(expr, left, error);
    let end = expr.span_of(right).end();
    located.len = end.saturating_sub(located.offset);
    located
}

impl Interpreter<'_> {
    pub fn evaluate_condition(
        &mut self,
        condition: &CombinedInequality,
    ) -> Result<bool, ExecutionError> {
        match condition {
            CombinedInequality::Leaf(inequality) => self.evaluate_inequality(inequality),
            CombinedInequality::And(parts) => {
                for part in parts {
                    if !self.evaluate_condition(part)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            CombinedInequality::Or(parts) => {
                for part in parts {
                    if self.evaluate_condition(part)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    pub fn evaluate_inequality(&mut self, inequality: &Inequality) -> Result<bool, ExecutionError> {
        match inequality {
            Inequality::Compare { op, left, right } => {
                let l = self.get_value(*left)?;
                let r = self.get_value(*right)?;
                operators::compare(*op, &l, &r)
                    .map_err(|e| comparison_error(self.expr, *left, *right, e))
            }
            Inequality::Truthy(term) => {
                let value = self.get_value(*term)?;
                operators::truthy(&value, "condition").map_err(|e| self.fail(*term, e))
            }
        }
    }

    /// Batch form of [`Interpreter::evaluate_condition`]: one flag per active
    /// instance.
    pub fn evaluate_condition_for_list(
        &mut self,
        condition: &CombinedInequality,
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<bool>, ExecutionError> {
        match condition {
            CombinedInequality::Leaf(inequality) => {
                self.evaluate_inequality_for_list(inequality, aid)
            }
            CombinedInequality::And(parts) => self.evaluate_and_list_on_list(parts, aid),
            CombinedInequality::Or(parts) => self.evaluate_or_list_on_list(parts, aid),
        }
    }

    /// Conjunction over the active instances.
    ///
    /// After each conjunct only the instances for which every conjunct so far
    /// held stay active; an instance proven false never evaluates the
    /// remaining conjuncts.
    pub fn evaluate_and_list_on_list(
        &mut self,
        parts: &[CombinedInequality],
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<bool>, ExecutionError> {
        self.narrowing_chain(parts, aid, false)
    }

    /// Disjunction over the active instances; the dual of
    /// [`Interpreter::evaluate_and_list_on_list`].
    pub fn evaluate_or_list_on_list(
        &mut self,
        parts: &[CombinedInequality],
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<bool>, ExecutionError> {
        self.narrowing_chain(parts, aid, true)
    }

    /// Evaluates `parts` in order, dropping an instance from the active set
    /// as soon as one part yields `decisive` for it.
    fn narrowing_chain(
        &mut self,
        parts: &[CombinedInequality],
        aid: &mut ListEvaluationAid,
        decisive: bool,
    ) -> Result<Vec<bool>, ExecutionError> {
        let active = aid.active_indices(self.evaluator.size());
        let mut result = vec![!decisive; active.len()];
        // Positions into `active` whose outcome is still open.
        let mut open: Vec<usize> = (0..active.len()).collect();

        for part in parts {
            if open.is_empty() {
                break;
            }
            aid.push_subset(open.iter().map(|&p| active[p]).collect::<Vec<_>>());
            let flags = self.evaluate_condition_for_list(part, aid);
            aid.pop_subset();
            let flags = flags?;

            open = open
                .into_iter()
                .zip(flags)
                .filter_map(|(position, flag)| {
                    if flag == decisive {
                        result[position] = decisive;
                        None
                    } else {
                        Some(position)
                    }
                })
                .collect();
        }
        Ok(result)
    }

    pub fn evaluate_inequality_for_list(
        &mut self,
        inequality: &Inequality,
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<bool>, ExecutionError> {
        match inequality {
            Inequality::Compare { op, left, right } => {
                let lefts = self.get_values_for_list(*left, aid)?;
                let rights = self.get_values_for_list(*right, aid)?;
                lefts
                    .iter()
                    .zip(&rights)
                    .map(|(l, r)| {
                        operators::compare(*op, l, r)
                            .map_err(|e| comparison_error(self.expr, *left, *right, e))
                    })
                    .collect()
            }
            Inequality::Truthy(term) => self
                .get_values_for_list(*term, aid)?
                .iter()
                .map(|value| {
                    operators::truthy(value, "condition").map_err(|e| self.fail(*term, e))
                })
                .collect(),
        }
    }
}
