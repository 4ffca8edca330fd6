//! Batch evaluation over the active instances of a [`ListEvaluationAid`].
//!
//! Every sub-term runs its own sweep over the active indices and returns one
//! value per active instance, in enumeration order. Composite terms combine
//! their children's columns position by position. Branching terms split the
//! active set, push each part as a subset, and merge the results back by
//! position.

use super::eval::{bare_exists_name, keyword_value, switch_target};
use super::{EvalError, ExecutionError, Interpreter, ListEvaluationAid, host::is_unresolved, operators};
use crate::ast::{SwitchCase, TermId, TermKind};
use crate::stdlib;
use crate::values::Value;
use hashbrown::HashMap;

/// Row `k` of a set of argument columns.
fn row(columns: &[Vec<Value>], k: usize) -> Vec<Value> {
    columns.iter().map(|column| column[k].clone()).collect()
}

/// Switch keys group by value; `0.0` and `-0.0` are the same key.
fn key_bits(key: f64) -> u64 {
    if key == 0.0 { 0 } else { key.to_bits() }
}

impl Interpreter<'_> {
    /// Evaluates a term once per active instance of `aid`.
    pub fn get_values_for_list(
        &mut self,
        id: TermId,
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<Value>, ExecutionError> {
        self.nested(id, |this| this.get_values_for_list_inner(id, aid))
    }

    fn get_values_for_list_inner(
        &mut self,
        id: TermId,
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<Value>, ExecutionError> {
        let expr = self.expr;
        let count = aid.active_count(self.evaluator.size());
        if self.depth == 1 {
            tracing::debug!(instances = count, "batch evaluation");
        }

        match &expr.node(id).kind {
            TermKind::Constant { text, number } => match number {
                Some(n) => Ok(vec![Value::Float(*n); count]),
                None => self.resolve_constants_for_list(id, text, count, aid),
            },

            TermKind::Str(s) => Ok(vec![Value::Str(s.clone()); count]),

            TermKind::Unary(operand) => self
                .get_values_for_list(*operand, aid)?
                .iter()
                .map(|value| operators::negate(value).map_err(|e| self.fail(id, e)))
                .collect(),

            TermKind::Binary { op, left, right } => {
                let lefts = self.get_values_for_list(*left, aid)?;
                let rights = self.get_values_for_list(*right, aid)?;
                lefts
                    .into_iter()
                    .zip(rights)
                    .map(|(l, r)| operators::binary(*op, l, r).map_err(|e| self.fail(id, e)))
                    .collect()
            }

            TermKind::Call { name, args } => self.call_for_list(id, name, args, count, aid),

            TermKind::MemberCall { object, name, args } => {
                let objects = self.get_values_for_list(*object, aid)?;
                let columns = self.get_arg_columns(args, aid)?;
                objects
                    .iter()
                    .enumerate()
                    .map(|(k, object)| {
                        operators::member_call(object, name, &row(&columns, k))
                            .map_err(|e| self.fail(id, e))
                    })
                    .collect()
            }

            TermKind::Array(elements) => {
                let columns = self.get_arg_columns(elements, aid)?;
                Ok((0..count)
                    .map(|k| Value::Array(columns.iter().map(|c| c[k].clone()).collect()))
                    .collect())
            }

            TermKind::Index { array, index } => {
                let containers = self.get_values_for_list(*array, aid)?;
                let indices = self.get_values_for_list(*index, aid)?;
                containers
                    .iter()
                    .zip(&indices)
                    .map(|(c, i)| operators::index(c, i).map_err(|e| self.fail(id, e)))
                    .collect()
            }

            TermKind::Switch {
                discriminant,
                cases,
                default,
            } => self.switch_for_list(*discriminant, cases, *default, aid),

            TermKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let flags = self.evaluate_condition_for_list(condition, aid)?;
                self.branch_for_list(&flags, *then, *otherwise, aid)
            }

            TermKind::Optional { name, fallback } => {
                self.optional_for_list(id, name, *fallback, count, aid)
            }

            TermKind::Not(operand) => self
                .get_values_for_list(*operand, aid)?
                .iter()
                .map(|value| {
                    operators::truthy(value, "!")
                        .map(|b| Value::Bool(!b))
                        .map_err(|e| self.fail(id, e))
                })
                .collect(),

            TermKind::Inequality(inequality) => Ok(self
                .evaluate_inequality_for_list(inequality, aid)?
                .into_iter()
                .map(Value::Bool)
                .collect()),

            TermKind::Combined(combined) => Ok(self
                .evaluate_condition_for_list(combined, aid)?
                .into_iter()
                .map(Value::Bool)
                .collect()),
        }
    }

    /// Host answers must cover every active instance.
    fn check_count(
        &self,
        id: TermId,
        what: &str,
        values: Vec<Value>,
        count: usize,
    ) -> Result<Vec<Value>, ExecutionError> {
        if values.len() == count {
            Ok(values)
        } else {
            Err(self.fail(
                id,
                EvalError::host(format!(
                    "{} returned {} values for {} instances",
                    what,
                    values.len(),
                    count
                )),
            ))
        }
    }

    fn resolve_constants_for_list(
        &mut self,
        id: TermId,
        text: &str,
        count: usize,
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<Value>, ExecutionError> {
        if let Some(value) = keyword_value(text) {
            return Ok(vec![value; count]);
        }
        if let Some(object) = self.registry.get(text) {
            return Ok(vec![Value::Object(object.clone()); count]);
        }
        let values = self
            .evaluator
            .resolve_constants_for_list(text, aid)
            .map_err(|e| self.fail(id, e))?;
        self.check_count(id, text, values, count)
    }

    /// One column per argument.
    fn get_arg_columns(
        &mut self,
        args: &[TermId],
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<Vec<Value>>, ExecutionError> {
        args.iter()
            .map(|arg| self.get_values_for_list(*arg, aid))
            .collect()
    }

    fn call_for_list(
        &mut self,
        id: TermId,
        name: &str,
        args: &[TermId],
        count: usize,
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<Value>, ExecutionError> {
        let size = self.evaluator.size();

        if let Some(word) = bare_exists_name(self.expr, name, args) {
            let mut values = Vec::with_capacity(count);
            let mut cursor = aid.cursor(size);
            while cursor.set_next_index(&mut *self.evaluator) {
                values.push(Value::Bool(self.evaluator.exists(word)));
            }
            return Ok(values);
        }

        let columns = self.get_arg_columns(args, aid)?;

        if let Some(builtin) = stdlib::lookup(name) {
            let mut values = Vec::with_capacity(count);
            let mut cursor = aid.cursor(size);
            let mut k = 0;
            while cursor.set_next_index(&mut *self.evaluator) {
                let value = builtin
                    .invoke(&row(&columns, k), &mut *self.evaluator)
                    .map_err(|e| self.fail(id, e))?;
                values.push(value);
                k += 1;
            }
            return Ok(values);
        }

        match self.evaluator.call_function_for_list(name, &columns, aid) {
            Some(result) => {
                let values = result.map_err(|e| self.fail(id, e))?;
                self.check_count(id, name, values, count)
            }
            None => Err(self.fail(
                id,
                EvalError::UndefinedReference {
                    name: name.to_string(),
                },
            )),
        }
    }

    /// Evaluates `term` over `positions` of the active set only, merging the
    /// results into `results` at those positions.
    fn evaluate_over(
        &mut self,
        term: TermId,
        positions: &[usize],
        results: &mut [Value],
        aid: &mut ListEvaluationAid,
    ) -> Result<(), ExecutionError> {
        if positions.is_empty() {
            return Ok(());
        }
        let active = aid.active_indices(self.evaluator.size());
        aid.push_subset(positions.iter().map(|&p| active[p]).collect::<Vec<_>>());
        let values = self.get_values_for_list(term, aid);
        aid.pop_subset();
        for (&position, value) in positions.iter().zip(values?) {
            results[position] = value;
        }
        Ok(())
    }

    fn branch_for_list(
        &mut self,
        flags: &[bool],
        then: TermId,
        otherwise: TermId,
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<Value>, ExecutionError> {
        let (taken, skipped): (Vec<usize>, Vec<usize>) =
            (0..flags.len()).partition(|&position| flags[position]);
        let mut results = vec![Value::Null; flags.len()];
        self.evaluate_over(then, &taken, &mut results, aid)?;
        self.evaluate_over(otherwise, &skipped, &mut results, aid)?;
        Ok(results)
    }

    /// Groups the active instances by discriminant and evaluates each
    /// matching case over its own group.
    ///
    /// The default branch is only evaluated when every active instance has
    /// the same discriminant. With mixed discriminants, instances that match
    /// no case yield `null`.
    fn switch_for_list(
        &mut self,
        discriminant: TermId,
        cases: &[SwitchCase],
        default: TermId,
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<Value>, ExecutionError> {
        let keys = self
            .get_values_for_list(discriminant, aid)?
            .iter()
            .map(|key| self.switch_key(discriminant, key))
            .collect::<Result<Vec<f64>, _>>()?;

        let Some(&first) = keys.first() else {
            return Ok(Vec::new());
        };
        if keys.iter().all(|&k| key_bits(k) == key_bits(first)) {
            return self.get_values_for_list(switch_target(cases, first, default), aid);
        }

        let mut groups: Vec<(f64, Vec<usize>)> = Vec::new();
        let mut group_of: HashMap<u64, usize> = HashMap::new();
        for (position, &key) in keys.iter().enumerate() {
            let group = *group_of.entry(key_bits(key)).or_insert_with(|| {
                groups.push((key, Vec::new()));
                groups.len() - 1
            });
            groups[group].1.push(position);
        }

        let mut results = vec![Value::Null; keys.len()];
        for (key, positions) in &groups {
            match cases.iter().find(|case| case.key == *key) {
                Some(case) => self.evaluate_over(case.term, positions, &mut results, aid)?,
                None => tracing::warn!(
                    key,
                    instances = positions.len(),
                    "switch default not evaluated for mixed discriminants"
                ),
            }
        }
        Ok(results)
    }

    fn optional_for_list(
        &mut self,
        id: TermId,
        name: &str,
        fallback: TermId,
        count: usize,
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<Value>, ExecutionError> {
        let values = self
            .evaluator
            .resolve_constants_for_list(name, aid)
            .map_err(|e| self.fail(id, e))?;
        let mut values = self.check_count(id, name, values, count)?;
        let missing: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|(_, value)| is_unresolved(value, name))
            .map(|(position, _)| position)
            .collect();
        self.evaluate_over(fallback, &missing, &mut values, aid)?;
        Ok(values)
    }
}
