//! Single-instance evaluation.

use super::{EvalError, ExecutionError, Interpreter, host::is_unresolved, operators};
use crate::ast::{Expression, SwitchCase, TermId, TermKind};
use crate::stdlib;
use crate::values::Value;
use core::f64::consts::PI;
use ecow::EcoVec;

/// Words with a fixed meaning. `pi`, `true` and `false` ignore case.
pub(super) fn keyword_value(text: &str) -> Option<Value> {
    if text.eq_ignore_ascii_case("pi") {
        Some(Value::Float(PI))
    } else if text.eq_ignore_ascii_case("true") {
        Some(Value::Bool(true))
    } else if text.eq_ignore_ascii_case("false") {
        Some(Value::Bool(false))
    } else if text == "null" {
        Some(Value::Null)
    } else if text == "ARRAY" {
        Some(Value::empty_array())
    } else {
        None
    }
}

/// `exists(name)` with a bare word asks about the word itself instead of
/// its value.
pub(super) fn bare_exists_name<'e>(
    expr: &'e Expression,
    name: &str,
    args: &[TermId],
) -> Option<&'e str> {
    match (name, args) {
        ("exists", [arg]) => match &expr.node(*arg).kind {
            TermKind::Constant { text, number: None } => Some(text.as_str()),
            _ => None,
        },
        _ => None,
    }
}

pub(super) fn switch_target(cases: &[SwitchCase], key: f64, default: TermId) -> TermId {
    cases
        .iter()
        .find(|case| case.key == key)
        .map_or(default, |case| case.term)
}

impl Interpreter<'_> {
    /// Evaluates a term for the host's current instance.
    pub fn get_value(&mut self, id: TermId) -> Result<Value, ExecutionError> {
        self.nested(id, |this| this.get_value_inner(id))
    }

    fn get_value_inner(&mut self, id: TermId) -> Result<Value, ExecutionError> {
        let expr = self.expr;
        match &expr.node(id).kind {
            TermKind::Constant { text, number } => match number {
                Some(n) => Ok(Value::Float(*n)),
                None => self.resolve_constant(id, text),
            },

            TermKind::Str(s) => Ok(Value::Str(s.clone())),

            TermKind::Unary(operand) => {
                let value = self.get_value(*operand)?;
                operators::negate(&value).map_err(|e| self.fail(id, e))
            }

            TermKind::Binary { op, left, right } => {
                let left = self.get_value(*left)?;
                let right = self.get_value(*right)?;
                operators::binary(*op, left, right).map_err(|e| self.fail(id, e))
            }

            TermKind::Call { name, args } => {
                if let Some(name) = bare_exists_name(expr, name, args) {
                    return Ok(Value::Bool(self.evaluator.exists(name)));
                }
                let args = self.get_arg_values(args)?;
                stdlib::call(name, &args, &mut *self.evaluator).map_err(|e| self.fail(id, e))
            }

            TermKind::MemberCall { object, name, args } => {
                let object = self.get_value(*object)?;
                let args = self.get_arg_values(args)?;
                operators::member_call(&object, name, &args).map_err(|e| self.fail(id, e))
            }

            TermKind::Array(elements) => elements
                .iter()
                .map(|element| self.get_value(*element))
                .collect::<Result<EcoVec<_>, _>>()
                .map(Value::Array),

            TermKind::Index { array, index } => {
                let container = self.get_value(*array)?;
                let index = self.get_value(*index)?;
                operators::index(&container, &index).map_err(|e| self.fail(id, e))
            }

            TermKind::Switch {
                discriminant,
                cases,
                default,
            } => {
                let key = self.get_value(*discriminant)?;
                let key = self.switch_key(*discriminant, &key)?;
                self.get_value(switch_target(cases, key, *default))
            }

            TermKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.evaluate_condition(condition)? {
                    self.get_value(*then)
                } else {
                    self.get_value(*otherwise)
                }
            }

            TermKind::Optional { name, fallback } => {
                let value = self
                    .evaluator
                    .resolve_constant(name)
                    .map_err(|e| self.fail(id, e))?;
                if is_unresolved(&value, name) {
                    self.get_value(*fallback)
                } else {
                    Ok(value)
                }
            }

            TermKind::Not(operand) => {
                let value = self.get_value(*operand)?;
                operators::truthy(&value, "!")
                    .map(|b| Value::Bool(!b))
                    .map_err(|e| self.fail(id, e))
            }

            TermKind::Inequality(inequality) => {
                self.evaluate_inequality(inequality).map(Value::Bool)
            }

            TermKind::Combined(combined) => self.evaluate_condition(combined).map(Value::Bool),
        }
    }

    /// Keywords, then registered objects, then the host.
    fn resolve_constant(&mut self, id: TermId, text: &str) -> Result<Value, ExecutionError> {
        if let Some(value) = keyword_value(text) {
            return Ok(value);
        }
        if let Some(object) = self.registry.get(text) {
            return Ok(Value::Object(object.clone()));
        }
        self.evaluator
            .resolve_constant(text)
            .map_err(|e| self.fail(id, e))
    }

    fn get_arg_values(&mut self, args: &[TermId]) -> Result<Vec<Value>, ExecutionError> {
        args.iter().map(|arg| self.get_value(*arg)).collect()
    }

    pub(super) fn switch_key(&self, discriminant: TermId, key: &Value) -> Result<f64, ExecutionError> {
        key.as_float().ok_or_else(|| {
            self.fail(
                discriminant,
                EvalError::type_mismatch("switch", key.kind_name()),
            )
        })
    }
}
