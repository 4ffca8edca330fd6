//! Operator semantics on dynamic values.

use crate::ast::{BinaryOp, CompareOp};
use crate::evaluator::EvalError;
use crate::values::Value;
use ecow::{EcoString, EcoVec};

fn mismatch(op: &str, left: &Value, right: &Value) -> EvalError {
    EvalError::type_mismatch(
        op,
        format!("{} and {}", left.kind_name(), right.kind_name()),
    )
}

/// Evaluate a binary operation.
///
/// `+` concatenates as soon as an array is involved, then as soon as a
/// string is involved; everything else is float arithmetic following IEEE
/// 754 (division by zero yields an infinity, not an error).
pub(super) fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    if op == BinaryOp::Add {
        match (left, right) {
            (Value::Array(mut items), Value::Array(more)) => {
                items.extend(more.iter().cloned());
                Ok(Value::Array(items))
            }
            (Value::Array(mut items), scalar) => {
                items.push(scalar);
                Ok(Value::Array(items))
            }
            (scalar, Value::Array(items)) => {
                let mut out = EcoVec::with_capacity(items.len() + 1);
                out.push(scalar);
                out.extend(items.iter().cloned());
                Ok(Value::Array(out))
            }
            (left @ Value::Str(_), right) | (left, right @ Value::Str(_)) => {
                let mut text: EcoString = left.concat_text();
                text.push_str(&right.concat_text());
                Ok(Value::Str(text))
            }
            (left, right) => float_binary(op, &left, &right),
        }
    } else {
        float_binary(op, &left, &right)
    }
}

fn float_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (Value::Float(l), Value::Float(r)) = (left, right) else {
        return Err(mismatch(op.symbol(), left, right));
    };
    Ok(Value::Float(eval_binary_float(op, *l, *r)))
}

/// Evaluate a binary operation on two floats.
pub(super) fn eval_binary_float(op: BinaryOp, left: f64, right: f64) -> f64 {
    match op {
        BinaryOp::Add => left + right,
        BinaryOp::Sub => left - right,
        BinaryOp::Mul => left * right,
        BinaryOp::Div => left / right,
        BinaryOp::Pow => left.powf(right),
        // Sign follows the dividend.
        BinaryOp::Mod => left % right,
    }
}

/// Unary minus on numbers and vectors.
pub(super) fn negate(value: &Value) -> Result<Value, EvalError> {
    match value {
        Value::Float(x) => Ok(Value::Float(-x)),
        Value::Vec2(v) => Ok(Value::Vec2(-*v)),
        Value::Vec3(v) => Ok(Value::Vec3(-*v)),
        other => Err(EvalError::type_mismatch("-", other.kind_name())),
    }
}

/// `array[index]`, also component access on vectors and character access
/// on strings. Fractional indices are truncated.
pub(super) fn index(container: &Value, index: &Value) -> Result<Value, EvalError> {
    let Value::Float(raw) = index else {
        return Err(EvalError::type_mismatch("[]", format!("{} index", index.kind_name())));
    };
    let i = raw.trunc() as i64;
    let pick = |len: usize| -> Result<usize, EvalError> {
        usize::try_from(i)
            .ok()
            .filter(|&i| i < len)
            .ok_or(EvalError::IndexOutOfBounds { index: i, len })
    };
    match container {
        Value::Array(items) => Ok(items[pick(items.len())?].clone()),
        Value::Vec2(v) => Ok(Value::Float(v.to_array()[pick(2)?])),
        Value::Vec3(v) => Ok(Value::Float(v.to_array()[pick(3)?])),
        Value::Str(s) => {
            let len = s.chars().count();
            let at = pick(len)?;
            Ok(s.chars()
                .nth(at)
                .map(|c| Value::Str(c.into()))
                .unwrap_or(Value::Null))
        }
        other => Err(EvalError::type_mismatch("[]", other.kind_name())),
    }
}

/// Truthiness of a condition operand: booleans, or numbers compared to zero.
pub(super) fn truthy(value: &Value, op: &str) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Float(x) => Ok(*x != 0.0),
        other => Err(EvalError::type_mismatch(op, other.kind_name())),
    }
}

/// Compare two values.
///
/// Numbers compare numerically. Vectors, strings and everything else only
/// support `==` and `!=`; vectors and strings never compare with a value of
/// another kind.
pub(super) fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    let equal = match (left, right) {
        (Value::Float(l), Value::Float(r)) => {
            return Ok(match op {
                CompareOp::Eq => l == r,
                CompareOp::Ne => l != r,
                CompareOp::Lt => l < r,
                CompareOp::Le => l <= r,
                CompareOp::Gt => l > r,
                CompareOp::Ge => l >= r,
            });
        }
        _ if op.is_ordering() => return Err(mismatch(op.symbol(), left, right)),
        (Value::Vec2(l), Value::Vec2(r)) => l == r,
        (Value::Vec3(l), Value::Vec3(r)) => l == r,
        (Value::Str(l), Value::Str(r)) => l == r,
        (Value::Vec2(_) | Value::Vec3(_) | Value::Str(_), _)
        | (_, Value::Vec2(_) | Value::Vec3(_) | Value::Str(_)) => {
            return Err(mismatch(op.symbol(), left, right));
        }
        // Arrays compare by identity: only copies of one value are equal.
        (Value::Array(l), Value::Array(r)) => core::ptr::eq(l.as_slice(), r.as_slice()),
        (l, r) => l == r,
    };
    Ok(if op == CompareOp::Eq { equal } else { !equal })
}

/// Invoke a member function on a functional object.
pub(super) fn member_call(object: &Value, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match object {
        Value::Object(object) => object.call(name, args),
        other => Err(EvalError::type_mismatch(
            format!("->{}", name),
            other.kind_name(),
        )),
    }
}
