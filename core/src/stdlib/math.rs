//! Math functions.
//!
//! Functions: sin, cos, tan, asin, acos, atan, sinh, cosh, tanh, sqrt, abs,
//!            floor, ceil, round, trunc, fract, sign, ln, log, log2, exp,
//!            rad, deg, atan2, pow, min, max, clamp

use super::{Table, float_arg};
use crate::evaluator::{EvalError, TermEvaluator};
use crate::values::Value;

pub(super) fn register(table: &mut Table) {
    table.unary("sin", f64::sin);
    table.unary("cos", f64::cos);
    table.unary("tan", f64::tan);
    table.unary("asin", f64::asin);
    table.unary("acos", f64::acos);
    table.unary("atan", f64::atan);
    table.unary("sinh", f64::sinh);
    table.unary("cosh", f64::cosh);
    table.unary("tanh", f64::tanh);
    table.unary("sqrt", f64::sqrt);
    table.unary("abs", f64::abs);
    table.unary("floor", f64::floor);
    table.unary("ceil", f64::ceil);
    table.unary("round", f64::round);
    table.unary("trunc", f64::trunc);
    table.unary("fract", fract);
    table.unary("sign", sign);
    table.unary("ln", f64::ln);
    table.unary("log", f64::log10);
    table.unary("log2", f64::log2);
    table.unary("exp", f64::exp);
    table.unary("rad", f64::to_radians);
    table.unary("deg", f64::to_degrees);

    table.native("atan2", 2, Some(2), "two numbers (y, x)", math_atan2);
    table.native("pow", 2, Some(2), "two numbers (base, exponent)", math_pow);
    table.native("min", 2, Some(3), "two or three numbers", math_min);
    table.native("max", 2, Some(3), "two or three numbers", math_max);
    table.native("clamp", 3, Some(3), "three numbers (x, min, max)", math_clamp);
}

// ============================================================================
// One-argument helpers
// ============================================================================

/// Fractional part, always in `[0, 1)`.
fn fract(x: f64) -> f64 {
    x - x.floor()
}

/// -1, 0 or 1. Unlike `f64::signum`, zero maps to zero.
fn sign(x: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x.signum() }
}

// ============================================================================
// Multi-argument functions
// ============================================================================

fn math_atan2(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let y = float_arg(args, 0, "atan2", "two numbers (y, x)")?;
    let x = float_arg(args, 1, "atan2", "two numbers (y, x)")?;
    Ok(Value::Float(y.atan2(x)))
}

fn math_pow(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let base = float_arg(args, 0, "pow", "two numbers (base, exponent)")?;
    let exponent = float_arg(args, 1, "pow", "two numbers (base, exponent)")?;
    Ok(Value::Float(base.powf(exponent)))
}

fn fold_floats(
    args: &[Value],
    function: &str,
    f: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    let mut acc = float_arg(args, 0, function, "two or three numbers")?;
    for i in 1..args.len() {
        acc = f(acc, float_arg(args, i, function, "two or three numbers")?);
    }
    Ok(Value::Float(acc))
}

fn math_min(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    fold_floats(args, "min", f64::min)
}

fn math_max(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    fold_floats(args, "max", f64::max)
}

/// Clamp a value between min and max. Never panics, even for `min > max`.
fn math_clamp(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let expected = "three numbers (x, min, max)";
    let x = float_arg(args, 0, "clamp", expected)?;
    let lo = float_arg(args, 1, "clamp", expected)?;
    let hi = float_arg(args, 2, "clamp", expected)?;
    Ok(Value::Float(x.max(lo).min(hi)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fract_and_sign() {
        assert_eq!(fract(2.25), 0.25);
        assert_eq!(fract(-0.25), 0.75);
        assert_eq!(sign(-3.0), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(7.0), 1.0);
    }
}
