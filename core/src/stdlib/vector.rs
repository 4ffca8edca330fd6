//! Vector and array constructors and vector math.
//!
//! Functions: vec2, vec3, vec4, vec, vecCross, vecDot, vecLen, vecNormalize,
//!            arr

use super::{Table, float_arg};
use crate::evaluator::{EvalError, TermEvaluator};
use crate::values::Value;
use glam::{DVec2, DVec3};

pub(super) fn register(table: &mut Table) {
    table.native("vec2", 2, Some(2), "two numbers", vec2);
    table.native("vec3", 3, Some(3), "three numbers", vec3);
    table.native("vec4", 4, Some(4), "four numbers", vec4);
    table.native("vec", 1, Some(3), VEC_EXPECTED, vec);
    table.native("vecCross", 2, Some(2), "two vectors of the same size", vec_cross);
    table.native("vecDot", 2, Some(2), "two vectors of the same size", vec_dot);
    table.native("vecLen", 1, Some(1), "one vector", vec_len);
    table.native("vecNormalize", 1, Some(1), "one vector", vec_normalize);
    table.native("arr", 0, None, "any values", arr);
}

const VEC_EXPECTED: &str = "two or three numbers, or an array of two or three numbers";

fn floats(args: &[Value], function: &str, expected: &str) -> Result<Vec<f64>, EvalError> {
    (0..args.len())
        .map(|i| float_arg(args, i, function, expected))
        .collect()
}

fn vec2(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let xs = floats(args, "vec2", "two numbers")?;
    Ok(Value::Vec2(DVec2::new(xs[0], xs[1])))
}

fn vec3(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let xs = floats(args, "vec3", "three numbers")?;
    Ok(Value::Vec3(DVec3::new(xs[0], xs[1], xs[2])))
}

/// There is no four-component vector value; `vec4` builds a 4-element array.
fn vec4(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let xs = floats(args, "vec4", "four numbers")?;
    Ok(xs.into_iter().map(Value::Float).collect())
}

fn vec(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let components = match args {
        [Value::Array(items)] => floats(items, "vec", VEC_EXPECTED)?,
        _ => floats(args, "vec", VEC_EXPECTED)?,
    };
    match components[..] {
        [x, y] => Ok(Value::Vec2(DVec2::new(x, y))),
        [x, y, z] => Ok(Value::Vec3(DVec3::new(x, y, z))),
        _ => Err(EvalError::arity_or_type("vec", VEC_EXPECTED)),
    }
}

/// 3-vectors give a 3-vector; 2-vectors give the scalar z component.
fn vec_cross(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    match (&args[0], &args[1]) {
        (Value::Vec3(a), Value::Vec3(b)) => Ok(Value::Vec3(a.cross(*b))),
        (Value::Vec2(a), Value::Vec2(b)) => Ok(Value::Float(a.perp_dot(*b))),
        _ => Err(EvalError::arity_or_type("vecCross", "two vectors of the same size")),
    }
}

fn vec_dot(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    match (&args[0], &args[1]) {
        (Value::Vec3(a), Value::Vec3(b)) => Ok(Value::Float(a.dot(*b))),
        (Value::Vec2(a), Value::Vec2(b)) => Ok(Value::Float(a.dot(*b))),
        _ => Err(EvalError::arity_or_type("vecDot", "two vectors of the same size")),
    }
}

fn vec_len(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Vec3(v) => Ok(Value::Float(v.length())),
        Value::Vec2(v) => Ok(Value::Float(v.length())),
        _ => Err(EvalError::arity_or_type("vecLen", "one vector")),
    }
}

/// The zero vector normalizes to itself.
fn vec_normalize(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    match &args[0] {
        Value::Vec3(v) => Ok(Value::Vec3(v.normalize_or_zero())),
        Value::Vec2(v) => Ok(Value::Vec2(v.normalize_or_zero())),
        _ => Err(EvalError::arity_or_type("vecNormalize", "one vector")),
    }
}

fn arr(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    Ok(args.iter().cloned().collect())
}
