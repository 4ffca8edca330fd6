//! Shape, host and diagnostic functions.
//!
//! Functions: extrude, exists, gate_print

use super::Table;
use crate::evaluator::{EvalError, TermEvaluator};
use crate::values::Value;
use glam::DVec3;

pub(super) fn register(table: &mut Table) {
    table.native("extrude", 2, Some(2), "(shape or 2-vector, height)", extrude);
    table.native("exists", 1, Some(1), "one name", exists);
    table.native("gate_print", 1, None, "at least one value", gate_print);
}

/// Dispatches on the kind of the shape: objects extrude themselves, a
/// 2-vector gains the height as its z component.
fn extrude(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let expected = "(shape or 2-vector, height)";
    let Value::Float(height) = args[1] else {
        return Err(EvalError::arity_or_type("extrude", expected));
    };
    match &args[0] {
        Value::Object(shape) => shape.call("extrude", &args[1..]),
        Value::Vec2(v) => Ok(Value::Vec3(DVec3::new(v.x, v.y, height))),
        _ => Err(EvalError::arity_or_type("extrude", expected)),
    }
}

/// Only reached when the argument is not a bare name, so it was evaluated:
/// a string is looked up as a name, `null` does not exist and anything
/// else does.
fn exists(args: &[Value], evaluator: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    Ok(Value::Bool(match &args[0] {
        Value::Str(name) => evaluator.exists(name),
        Value::Null => false,
        _ => true,
    }))
}

fn gate_print(args: &[Value], _: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    tracing::info!(target: "gate_print", "{}", line);
    println!("{}", line);
    Ok(args[0].clone())
}
