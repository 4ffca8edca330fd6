//! Shared fixtures and the `test_case!` macro for the integration tests.
//!
//! ```ignore
//! test_case! {
//!     name: simple_addition,
//!     input: "1 + 2",
//!     formatted: "(1 + 2)",
//!     value: Value::Float(3.0),
//! }
//! ```
//!
//! Every field after `input` is optional:
//!
//! - `formatted`: canonical print, which must also parse back to itself
//! - `value`: result against [`host`]
//! - `batch`: results against [`instances`], which must also equal one
//!   evaluation per instance
//! - `error`: diagnostic code of the expected failure against [`host`]

#![allow(dead_code)]

use once_cell::sync::Lazy;
use shaperule::{
    Engine, EngineOptions, Error, EvalError, Expression, FunctionalObject, ListEvaluationAid,
    TableEvaluator, TermEvaluator, Value,
};
use std::sync::Arc;

#[macro_export]
macro_rules! test_case {
    (
        name: $name:ident,
        input: $input:expr,
        $( formatted: $formatted:expr, )?
        $( value: $value:expr, )?
        $( batch: $batch:expr, )?
        $( error: $code:expr, )?
    ) => {
        mod $name {
            #[allow(unused_imports)]
            use super::*;

            $(
                #[test]
                fn formatted() {
                    let printed = $crate::cases::parse($input).to_string();
                    pretty_assertions::assert_eq!(printed, $formatted);
                    let reprinted = $crate::cases::parse(&printed).to_string();
                    pretty_assertions::assert_eq!(reprinted, printed);
                }
            )?

            $(
                #[test]
                fn value() {
                    pretty_assertions::assert_eq!($crate::cases::evaluate($input), $value);
                }
            )?

            $(
                #[test]
                fn batch() {
                    let expected: Vec<shaperule::Value> = $batch;
                    pretty_assertions::assert_eq!($crate::cases::evaluate_batch($input), expected);
                }
            )?

            $(
                #[test]
                fn error() {
                    let err = $crate::cases::failure($input);
                    pretty_assertions::assert_eq!(err.to_diagnostic().code.as_deref(), Some($code));
                }
            )?
        }
    };
}

/// A building lot with a fixed area of 120.
#[derive(Debug)]
pub struct Lot;

impl FunctionalObject for Lot {
    fn type_name(&self) -> &str {
        "lot"
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        match (name, args) {
            ("area", []) => Ok(Value::Float(120.0)),
            ("extrude", [Value::Float(height)]) => Ok(Value::Float(120.0 * height)),
            _ => Err(EvalError::UndefinedReference {
                name: format!("lot->{}", name),
            }),
        }
    }
}

/// Engine with `lot` registered.
pub static ENGINE: Lazy<Engine> = Lazy::new(|| {
    Engine::with_registry(EngineOptions::default(), |registry| {
        registry.register("lot", Arc::new(Lot));
    })
});

/// A single instance with a handful of attributes.
pub fn host() -> TableEvaluator {
    let mut host = TableEvaluator::with_seed(42);
    host.set_global("width", 10.0);
    host.set_global("height", 4.0);
    host.set_global("floors", 5.0);
    host.set_global("name", "tower");
    host.set_global("flag", true);
    host.set_global("corner", glam::DVec2::new(3.0, 4.0));
    host.set_global("pos", glam::DVec3::new(1.0, 2.0, 3.0));
    host.set_global(
        "sizes",
        vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)],
    );
    host
}

/// Four instances: `index`, `w = 2 * index`, `kind` alternating 1 and 2,
/// and `roof` on even instances only. `width` is shared.
pub fn instances() -> TableEvaluator {
    let mut host = TableEvaluator::with_instances(4);
    host.set_global("width", 10.0);
    for i in 0..4 {
        host.set_instance_value(i, "index", i as f64);
        host.set_instance_value(i, "w", 2.0 * i as f64);
        host.set_instance_value(i, "kind", (i % 2 + 1) as f64);
        if i % 2 == 0 {
            host.set_instance_value(i, "roof", "gable");
        }
    }
    host
}

pub fn parse(source: &str) -> Expression {
    ENGINE
        .parse(source)
        .unwrap_or_else(|e| panic!("'{}' should parse: {}", source, e))
}

pub fn evaluate(source: &str) -> Value {
    ENGINE
        .run(source, &mut host())
        .unwrap_or_else(|e| panic!("'{}' should evaluate: {}", source, e))
}

pub fn failure(source: &str) -> Error {
    match ENGINE.run(source, &mut host()) {
        Ok(value) => panic!("expected '{}' to fail, got {}", source, value),
        Err(e) => e,
    }
}

/// Batch results over [`instances`], checked against one evaluation per
/// instance.
pub fn evaluate_batch(source: &str) -> Vec<Value> {
    let expr = parse(source);

    let mut host = instances();
    let mut aid = ListEvaluationAid::new();
    let values = ENGINE
        .evaluate_for_list(&expr, &mut host, &mut aid)
        .unwrap_or_else(|e| panic!("'{}' should evaluate in batch: {}", source, e));
    assert_eq!(aid.depth(), 0);

    let mut host = instances();
    let singles: Vec<Value> = (0..host.size())
        .map(|i| {
            host.set_index(i);
            ENGINE.evaluate(&expr, &mut host).unwrap()
        })
        .collect();
    assert_eq!(values, singles, "batch and single evaluation differ for '{}'", source);
    values
}
