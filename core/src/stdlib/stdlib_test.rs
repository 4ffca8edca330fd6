use super::{call, lookup, names};
use crate::evaluator::{EvalError, TableEvaluator, TermEvaluator};
use crate::values::{FunctionalObject, Value};
use glam::{DVec2, DVec3};
use pretty_assertions::assert_eq;
use rand::RngCore;
use std::f64::consts::PI;
use std::sync::Arc;

fn run(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    call(name, args, &mut TableEvaluator::with_seed(7))
}

fn float(name: &str, args: &[f64]) -> f64 {
    let args: Vec<Value> = args.iter().map(|x| Value::Float(*x)).collect();
    run(name, &args).unwrap().as_float().unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
}

fn floats(values: &[f64]) -> Value {
    values.iter().map(|x| Value::Float(*x)).collect()
}

#[derive(Debug)]
struct Footprint;

impl FunctionalObject for Footprint {
    fn type_name(&self) -> &str {
        "footprint"
    }

    fn call(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        match (name, args) {
            ("extrude", [Value::Float(h)]) => Ok(Value::from(format!("mass {}", h).as_str())),
            _ => Err(EvalError::UndefinedReference {
                name: name.to_string(),
            }),
        }
    }
}

// ============================================================================
// Table
// ============================================================================

#[test]
fn test_lookup_known_and_unknown() {
    assert_eq!(lookup("sin").map(|b| b.name()), Some("sin"));
    assert!(lookup("Sin").is_none());
    assert!(lookup("nope").is_none());
    assert!(names().any(|name| name == "gate_print"));
}

#[test]
fn test_arity_checked_before_running() {
    let err = run("atan2", &[Value::Float(1.0)]).unwrap_err();
    assert_eq!(
        err,
        EvalError::ArityOrType {
            function: "atan2".into(),
            expected: "two numbers (y, x)".into(),
        }
    );
    assert!(run("sin", &[]).is_err());
    assert!(run("min", &vec![Value::Float(1.0); 4]).is_err());
}

#[test]
fn test_unary_rejects_non_numbers() {
    let err = run("sqrt", &[Value::from("4")]).unwrap_err();
    assert!(matches!(err, EvalError::ArityOrType { ref function, .. } if function == "sqrt"));
}

#[test]
fn test_unknown_name_goes_to_host() {
    let err = run("shapeFrom", &[]).unwrap_err();
    assert_eq!(
        err,
        EvalError::UndefinedReference {
            name: "shapeFrom".into()
        }
    );
}

// ============================================================================
// Math
// ============================================================================

#[test]
fn test_one_argument_math() {
    assert_eq!(float("sqrt", &[9.0]), 3.0);
    assert_eq!(float("abs", &[-2.0]), 2.0);
    assert_eq!(float("floor", &[-1.5]), -2.0);
    assert_eq!(float("ceil", &[1.2]), 2.0);
    assert_eq!(float("round", &[2.5]), 3.0);
    assert_eq!(float("trunc", &[-1.7]), -1.0);
    assert_eq!(float("ln", &[1.0]), 0.0);
    assert_eq!(float("sign", &[-0.0]), 0.0);
    assert_close(float("log", &[1000.0]), 3.0);
    assert_close(float("log2", &[8.0]), 3.0);
    assert_close(float("deg", &[PI]), 180.0);
    assert_close(float("sin", &[PI / 2.0]), 1.0);
}

#[test]
fn test_multi_argument_math() {
    assert_eq!(float("pow", &[2.0, 10.0]), 1024.0);
    assert_eq!(float("min", &[3.0, 1.0, 2.0]), 1.0);
    assert_eq!(float("max", &[3.0, 4.0]), 4.0);
    assert_eq!(float("clamp", &[5.0, 0.0, 2.0]), 2.0);
    assert_eq!(float("clamp", &[-1.0, 0.0, 2.0]), 0.0);
    assert_close(float("atan2", &[1.0, 1.0]), PI / 4.0);
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_len() {
    assert_eq!(run("len", &[Value::from("façade")]).unwrap(), Value::Float(6.0));
    assert_eq!(run("len", &[floats(&[1.0, 2.0])]).unwrap(), Value::Float(2.0));
    assert!(run("len", &[Value::Float(3.0)]).is_err());
}

#[test]
fn test_find_and_count() {
    let s = Value::from("a-b-c");
    let dash = Value::from("-");
    assert_eq!(run("find", &[s.clone(), dash.clone()]).unwrap(), Value::Float(1.0));
    assert_eq!(
        run("find", &[s.clone(), dash.clone(), Value::Float(1.0)]).unwrap(),
        Value::Float(3.0)
    );
    assert_eq!(
        run("find", &[s.clone(), dash.clone(), Value::Float(2.0)]).unwrap(),
        Value::Float(-1.0)
    );
    assert_eq!(run("find", &[s.clone(), Value::from("x")]).unwrap(), Value::Float(-1.0));
    assert_eq!(run("count", &[s, dash]).unwrap(), Value::Float(2.0));
    assert_eq!(
        run("count", &[Value::from("aaaa"), Value::from("aa")]).unwrap(),
        Value::Float(2.0)
    );
}

#[test]
fn test_substring_clamps() {
    let s = Value::from("window");
    let sub = |start: f64, end: f64| {
        run("subString", &[s.clone(), Value::Float(start), Value::Float(end)]).unwrap()
    };
    assert_eq!(sub(0.0, 3.0), Value::from("win"));
    assert_eq!(sub(3.0, 100.0), Value::from("dow"));
    assert_eq!(sub(-2.0, 1.0), Value::from("w"));
    assert_eq!(sub(4.0, 2.0), Value::from(""));
}

#[test]
fn test_conversions() {
    assert_eq!(run("str", &[Value::Float(3.0)]).unwrap(), Value::from("3"));
    assert_eq!(run("str", &[Value::Null]).unwrap(), Value::from(""));
    assert_eq!(run("float", &[Value::from("2.5m")]).unwrap(), Value::Float(2.5));
    assert_eq!(run("float", &[Value::from("abc")]).unwrap(), Value::Float(0.0));
    assert_eq!(run("float", &[Value::Bool(true)]).unwrap(), Value::Float(1.0));
    assert_eq!(run("bool", &[Value::from("True")]).unwrap(), Value::Bool(true));
    assert_eq!(run("bool", &[Value::from("0")]).unwrap(), Value::Bool(false));
    assert_eq!(run("bool", &[Value::Float(0.0)]).unwrap(), Value::Bool(false));
    assert!(run("bool", &[Value::Null]).is_err());
}

// ============================================================================
// Random
// ============================================================================

#[test]
fn test_rand_ranges() {
    let mut host = TableEvaluator::with_seed(11);
    for _ in 0..50 {
        let x = call("rand", &[], &mut host).unwrap().as_float().unwrap();
        assert!((0.0..1.0).contains(&x));
        let x = call("rand", &[Value::Float(10.0)], &mut host)
            .unwrap()
            .as_float()
            .unwrap();
        assert!((0.0..10.0).contains(&x));
        let x = call("rand", &[Value::Float(-3.0), Value::Float(-1.0)], &mut host)
            .unwrap()
            .as_float()
            .unwrap();
        assert!((-3.0..-1.0).contains(&x));
    }
}

#[test]
fn test_rand_is_reproducible_with_seed() {
    let draw = |seed| {
        let mut host = TableEvaluator::with_seed(seed);
        let args = [Value::from("normal"), Value::Float(10.0), Value::Float(2.0)];
        call("rand", &args, &mut host).unwrap()
    };
    assert_eq!(draw(3), draw(3));
}

#[test]
fn test_rand_rejects_bad_arguments() {
    assert!(run("rand", &[Value::from("x")]).is_err());
    let args = [Value::from("gamma"), Value::Float(1.0), Value::Float(1.0)];
    assert!(run("rand", &args).is_err());
}

/// A random source that must never be used.
struct NoDice;

impl TermEvaluator for NoDice {
    fn rng(&mut self) -> &mut dyn RngCore {
        panic!("random source used")
    }
}

#[test]
fn test_p_outside_unit_interval_is_deterministic() {
    let mut host = NoDice;
    for (probability, expected) in [(0.0, false), (-1.0, false), (1.0, true), (3.0, true)] {
        assert_eq!(
            call("p", &[Value::Float(probability)], &mut host).unwrap(),
            Value::Bool(expected)
        );
    }
    assert_eq!(
        call("p", &[Value::Float(f64::NAN)], &mut host).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn test_p_inside_unit_interval_is_random() {
    let mut host = TableEvaluator::with_seed(5);
    let hits = (0..1000)
        .filter(|_| call("p", &[Value::Float(0.5)], &mut host).unwrap() == Value::Bool(true))
        .count();
    assert!((350..650).contains(&hits));
}

// ============================================================================
// Vectors and arrays
// ============================================================================

#[test]
fn test_vector_constructors() {
    assert_eq!(
        run("vec2", &[Value::Float(1.0), Value::Float(2.0)]).unwrap(),
        Value::from(DVec2::new(1.0, 2.0))
    );
    assert_eq!(
        run("vec", &[floats(&[1.0, 2.0, 3.0])]).unwrap(),
        Value::from(DVec3::new(1.0, 2.0, 3.0))
    );
    assert_eq!(
        run("vec", &[Value::Float(4.0), Value::Float(5.0)]).unwrap(),
        Value::from(DVec2::new(4.0, 5.0))
    );
    assert_eq!(
        run("vec4", &vec![Value::Float(1.0); 4]).unwrap(),
        floats(&[1.0, 1.0, 1.0, 1.0])
    );
    assert!(run("vec", &[floats(&[1.0])]).is_err());
    assert!(run("vec3", &[Value::Float(1.0), Value::from("y"), Value::Float(3.0)]).is_err());
}

#[test]
fn test_vector_math() {
    let x = Value::from(DVec3::X);
    let y = Value::from(DVec3::Y);
    assert_eq!(run("vecCross", &[x.clone(), y.clone()]).unwrap(), Value::from(DVec3::Z));
    assert_eq!(run("vecDot", &[x.clone(), y]).unwrap(), Value::Float(0.0));
    assert_eq!(
        run("vecCross", &[Value::from(DVec2::X), Value::from(DVec2::Y)]).unwrap(),
        Value::Float(1.0)
    );
    assert_eq!(
        run("vecLen", &[Value::from(DVec2::new(3.0, 4.0))]).unwrap(),
        Value::Float(5.0)
    );
    assert_eq!(
        run("vecNormalize", &[Value::from(DVec3::ZERO)]).unwrap(),
        Value::from(DVec3::ZERO)
    );
    assert!(run("vecDot", &[x, Value::from(DVec2::X)]).is_err());
}

#[test]
fn test_arr_collects_anything() {
    assert_eq!(run("arr", &[]).unwrap(), Value::empty_array());
    assert_eq!(
        run("arr", &[Value::Float(1.0), Value::from("a")]).unwrap(),
        Value::from(vec![Value::Float(1.0), Value::from("a")])
    );
}

// ============================================================================
// Misc
// ============================================================================

#[test]
fn test_extrude_dispatches_on_kind() {
    let footprint = Value::Object(Arc::new(Footprint));
    assert_eq!(
        run("extrude", &[footprint, Value::Float(3.0)]).unwrap(),
        Value::from("mass 3")
    );
    assert_eq!(
        run("extrude", &[Value::from(DVec2::new(1.0, 2.0)), Value::Float(3.0)]).unwrap(),
        Value::from(DVec3::new(1.0, 2.0, 3.0))
    );
    assert!(run("extrude", &[Value::Float(1.0), Value::Float(3.0)]).is_err());
}

#[test]
fn test_exists_on_evaluated_argument() {
    let mut host = TableEvaluator::with_seed(0);
    host.set_global("roof", 1.0);
    assert_eq!(call("exists", &[Value::from("roof")], &mut host).unwrap(), Value::Bool(true));
    assert_eq!(call("exists", &[Value::from("wall")], &mut host).unwrap(), Value::Bool(false));
    assert_eq!(call("exists", &[Value::Null], &mut host).unwrap(), Value::Bool(false));
}

#[test]
fn test_gate_print_returns_first_argument() {
    assert_eq!(
        run("gate_print", &[Value::Float(2.0), Value::from("x")]).unwrap(),
        Value::Float(2.0)
    );
    assert!(run("gate_print", &[]).is_err());
}
