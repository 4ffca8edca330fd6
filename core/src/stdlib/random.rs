//! Random numbers, drawn from the host's random source.
//!
//! Functions: rand, p

use super::{Table, float_arg, str_arg};
use crate::evaluator::{EvalError, TermEvaluator};
use crate::values::Value;
use rand::RngCore;
use rand::distributions::{Distribution, Standard};
use rand_distr::{LogNormal, Normal};

const RAND_EXPECTED: &str = "(), (max), (min, max) or ('uniform'|'normal'|'lognormal', a, b)";

pub(super) fn register(table: &mut Table) {
    table.native("rand", 0, Some(3), RAND_EXPECTED, random_rand);
    table.native("p", 1, Some(1), "one probability", random_p);
}

fn random_rand(args: &[Value], evaluator: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let rng = evaluator.rng();
    let x = match args {
        [] => unit(rng),
        [_] => uniform(rng, 0.0, float_arg(args, 0, "rand", RAND_EXPECTED)?)?,
        [_, _] => {
            let lo = float_arg(args, 0, "rand", RAND_EXPECTED)?;
            let hi = float_arg(args, 1, "rand", RAND_EXPECTED)?;
            uniform(rng, lo, hi)?
        }
        _ => {
            let distribution = str_arg(args, 0, "rand", RAND_EXPECTED)?;
            let a = float_arg(args, 1, "rand", RAND_EXPECTED)?;
            let b = float_arg(args, 2, "rand", RAND_EXPECTED)?;
            named(rng, distribution, a, b)?
        }
    };
    Ok(Value::Float(x))
}

/// Uniform in `[0, 1)`.
fn unit(rng: &mut dyn RngCore) -> f64 {
    Standard.sample(rng)
}

/// Uniform between two bounds given in either order.
fn uniform(rng: &mut dyn RngCore, a: f64, b: f64) -> Result<f64, EvalError> {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let width = hi - lo;
    if !width.is_finite() {
        return Err(EvalError::arity_or_type("rand", "finite bounds"));
    }
    if width == 0.0 {
        return Ok(lo);
    }
    Ok(lo + width * unit(rng))
}

fn named(rng: &mut dyn RngCore, distribution: &str, a: f64, b: f64) -> Result<f64, EvalError> {
    match distribution {
        "uniform" => uniform(rng, a, b),
        "normal" => Normal::new(a, b)
            .map(|normal| normal.sample(rng))
            .map_err(|_| EvalError::arity_or_type("rand", "a finite mean and a non-negative deviation")),
        "lognormal" => LogNormal::new(a, b)
            .map(|lognormal| lognormal.sample(rng))
            .map_err(|_| EvalError::arity_or_type("rand", "a finite mu and a non-negative sigma")),
        _ => Err(EvalError::arity_or_type("rand", RAND_EXPECTED)),
    }
}

/// True with the given probability. Outside `(0, 1)` the answer does not
/// touch the random source.
fn random_p(args: &[Value], evaluator: &mut dyn TermEvaluator) -> Result<Value, EvalError> {
    let probability = float_arg(args, 0, "p", "one probability")?;
    let hit = if probability.is_nan() || probability <= 0.0 {
        false
    } else if probability >= 1.0 {
        true
    } else {
        unit(evaluator.rng()) < probability
    };
    Ok(Value::Bool(hit))
}
