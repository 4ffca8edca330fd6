//! Built-in function library.
//!
//! A fixed table keyed by function name:
//! - Math: trigonometry, rounding, logarithms, `atan2`, `pow`, `min`, `max`,
//!   `clamp`
//! - String: `len`, `find`, `count`, `subString` and the `str`/`bool`/`float`
//!   conversions
//! - Random: `rand` and `p`, drawing from the host's random source
//! - Vector: `vec2`, `vec3`, `vec4`, `vec`, vector arithmetic helpers, `arr`
//! - Misc: `extrude`, `exists`, `gate_print`
//!
//! Every entry checks its argument count before running; argument kinds are
//! checked by the function itself. Names not in the table are passed to the
//! host through [`TermEvaluator::call_function`].

use crate::evaluator::{EvalError, TermEvaluator};
use crate::values::Value;
use hashbrown::HashMap;
use once_cell::sync::Lazy;

mod math;
mod misc;
mod random;
mod string;
mod vector;

#[cfg(test)]
mod stdlib_test;

/// Signature of a built-in.
pub type BuiltinFn = fn(&[Value], &mut dyn TermEvaluator) -> Result<Value, EvalError>;

#[derive(Clone, Copy)]
enum Implementation {
    /// A float function of one float.
    Unary(fn(f64) -> f64),
    Native(BuiltinFn),
}

/// One entry of the built-in table.
#[derive(Clone, Copy)]
pub struct Builtin {
    name: &'static str,
    min_args: usize,
    /// `None` for variadic functions.
    max_args: Option<usize>,
    /// Describes valid arguments in error messages.
    expected: &'static str,
    implementation: Implementation,
}

impl core::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish()
    }
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn invoke(
        &self,
        args: &[Value],
        evaluator: &mut dyn TermEvaluator,
    ) -> Result<Value, EvalError> {
        let too_many = self.max_args.is_some_and(|max| args.len() > max);
        if args.len() < self.min_args || too_many {
            return Err(self.error());
        }
        match self.implementation {
            Implementation::Unary(f) => match &args[0] {
                Value::Float(x) => Ok(Value::Float(f(*x))),
                _ => Err(self.error()),
            },
            Implementation::Native(f) => f(args, evaluator),
        }
    }

    fn error(&self) -> EvalError {
        EvalError::arity_or_type(self.name, self.expected)
    }
}

/// Collects the entries of one library module.
pub(crate) struct Table {
    entries: HashMap<&'static str, Builtin>,
}

impl Table {
    fn unary(&mut self, name: &'static str, f: fn(f64) -> f64) {
        self.insert(name, 1, Some(1), "one number", Implementation::Unary(f));
    }

    fn native(
        &mut self,
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        expected: &'static str,
        f: BuiltinFn,
    ) {
        self.insert(name, min_args, max_args, expected, Implementation::Native(f));
    }

    fn insert(
        &mut self,
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        expected: &'static str,
        implementation: Implementation,
    ) {
        self.entries.insert(
            name,
            Builtin {
                name,
                min_args,
                max_args,
                expected,
                implementation,
            },
        );
    }
}

static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    let mut table = Table {
        entries: HashMap::new(),
    };
    math::register(&mut table);
    string::register(&mut table);
    random::register(&mut table);
    vector::register(&mut table);
    misc::register(&mut table);
    table.entries
});

/// The built-in named `name`.
pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.get(name)
}

/// Names of all built-ins, in no particular order.
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTINS.keys().copied()
}

/// Calls `name`: a built-in if there is one, otherwise the host.
pub fn call(
    name: &str,
    args: &[Value],
    evaluator: &mut dyn TermEvaluator,
) -> Result<Value, EvalError> {
    if let Some(builtin) = lookup(name) {
        return builtin.invoke(args, evaluator);
    }
    evaluator
        .call_function(name, args)
        .unwrap_or_else(|| {
            Err(EvalError::UndefinedReference {
                name: name.to_string(),
            })
        })
}

// ============================================================================
// Argument helpers
// ============================================================================

/// The float at `args[i]`, or an arity/type error for `function`.
pub(crate) fn float_arg(
    args: &[Value],
    i: usize,
    function: &str,
    expected: &str,
) -> Result<f64, EvalError> {
    args.get(i)
        .and_then(Value::as_float)
        .ok_or_else(|| EvalError::arity_or_type(function, expected))
}

pub(crate) fn str_arg<'v>(
    args: &'v [Value],
    i: usize,
    function: &str,
    expected: &str,
) -> Result<&'v str, EvalError> {
    args.get(i)
        .and_then(Value::as_str)
        .ok_or_else(|| EvalError::arity_or_type(function, expected))
}
