//! Shaperule - a small formula language for procedural shape rules
//!
//! # Overview
//!
//! Formulas are short expressions attached to rule attributes: a height, a
//! facade split, the choice of a roof shape. They are parsed once and then
//! evaluated many times, either for one instance at a time or in batch mode
//! across every instance of a collection owned by the host.
//!
//! - Arithmetic on numbers and 2/3-vectors, string concatenation, arrays
//! - Conditions with `&&`/`||` that short-circuit per instance
//! - `if(...)`, `switch(...)` and `optional(...)` forms
//! - A built-in function library plus host-supplied functions and objects
//!
//! # Quick Start
//!
//! ```
//! use shaperule::{Engine, EngineOptions, TableEvaluator, Value};
//!
//! let engine = Engine::new(EngineOptions::default());
//! let expr = engine.parse("if(floors > 3, floors * 3.2, 4)").unwrap();
//!
//! let mut host = TableEvaluator::with_seed(0);
//! host.set_global("floors", 5.0);
//! assert_eq!(engine.evaluate(&expr, &mut host).unwrap(), Value::Float(16.0));
//! ```
//!
//! # Batch Evaluation
//!
//! ```
//! use shaperule::{Engine, ListEvaluationAid, TableEvaluator, Value};
//!
//! let engine = Engine::default();
//! let expr = engine.parse("switch(kind, 1: 'flat', 2: 'gable', default: 'hip')").unwrap();
//!
//! let mut host = TableEvaluator::with_instances(3);
//! for (i, kind) in [1.0, 2.0, 1.0].into_iter().enumerate() {
//!     host.set_instance_value(i, "kind", kind);
//! }
//! let mut aid = ListEvaluationAid::new();
//! let roofs = engine.evaluate_for_list(&expr, &mut host, &mut aid).unwrap();
//! assert_eq!(roofs, vec![Value::from("flat"), Value::from("gable"), Value::from("flat")]);
//! ```

mod error_renderer;

// Re-export public API from shaperule_core
pub use shaperule_core::api::{
    Diagnostic, Engine, EngineOptions, Error, ExecutionOptions, Severity,
};
pub use shaperule_core::parser::{ParseError, ParseErrorKind, ParseOptions, Span};

// Re-export commonly used types and values
pub use shaperule_core::ast::{self, Expression, Term, TermId};
pub use shaperule_core::evaluator::{
    CombinedEvaluator, EvalError, ExecutionError, ListEvaluationAid, TableEvaluator,
    TermEvaluator,
};
pub use shaperule_core::values::{self, FunctionalObject, ObjectRegistry, Value};

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
