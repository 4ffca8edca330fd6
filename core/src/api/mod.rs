//! Public API for the Shaperule formula language.
//!
//! This module provides the stable public API for parsing and evaluating
//! formulas. An [`Engine`] bundles the options and the object registry;
//! evaluation runs against a caller-supplied
//! [`TermEvaluator`](crate::evaluator::TermEvaluator) either once or in
//! batch mode over many instances.
//!
//! # Example
//!
//! ```
//! use shaperule_core::api::{Engine, EngineOptions};
//! use shaperule_core::evaluator::{ListEvaluationAid, TableEvaluator};
//! use shaperule_core::values::Value;
//!
//! let engine = Engine::new(EngineOptions::default());
//! let expr = engine.parse("width * depth").unwrap();
//!
//! let mut host = TableEvaluator::with_instances(2);
//! host.set_global("depth", 10.0);
//! host.set_instance_value(0, "width", 2.0);
//! host.set_instance_value(1, "width", 3.0);
//!
//! let mut aid = ListEvaluationAid::new();
//! let areas = engine.evaluate_for_list(&expr, &mut host, &mut aid).unwrap();
//! assert_eq!(areas, vec![Value::Float(20.0), Value::Float(30.0)]);
//! ```

pub mod engine;
pub mod error;
pub mod options;

pub use engine::Engine;
pub use error::{Diagnostic, Error, Severity};
pub use options::{EngineOptions, ExecutionOptions};
