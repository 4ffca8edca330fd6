//! The Shaperule engine.

use super::{EngineOptions, Error};
use crate::ast::{Expression, Term};
use crate::evaluator::{ListEvaluationAid, TermEvaluator};
use crate::parser;
use crate::values::{ObjectRegistry, Value};

/// Parses formulas and evaluates them with one set of options and one
/// object registry.
///
/// The engine holds no per-formula state: parsed expressions are owned by
/// the caller and may be evaluated any number of times, against any host.
///
/// # Example
///
/// ```
/// use shaperule_core::api::{Engine, EngineOptions};
/// use shaperule_core::evaluator::TableEvaluator;
/// use shaperule_core::values::Value;
///
/// let engine = Engine::new(EngineOptions::default());
/// let expr = engine.parse("if(floors > 3, 'tower', 'house')").unwrap();
///
/// let mut host = TableEvaluator::with_seed(0);
/// host.set_global("floors", 5.0);
/// assert_eq!(engine.evaluate(&expr, &mut host).unwrap(), Value::from("tower"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: EngineOptions,
    registry: ObjectRegistry,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            options,
            registry: ObjectRegistry::new(),
        }
    }

    /// Create a new engine, filling its registry with `init`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let engine = Engine::with_registry(options, |registry| {
    ///     registry.register("lot", Arc::new(Lot::default()));
    /// });
    /// ```
    pub fn with_registry(options: EngineOptions, init: impl FnOnce(&mut ObjectRegistry)) -> Self {
        let mut engine = Self::new(options);
        init(&mut engine.registry);
        engine
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.registry
    }

    /// Parse a formula.
    pub fn parse(&self, source: &str) -> Result<Expression, Error> {
        Ok(parser::parse_with_options(source, &self.options.parse)?)
    }

    /// Evaluate a whole expression for the host's current instance.
    pub fn evaluate(
        &self,
        expr: &Expression,
        evaluator: &mut dyn TermEvaluator,
    ) -> Result<Value, Error> {
        self.evaluate_term(expr.root(), evaluator)
    }

    /// Evaluate one term of an expression for the host's current instance.
    pub fn evaluate_term(
        &self,
        term: Term<'_>,
        evaluator: &mut dyn TermEvaluator,
    ) -> Result<Value, Error> {
        Ok(term.get_value_with(evaluator, &self.registry, &self.options.execution)?)
    }

    /// Evaluate a whole expression once per active instance of `aid`.
    pub fn evaluate_for_list(
        &self,
        expr: &Expression,
        evaluator: &mut dyn TermEvaluator,
        aid: &mut ListEvaluationAid,
    ) -> Result<Vec<Value>, Error> {
        Ok(expr.root().get_values_for_list_with(
            evaluator,
            aid,
            &self.registry,
            &self.options.execution,
        )?)
    }

    /// Parse and evaluate in one step.
    pub fn run(&self, source: &str, evaluator: &mut dyn TermEvaluator) -> Result<Value, Error> {
        let expr = self.parse(source)?;
        self.evaluate(&expr, evaluator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ExecutionOptions;
    use crate::evaluator::{EvalError, TableEvaluator};
    use crate::parser::ParseOptions;
    use crate::values::FunctionalObject;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Lot;

    impl FunctionalObject for Lot {
        fn type_name(&self) -> &str {
            "lot"
        }

        fn call(&self, _name: &str, _args: &[Value]) -> Result<Value, EvalError> {
            Ok(Value::Float(42.0))
        }
    }

    #[test]
    fn test_run() {
        let engine = Engine::default();
        let mut host = TableEvaluator::with_seed(0);
        assert_eq!(engine.run("2 * 21", &mut host).unwrap(), Value::Float(42.0));
    }

    #[test]
    fn test_parse_error_is_malformed_expression() {
        let engine = Engine::default();
        let err = engine.parse("(1 + 2").unwrap_err();
        assert!(matches!(err, Error::MalformedExpression(_)));
        assert_eq!(err.source_text(), "(1 + 2");
        assert_eq!(err.to_diagnostic().code.as_deref(), Some("P002"));
    }

    #[test]
    fn test_evaluation_error_diagnostic() {
        let engine = Engine::default();
        let mut host = TableEvaluator::with_seed(0);
        let err = engine.run("1 + nothing(2)", &mut host).unwrap_err();
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.code.as_deref(), Some("E003"));
        assert_eq!(diagnostic.span.0, 4..14);
        assert_eq!(diagnostic.message, "undefined reference 'nothing'");
    }

    #[test]
    fn test_options_are_applied() {
        let options = EngineOptions {
            parse: ParseOptions { max_depth: 4 },
            execution: ExecutionOptions::default(),
        };
        let engine = Engine::new(options);
        assert!(engine.parse("((((((1))))))").is_err());

        let options = EngineOptions {
            parse: ParseOptions::default(),
            execution: ExecutionOptions { max_depth: 2 },
        };
        let engine = Engine::new(options);
        let mut host = TableEvaluator::with_seed(0);
        let err = engine.run("1 + 2 * 3", &mut host).unwrap_err();
        assert!(err.is_resource_exceeded());
    }

    #[test]
    fn test_registry_objects_are_visible() {
        let engine = Engine::with_registry(EngineOptions::default(), |registry| {
            registry.register("lot", Arc::new(Lot));
        });
        let mut host = TableEvaluator::with_seed(0);
        assert_eq!(engine.run("lot->area()", &mut host).unwrap(), Value::Float(42.0));
        assert_eq!(engine.run("lot", &mut host).unwrap().to_string(), "lot");
    }

    #[test]
    fn test_batch_evaluation() {
        let engine = Engine::default();
        let expr = engine.parse("index * 2").unwrap();
        let mut host = TableEvaluator::with_instances(3);
        for i in 0..3 {
            host.set_instance_value(i, "index", i as f64);
        }
        let mut aid = ListEvaluationAid::new();
        let values = engine.evaluate_for_list(&expr, &mut host, &mut aid).unwrap();
        assert_eq!(
            values,
            vec![Value::Float(0.0), Value::Float(2.0), Value::Float(4.0)]
        );
    }
}
