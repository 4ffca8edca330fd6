//! Shaperule core: a small formula language for procedural shape rules.
//!
//! Source text is parsed once into an [`ast::Expression`] and then evaluated
//! repeatedly against a host-supplied [`evaluator::TermEvaluator`], either for
//! a single instance or in batch mode across many instances at once.

pub mod api;
pub mod ast;
pub mod evaluator;
pub mod parser;
pub mod scanner;
pub mod stdlib;
pub mod values;

pub use api::{Engine, EngineOptions, Error};
pub use ast::{Expression, Term, TermId};
pub use evaluator::{ListEvaluationAid, TermEvaluator};
pub use parser::parse;
pub use values::Value;

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    ///
    /// # Example
    /// ```ignore
    /// #[test]
    /// fn test_switch_batch() {
    ///     test_utils::init_test_logging();
    ///     // ... your test code
    /// }
    /// ```
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
