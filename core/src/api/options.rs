//! Configuration options for the Shaperule engine.

use crate::parser::ParseOptions;

/// Configuration options for expression execution.
///
/// These options control resource limits during evaluation.
///
/// # Example
///
/// ```
/// use shaperule_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions { max_depth: 500 };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Maximum evaluation stack depth (for recursion protection).
    ///
    /// Default: 1000
    pub max_depth: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self { max_depth: 1000 }
    }
}

/// Configuration options for the Shaperule engine.
///
/// # Example
///
/// ```
/// use shaperule_core::api::{EngineOptions, ExecutionOptions};
/// use shaperule_core::parser::ParseOptions;
///
/// let options = EngineOptions {
///     parse: ParseOptions { max_depth: 64 },
///     execution: ExecutionOptions { max_depth: 500 },
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Options used by [`Engine::parse`](super::Engine::parse).
    pub parse: ParseOptions,

    /// Options used by every evaluation through the engine.
    pub execution: ExecutionOptions,
}
