//! Evaluation errors.
//!
//! # Error Categories
//!
//! - **Type errors**: an operator or comparison applied to values of the
//!   wrong kinds (`TypeMismatch`).
//! - **Call errors**: a built-in called with the wrong number or kinds of
//!   arguments (`ArityOrType`), or a name nothing answers to
//!   (`UndefinedReference`).
//! - **Resource exceeded**: evaluation recursion beyond the configured depth
//!   (`StackOverflow`).
//!
//! None of these are recoverable inside a formula. The `optional(...)` form
//! is ordinary control flow, not error handling.

use crate::api::{Diagnostic, Severity};
use crate::ast::{Expression, TermId};
use crate::parser::Span;
use thiserror::Error;

/// An evaluation failure without location.
///
/// Built-ins and host code raise these; the interpreter attaches the term
/// that failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("'{op}' cannot be applied to {found}")]
    TypeMismatch { op: String, found: String },

    #[error("{function}: expected {expected}")]
    ArityOrType { function: String, expected: String },

    #[error("undefined reference '{name}'")]
    UndefinedReference { name: String },

    #[error("index {index} out of bounds (length: {len})")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("evaluation stack overflow: depth {depth} exceeds maximum of {max_depth}")]
    StackOverflow { depth: usize, max_depth: usize },

    /// Raised by host code.
    #[error("{message}")]
    Host { message: String },
}

impl EvalError {
    pub fn type_mismatch(op: impl Into<String>, found: impl Into<String>) -> Self {
        EvalError::TypeMismatch {
            op: op.into(),
            found: found.into(),
        }
    }

    pub fn arity_or_type(function: impl Into<String>, expected: impl Into<String>) -> Self {
        EvalError::ArityOrType {
            function: function.into(),
            expected: expected.into(),
        }
    }

    pub fn host(message: impl Into<String>) -> Self {
        EvalError::Host {
            message: message.into(),
        }
    }

    /// Resource errors are reported apart from ordinary failures.
    pub fn is_resource_exceeded(&self) -> bool {
        matches!(self, EvalError::StackOverflow { .. })
    }
}

/// An [`EvalError`] located in the source of the formula that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct ExecutionError {
    pub error: EvalError,
    /// Absolute byte offset of the failing term in `src`.
    pub offset: usize,
    pub len: usize,
    pub src: String,
}

impl ExecutionError {
    pub(crate) fn at(expr: &Expression, term: TermId, error: EvalError) -> Self {
        let Span(range) = expr.span_of(term);
        Self {
            error,
            offset: range.start,
            len: range.len(),
            src: expr.source().to_string(),
        }
    }

    pub fn span(&self) -> Span {
        Span(self.offset..self.offset + self.len)
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.error {
            EvalError::TypeMismatch { .. } => ("E001", None),
            EvalError::ArityOrType { .. } => ("E002", None),
            EvalError::UndefinedReference { .. } => (
                "E003",
                Some("Define the name in the host or check its spelling".to_string()),
            ),
            EvalError::IndexOutOfBounds { .. } => ("E004", None),
            EvalError::StackOverflow { .. } => (
                "E005",
                Some("Reduce nesting or raise the execution depth limit".to_string()),
            ),
            EvalError::Host { .. } => ("E006", None),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.error.to_string(),
            span: self.span(),
            help,
            code: Some(code.to_string()),
        }
    }
}
