//! Public error types for the Shaperule API.
//!
//! Internal errors are converted to these public types at API boundaries.

use crate::evaluator::ExecutionError;
use crate::parser::{ParseError, Span};
use core::fmt;
use thiserror::Error;

/// Public error type for all Shaperule operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The text does not describe a formula.
    #[error("malformed expression: {0}")]
    MalformedExpression(#[from] ParseError),

    /// Evaluation failed.
    #[error("evaluation failed: {0}")]
    Evaluation(#[from] ExecutionError),
}

impl Error {
    /// The formula the error was raised for.
    pub fn source_text(&self) -> &str {
        match self {
            Error::MalformedExpression(e) => &e.src,
            Error::Evaluation(e) => &e.src,
        }
    }

    /// True for evaluation stopped by a resource limit rather than a fault
    /// in the formula.
    pub fn is_resource_exceeded(&self) -> bool {
        matches!(self, Error::Evaluation(e) if e.error.is_resource_exceeded())
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::MalformedExpression(e) => e.to_diagnostic(),
            Error::Evaluation(e) => e.to_diagnostic(),
        }
    }
}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Optional error code (e.g., "P001") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - the formula cannot be parsed or evaluated.
    Error,
    /// Warning - suspicious input that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}
