use crate::api::{Diagnostic, Severity};
use crate::parser::Span;
use thiserror::Error;

/// Parser error with the source it was raised for.
///
/// Every kind belongs to the malformed-expression category: the text does
/// not describe a term of the language.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub src: String,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    /// Empty or whitespace-only text where a term was expected.
    #[error("expected an expression")]
    Empty,
    /// Unmatched bracket or unterminated string literal.
    #[error("unbalanced delimiter '{delimiter}'")]
    UnbalancedDelimiter { delimiter: char },
    /// No production of the grammar matches the text.
    #[error("cannot parse '{text}'")]
    NoProduction { text: String },
    /// A unary minus preceded by something other than whitespace.
    #[error("unary minus in invalid position")]
    MisplacedUnaryMinus,
    /// `if`, `switch` or `optional` with the wrong number of arguments.
    #[error("'{form}' expects {expected} arguments, found {found}")]
    WrongArity {
        form: &'static str,
        expected: &'static str,
        found: usize,
    },
    /// A switch key that is not a numeric literal or `default`.
    #[error("invalid switch case key '{key}'")]
    InvalidCaseKey { key: String },
    #[error("duplicate switch case key '{key}'")]
    DuplicateCaseKey { key: String },
    #[error("switch without a default case")]
    MissingDefault,
    /// Maximum nesting depth exceeded
    #[error("expression nesting depth exceeds maximum of {max_depth} levels")]
    MaxDepthExceeded { max_depth: usize },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, src: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            src: src.into(),
            span,
        }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            ParseErrorKind::Empty => ("P001", None),
            ParseErrorKind::UnbalancedDelimiter { .. } => (
                "P002",
                Some("Add the missing closing delimiter".to_string()),
            ),
            ParseErrorKind::NoProduction { .. } => ("P003", None),
            ParseErrorKind::MisplacedUnaryMinus => (
                "P004",
                Some("Wrap the negated operand in parentheses".to_string()),
            ),
            ParseErrorKind::WrongArity { .. } => ("P005", None),
            ParseErrorKind::InvalidCaseKey { .. } => (
                "P006",
                Some("Switch keys must be numeric literals or 'default'".to_string()),
            ),
            ParseErrorKind::DuplicateCaseKey { .. } => ("P007", None),
            ParseErrorKind::MissingDefault => (
                "P008",
                Some("Add a 'default: ...' case".to_string()),
            ),
            ParseErrorKind::MaxDepthExceeded { .. } => (
                "P009",
                Some("Reduce nesting or simplify the expression".to_string()),
            ),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.kind.to_string(),
            span: self.span.clone(),
            help,
            code: Some(code.to_string()),
        }
    }
}
