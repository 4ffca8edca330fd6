//! Recursive-descent parser for the formula language.
//!
//! There is no tokenizer. Each level of the parser blanks out parenthesized
//! groups (see [`crate::scanner`]) and scans the remaining top-level
//! characters once to decide which production applies.

mod condition;
pub mod error;
mod term_parser;

#[cfg(test)]
mod parse_test;


pub use error::{ParseError, ParseErrorKind};
pub use term_parser::TermParser;

use crate::ast::Expression;
use core::ops::Range;

/// Byte range into the source of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn start(&self) -> usize {
        self.0.start
    }

    pub fn end(&self) -> usize {
        self.0.end
    }
}

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting depth of the recursive descent.
    ///
    /// Every binary operator adds a level, including the operators of a flat
    /// chain: `a + b + c` nests as `a + (b + c)`. With the default, a chain
    /// holds at most 256 terms.
    ///
    /// Default: 256
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Parse a formula with default options.
pub fn parse(source: &str) -> Result<Expression, ParseError> {
    parse_with_options(source, &ParseOptions::default())
}

/// Parse a formula with a custom nesting limit.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Result<Expression, ParseError> {
    tracing::debug!(len = source.len(), "parsing formula");
    TermParser::new(source, options.clone()).parse()
}
