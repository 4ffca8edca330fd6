//! Relational conditions and `&&`/`||` chains.

use super::term_parser::TermParser;
use crate::ast::{CombinedInequality, CompareOp, Inequality};
use crate::parser::ParseError;
use crate::scanner::{blank_paren_interiors, matching_bracket_forward};

/// Byte positions where `pattern` occurs outside parentheses, brackets and
/// string literals.
fn top_level_matches(blanked: &str, pattern: &str) -> Vec<usize> {
    let bytes = blanked.as_bytes();
    let pat = pattern.as_bytes();
    let mut found = Vec::new();
    let mut brackets = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => brackets += 1,
            b']' => brackets = brackets.saturating_sub(1),
            _ if brackets == 0 && bytes[i..].starts_with(pat) => {
                // `->` is the member-call arrow, not a comparison.
                let arrow = pat[0] == b'>' && i > 0 && bytes[i - 1] == b'-';
                if !arrow {
                    found.push(i);
                    i += pat.len();
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }
    found
}

/// The interior of `(chain)` when the chain itself holds a top-level `||` or
/// `&&`, with its position inside `text`.
fn grouped_chain(text: &str) -> Option<(&str, usize)> {
    let lead = text.len() - text.trim_start().len();
    let trimmed = text.trim();
    let len = trimmed.len();
    if matching_bracket_forward(trimmed, 0, b'(', b')') != Some(len.checked_sub(1)?) {
        return None;
    }
    let inner = &trimmed[1..len - 1];
    let blanked = blank_paren_interiors(inner);
    let is_chain = ["||", "&&"]
        .iter()
        .any(|pattern| !top_level_matches(&blanked, pattern).is_empty());
    is_chain.then_some((inner, lead + 1))
}

impl TermParser<'_> {
    /// Parses `a || b`, `a && b` or a single inequality.
    ///
    /// `||` binds looser than `&&`; both sides are split on every top-level
    /// occurrence so chains are flat. A parenthesized chain inside a chain
    /// nests directly, so `(a && b) || c` and `a && b || c` are one tree.
    pub(super) fn parse_combined(
        &mut self,
        text: &str,
        start: usize,
    ) -> Result<CombinedInequality, ParseError> {
        self.enter(start)?;
        let result = self.parse_combined_inner(text, start);
        self.leave();
        result
    }

    fn parse_combined_inner(
        &mut self,
        text: &str,
        start: usize,
    ) -> Result<CombinedInequality, ParseError> {
        let blanked = blank_paren_interiors(text);
        for (pattern, is_or) in [("||", true), ("&&", false)] {
            let positions = top_level_matches(&blanked, pattern);
            if positions.is_empty() {
                continue;
            }
            let mut parts = Vec::with_capacity(positions.len() + 1);
            let mut from = 0;
            for pos in positions.into_iter().chain(core::iter::once(text.len())) {
                parts.push(self.parse_combined(&text[from..pos], start + from)?);
                from = pos + pattern.len();
            }
            return Ok(if is_or {
                CombinedInequality::Or(parts)
            } else {
                CombinedInequality::And(parts)
            });
        }
        if let Some((inner, offset)) = grouped_chain(text) {
            return self.parse_combined(inner, start + offset);
        }
        Ok(CombinedInequality::Leaf(self.parse_inequality(text, start)?))
    }

    /// Parses `left op right`, or a bare truthy operand when `text` holds no
    /// relational operator at the top level.
    pub(super) fn parse_inequality(
        &mut self,
        text: &str,
        start: usize,
    ) -> Result<Inequality, ParseError> {
        let blanked = blank_paren_interiors(text);
        let found = CompareOp::SEARCH_ORDER.iter().find_map(|(symbol, op)| {
            top_level_matches(&blanked, symbol)
                .first()
                .map(|&pos| (pos, symbol.len(), *op))
        });

        match found {
            Some((pos, symbol_len, op)) => {
                let left = self.parse_term(&text[..pos], start)?;
                let right_at = pos + symbol_len;
                let right = self.parse_term(&text[right_at..], start + right_at)?;
                Ok(Inequality::Compare { op, left, right })
            }
            None => Ok(Inequality::Truthy(self.parse_term(text, start)?)),
        }
    }
}
