//! Term-level productions.

use crate::ast::{BinaryOp, Expression, SwitchCase, TermId, TermKind};
use crate::parser::{ParseError, ParseErrorKind, ParseOptions, Span};
use crate::scanner::{
    blank_paren_interiors, check_balanced, is_quoted_literal, matching_bracket_backward,
    matching_bracket_forward, split_respecting_parens_with_offsets,
};
use ecow::EcoString;

/// Builds an [`Expression`] from source text.
///
/// Every recursive call receives a slice of the source together with the
/// absolute position of that slice, so nodes can record where they start.
pub struct TermParser<'s> {
    pub(super) source: &'s str,
    pub(super) expr: Expression,
    options: ParseOptions,
    depth: usize,
}

/// Positions of the top-level operators found by one scan of a term.
#[derive(Debug, Default)]
pub(super) struct OperatorScan {
    plus: Option<usize>,
    /// Last binary minus, so that `a - b - c` splits as `(a - b) - c`.
    minus: Option<usize>,
    unary_minus: Option<usize>,
    star: Option<usize>,
    slash: Option<usize>,
    percent: Option<usize>,
    caret: Option<usize>,
    /// Last `->`, so chained member calls nest to the left.
    arrow: Option<usize>,
    pub(super) logical: bool,
    pub(super) relational: bool,
}

impl OperatorScan {
    /// Scans `text` once. `blanked` is `text` with parenthesized interiors
    /// blanked; brackets are tracked here since blanking leaves them alone.
    pub(super) fn new(text: &str, blanked: &str) -> Self {
        let original = text.as_bytes();
        let bytes = blanked.as_bytes();
        let mut scan = OperatorScan::default();
        let mut brackets = 0usize;

        for (i, &c) in bytes.iter().enumerate() {
            match c {
                b'[' => {
                    brackets += 1;
                    continue;
                }
                b']' => {
                    brackets = brackets.saturating_sub(1);
                    continue;
                }
                _ if brackets > 0 => continue,
                _ => {}
            }
            let next = bytes.get(i + 1).copied();
            match c {
                b'+' => {
                    if !is_exponent_sign(original, i) && scan.plus.is_none() {
                        scan.plus = Some(i);
                    }
                }
                b'-' if next == Some(b'>') => scan.arrow = Some(i),
                b'-' => {
                    if is_exponent_sign(original, i) {
                        continue;
                    }
                    if follows_operand(original, i) {
                        scan.minus = Some(i);
                    } else if scan.unary_minus.is_none() {
                        scan.unary_minus = Some(i);
                    }
                }
                b'*' => {
                    scan.star.get_or_insert(i);
                }
                b'/' => scan.slash = Some(i),
                b'%' => scan.percent = Some(i),
                b'^' => {
                    scan.caret.get_or_insert(i);
                }
                b'&' | b'|' if next == Some(c) => scan.logical = true,
                b'<' | b'=' if matches!(next, Some(b'=')) || c == b'<' => {
                    scan.relational = true
                }
                b'>' if i == 0 || bytes[i - 1] != b'-' => scan.relational = true,
                b'!' if matches!(next, Some(b'=') | Some(b'>')) => scan.relational = true,
                _ => {}
            }
        }
        scan
    }

    fn binary_split(&self) -> Option<(usize, BinaryOp)> {
        if let Some(p) = self.plus {
            Some((p, BinaryOp::Add))
        } else if let Some(p) = self.minus {
            Some((p, BinaryOp::Sub))
        } else if let Some(p) = self.star {
            Some((p, BinaryOp::Mul))
        } else if let Some(p) = self.slash {
            Some((p, BinaryOp::Div))
        } else if let Some(p) = self.percent {
            Some((p, BinaryOp::Mod))
        } else {
            self.caret.map(|p| (p, BinaryOp::Pow))
        }
    }
}

fn is_ident_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'_' | b'.' | b'$' | b'#') || !c.is_ascii()
}

/// A `-` is binary when the previous non-space character ends an operand.
fn follows_operand(text: &[u8], index: usize) -> bool {
    text[..index]
        .iter()
        .rev()
        .find(|c| !c.is_ascii_whitespace())
        .is_some_and(|&c| is_ident_byte(c) || matches!(c, b')' | b']' | b'\'' | b'"'))
}

/// True for the sign of an exponent inside a numeric literal such as `1e-5`.
fn is_exponent_sign(text: &[u8], index: usize) -> bool {
    if index < 2 || !matches!(text[index - 1], b'e' | b'E') {
        return false;
    }
    if !text.get(index + 1).is_some_and(u8::is_ascii_digit) {
        return false;
    }
    let mantissa_end = index - 1;
    let mut start = mantissa_end;
    while start > 0 && (text[start - 1].is_ascii_digit() || text[start - 1] == b'.') {
        start -= 1;
    }
    start < mantissa_end
        && (text[start].is_ascii_digit() || text[start] == b'.')
        && (start == 0 || !is_ident_byte(text[start - 1]))
}

pub(super) fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(is_ident_byte)
}

/// A signed decimal literal. Words such as `inf` are not literals.
fn numeric_literal(text: &str) -> Option<f64> {
    let digits = text.trim_start_matches(['-', '+']);
    if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    text.parse().ok()
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

impl<'s> TermParser<'s> {
    pub fn new(source: &'s str, options: ParseOptions) -> Self {
        Self {
            source,
            expr: Expression::with_source(source),
            options,
            depth: 0,
        }
    }

    /// Parses the whole source. Bracket balance is checked up front so that
    /// every slice handed to the recursive productions is balanced.
    pub fn parse(mut self) -> Result<Expression, ParseError> {
        if let Err((delimiter, pos)) = check_balanced(self.source) {
            return Err(self.error(
                ParseErrorKind::UnbalancedDelimiter { delimiter },
                pos,
                1,
            ));
        }
        let source = self.source;
        let root = self.parse_term(source, 0)?;
        self.expr.set_root(root);
        Ok(self.expr)
    }

    pub(super) fn error(&self, kind: ParseErrorKind, start: usize, len: usize) -> ParseError {
        ParseError::new(kind, self.source, Span(start..start + len))
    }

    pub(super) fn enter(&mut self, start: usize) -> Result<(), ParseError> {
        if self.depth >= self.options.max_depth {
            return Err(self.error(
                ParseErrorKind::MaxDepthExceeded {
                    max_depth: self.options.max_depth,
                },
                start,
                0,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Parses `text`, which starts at absolute position `start`.
    pub(super) fn parse_term(&mut self, text: &str, start: usize) -> Result<TermId, ParseError> {
        self.enter(start)?;
        let result = self.parse_term_inner(text, start);
        self.leave();
        result
    }

    fn parse_term_inner(&mut self, text: &str, start: usize) -> Result<TermId, ParseError> {
        let start = start + leading_whitespace(text);
        let text = text.trim();
        let len = text.len();
        if text.is_empty() {
            return Err(self.error(ParseErrorKind::Empty, start, 0));
        }

        if is_quoted_literal(text) {
            let kind = TermKind::Str(EcoString::from(&text[1..len - 1]));
            return Ok(self.expr.alloc(start, len, kind));
        }

        let blanked = blank_paren_interiors(text);
        let scan = OperatorScan::new(text, &blanked);

        // Conditions bind loosest of all.
        if scan.logical {
            let combined = self.parse_combined(text, start)?;
            return Ok(self.expr.alloc(start, len, TermKind::Combined(combined)));
        }
        if scan.relational {
            let inequality = self.parse_inequality(text, start)?;
            return Ok(self.expr.alloc(start, len, TermKind::Inequality(inequality)));
        }
        if text.starts_with('!') {
            let operand = self.parse_term(&text[1..], start + 1)?;
            return Ok(self.expr.alloc(start, len, TermKind::Not(operand)));
        }

        if let Some((pos, op)) = scan.binary_split() {
            let left = self.parse_term(&text[..pos], start)?;
            let right = self.parse_term(&text[pos + 1..], start + pos + 1)?;
            return Ok(self.expr.alloc(start, len, TermKind::Binary { op, left, right }));
        }

        if text.starts_with('(') && matching_bracket_forward(text, 0, b'(', b')') == Some(len - 1)
        {
            return self.parse_parenthesized(&text[1..len - 1], start + 1);
        }

        if let Some(pos) = scan.unary_minus {
            if !text[..pos].trim().is_empty() {
                return Err(self.error(ParseErrorKind::MisplacedUnaryMinus, start + pos, 1));
            }
            let operand = self.parse_term(&text[pos + 1..], start + pos + 1)?;
            return Ok(self.expr.alloc(start, len, TermKind::Unary(operand)));
        }

        if text.ends_with(')') {
            return match scan.arrow {
                Some(arrow) => self.parse_member_call(text, start, arrow),
                None => self.parse_call(text, start),
            };
        }

        if text.ends_with(']') {
            if let Some(open) = matching_bracket_backward(text, len - 1, b'[', b']') {
                if open > 0 {
                    let array = self.parse_term(&text[..open], start)?;
                    let index = self.parse_term(&text[open + 1..len - 1], start + open + 1)?;
                    return Ok(self.expr.alloc(start, len, TermKind::Index { array, index }));
                }
            }
        }

        self.parse_constant(text, start)
    }

    /// Interior of a redundant outer paren pair: an array literal when it
    /// holds top-level `;`, otherwise just the inner term.
    fn parse_parenthesized(&mut self, inner: &str, start: usize) -> Result<TermId, ParseError> {
        let pieces = split_respecting_parens_with_offsets(inner, b';');
        if pieces.len() < 2 {
            return self.parse_term(inner, start);
        }
        let mut elements = Vec::with_capacity(pieces.len());
        for (offset, piece) in pieces {
            elements.push(self.parse_term(piece, start + offset)?);
        }
        // The array node spans the parentheses as well.
        Ok(self
            .expr
            .alloc(start - 1, inner.len() + 2, TermKind::Array(elements)))
    }

    /// A numeral or a name. Text that starts like a numeral must be one, so
    /// `1.5.2` is rejected instead of being looked up.
    fn parse_constant(&mut self, text: &str, start: usize) -> Result<TermId, ParseError> {
        let numeral = text.starts_with(|c: char| c.is_ascii_digit() || c == '.');
        let number = if numeral {
            text.parse::<f64>().ok()
        } else {
            None
        };
        if number.is_none() && (numeral || !is_identifier(text)) {
            return Err(self.error(
                ParseErrorKind::NoProduction {
                    text: text.to_string(),
                },
                start,
                text.len(),
            ));
        }
        let kind = TermKind::Constant {
            text: EcoString::from(text),
            number,
        };
        Ok(self.expr.alloc(start, text.len(), kind))
    }

    /// Splits `name(args)` into the name and the argument slices with their
    /// absolute positions.
    fn split_call<'t>(
        &self,
        text: &'t str,
        start: usize,
    ) -> Result<(&'t str, Vec<(usize, &'t str)>), ParseError> {
        let no_production = || {
            self.error(
                ParseErrorKind::NoProduction {
                    text: text.to_string(),
                },
                start,
                text.len(),
            )
        };
        let open = text.find('(').ok_or_else(no_production)?;
        let name = text[..open].trim();
        if !is_identifier(name)
            || matching_bracket_forward(text, open, b'(', b')') != Some(text.len() - 1)
        {
            return Err(no_production());
        }
        let args_start = start + open + 1;
        let args = split_respecting_parens_with_offsets(&text[open + 1..text.len() - 1], b',')
            .into_iter()
            .map(|(offset, piece)| (args_start + offset, piece))
            .collect();
        Ok((name, args))
    }

    fn parse_args(&mut self, args: &[(usize, &str)]) -> Result<Vec<TermId>, ParseError> {
        args.iter()
            .map(|&(pos, piece)| self.parse_term(piece, pos))
            .collect()
    }

    fn parse_call(&mut self, text: &str, start: usize) -> Result<TermId, ParseError> {
        let (name, args) = self.split_call(text, start)?;
        let kind = match name {
            "if" => self.parse_if(&args, start)?,
            "switch" => self.parse_switch(&args, start)?,
            "optional" => self.parse_optional(&args, start)?,
            _ => TermKind::Call {
                name: EcoString::from(name),
                args: self.parse_args(&args)?,
            },
        };
        Ok(self.expr.alloc(start, text.len(), kind))
    }

    fn parse_member_call(
        &mut self,
        text: &str,
        start: usize,
        arrow: usize,
    ) -> Result<TermId, ParseError> {
        let call_start = start + arrow + 2;
        let (name, args) = self.split_call(&text[arrow + 2..], call_start)?;
        let object = self.parse_term(&text[..arrow], start)?;
        let args = self.parse_args(&args)?;
        let kind = TermKind::MemberCall {
            object,
            name: EcoString::from(name),
            args,
        };
        Ok(self.expr.alloc(start, text.len(), kind))
    }

    fn wrong_arity(
        &self,
        form: &'static str,
        expected: &'static str,
        found: usize,
        start: usize,
    ) -> ParseError {
        self.error(
            ParseErrorKind::WrongArity {
                form,
                expected,
                found,
            },
            start,
            form.len(),
        )
    }

    fn parse_if(&mut self, args: &[(usize, &str)], start: usize) -> Result<TermKind, ParseError> {
        let [(cond_pos, cond), (then_pos, then), (else_pos, otherwise)] = args else {
            return Err(self.wrong_arity("if", "3", args.len(), start));
        };
        let condition = self.parse_combined(cond, *cond_pos)?;
        let then = self.parse_term(then, *then_pos)?;
        let otherwise = self.parse_term(otherwise, *else_pos)?;
        Ok(TermKind::Conditional {
            condition,
            then,
            otherwise,
        })
    }

    fn parse_switch(
        &mut self,
        args: &[(usize, &str)],
        start: usize,
    ) -> Result<TermKind, ParseError> {
        let Some((&(disc_pos, disc), arms)) = args.split_first().filter(|_| args.len() >= 2) else {
            return Err(self.wrong_arity("switch", "at least 2", args.len(), start));
        };
        let discriminant = self.parse_term(disc, disc_pos)?;

        let mut cases: Vec<SwitchCase> = Vec::with_capacity(arms.len());
        let mut default = None;
        for &(arm_pos, arm) in arms {
            let parts = split_respecting_parens_with_offsets(arm, b':');
            let [(_, key), (term_offset, term)] = parts.as_slice() else {
                return Err(self.error(
                    ParseErrorKind::InvalidCaseKey {
                        key: arm.to_string(),
                    },
                    arm_pos,
                    arm.len(),
                ));
            };
            let term = self.parse_term(term, arm_pos + term_offset)?;
            if *key == "default" {
                if default.replace(term).is_some() {
                    return Err(self.error(
                        ParseErrorKind::DuplicateCaseKey {
                            key: key.to_string(),
                        },
                        arm_pos,
                        key.len(),
                    ));
                }
                continue;
            }
            let Some(value) = numeric_literal(key) else {
                return Err(self.error(
                    ParseErrorKind::InvalidCaseKey {
                        key: key.to_string(),
                    },
                    arm_pos,
                    key.len(),
                ));
            };
            if cases.iter().any(|c| c.key == value) {
                return Err(self.error(
                    ParseErrorKind::DuplicateCaseKey {
                        key: key.to_string(),
                    },
                    arm_pos,
                    key.len(),
                ));
            }
            cases.push(SwitchCase { key: value, term });
        }

        let default = default.ok_or_else(|| self.error(ParseErrorKind::MissingDefault, start, 6))?;
        Ok(TermKind::Switch {
            discriminant,
            cases,
            default,
        })
    }

    fn parse_optional(
        &mut self,
        args: &[(usize, &str)],
        start: usize,
    ) -> Result<TermKind, ParseError> {
        let [(name_pos, name), (fallback_pos, fallback)] = args else {
            return Err(self.wrong_arity("optional", "2", args.len(), start));
        };
        let name = if is_quoted_literal(name) {
            &name[1..name.len() - 1]
        } else {
            name
        };
        if !is_identifier(name) {
            return Err(self.error(
                ParseErrorKind::NoProduction {
                    text: name.to_string(),
                },
                *name_pos,
                name.len(),
            ));
        }
        let fallback = self.parse_term(fallback, *fallback_pos)?;
        Ok(TermKind::Optional {
            name: EcoString::from(name),
            fallback,
        })
    }
}
