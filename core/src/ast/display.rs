//! Canonical printing.
//!
//! The printed form is fully parenthesized and parses back to a tree of the
//! same shape.

use super::{CombinedInequality, Expression, Inequality, Term, TermKind};
use core::fmt;

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root())
    }
}

impl fmt::Display for Term<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expr = self.expression();
        let t = |id| expr.term(id);
        match self.kind() {
            TermKind::Constant { text, .. } => write!(f, "{}", text),
            TermKind::Str(s) => write_quoted(f, s),
            TermKind::Unary(operand) => write!(f, "-{}", t(*operand)),
            TermKind::Binary { op, left, right } => {
                write!(f, "({} {} {})", t(*left), op.symbol(), t(*right))
            }
            TermKind::Call { name, args } => {
                write!(f, "{}(", name)?;
                write_list(f, expr, args, ", ")?;
                write!(f, ")")
            }
            TermKind::MemberCall { object, name, args } => {
                write_postfix_operand(f, t(*object))?;
                write!(f, "->{}(", name)?;
                write_list(f, expr, args, ", ")?;
                write!(f, ")")
            }
            TermKind::Array(elements) => match elements.len() {
                0 => write!(f, "ARRAY"),
                // `(x)` would read back as a plain parenthesized term.
                1 => write!(f, "arr({})", t(elements[0])),
                _ => {
                    write!(f, "(")?;
                    write_list(f, expr, elements, "; ")?;
                    write!(f, ")")
                }
            },
            TermKind::Index { array, index } => {
                write_postfix_operand(f, t(*array))?;
                write!(f, "[{}]", t(*index))
            }
            TermKind::Switch {
                discriminant,
                cases,
                default,
            } => {
                write!(f, "switch({}", t(*discriminant))?;
                for case in cases {
                    write!(f, ", {}: {}", case.key, t(case.term))?;
                }
                write!(f, ", default: {})", t(*default))
            }
            TermKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                write!(f, "if(")?;
                write_combined(f, expr, condition, true)?;
                write!(f, ", {}, {})", t(*then), t(*otherwise))
            }
            TermKind::Optional { name, fallback } => {
                write!(f, "optional({}, {})", name, t(*fallback))
            }
            TermKind::Not(operand) => write!(f, "!{}", t(*operand)),
            TermKind::Inequality(inequality) => {
                write!(f, "(")?;
                write_inequality(f, expr, inequality)?;
                write!(f, ")")
            }
            TermKind::Combined(combined) => write_combined(f, expr, combined, false),
        }
    }
}

/// The operand of `[...]` or `->`. A prefix `-` or `!` would otherwise
/// capture the whole postfix expression when read back.
fn write_postfix_operand(f: &mut fmt::Formatter<'_>, term: Term<'_>) -> fmt::Result {
    match term.kind() {
        TermKind::Unary(_) | TermKind::Not(_) => write!(f, "({})", term),
        _ => write!(f, "{}", term),
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') { '"' } else { '\'' };
    write!(f, "{quote}{s}{quote}")
}

fn write_list(
    f: &mut fmt::Formatter<'_>,
    expr: &Expression,
    items: &[super::TermId],
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", expr.term(*item))?;
    }
    Ok(())
}

fn write_inequality(
    f: &mut fmt::Formatter<'_>,
    expr: &Expression,
    inequality: &Inequality,
) -> fmt::Result {
    match inequality {
        Inequality::Compare { op, left, right } => write!(
            f,
            "{} {} {}",
            expr.term(*left),
            op.symbol(),
            expr.term(*right)
        ),
        Inequality::Truthy(term) => write!(f, "{}", expr.term(*term)),
    }
}

/// `top` suppresses the outer parentheses of an `&&`/`||` chain, which is
/// only safe where the chain is parsed as a condition directly.
fn write_combined(
    f: &mut fmt::Formatter<'_>,
    expr: &Expression,
    combined: &CombinedInequality,
    top: bool,
) -> fmt::Result {
    let (parts, separator) = match combined {
        CombinedInequality::Leaf(inequality) => return write_inequality(f, expr, inequality),
        CombinedInequality::And(parts) => (parts, " && "),
        CombinedInequality::Or(parts) => (parts, " || "),
    };
    if !top {
        write!(f, "(")?;
    }
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write_combined(f, expr, part, false)?;
    }
    if !top {
        write!(f, ")")?;
    }
    Ok(())
}
