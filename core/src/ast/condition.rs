//! Relational and boolean condition nodes.

use super::TermId;
use smallvec::SmallVec;

/// Relational operator of an [`Inequality`].
///
/// The negated source forms `!>=` and `!>` are folded into [`CompareOp::Le`]
/// and [`CompareOp::Lt`] at parse time; the evaluator never sees a separate
/// negation for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Operators in the order the parser searches for them, together with
    /// the comparison each one produces.
    pub const SEARCH_ORDER: [(&'static str, CompareOp); 8] = [
        ("==", CompareOp::Eq),
        ("!>=", CompareOp::Le),
        ("!>", CompareOp::Lt),
        ("<=", CompareOp::Le),
        ("<", CompareOp::Lt),
        (">=", CompareOp::Ge),
        (">", CompareOp::Gt),
        ("!=", CompareOp::Ne),
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Whether the operator only makes sense on ordered (numeric) operands.
    pub fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Eq | CompareOp::Ne)
    }
}

/// A single relational expression, or a single boolean-valued operand when
/// the source contained no relational operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Inequality {
    Compare {
        op: CompareOp,
        left: TermId,
        right: TermId,
    },
    Truthy(TermId),
}

/// A tree of `||` / `&&` over [`Inequality`] leaves.
#[derive(Debug, Clone, PartialEq)]
pub enum CombinedInequality {
    Leaf(Inequality),
    And(Vec<CombinedInequality>),
    Or(Vec<CombinedInequality>),
}

impl Inequality {
    pub fn operands(&self) -> SmallVec<[TermId; 2]> {
        match self {
            Inequality::Compare { left, right, .. } => SmallVec::from_buf([*left, *right]),
            Inequality::Truthy(term) => smallvec::smallvec![*term],
        }
    }

    pub(crate) fn map_operands(&self, f: &mut impl FnMut(TermId) -> TermId) -> Inequality {
        match self {
            Inequality::Compare { op, left, right } => Inequality::Compare {
                op: *op,
                left: f(*left),
                right: f(*right),
            },
            Inequality::Truthy(term) => Inequality::Truthy(f(*term)),
        }
    }
}

impl CombinedInequality {
    /// All operand terms, depth-first, left to right.
    pub fn operands(&self) -> SmallVec<[TermId; 4]> {
        let mut out = SmallVec::new();
        self.collect_operands(&mut out);
        out
    }

    fn collect_operands(&self, out: &mut SmallVec<[TermId; 4]>) {
        match self {
            CombinedInequality::Leaf(inequality) => out.extend(inequality.operands()),
            CombinedInequality::And(parts) | CombinedInequality::Or(parts) => {
                for part in parts {
                    part.collect_operands(out);
                }
            }
        }
    }

    pub(crate) fn map_operands(&self, f: &mut impl FnMut(TermId) -> TermId) -> CombinedInequality {
        match self {
            CombinedInequality::Leaf(inequality) => {
                CombinedInequality::Leaf(inequality.map_operands(f))
            }
            CombinedInequality::And(parts) => {
                CombinedInequality::And(parts.iter().map(|p| p.map_operands(f)).collect())
            }
            CombinedInequality::Or(parts) => {
                CombinedInequality::Or(parts.iter().map(|p| p.map_operands(f)).collect())
            }
        }
    }
}
