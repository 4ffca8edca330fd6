//! Parsed formula trees.
//!
//! An [`Expression`] owns every node of one parsed formula in a flat arena.
//! Nodes refer to their children by [`TermId`] and to their parent by a
//! non-owning id plus the byte offset of the node's start relative to the
//! parent's start. Summing offsets up the parent chain yields the node's
//! absolute position in the original source, which is only needed when an
//! error is reported.
//!
//! Trees are never mutated after parsing. A [`Term`] is a cheap borrowed view
//! of one node and carries the evaluation, cloning and introspection entry
//! points.

mod condition;
mod constants;
mod display;

pub use condition::{CombinedInequality, CompareOp, Inequality};
pub use constants::Constants;

use crate::parser::Span;
use ecow::EcoString;
use smallvec::SmallVec;
use std::sync::Arc;

/// Index of a node inside its [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(u32);

impl TermId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Arithmetic operators of a binary term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Mod => "%",
        }
    }
}

/// One `key: term` arm of a switch.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub key: f64,
    pub term: TermId,
}

/// The node kinds of the formula language.
#[derive(Debug, Clone, PartialEq)]
pub enum TermKind {
    /// A bare word or number. `number` holds the eagerly parsed value when
    /// the text is a numeric literal.
    Constant {
        text: EcoString,
        number: Option<f64>,
    },
    /// A quoted string literal, quotes removed.
    Str(EcoString),
    /// Unary negation.
    Unary(TermId),
    Binary {
        op: BinaryOp,
        left: TermId,
        right: TermId,
    },
    /// `name(args...)`, dispatched to the built-in library or the host.
    Call { name: EcoString, args: Vec<TermId> },
    /// `object->name(args...)`.
    MemberCall {
        object: TermId,
        name: EcoString,
        args: Vec<TermId>,
    },
    /// `(a; b; c)`.
    Array(Vec<TermId>),
    /// `array[index]`.
    Index { array: TermId, index: TermId },
    Switch {
        discriminant: TermId,
        cases: Vec<SwitchCase>,
        default: TermId,
    },
    /// `if(condition, then, otherwise)`.
    Conditional {
        condition: CombinedInequality,
        then: TermId,
        otherwise: TermId,
    },
    /// `optional(name, fallback)`.
    Optional { name: EcoString, fallback: TermId },
    Not(TermId),
    Inequality(Inequality),
    Combined(CombinedInequality),
}

impl TermKind {
    /// Child terms in evaluation order.
    pub fn children(&self) -> SmallVec<[TermId; 4]> {
        match self {
            TermKind::Constant { .. } | TermKind::Str(_) => SmallVec::new(),
            TermKind::Unary(t) | TermKind::Not(t) => smallvec::smallvec![*t],
            TermKind::Binary { left, right, .. } => smallvec::smallvec![*left, *right],
            TermKind::Call { args, .. } => args.iter().copied().collect(),
            TermKind::MemberCall { object, args, .. } => {
                core::iter::once(*object).chain(args.iter().copied()).collect()
            }
            TermKind::Array(elements) => elements.iter().copied().collect(),
            TermKind::Index { array, index } => smallvec::smallvec![*array, *index],
            TermKind::Switch {
                discriminant,
                cases,
                default,
            } => core::iter::once(*discriminant)
                .chain(cases.iter().map(|c| c.term))
                .chain(core::iter::once(*default))
                .collect(),
            TermKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let mut out = condition.operands();
                out.push(*then);
                out.push(*otherwise);
                out
            }
            TermKind::Optional { fallback, .. } => smallvec::smallvec![*fallback],
            TermKind::Inequality(inequality) => inequality.operands().into_iter().collect(),
            TermKind::Combined(combined) => combined.operands(),
        }
    }

    /// Rebuilds this kind with every child id passed through `f`, in the
    /// same order as [`TermKind::children`].
    pub(crate) fn map_children(&self, mut f: impl FnMut(TermId) -> TermId) -> TermKind {
        match self {
            TermKind::Constant { .. } | TermKind::Str(_) => self.clone(),
            TermKind::Unary(t) => TermKind::Unary(f(*t)),
            TermKind::Not(t) => TermKind::Not(f(*t)),
            TermKind::Binary { op, left, right } => TermKind::Binary {
                op: *op,
                left: f(*left),
                right: f(*right),
            },
            TermKind::Call { name, args } => TermKind::Call {
                name: name.clone(),
                args: args.iter().map(|a| f(*a)).collect(),
            },
            TermKind::MemberCall { object, name, args } => {
                let object = f(*object);
                TermKind::MemberCall {
                    object,
                    name: name.clone(),
                    args: args.iter().map(|a| f(*a)).collect(),
                }
            }
            TermKind::Array(elements) => TermKind::Array(elements.iter().map(|e| f(*e)).collect()),
            TermKind::Index { array, index } => {
                let array = f(*array);
                TermKind::Index {
                    array,
                    index: f(*index),
                }
            }
            TermKind::Switch {
                discriminant,
                cases,
                default,
            } => {
                let discriminant = f(*discriminant);
                let cases = cases
                    .iter()
                    .map(|c| SwitchCase {
                        key: c.key,
                        term: f(c.term),
                    })
                    .collect();
                TermKind::Switch {
                    discriminant,
                    cases,
                    default: f(*default),
                }
            }
            TermKind::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let condition = condition.map_operands(&mut f);
                let then = f(*then);
                TermKind::Conditional {
                    condition,
                    then,
                    otherwise: f(*otherwise),
                }
            }
            TermKind::Optional { name, fallback } => TermKind::Optional {
                name: name.clone(),
                fallback: f(*fallback),
            },
            TermKind::Inequality(inequality) => {
                TermKind::Inequality(inequality.map_operands(&mut f))
            }
            TermKind::Combined(combined) => TermKind::Combined(combined.map_operands(&mut f)),
        }
    }
}

/// One node of the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Non-owning back reference, `None` for a root.
    pub parent: Option<TermId>,
    /// Start of this node relative to the start of its parent. For a root,
    /// the absolute start in the source.
    pub offset: usize,
    /// Length of the node's text in bytes.
    pub len: usize,
    pub kind: TermKind,
}

/// A parsed formula: the source text plus the node arena.
#[derive(Debug, Clone)]
pub struct Expression {
    source: Arc<str>,
    nodes: Vec<Node>,
    root: TermId,
}

impl Expression {
    pub(crate) fn with_source(source: &str) -> Self {
        Self {
            source: Arc::from(source),
            nodes: Vec::new(),
            root: TermId(0),
        }
    }

    /// Appends a node whose children already exist, adopting them.
    ///
    /// `start` is the absolute byte position of the node in the source.
    /// Children are allocated with absolute offsets and converted to
    /// parent-relative offsets here.
    pub(crate) fn alloc(&mut self, start: usize, len: usize, kind: TermKind) -> TermId {
        let id = TermId(self.nodes.len() as u32);
        for child in kind.children() {
            let node = &mut self.nodes[child.index()];
            node.parent = Some(id);
            node.offset -= start;
        }
        self.nodes.push(Node {
            parent: None,
            offset: start,
            len,
            kind,
        });
        id
    }

    pub(crate) fn set_root(&mut self, root: TermId) {
        self.root = root;
    }

    /// The full source text this expression was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Term<'_> {
        self.term(self.root)
    }

    pub fn root_id(&self) -> TermId {
        self.root
    }

    pub fn term(&self, id: TermId) -> Term<'_> {
        Term { expr: self, id }
    }

    pub fn node(&self, id: TermId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Absolute byte offset of `id` in the source, computed by summing
    /// offsets up the parent chain.
    pub fn absolute_offset(&self, id: TermId) -> usize {
        let mut offset = 0;
        let mut current = Some(id);
        while let Some(id) = current {
            let node = self.node(id);
            offset += node.offset;
            current = node.parent;
        }
        offset
    }

    pub fn span_of(&self, id: TermId) -> Span {
        let start = self.absolute_offset(id);
        Span(start..start + self.node(id).len)
    }

    /// Deep-copies `term` (from another expression) into this arena under
    /// `parent`, keeping the copied root's offset. Returns the new id.
    ///
    /// The copy is structurally identical to the original and shares no
    /// nodes with it.
    pub fn graft(&mut self, parent: Option<TermId>, term: Term<'_>) -> TermId {
        self.copy_node(term.expr, term.id, parent, term.node().offset)
    }

    fn copy_node(
        &mut self,
        from: &Expression,
        id: TermId,
        parent: Option<TermId>,
        offset: usize,
    ) -> TermId {
        let source = from.node(id);
        let new_id = TermId(self.nodes.len() as u32);
        // Reserve the slot first so children can point at it.
        self.nodes.push(Node {
            parent,
            offset,
            len: source.len,
            kind: TermKind::Array(Vec::new()),
        });
        let kind = source.kind.map_children(|child| {
            let child_offset = from.node(child).offset;
            self.copy_node(from, child, Some(new_id), child_offset)
        });
        self.nodes[new_id.index()].kind = kind;
        new_id
    }

    #[cfg(test)]
    pub(crate) fn kind_mut(&mut self, id: TermId) -> &mut TermKind {
        &mut self.nodes[id.index()].kind
    }
}

/// Borrowed view of one node of an [`Expression`].
#[derive(Debug, Clone, Copy)]
pub struct Term<'e> {
    expr: &'e Expression,
    id: TermId,
}

impl<'e> Term<'e> {
    pub fn id(&self) -> TermId {
        self.id
    }

    pub fn expression(&self) -> &'e Expression {
        self.expr
    }

    pub fn node(&self) -> &'e Node {
        self.expr.node(self.id)
    }

    pub fn kind(&self) -> &'e TermKind {
        &self.node().kind
    }

    pub fn parent(&self) -> Option<Term<'e>> {
        self.node().parent.map(|id| self.expr.term(id))
    }

    /// Offset relative to the parent's start.
    pub fn offset(&self) -> usize {
        self.node().offset
    }

    pub fn absolute_offset(&self) -> usize {
        self.expr.absolute_offset(self.id)
    }

    pub fn span(&self) -> Span {
        self.expr.span_of(self.id)
    }

    /// The slice of the source this node was parsed from.
    pub fn text(&self) -> &'e str {
        let Span(range) = self.span();
        self.expr.source.get(range).unwrap_or("")
    }

    pub fn children(&self) -> impl Iterator<Item = Term<'e>> + 'e {
        let expr = self.expr;
        self.kind().children().into_iter().map(move |id| expr.term(id))
    }

    /// True when the value of this term can never depend on the host:
    /// every reachable leaf is a literal, and no call, member call or
    /// optional variable is involved.
    ///
    /// Bare words other than `pi`, `true`, `false`, `null` and `ARRAY` are
    /// host lookups and therefore not constant.
    pub fn is_constant(&self) -> bool {
        match self.kind() {
            TermKind::Constant { text, number } => {
                number.is_some() || is_literal_keyword(text)
            }
            TermKind::Str(_) => true,
            TermKind::Call { .. } | TermKind::MemberCall { .. } | TermKind::Optional { .. } => {
                false
            }
            _ => self.children().all(|child| child.is_constant()),
        }
    }

    /// Every `Constant` leaf reachable from this term, depth-first.
    pub fn constants(&self) -> Constants<'e> {
        Constants::new(*self)
    }

    /// Copies this term and its descendants into a new, independent
    /// expression. The copy keeps its absolute offset into the original
    /// source so that errors still point at the right place.
    pub fn clone_tree(&self) -> Expression {
        let mut out = Expression {
            source: self.expr.source.clone(),
            nodes: Vec::with_capacity(self.expr.len()),
            root: TermId(0),
        };
        let root = out.copy_node(self.expr, self.id, None, self.absolute_offset());
        out.set_root(root);
        out
    }
}

/// Words that resolve without consulting the host.
pub(crate) fn is_literal_keyword(text: &str) -> bool {
    text.eq_ignore_ascii_case("pi")
        || text.eq_ignore_ascii_case("true")
        || text.eq_ignore_ascii_case("false")
        || text == "null"
        || text == "ARRAY"
}
