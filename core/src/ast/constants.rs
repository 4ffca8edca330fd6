use super::{Term, TermId, TermKind};
use smallvec::SmallVec;

/// Lazy depth-first iterator over the `Constant` leaves below a term.
///
/// Used for variable discovery without evaluating anything.
pub struct Constants<'e> {
    root: Term<'e>,
    stack: SmallVec<[TermId; 16]>,
}

impl<'e> Constants<'e> {
    pub(super) fn new(root: Term<'e>) -> Self {
        Self {
            root,
            stack: smallvec::smallvec![root.id()],
        }
    }
}

impl<'e> Iterator for Constants<'e> {
    type Item = Term<'e>;

    fn next(&mut self) -> Option<Self::Item> {
        let expr = self.root.expression();
        while let Some(id) = self.stack.pop() {
            let term = expr.term(id);
            if let TermKind::Constant { .. } = term.kind() {
                return Some(term);
            }
            // Push in reverse so the leftmost child is visited first.
            self.stack.extend(term.kind().children().into_iter().rev());
        }
        None
    }
}
