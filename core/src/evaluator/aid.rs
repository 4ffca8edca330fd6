//! Active-index bookkeeping for batch evaluation.

use super::TermEvaluator;
use core::ops::Range;
use std::sync::Arc;

/// Stack of active index subsets.
///
/// With an empty stack every instance `0..size` is active. Otherwise only
/// the indices of the top subset are. Conditions, switches and optional
/// fallbacks push the subset that still needs evaluating, evaluate a
/// sub-term over it, and pop it again.
#[derive(Debug, Clone, Default)]
pub struct ListEvaluationAid {
    subsets: Vec<Arc<[usize]>>,
}

impl ListEvaluationAid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_subset(&mut self, indices: impl Into<Arc<[usize]>>) {
        let indices = indices.into();
        tracing::trace!(active = indices.len(), depth = self.subsets.len() + 1, "narrowing");
        self.subsets.push(indices);
    }

    pub fn pop_subset(&mut self) -> Option<Arc<[usize]>> {
        self.subsets.pop()
    }

    /// Number of pushed subsets.
    pub fn depth(&self) -> usize {
        self.subsets.len()
    }

    pub fn active_count(&self, size: usize) -> usize {
        self.subsets.last().map_or(size, |top| top.len())
    }

    /// The active indices in enumeration order.
    pub fn active_indices(&self, size: usize) -> Arc<[usize]> {
        match self.subsets.last() {
            Some(top) => top.clone(),
            None => (0..size).collect(),
        }
    }

    /// A fresh sweep over the active indices.
    ///
    /// Each sub-term runs its own sweep; sweeps never share progress.
    pub fn cursor(&self, size: usize) -> IndexCursor {
        let source = match self.subsets.last() {
            Some(top) => Source::Subset {
                indices: top.clone(),
                next: 0,
            },
            None => Source::Range(0..size),
        };
        IndexCursor {
            source,
            current: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Source {
    Range(Range<usize>),
    Subset { indices: Arc<[usize]>, next: usize },
}

/// One sweep over the active indices of a [`ListEvaluationAid`].
#[derive(Debug, Clone)]
pub struct IndexCursor {
    source: Source,
    current: Option<usize>,
}

impl IndexCursor {
    /// Advances to the next active index and tells the evaluator about it.
    /// Returns `false` once the sweep is exhausted.
    pub fn set_next_index(&mut self, evaluator: &mut (impl TermEvaluator + ?Sized)) -> bool {
        let next = match &mut self.source {
            Source::Range(range) => range.next(),
            Source::Subset { indices, next } => {
                let index = indices.get(*next).copied();
                *next += 1;
                index
            }
        };
        self.current = next;
        match next {
            Some(index) => {
                evaluator.set_index(index);
                true
            }
            None => false,
        }
    }

    /// The index the last successful [`IndexCursor::set_next_index`] moved to.
    pub fn current(&self) -> Option<usize> {
        self.current
    }
}
