use std::sync::Arc;

use dashmap::DashMap;

use crate::{ContextSignature, InvokeId, MethodId};

/// Precondition/postcondition pair for an analyzed region (a method body or
/// an invoke site).
///
/// Created when analysis of the region begins; the postcondition is frozen
/// exactly once, after the region's fixpoint has converged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractState<D> {
    pre: D,
    post: Option<D>,
}

impl<D> AbstractState<D> {
    pub fn new(pre: D) -> Self {
        Self { pre, post: None }
    }

    pub fn precondition(&self) -> &D {
        &self.pre
    }

    pub fn postcondition(&self) -> Option<&D> {
        self.post.as_ref()
    }

    pub fn is_frozen(&self) -> bool {
        self.post.is_some()
    }

    /// Freeze the postcondition. Freezing twice is a caller bug.
    pub fn freeze(&mut self, post: D) {
        assert!(self.post.is_none(), "postcondition already frozen");
        self.post = Some(post);
    }
}

/// A reusable precondition→postcondition mapping for one callee.
///
/// Built precondition-only by the [`SummaryFactory`] before the callee is
/// analyzed, then finalized exactly once with the callee's converged exit
/// state, translated back into caller terms (the inverse of the factory's
/// argument renaming). Immutable after finalization; a finalized summary is
/// only ever invalidated by a whole-store reset.
pub trait Summary<D>: Send + Sync {
    /// The invoke site this summary was created at.
    fn invoke(&self) -> InvokeId;

    /// Renamed/abstracted actual arguments in callee-local terms; the
    /// callee is analyzed from this state.
    fn precondition(&self) -> &D;

    /// The callee's effect in caller terms; `None` until finalized.
    fn postcondition(&self) -> Option<&D>;

    fn is_finalized(&self) -> bool {
        self.postcondition().is_some()
    }

    /// Whether this cached summary may stand in for `other`. Concrete
    /// domains choose their own strength: same-call-site keying, or
    /// precondition containment (`other.pre ⊑ self.pre`) for broader reuse.
    fn subsumes(&self, other: &Self) -> bool;

    /// Freeze the postcondition from the callee's converged exit state.
    /// Called exactly once by the analyzer.
    fn finalize(&mut self, callee_post: D);

    /// Fold this summary's effect into the caller's running state.
    fn apply(&self, state: &D) -> D;
}

/// Builds summaries for invoke sites, abstracting actual arguments into
/// callee-local terms so one summary can be reused at call sites with
/// different concrete argument names.
pub trait SummaryFactory<D>: Send + Sync {
    type Summary: Summary<D>;

    fn create_summary(
        &self,
        invoke: InvokeId,
        caller_pre: &D,
        argument_states: &[D],
    ) -> Self::Summary;
}

/// Shared store of finalized summaries, keyed by callee and call context.
///
/// Append-mostly and concurrently accessed; the only invalidation is
/// [`clear`](Self::clear), a whole-cache reset.
pub struct SummaryStore<S> {
    entries: DashMap<(MethodId, ContextSignature), Vec<Arc<S>>>,
}

impl<S> Default for SummaryStore<S> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<S> SummaryStore<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the first cached summary satisfying `matches` for the callee
    /// under the given call context.
    pub fn lookup(
        &self,
        callee: MethodId,
        context: &ContextSignature,
        matches: impl Fn(&S) -> bool,
    ) -> Option<Arc<S>> {
        let key = (callee, context.clone());
        let entries = self.entries.get(&key)?;
        entries
            .value()
            .iter()
            .find(|entry| matches(entry))
            .cloned()
    }

    /// Publish a finalized summary.
    pub fn insert(&self, callee: MethodId, context: ContextSignature, summary: Arc<S>) {
        self.entries
            .entry((callee, context))
            .or_default()
            .push(summary);
    }

    /// Total number of cached summaries.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whole-cache reset: the only way a finalized summary is invalidated.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
