use argus_analysis::{
    AbstractState, CallGraph, InvokeId, MethodId, NodeInterpreter, Summary, SummaryFactory,
};
use argus_domain::{HasBottom, Lattice};

use crate::{FieldId, ReachSummary, TypeId};

/// CFG node payload of the reachability analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachOp {
    Nop,
    Invoke(InvokeId),
    AccessType(TypeId),
    Instantiate(TypeId),
    ReadField(FieldId),
    WriteField(FieldId),
}

/// Summary of one invoke site's transitive reachability effect.
///
/// Reachability facts name global entities, so the caller/callee renaming
/// is the identity and subsumption is plain precondition containment: a
/// finalized summary stands in for any probe whose precondition it covers,
/// letting call sites across the whole program share one callee summary.
#[derive(Debug, Clone)]
pub struct ReachSiteSummary {
    invoke: InvokeId,
    state: AbstractState<ReachSummary>,
}

impl Summary<ReachSummary> for ReachSiteSummary {
    fn invoke(&self) -> InvokeId {
        self.invoke
    }

    fn precondition(&self) -> &ReachSummary {
        self.state.precondition()
    }

    fn postcondition(&self) -> Option<&ReachSummary> {
        self.state.postcondition()
    }

    fn subsumes(&self, other: &Self) -> bool {
        other.precondition().is_subseteq(self.precondition())
    }

    fn finalize(&mut self, callee_post: ReachSummary) {
        self.state.freeze(callee_post);
    }

    fn apply(&self, state: &ReachSummary) -> ReachSummary {
        match self.postcondition() {
            Some(post) => state.join(post),
            None => state.clone(),
        }
    }
}

/// Builds [`ReachSiteSummary`] preconditions.
///
/// Callees start from the empty effect — reachability is not
/// argument-sensitive, so the abstracted argument states are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReachSummaryFactory;

impl SummaryFactory<ReachSummary> for ReachSummaryFactory {
    type Summary = ReachSiteSummary;

    fn create_summary(
        &self,
        invoke: InvokeId,
        _caller_pre: &ReachSummary,
        _argument_states: &[ReachSummary],
    ) -> ReachSiteSummary {
        ReachSiteSummary {
            invoke,
            state: AbstractState::new(ReachSummary::bottom()),
        }
    }
}

/// Node interpreter accumulating reachability facts.
///
/// At invoke nodes the direct callees are recorded from the call graph and
/// the callee's summarized transitive effect, when known, is folded in. An
/// unknown callee (`None` summary) still records the invocation itself.
pub struct ReachInterpreter<'p, P: CallGraph> {
    call_graph: &'p P,
}

impl<'p, P: CallGraph> ReachInterpreter<'p, P> {
    pub fn new(call_graph: &'p P) -> Self {
        Self { call_graph }
    }
}

impl<P: CallGraph> NodeInterpreter<ReachSummary> for ReachInterpreter<'_, P> {
    type Node = ReachOp;
    type Summary = ReachSiteSummary;
    type Error = std::convert::Infallible;

    fn transfer(
        &self,
        _method: MethodId,
        node: &ReachOp,
        state: &ReachSummary,
    ) -> Result<ReachSummary, Self::Error> {
        let mut next = state.clone();
        match node {
            ReachOp::Nop | ReachOp::Invoke(_) => {}
            ReachOp::AccessType(ty) => {
                next.accessed_types.insert(*ty);
            }
            ReachOp::Instantiate(ty) => {
                next.accessed_types.insert(*ty);
                next.instantiated_types.insert(*ty);
            }
            ReachOp::ReadField(field) => {
                next.read_fields.insert(*field);
            }
            ReachOp::WriteField(field) => {
                next.written_fields.insert(*field);
            }
        }
        Ok(next)
    }

    fn as_invoke(&self, _method: MethodId, node: &ReachOp) -> Option<InvokeId> {
        match node {
            ReachOp::Invoke(invoke) => Some(*invoke),
            _ => None,
        }
    }

    fn argument_states(&self, _invoke: InvokeId, _state: &ReachSummary) -> Vec<ReachSummary> {
        Vec::new()
    }

    fn transfer_invoke(
        &self,
        invoke: InvokeId,
        state: &ReachSummary,
        summary: Option<&ReachSiteSummary>,
    ) -> Result<ReachSummary, Self::Error> {
        let mut next = state.clone();
        for callee in self.call_graph.callees(invoke) {
            next.invoked.insert(callee);
            if self.call_graph.is_implementation_invoked(callee) {
                next.implementation_invoked.insert(callee);
            }
        }
        if let Some(summary) = summary {
            next = summary.apply(&next);
        }
        Ok(next)
    }
}
