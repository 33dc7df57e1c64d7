//! In-memory program fixture and a small resource-tracking analysis used
//! by the interprocedural tests.

use std::convert::Infallible;

use rustc_hash::FxHashMap;

use argus_analysis::{
    AbstractState, CallGraph, GraphSource, InvokeId, MethodId, NodeInterpreter, Summary,
    SummaryFactory,
};
use argus_domain::{HasBottom, HasTop, Lattice, SetDomain};
use argus_graph::MethodGraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOp {
    Nop,
    Gen(&'static str),
    Call(InvokeId),
}

/// Hand-built whole program: per-method CFGs plus a call graph.
#[derive(Default)]
pub struct TestProgram {
    graphs: FxHashMap<MethodId, MethodGraph<TestOp>>,
    callees: FxHashMap<InvokeId, Vec<MethodId>>,
}

impl TestProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_method(&mut self, method: MethodId, graph: MethodGraph<TestOp>) {
        self.graphs.insert(method, graph);
    }

    /// A method whose body is a straight line of `ops`.
    pub fn add_linear_method(&mut self, method: MethodId, ops: &[TestOp]) {
        let mut graph = MethodGraph::new(ops[0].clone());
        let mut previous = graph.entry();
        for op in &ops[1..] {
            let node = graph.add_node(op.clone());
            graph.add_edge(previous, node);
            previous = node;
        }
        self.add_method(method, graph);
    }

    pub fn add_call(&mut self, invoke: InvokeId, callees: &[MethodId]) {
        self.callees.insert(invoke, callees.to_vec());
    }
}

impl GraphSource for TestProgram {
    type Node = TestOp;

    fn method_graph(&self, method: MethodId) -> Option<MethodGraph<TestOp>> {
        self.graphs.get(&method).cloned()
    }
}

impl CallGraph for TestProgram {
    fn callees(&self, invoke: InvokeId) -> Vec<MethodId> {
        self.callees.get(&invoke).cloned().unwrap_or_default()
    }

    fn invoke_sites(&self, method: MethodId) -> Vec<InvokeId> {
        let Some(graph) = self.graphs.get(&method) else {
            return Vec::new();
        };
        graph
            .node_indices()
            .filter_map(|ix| match graph.node(ix) {
                TestOp::Call(invoke) => Some(*invoke),
                _ => None,
            })
            .collect()
    }

    fn is_implementation_invoked(&self, method: MethodId) -> bool {
        self.callees.values().any(|callees| callees.contains(&method))
    }
}

/// Summary of one call site of the resource analysis.
///
/// The callee is analyzed from the empty resource set; facts it creates for
/// itself are `local:`-prefixed and finalization renames them into fresh
/// caller-side ids derived from the invoke site, so two sites calling the
/// same callee observe disjoint resources.
#[derive(Debug, Clone)]
pub struct ResourceSummary {
    invoke: InvokeId,
    site_scoped: bool,
    state: AbstractState<SetDomain>,
}

impl Summary<SetDomain> for ResourceSummary {
    fn invoke(&self) -> InvokeId {
        self.invoke
    }

    fn precondition(&self) -> &SetDomain {
        self.state.precondition()
    }

    fn postcondition(&self) -> Option<&SetDomain> {
        self.state.postcondition()
    }

    fn subsumes(&self, other: &Self) -> bool {
        let contained = other.precondition().is_subseteq(self.precondition());
        if self.site_scoped {
            self.invoke == other.invoke && contained
        } else {
            contained
        }
    }

    fn finalize(&mut self, callee_post: SetDomain) {
        let renamed = callee_post.map_facts(|fact| {
            if fact.starts_with("local:") {
                format!("r{}", self.invoke.raw())
            } else {
                fact.to_owned()
            }
        });
        self.state.freeze(renamed);
    }

    fn apply(&self, state: &SetDomain) -> SetDomain {
        match self.postcondition() {
            Some(post) => state.join(post),
            None => state.clone(),
        }
    }
}

/// Factory for the resource analysis.
///
/// `site_scoped` selects the subsumption strength: per-call-site keying
/// (each site finalizes its own renamed summary) or precondition
/// containment (one callee summary shared across sites).
#[derive(Debug, Clone, Copy)]
pub struct ResourceFactory {
    pub site_scoped: bool,
}

impl SummaryFactory<SetDomain> for ResourceFactory {
    type Summary = ResourceSummary;

    fn create_summary(
        &self,
        invoke: InvokeId,
        _caller_pre: &SetDomain,
        _argument_states: &[SetDomain],
    ) -> ResourceSummary {
        ResourceSummary {
            invoke,
            site_scoped: self.site_scoped,
            state: AbstractState::new(SetDomain::bottom()),
        }
    }
}

/// Node interpreter of the resource analysis. An unknown callee effect is
/// the conservative `Top`.
pub struct ResourceInterpreter;

impl NodeInterpreter<SetDomain> for ResourceInterpreter {
    type Node = TestOp;
    type Summary = ResourceSummary;
    type Error = Infallible;

    fn transfer(
        &self,
        _method: MethodId,
        node: &TestOp,
        state: &SetDomain,
    ) -> Result<SetDomain, Infallible> {
        Ok(match node {
            TestOp::Gen(fact) => {
                let mut next = state.clone();
                next.insert(*fact);
                next
            }
            TestOp::Nop | TestOp::Call(_) => state.clone(),
        })
    }

    fn as_invoke(&self, _method: MethodId, node: &TestOp) -> Option<InvokeId> {
        match node {
            TestOp::Call(invoke) => Some(*invoke),
            _ => None,
        }
    }

    fn argument_states(&self, _invoke: InvokeId, _state: &SetDomain) -> Vec<SetDomain> {
        Vec::new()
    }

    fn transfer_invoke(
        &self,
        _invoke: InvokeId,
        state: &SetDomain,
        summary: Option<&ResourceSummary>,
    ) -> Result<SetDomain, Infallible> {
        Ok(match summary {
            Some(summary) => summary.apply(state),
            None => state.join(&SetDomain::top()),
        })
    }
}

pub fn method(raw: u32) -> MethodId {
    MethodId::from_raw(raw)
}

pub fn invoke(raw: u32) -> InvokeId {
    InvokeId::from_raw(raw)
}
