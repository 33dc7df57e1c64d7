use rustc_hash::FxHashMap;

use argus_analysis::{CallGraph, GraphSource, InvokeId, MethodId};
use argus_graph::MethodGraph;
use argus_reach::ReachOp;

/// Hand-built program fixture for the reachability analysis.
#[derive(Default)]
pub struct ReachProgram {
    graphs: FxHashMap<MethodId, MethodGraph<ReachOp>>,
    callees: FxHashMap<InvokeId, Vec<MethodId>>,
}

impl ReachProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_linear_method(&mut self, method: MethodId, ops: &[ReachOp]) {
        let mut graph = MethodGraph::new(ops[0].clone());
        let mut previous = graph.entry();
        for op in &ops[1..] {
            let node = graph.add_node(op.clone());
            graph.add_edge(previous, node);
            previous = node;
        }
        self.graphs.insert(method, graph);
    }

    pub fn add_call(&mut self, invoke: InvokeId, callees: &[MethodId]) {
        self.callees.insert(invoke, callees.to_vec());
    }
}

impl GraphSource for ReachProgram {
    type Node = ReachOp;

    fn method_graph(&self, method: MethodId) -> Option<MethodGraph<ReachOp>> {
        self.graphs.get(&method).cloned()
    }
}

impl CallGraph for ReachProgram {
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
                ReachOp::Invoke(invoke) => Some(*invoke),
                _ => None,
            })
            .collect()
    }

    fn is_implementation_invoked(&self, method: MethodId) -> bool {
        self.callees.values().any(|callees| callees.contains(&method))
    }
}
