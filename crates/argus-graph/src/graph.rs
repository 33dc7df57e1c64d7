use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

/// Per-method control-flow graph over instruction/basic-block nodes `N`.
///
/// Built once by a front-end collaborator, then read-only for the lifetime
/// of the analysis. Calls are ordinary nodes here; their semantics are the
/// node interpreter's concern.
#[derive(Debug, Clone)]
pub struct MethodGraph<N> {
    graph: DiGraph<N, ()>,
    entry: NodeIndex,
}

impl<N> MethodGraph<N> {
    /// Create a graph containing only the entry node.
    pub fn new(entry: N) -> Self {
        let mut graph = DiGraph::new();
        let entry = graph.add_node(entry);
        Self { graph, entry }
    }

    pub fn add_node(&mut self, node: N) -> NodeIndex {
        self.graph.add_node(node)
    }

    /// Add a control-flow edge. Parallel edges are collapsed.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    pub fn entry(&self) -> NodeIndex {
        self.entry
    }

    pub fn node(&self, index: NodeIndex) -> &N {
        &self.graph[index]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn successors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(index, Direction::Outgoing)
    }

    pub fn predecessors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(index, Direction::Incoming)
    }

    /// Nodes with no successors. A method body stuck in an infinite loop
    /// has none.
    pub fn exit_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(|&ix| self.successors(ix).next().is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_nodes_of_a_diamond() {
        let mut g = MethodGraph::new("entry");
        let a = g.add_node("a");
        let b = g.add_node("b");
        let join = g.add_node("join");
        g.add_edge(g.entry(), a);
        g.add_edge(g.entry(), b);
        g.add_edge(a, join);
        g.add_edge(b, join);

        let exits: Vec<_> = g.exit_nodes().collect();
        assert_eq!(exits, vec![join]);
    }

    #[test]
    fn parallel_edges_collapse() {
        let mut g = MethodGraph::new(());
        let a = g.add_node(());
        g.add_edge(g.entry(), a);
        g.add_edge(g.entry(), a);
        assert_eq!(g.successors(g.entry()).count(), 1);
    }
}
