use std::collections::VecDeque;

use petgraph::graph::NodeIndex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::MethodGraph;

/// One element of a weak topological ordering: a plain vertex, or a
/// strongly-connected component led by its head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WtoElement {
    Vertex(NodeIndex),
    Component(WtoComponent),
}

/// A component of the ordering. `head` is the single re-entry point the
/// fixpoint solver widens at; `body` lists the remaining elements in
/// iteration order and may itself contain nested components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WtoComponent {
    pub head: NodeIndex,
    pub body: Vec<WtoElement>,
}

/// Weak topological ordering of a [`MethodGraph`] (Bourdoncle's
/// hierarchical ordering).
///
/// Computed once per method and cached; deterministic for a given graph.
#[derive(Debug, Clone)]
pub struct Wto {
    elements: Vec<WtoElement>,
    heads: FxHashSet<NodeIndex>,
}

impl Wto {
    pub fn of<N>(graph: &MethodGraph<N>) -> Self {
        let mut builder = WtoBuilder {
            graph,
            dfn: FxHashMap::default(),
            stack: Vec::new(),
            num: 0,
        };
        let mut partition = VecDeque::new();
        builder.visit(graph.entry(), &mut partition);

        let elements: Vec<WtoElement> = partition.into();
        let mut heads = FxHashSet::default();
        collect_heads(&elements, &mut heads);
        Self { elements, heads }
    }

    pub fn elements(&self) -> &[WtoElement] {
        &self.elements
    }

    /// Whether `node` heads a component (a widening point).
    pub fn is_head(&self, node: NodeIndex) -> bool {
        self.heads.contains(&node)
    }

    /// All nodes in ordering sequence, components flattened head-first.
    pub fn flatten(&self) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        flatten_into(&self.elements, &mut out);
        out
    }
}

fn collect_heads(elements: &[WtoElement], heads: &mut FxHashSet<NodeIndex>) {
    for element in elements {
        if let WtoElement::Component(c) = element {
            heads.insert(c.head);
            collect_heads(&c.body, heads);
        }
    }
}

fn flatten_into(elements: &[WtoElement], out: &mut Vec<NodeIndex>) {
    for element in elements {
        match element {
            WtoElement::Vertex(v) => out.push(*v),
            WtoElement::Component(c) => {
                out.push(c.head);
                flatten_into(&c.body, out);
            }
        }
    }
}

struct WtoBuilder<'g, N> {
    graph: &'g MethodGraph<N>,
    /// Depth-first numbering; absent = unvisited, `u32::MAX` = finished.
    dfn: FxHashMap<NodeIndex, u32>,
    stack: Vec<NodeIndex>,
    num: u32,
}

impl<N> WtoBuilder<'_, N> {
    fn dfn(&self, v: NodeIndex) -> u32 {
        self.dfn.get(&v).copied().unwrap_or(0)
    }

    fn visit(&mut self, vertex: NodeIndex, partition: &mut VecDeque<WtoElement>) -> u32 {
        self.stack.push(vertex);
        self.num += 1;
        self.dfn.insert(vertex, self.num);
        let mut head = self.num;
        let mut is_loop = false;

        let successors: Vec<NodeIndex> = self.graph.successors(vertex).collect();
        for succ in successors {
            let min = if self.dfn(succ) == 0 {
                self.visit(succ, partition)
            } else {
                self.dfn(succ)
            };
            if min <= head {
                head = min;
                is_loop = true;
            }
        }

        if head == self.dfn(vertex) {
            self.dfn.insert(vertex, u32::MAX);
            let mut element = self.stack.pop().expect("WTO stack underflow");
            if is_loop {
                while element != vertex {
                    // Reset so the component pass revisits interior nodes.
                    self.dfn.insert(element, 0);
                    element = self.stack.pop().expect("WTO stack underflow");
                }
                let component = self.component(vertex);
                partition.push_front(WtoElement::Component(component));
            } else {
                partition.push_front(WtoElement::Vertex(vertex));
            }
        }
        head
    }

    fn component(&mut self, head: NodeIndex) -> WtoComponent {
        let mut body = VecDeque::new();
        let successors: Vec<NodeIndex> = self.graph.successors(head).collect();
        for succ in successors {
            if self.dfn(succ) == 0 {
                self.visit(succ, &mut body);
            }
        }
        WtoComponent {
            head,
            body: body.into(),
        }
    }
}
