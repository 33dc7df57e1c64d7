use petgraph::graph::NodeIndex;
use rustc_hash::FxHashMap;

use argus_domain::{AbstractValue, WideningStrategy};

use crate::{MethodGraph, Wto, WtoElement};

/// Knobs governing one intra-procedural fixpoint solve.
#[derive(Debug, Clone, Copy)]
pub struct IterationPolicy {
    /// When to switch from join to widen at component heads.
    pub widening: WideningStrategy,
    /// Safety budget on component stabilization passes.
    pub max_passes: usize,
    /// Descending passes applied after the ascending phase converges.
    pub narrowing_passes: usize,
}

impl Default for IterationPolicy {
    fn default() -> Self {
        Self {
            widening: WideningStrategy::Delayed(2),
            max_passes: 1000,
            narrowing_passes: 0,
        }
    }
}

impl IterationPolicy {
    pub fn with_widening(mut self, strategy: WideningStrategy) -> Self {
        self.widening = strategy;
        self
    }

    pub fn with_max_passes(mut self, max: usize) -> Self {
        self.max_passes = max;
        self
    }

    pub fn with_narrowing_passes(mut self, n: usize) -> Self {
        self.narrowing_passes = n;
        self
    }
}

/// Error type for fixpoint failures.
#[derive(Debug, thiserror::Error)]
pub enum FixpointError {
    /// The pass budget ran out before a component stabilized. With a
    /// law-abiding widening operator this indicates a domain contract
    /// violation, not a framework bug.
    #[error("fixpoint pass budget exhausted after {0} passes")]
    PassBudgetExhausted(usize),
}

/// Converged result of a fixpoint solve.
///
/// Holds entry/exit abstract states for every *reached* node; nodes whose
/// entry state stayed bottom are absent. The method postcondition is the
/// join over exit-node states, frozen at convergence.
#[derive(Debug, Clone)]
pub struct Fixpoint<D> {
    entry_states: FxHashMap<NodeIndex, D>,
    exit_states: FxHashMap<NodeIndex, D>,
    post: D,
    passes: usize,
}

impl<D> Fixpoint<D> {
    pub fn entry_state(&self, node: NodeIndex) -> Option<&D> {
        self.entry_states.get(&node)
    }

    pub fn exit_state(&self, node: NodeIndex) -> Option<&D> {
        self.exit_states.get(&node)
    }

    pub fn reached(&self, node: NodeIndex) -> bool {
        self.entry_states.contains_key(&node)
    }

    pub fn reached_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.entry_states.keys().copied()
    }

    /// The method postcondition: join over all reached exit nodes.
    pub fn post(&self) -> &D {
        &self.post
    }

    pub fn passes(&self) -> usize {
        self.passes
    }
}

/// Worklist-free fixpoint solver driven by a weak topological ordering.
///
/// Processes WTO elements in order; a node's entry state is the join of its
/// already-computed predecessors' exit states. Component heads merge
/// re-entry states through the [`WideningStrategy`], which guarantees
/// termination on domains with unbounded ascending chains. The transfer
/// function is an arbitrary fallible callback and must be safe to invoke
/// repeatedly for the same node.
pub struct FixpointSolver<'g, N> {
    graph: &'g MethodGraph<N>,
    wto: &'g Wto,
    policy: IterationPolicy,
}

struct SolveState<D> {
    initial: D,
    entry: FxHashMap<NodeIndex, D>,
    exit: FxHashMap<NodeIndex, D>,
    /// Per-head revisit counts for [`WideningStrategy::Delayed`].
    visits: FxHashMap<NodeIndex, usize>,
    passes: usize,
}

impl<'g, N> FixpointSolver<'g, N> {
    pub fn new(graph: &'g MethodGraph<N>, wto: &'g Wto, policy: IterationPolicy) -> Self {
        Self { graph, wto, policy }
    }

    /// Run the solve from `entry_state` bound at the graph entry.
    pub fn solve<D, E, T>(&self, entry_state: D, transfer: &mut T) -> Result<Fixpoint<D>, E>
    where
        D: AbstractValue + Clone,
        E: From<FixpointError>,
        T: FnMut(NodeIndex, &N, &D) -> Result<D, E>,
    {
        let mut st = SolveState {
            initial: entry_state,
            entry: FxHashMap::default(),
            exit: FxHashMap::default(),
            visits: FxHashMap::default(),
            passes: 0,
        };

        // Ascending phase.
        for element in self.wto.elements() {
            self.process_element(element, &mut st, transfer, false)?;
        }

        // Descending (narrowing) phase.
        for _ in 0..self.policy.narrowing_passes {
            let mut changed = false;
            for element in self.wto.elements() {
                changed |= self.process_element(element, &mut st, transfer, true)?;
            }
            if !changed {
                break;
            }
        }

        let post = self.join_exit_states(&st);
        Ok(Fixpoint {
            entry_states: st.entry,
            exit_states: st.exit,
            post,
            passes: st.passes,
        })
    }

    fn join_exit_states<D: AbstractValue + Clone>(&self, st: &SolveState<D>) -> D {
        let mut post: Option<D> = None;
        for exit in self.graph.exit_nodes() {
            if let Some(state) = st.exit.get(&exit) {
                post = Some(match post {
                    None => state.clone(),
                    Some(acc) => acc.join(state),
                });
            }
        }
        post.unwrap_or_else(D::bottom)
    }

    fn process_element<D, E, T>(
        &self,
        element: &WtoElement,
        st: &mut SolveState<D>,
        transfer: &mut T,
        narrowing: bool,
    ) -> Result<bool, E>
    where
        D: AbstractValue + Clone,
        E: From<FixpointError>,
        T: FnMut(NodeIndex, &N, &D) -> Result<D, E>,
    {
        match element {
            WtoElement::Vertex(v) => self.process_vertex(*v, st, transfer, narrowing, false),
            WtoElement::Component(c) => {
                let mut changed_any = false;
                loop {
                    st.passes += 1;
                    if st.passes > self.policy.max_passes {
                        return Err(FixpointError::PassBudgetExhausted(st.passes).into());
                    }
                    let head_changed = self.process_vertex(c.head, st, transfer, narrowing, true)?;
                    let mut body_changed = false;
                    for inner in &c.body {
                        body_changed |= self.process_element(inner, st, transfer, narrowing)?;
                    }
                    changed_any |= head_changed | body_changed;
                    if narrowing || (!head_changed && !body_changed) {
                        break;
                    }
                }
                Ok(changed_any)
            }
        }
    }

    /// Recompute one node's entry and exit state. Returns whether either
    /// changed (or the node was reached for the first time).
    fn process_vertex<D, E, T>(
        &self,
        vertex: NodeIndex,
        st: &mut SolveState<D>,
        transfer: &mut T,
        narrowing: bool,
        is_head: bool,
    ) -> Result<bool, E>
    where
        D: AbstractValue + Clone,
        E: From<FixpointError>,
        T: FnMut(NodeIndex, &N, &D) -> Result<D, E>,
    {
        let mut incoming: Option<D> = None;
        for pred in self.graph.predecessors(vertex) {
            if let Some(state) = st.exit.get(&pred) {
                incoming = Some(match incoming {
                    None => state.clone(),
                    Some(acc) => acc.join(state),
                });
            }
        }
        if vertex == self.graph.entry() {
            incoming = Some(match incoming {
                None => st.initial.clone(),
                Some(acc) => acc.join(&st.initial),
            });
        }

        let new_entry = match (st.entry.get(&vertex), incoming) {
            // Not reached on any computed path yet.
            (None, None) => return Ok(false),
            (Some(old), None) => old.clone(),
            (None, Some(incoming)) => incoming,
            (Some(old), Some(incoming)) => {
                if is_head {
                    if narrowing {
                        old.narrow(&incoming)
                    } else {
                        let visits = st.visits.entry(vertex).or_insert(0);
                        *visits += 1;
                        self.policy.widening.merge(old, &incoming, *visits)
                    }
                } else {
                    incoming
                }
            }
        };

        let entry_changed = match st.entry.get(&vertex) {
            None => true,
            Some(old) => !new_entry.is_subseteq(old) || !old.is_subseteq(&new_entry),
        };

        let new_exit = transfer(vertex, self.graph.node(vertex), &new_entry)?;
        let exit_changed = match st.exit.get(&vertex) {
            None => true,
            Some(old) => !new_exit.is_subseteq(old) || !old.is_subseteq(&new_exit),
        };

        st.entry.insert(vertex, new_entry);
        st.exit.insert(vertex, new_exit);
        Ok(entry_changed || exit_changed)
    }
}
