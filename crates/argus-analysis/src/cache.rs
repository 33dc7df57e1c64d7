use std::sync::Arc;

use dashmap::DashMap;

use argus_graph::{MethodGraph, Wto};

use crate::{GraphSource, MethodId};

/// Shared, append-mostly cache of per-method graphs and weak topological
/// orderings.
///
/// Invariant: a WTO entry is only ever present when the corresponding graph
/// entry is. Check-then-insert races are tolerated: graph and WTO
/// construction are pure functions of the method, so two threads building
/// the same entry insert equal values and the last write wins.
pub struct MethodGraphCache<N> {
    graphs: DashMap<MethodId, Arc<MethodGraph<N>>>,
    wtos: DashMap<MethodId, Arc<Wto>>,
}

impl<N> Default for MethodGraphCache<N> {
    fn default() -> Self {
        Self {
            graphs: DashMap::new(),
            wtos: DashMap::new(),
        }
    }
}

impl<N> MethodGraphCache<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_graph(&self, method: MethodId) -> bool {
        self.graphs.contains_key(&method)
    }

    pub fn add_graph(&self, method: MethodId, graph: MethodGraph<N>) {
        self.graphs.insert(method, Arc::new(graph));
    }

    pub fn graph(&self, method: MethodId) -> Option<Arc<MethodGraph<N>>> {
        self.graphs.get(&method).map(|entry| entry.value().clone())
    }

    pub fn contains_wto(&self, method: MethodId) -> bool {
        self.wtos.contains_key(&method)
    }

    pub fn add_wto(&self, method: MethodId, wto: Wto) {
        debug_assert!(
            self.contains_graph(method),
            "WTO added for a method without a cached graph"
        );
        self.wtos.insert(method, Arc::new(wto));
    }

    pub fn wto(&self, method: MethodId) -> Option<Arc<Wto>> {
        self.wtos.get(&method).map(|entry| entry.value().clone())
    }

    /// Fetch the method's graph, building and publishing it on a miss.
    /// `None` when the source cannot resolve the method.
    pub fn graph_or_build<S>(&self, method: MethodId, source: &S) -> Option<Arc<MethodGraph<N>>>
    where
        S: GraphSource<Node = N>,
    {
        if let Some(graph) = self.graph(method) {
            return Some(graph);
        }
        let built = Arc::new(source.method_graph(method)?);
        Some(self.graphs.entry(method).or_insert(built).value().clone())
    }

    /// Fetch the method's WTO, building it from the cached graph on a miss.
    /// `None` when no graph is cached for the method.
    pub fn wto_or_build(&self, method: MethodId) -> Option<Arc<Wto>> {
        if let Some(wto) = self.wto(method) {
            return Some(wto);
        }
        let graph = self.graph(method)?;
        let built = Arc::new(Wto::of(&*graph));
        Some(self.wtos.entry(method).or_insert(built).value().clone())
    }

    /// Merge entries from `other` into this cache; `other`'s entries win.
    ///
    /// WTO entries are copied only when `other` also holds the matching
    /// graph, preserving the WTO-implies-graph invariant.
    pub fn join_with(&self, other: &Self) {
        for entry in other.graphs.iter() {
            self.graphs.insert(*entry.key(), entry.value().clone());
        }
        for entry in other.wtos.iter() {
            if other.graphs.contains_key(entry.key()) {
                self.wtos.insert(*entry.key(), entry.value().clone());
            }
        }
    }

    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    pub fn wto_count(&self) -> usize {
        self.wtos.len()
    }
}
