use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;

use argus_graph::IterationPolicy;

use crate::checker::{Checker, CheckerManager, Diagnostic};
use crate::model::{AnalyzeAll, MethodFilter};
use crate::summary::{SummaryFactory, SummaryStore};
use crate::{ContextSignature, MethodGraphCache, MethodId};

/// Policy knobs of one top-level analysis run.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisPolicy {
    /// Hard bound on the analysis call-stack depth; the only guard against
    /// unbounded recursion.
    pub max_stack_depth: usize,
    /// Maximum occurrences of one method on the stack before direct
    /// recursion is cut off.
    pub max_consecutive_calls: usize,
    /// Call-context length *k* for k-CFA; `0` is context-insensitive.
    pub context_depth: usize,
    /// Intra-procedural iteration policy.
    pub iteration: IterationPolicy,
}

impl Default for AnalysisPolicy {
    fn default() -> Self {
        Self {
            max_stack_depth: 64,
            max_consecutive_calls: 2,
            context_depth: 0,
            iteration: IterationPolicy::default(),
        }
    }
}

impl AnalysisPolicy {
    pub fn with_max_stack_depth(mut self, depth: usize) -> Self {
        self.max_stack_depth = depth;
        self
    }

    pub fn with_max_consecutive_calls(mut self, max: usize) -> Self {
        self.max_consecutive_calls = max;
        self
    }

    pub fn with_context_depth(mut self, k: usize) -> Self {
        self.context_depth = k;
        self
    }

    pub fn with_iteration(mut self, iteration: IterationPolicy) -> Self {
        self.iteration = iteration;
        self
    }
}

/// Analysis lifecycle of one `(method, context)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodPhase {
    Pending,
    InProgress,
    Converged,
}

/// Atomic instrumentation counters shared by all workers of a run.
#[derive(Debug, Default)]
pub struct AnalysisStats {
    methods_analyzed: AtomicUsize,
    summary_hits: AtomicUsize,
    summary_misses: AtomicUsize,
    conservative_cutoffs: AtomicUsize,
}

impl AnalysisStats {
    pub(crate) fn record_method_analyzed(&self) {
        self.methods_analyzed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_summary_hit(&self) {
        self.summary_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_summary_miss(&self) {
        self.summary_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_conservative_cutoff(&self) {
        self.conservative_cutoffs.fetch_add(1, Ordering::Relaxed);
    }

    /// Method bodies driven to a fixpoint (cache hits excluded).
    pub fn methods_analyzed(&self) -> usize {
        self.methods_analyzed.load(Ordering::Relaxed)
    }

    pub fn summary_hits(&self) -> usize {
        self.summary_hits.load(Ordering::Relaxed)
    }

    pub fn summary_misses(&self) -> usize {
        self.summary_misses.load(Ordering::Relaxed)
    }

    /// Calls answered with the conservative unknown effect (depth, cycle,
    /// filter, or unresolvable-callee cutoffs).
    pub fn conservative_cutoffs(&self) -> usize {
        self.conservative_cutoffs.load(Ordering::Relaxed)
    }
}

/// Immutable aggregate wiring one top-level analysis run together: policy,
/// method filter, summary factory, checker manager, and the shared caches,
/// whose lifetime it owns.
///
/// The context is shared by all worker threads of a run; per-run mutable
/// state (the call stack) is never stored here.
pub struct AnalysisContext<N, D, F: SummaryFactory<D>> {
    policy: AnalysisPolicy,
    filter: Box<dyn MethodFilter>,
    factory: F,
    checkers: CheckerManager<D>,
    graph_cache: MethodGraphCache<N>,
    summaries: SummaryStore<F::Summary>,
    phases: DashMap<(MethodId, ContextSignature), MethodPhase>,
    stats: AnalysisStats,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl<N, D, F: SummaryFactory<D>> AnalysisContext<N, D, F> {
    pub fn new(policy: AnalysisPolicy, factory: F) -> Self {
        Self {
            policy,
            filter: Box::new(AnalyzeAll),
            factory,
            checkers: CheckerManager::new(),
            graph_cache: MethodGraphCache::new(),
            summaries: SummaryStore::new(),
            phases: DashMap::new(),
            stats: AnalysisStats::default(),
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    pub fn with_filter(mut self, filter: impl MethodFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn with_checker(mut self, checker: impl Checker<D> + 'static) -> Self {
        self.checkers.register(checker);
        self
    }

    pub fn policy(&self) -> &AnalysisPolicy {
        &self.policy
    }

    pub fn filter(&self) -> &dyn MethodFilter {
        self.filter.as_ref()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn checkers(&self) -> &CheckerManager<D> {
        &self.checkers
    }

    pub fn graph_cache(&self) -> &MethodGraphCache<N> {
        &self.graph_cache
    }

    pub fn summaries(&self) -> &SummaryStore<F::Summary> {
        &self.summaries
    }

    pub fn stats(&self) -> &AnalysisStats {
        &self.stats
    }

    /// Lifecycle of a `(method, context)` pair; `Pending` when untouched.
    pub fn phase(&self, method: MethodId, context: &ContextSignature) -> MethodPhase {
        self.phases
            .get(&(method, context.clone()))
            .map(|entry| *entry.value())
            .unwrap_or(MethodPhase::Pending)
    }

    pub(crate) fn set_phase(
        &self,
        method: MethodId,
        context: &ContextSignature,
        phase: MethodPhase,
    ) {
        self.phases.insert((method, context.clone()), phase);
    }

    pub(crate) fn push_diagnostics(&self, mut diagnostics: Vec<Diagnostic>) {
        if !diagnostics.is_empty() {
            self.diagnostics.lock().append(&mut diagnostics);
        }
    }

    /// Drain all diagnostics collected so far.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }
}
