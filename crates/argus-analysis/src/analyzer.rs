use std::sync::Arc;

use rayon::prelude::*;

use argus_domain::AbstractValue;
use argus_graph::{FixpointError, FixpointSolver};

use crate::model::{CallGraph, GraphSource, NodeInterpreter};
use crate::summary::{Summary, SummaryFactory};
use crate::{
    AnalysisContext, CallStack, ContextSignature, InvokeId, MethodId, MethodPhase, MethodReport,
};

/// Error type for interprocedural analysis failures.
///
/// Depth and cycle cutoffs are policy outcomes, not errors; they never
/// surface here. `Unresolvable` is fatal only for a root method — for a
/// callee it degrades to the conservative unknown effect.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError<E> {
    /// No control-flow graph could be built for the method.
    #[error("no control-flow graph for method {0}")]
    Unresolvable(MethodId),
    /// A root method was rejected by the method filter.
    #[error("method {0} excluded by the method filter")]
    Filtered(MethodId),
    /// The intra-procedural solver exhausted its pass budget.
    #[error(transparent)]
    Fixpoint(#[from] FixpointError),
    /// The node interpreter reported a domain-specific failure.
    #[error("node interpreter failure")]
    Interp(E),
}

/// Depth-first interprocedural driver.
///
/// Walks one method's fixpoint at a time; an invoke node blocks (recurses)
/// until its callee converges and a summary is finalized. Independent entry
/// points may be analyzed concurrently by separate workers sharing one
/// [`AnalysisContext`]; every worker owns its [`CallStack`].
pub struct InterproceduralAnalyzer<'a, D, G, C, I, F>
where
    G: GraphSource,
    C: CallGraph,
    F: SummaryFactory<D>,
    I: NodeInterpreter<D, Node = G::Node, Summary = F::Summary>,
{
    context: &'a AnalysisContext<G::Node, D, F>,
    graphs: &'a G,
    call_graph: &'a C,
    interp: &'a I,
}

impl<'a, D, G, C, I, F> InterproceduralAnalyzer<'a, D, G, C, I, F>
where
    D: AbstractValue + Clone,
    G: GraphSource,
    C: CallGraph,
    F: SummaryFactory<D>,
    I: NodeInterpreter<D, Node = G::Node, Summary = F::Summary>,
{
    pub fn new(
        context: &'a AnalysisContext<G::Node, D, F>,
        graphs: &'a G,
        call_graph: &'a C,
        interp: &'a I,
    ) -> Self {
        Self {
            context,
            graphs,
            call_graph,
            interp,
        }
    }

    pub fn context(&self) -> &'a AnalysisContext<G::Node, D, F> {
        self.context
    }

    /// Analyze `root` from the domain's bottom state.
    pub fn analyze(&self, root: MethodId) -> Result<MethodReport<D>, AnalysisError<I::Error>> {
        self.analyze_with(root, D::bottom())
    }

    /// Analyze `root` from an explicit entry state.
    pub fn analyze_with(
        &self,
        root: MethodId,
        entry: D,
    ) -> Result<MethodReport<D>, AnalysisError<I::Error>> {
        if !self.context.filter().should_analyze(root) {
            return Err(AnalysisError::Filtered(root));
        }
        let mut stack = CallStack::new(self.context.policy().max_stack_depth);
        stack.push(root);
        let result = self.analyze_method(&mut stack, root, entry, ContextSignature::insensitive());
        stack.pop();
        result
    }

    /// Analyze every filter-eligible root, in parallel.
    ///
    /// The shared caches make summaries computed by one worker visible to
    /// all others; call stacks stay worker-local.
    pub fn analyze_roots(
        &self,
        roots: &[MethodId],
    ) -> Vec<(MethodId, Result<MethodReport<D>, AnalysisError<I::Error>>)>
    where
        D: Send + Sync,
        G::Node: Send + Sync,
        I: Sync,
        I::Error: Send,
    {
        let eligible: Vec<MethodId> = roots
            .iter()
            .copied()
            .filter(|&root| {
                let keep = self.context.filter().should_analyze(root);
                if !keep {
                    tracing::debug!(%root, "root excluded by the method filter");
                }
                keep
            })
            .collect();

        eligible
            .par_iter()
            .map(|&root| (root, self.analyze(root)))
            .collect()
    }

    fn analyze_method(
        &self,
        stack: &mut CallStack,
        method: MethodId,
        entry: D,
        context_sig: ContextSignature,
    ) -> Result<MethodReport<D>, AnalysisError<I::Error>> {
        let Some(graph) = self.context.graph_cache().graph_or_build(method, self.graphs) else {
            return Err(AnalysisError::Unresolvable(method));
        };
        let wto = self
            .context
            .graph_cache()
            .wto_or_build(method)
            .ok_or(AnalysisError::Unresolvable(method))?;
        self.context.set_phase(method, &context_sig, MethodPhase::InProgress);

        let solver = FixpointSolver::new(&graph, &wto, self.context.policy().iteration);
        let mut transfer =
            |_ix, node: &G::Node, state: &D| match self.interp.as_invoke(method, node) {
                Some(invoke) => self.invoke_effect(stack, invoke, state),
                None => self
                    .interp
                    .transfer(method, node, state)
                    .map_err(AnalysisError::Interp),
            };
        let fixpoint = solver.solve(entry.clone(), &mut transfer)?;

        self.context.stats().record_method_analyzed();
        let report = MethodReport::new(method, context_sig.clone(), entry, fixpoint);
        self.context
            .set_phase(method, &context_sig, MethodPhase::Converged);
        tracing::debug!(%method, passes = report.fixpoint().passes(), "method converged");

        let diagnostics = self.context.checkers().run(&report);
        self.context.push_diagnostics(diagnostics);
        Ok(report)
    }

    /// Abstract effect of one invoke node under `state`, joined over every
    /// statically possible callee.
    fn invoke_effect(
        &self,
        stack: &mut CallStack,
        invoke: InvokeId,
        state: &D,
    ) -> Result<D, AnalysisError<I::Error>> {
        let arguments = self.interp.argument_states(invoke, state);
        let callees = self.call_graph.callees(invoke);
        if callees.is_empty() {
            return self.unknown_effect(invoke, state);
        }

        let mut merged: Option<D> = None;
        for callee in callees {
            let effect = self.callee_effect(stack, invoke, callee, state, &arguments)?;
            merged = Some(match merged {
                None => effect,
                Some(acc) => acc.join(&effect),
            });
        }
        Ok(merged.expect("joined over a non-empty callee set"))
    }

    fn callee_effect(
        &self,
        stack: &mut CallStack,
        invoke: InvokeId,
        callee: MethodId,
        state: &D,
        arguments: &[D],
    ) -> Result<D, AnalysisError<I::Error>> {
        let policy = self.context.policy();
        let context_sig = stack.context_signature(policy.context_depth);
        let probe = self
            .context
            .factory()
            .create_summary(invoke, state, arguments);

        if let Some(summary) = self.context.summaries().lookup(callee, &context_sig, |cached| {
            cached.is_finalized() && cached.subsumes(&probe)
        }) {
            self.context.stats().record_summary_hit();
            tracing::debug!(%callee, %invoke, "summary cache hit");
            return self
                .interp
                .transfer_invoke(invoke, state, Some(summary.as_ref()))
                .map_err(AnalysisError::Interp);
        }

        if stack.has_method_call_cycle(callee) {
            self.context.stats().record_conservative_cutoff();
            tracing::warn!(
                cycle = %stack.format_cycle_with_method(callee, |m| m.to_string()),
                "call cycle cutoff; assuming unknown callee effect"
            );
            return self.unknown_effect(invoke, state);
        }
        if stack.is_full() || stack.count_consecutive_calls(callee) >= policy.max_consecutive_calls
        {
            self.context.stats().record_conservative_cutoff();
            tracing::warn!(
                %callee,
                depth = stack.depth(),
                "recursion bound reached; assuming unknown callee effect"
            );
            return self.unknown_effect(invoke, state);
        }
        if !self.context.filter().should_analyze(callee) {
            self.context.stats().record_conservative_cutoff();
            tracing::debug!(%callee, "callee excluded by the method filter");
            return self.unknown_effect(invoke, state);
        }

        self.context.stats().record_summary_miss();
        let callee_entry = probe.precondition().clone();
        stack.push(callee);
        let outcome = self.analyze_method(stack, callee, callee_entry, context_sig.clone());
        stack.pop();

        match outcome {
            Ok(report) => {
                let mut summary = probe;
                summary.finalize(report.post().clone());
                let summary = Arc::new(summary);
                self.context
                    .summaries()
                    .insert(callee, context_sig, summary.clone());
                self.interp
                    .transfer_invoke(invoke, state, Some(summary.as_ref()))
                    .map_err(AnalysisError::Interp)
            }
            Err(AnalysisError::Unresolvable(unresolved)) => {
                self.context.stats().record_conservative_cutoff();
                tracing::warn!(
                    method = %unresolved,
                    "callee graph unresolvable; assuming unknown effect"
                );
                self.unknown_effect(invoke, state)
            }
            Err(fatal) => Err(fatal),
        }
    }

    fn unknown_effect(&self, invoke: InvokeId, state: &D) -> Result<D, AnalysisError<I::Error>> {
        self.interp
            .transfer_invoke(invoke, state, None)
            .map_err(AnalysisError::Interp)
    }
}
