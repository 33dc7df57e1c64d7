use argus_graph::MethodGraph;

use crate::summary::Summary;
use crate::{InvokeId, MethodId};

/// Whole-program call graph, supplied by a compiler front end.
///
/// The framework only reads this; it never mutates it.
pub trait CallGraph: Send + Sync {
    /// The statically possible callee set of an invoke site.
    fn callees(&self, invoke: InvokeId) -> Vec<MethodId>;

    /// The invoke sites contained in a method body.
    fn invoke_sites(&self, method: MethodId) -> Vec<InvokeId>;

    /// Whether the method's implementation is reached by some invoke
    /// (as opposed to being merely declared).
    fn is_implementation_invoked(&self, method: MethodId) -> bool;
}

/// Per-method control-flow graph provider (CFG/IR collaborator).
pub trait GraphSource: Send + Sync {
    type Node;

    /// Build the method's control-flow graph, or `None` when the method
    /// cannot be resolved. Construction must be a pure, deterministic
    /// function of the method so concurrent rebuilds are benign.
    fn method_graph(&self, method: MethodId) -> Option<MethodGraph<Self::Node>>;
}

/// Predicate deciding which methods are eligible for analysis, used to
/// exclude out-of-scope libraries.
pub trait MethodFilter: Send + Sync {
    fn should_analyze(&self, method: MethodId) -> bool;
}

/// Filter admitting every method.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyzeAll;

impl MethodFilter for AnalyzeAll {
    fn should_analyze(&self, _method: MethodId) -> bool {
        true
    }
}

/// Transfer semantics of a concrete analysis over CFG nodes.
///
/// Implementations must be pure with respect to the framework: the fixpoint
/// iterator re-invokes `transfer` for the same node as states ascend, and
/// the only effect may be the returned state.
pub trait NodeInterpreter<D> {
    type Node;
    type Summary: Summary<D>;
    type Error;

    /// Abstract effect of an ordinary (non-call) node.
    fn transfer(&self, method: MethodId, node: &Self::Node, state: &D) -> Result<D, Self::Error>;

    /// Classify a node as an invoke site, or `None` for ordinary nodes.
    fn as_invoke(&self, method: MethodId, node: &Self::Node) -> Option<InvokeId>;

    /// Abstract the actual arguments of `invoke` under the caller state.
    fn argument_states(&self, invoke: InvokeId, state: &D) -> Vec<D>;

    /// Fold a callee summary into the caller state at an invoke node.
    ///
    /// `None` means the callee's effect is unknown (unresolvable body,
    /// depth or cycle cutoff); the implementation must account for it
    /// conservatively.
    fn transfer_invoke(
        &self,
        invoke: InvokeId,
        state: &D,
        summary: Option<&Self::Summary>,
    ) -> Result<D, Self::Error>;
}
