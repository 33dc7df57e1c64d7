//! `argus` — a generic, modular interprocedural abstract-interpretation
//! framework.
//!
//! The framework computes static facts over a whole-program call graph
//! ahead of execution: a pluggable lattice domain describes the abstract
//! state, a WTO-driven solver runs each method body to a fixpoint, and a
//! summary store lets a callee's effect be computed once and reused at
//! every matching call site. Concrete domains, node semantics, and the
//! program model (call graph, per-method CFGs) are supplied by callers.

pub use argus_analysis as analysis;
pub use argus_domain as domain;
pub use argus_graph as graph;
pub use argus_reach as reach;

pub mod prelude {
    pub use argus_analysis::*;
    pub use argus_domain::*;
    pub use argus_graph::*;
}
