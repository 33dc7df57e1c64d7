mod fixpoint;
mod graph;
mod wto;

pub use fixpoint::{Fixpoint, FixpointError, FixpointSolver, IterationPolicy};
pub use graph::MethodGraph;
pub use wto::{Wto, WtoComponent, WtoElement};

pub use petgraph::graph::NodeIndex;
