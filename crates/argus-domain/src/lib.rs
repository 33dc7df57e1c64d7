mod flat;
mod lattice;
mod set;
mod value;
mod widening;

pub use flat::FlatDomain;
pub use lattice::{HasBottom, HasTop, Lattice};
pub use set::SetDomain;
pub use value::AbstractValue;
pub use widening::WideningStrategy;
