/// Join-semilattice contract for abstract values.
///
/// ## Algebraic contracts
///
/// `join` must be commutative, associative, and idempotent, with
/// `a ⊑ a.join(b)` and `b ⊑ a.join(b)`. `is_subseteq` is the partial order
/// induced by join: `a ⊑ b` iff `a.join(b) == b`. Violating these laws is a
/// programming error in the implementing domain; the framework does not
/// detect it at runtime beyond divergence.
pub trait Lattice {
    fn join(&self, other: &Self) -> Self;
    fn meet(&self, other: &Self) -> Self;
    fn is_subseteq(&self, other: &Self) -> bool;
}

/// A lattice with a distinguished least element.
///
/// Join with bottom is identity.
pub trait HasBottom: Lattice {
    fn bottom() -> Self;

    fn is_bottom(&self) -> bool
    where
        Self: Sized,
    {
        self.is_subseteq(&Self::bottom())
    }
}

/// A lattice with a distinguished greatest element.
pub trait HasTop: Lattice {
    fn top() -> Self;

    fn is_top(&self) -> bool
    where
        Self: Sized,
    {
        Self::top().is_subseteq(self)
    }
}
