use crate::lattice::HasBottom;

/// Abstract value extending [`Lattice`](crate::Lattice) with widening and
/// narrowing.
///
/// No blanket implementation — every abstract value type must explicitly
/// define its own widening operator. Domains of finite height may implement
/// `widen` as `join`.
///
/// ## Algebraic contracts
///
/// **Widening**: `x ⊑ widen(x, y)` and `y ⊑ widen(x, y)`. The ascending
/// chain `x₀, widen(x₀, x₁), widen(widen(x₀, x₁), x₂), ...` must stabilize
/// in finite steps at every program point.
///
/// **Narrowing**: `x ⊓ y ⊑ narrow(x, y) ⊑ x`. The descending chain must
/// also stabilize in finite steps.
pub trait AbstractValue: HasBottom {
    /// Widen `self` with `next` to guarantee ascending chain termination.
    fn widen(&self, next: &Self) -> Self;

    /// Narrow `self` with `next` to refine a post-fixpoint downward.
    ///
    /// Default: no refinement (returns `self`).
    fn narrow(&self, _next: &Self) -> Self
    where
        Self: Clone,
    {
        self.clone()
    }
}
