use std::collections::BTreeSet;

use crate::{AbstractValue, HasBottom, HasTop, Lattice};

/// Finite string-set domain with an explicit top element.
///
/// Tracks a set of opaque fact identifiers (resource handles, initialized
/// type names, taint labels). Join is set union; the induced order is set
/// inclusion with `Top` above everything. The domain has unbounded ascending
/// chains, so widening collapses any strictly growing chain to `Top`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetDomain {
    Finite(BTreeSet<String>),
    Top,
}

impl SetDomain {
    pub fn empty() -> Self {
        SetDomain::Finite(BTreeSet::new())
    }

    pub fn singleton(fact: impl Into<String>) -> Self {
        let mut set = BTreeSet::new();
        set.insert(fact.into());
        SetDomain::Finite(set)
    }

    pub fn from_facts<I, S>(facts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SetDomain::Finite(facts.into_iter().map(Into::into).collect())
    }

    /// Add a fact in place. No-op on `Top`.
    pub fn insert(&mut self, fact: impl Into<String>) {
        if let SetDomain::Finite(set) = self {
            set.insert(fact.into());
        }
    }

    pub fn contains(&self, fact: &str) -> bool {
        match self {
            SetDomain::Finite(set) => set.contains(fact),
            SetDomain::Top => true,
        }
    }

    /// The underlying facts, or `None` for `Top`.
    pub fn facts(&self) -> Option<&BTreeSet<String>> {
        match self {
            SetDomain::Finite(set) => Some(set),
            SetDomain::Top => None,
        }
    }

    /// Rebuild the fact set element-wise. `Top` is preserved.
    pub fn map_facts(&self, mut f: impl FnMut(&str) -> String) -> Self {
        match self {
            SetDomain::Finite(set) => {
                SetDomain::Finite(set.iter().map(|fact| f(fact)).collect())
            }
            SetDomain::Top => SetDomain::Top,
        }
    }
}

impl Lattice for SetDomain {
    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (SetDomain::Top, _) | (_, SetDomain::Top) => SetDomain::Top,
            (SetDomain::Finite(a), SetDomain::Finite(b)) => {
                SetDomain::Finite(a.union(b).cloned().collect())
            }
        }
    }

    fn meet(&self, other: &Self) -> Self {
        match (self, other) {
            (SetDomain::Top, v) | (v, SetDomain::Top) => v.clone(),
            (SetDomain::Finite(a), SetDomain::Finite(b)) => {
                SetDomain::Finite(a.intersection(b).cloned().collect())
            }
        }
    }

    fn is_subseteq(&self, other: &Self) -> bool {
        match (self, other) {
            (_, SetDomain::Top) => true,
            (SetDomain::Top, SetDomain::Finite(_)) => false,
            (SetDomain::Finite(a), SetDomain::Finite(b)) => a.is_subset(b),
        }
    }
}

impl HasBottom for SetDomain {
    fn bottom() -> Self {
        SetDomain::empty()
    }
}

impl HasTop for SetDomain {
    fn top() -> Self {
        SetDomain::Top
    }
}

impl AbstractValue for SetDomain {
    fn widen(&self, next: &Self) -> Self {
        if next.is_subseteq(self) {
            self.clone()
        } else {
            SetDomain::Top
        }
    }

    fn narrow(&self, next: &Self) -> Self {
        match self {
            SetDomain::Top => next.clone(),
            SetDomain::Finite(_) => self.clone(),
        }
    }
}
