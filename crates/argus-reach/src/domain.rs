use std::collections::BTreeSet;

use argus_analysis::MethodId;
use argus_domain::{AbstractValue, HasBottom, Lattice};

use crate::{FieldId, TypeId};

/// Reachability effect summary: the program entities a region of code can
/// touch.
///
/// A product lattice of entity sets ordered pointwise by inclusion; join is
/// pointwise union. Ascending chains are bounded by the number of entities
/// in the program under analysis, so widening can safely delegate to join.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReachSummary {
    pub invoked: BTreeSet<MethodId>,
    pub implementation_invoked: BTreeSet<MethodId>,
    pub accessed_types: BTreeSet<TypeId>,
    pub instantiated_types: BTreeSet<TypeId>,
    pub read_fields: BTreeSet<FieldId>,
    pub written_fields: BTreeSet<FieldId>,
}

impl ReachSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.invoked.is_empty()
            && self.implementation_invoked.is_empty()
            && self.accessed_types.is_empty()
            && self.instantiated_types.is_empty()
            && self.read_fields.is_empty()
            && self.written_fields.is_empty()
    }
}

fn union<T: Ord + Clone>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> BTreeSet<T> {
    a.union(b).cloned().collect()
}

fn intersection<T: Ord + Clone>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> BTreeSet<T> {
    a.intersection(b).cloned().collect()
}

impl Lattice for ReachSummary {
    fn join(&self, other: &Self) -> Self {
        Self {
            invoked: union(&self.invoked, &other.invoked),
            implementation_invoked: union(
                &self.implementation_invoked,
                &other.implementation_invoked,
            ),
            accessed_types: union(&self.accessed_types, &other.accessed_types),
            instantiated_types: union(&self.instantiated_types, &other.instantiated_types),
            read_fields: union(&self.read_fields, &other.read_fields),
            written_fields: union(&self.written_fields, &other.written_fields),
        }
    }

    fn meet(&self, other: &Self) -> Self {
        Self {
            invoked: intersection(&self.invoked, &other.invoked),
            implementation_invoked: intersection(
                &self.implementation_invoked,
                &other.implementation_invoked,
            ),
            accessed_types: intersection(&self.accessed_types, &other.accessed_types),
            instantiated_types: intersection(&self.instantiated_types, &other.instantiated_types),
            read_fields: intersection(&self.read_fields, &other.read_fields),
            written_fields: intersection(&self.written_fields, &other.written_fields),
        }
    }

    fn is_subseteq(&self, other: &Self) -> bool {
        self.invoked.is_subset(&other.invoked)
            && self
                .implementation_invoked
                .is_subset(&other.implementation_invoked)
            && self.accessed_types.is_subset(&other.accessed_types)
            && self.instantiated_types.is_subset(&other.instantiated_types)
            && self.read_fields.is_subset(&other.read_fields)
            && self.written_fields.is_subset(&other.written_fields)
    }
}

impl HasBottom for ReachSummary {
    fn bottom() -> Self {
        Self::default()
    }
}

impl AbstractValue for ReachSummary {
    fn widen(&self, next: &Self) -> Self {
        self.join(next)
    }
}
