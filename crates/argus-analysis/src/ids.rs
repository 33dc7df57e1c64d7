use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Stable identity of a method within one [`MethodInterner`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct MethodId(u32);

impl MethodId {
    pub fn from_raw(raw: u32) -> Self {
        MethodId(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// Identity of one invoke site, assigned by the call-graph collaborator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct InvokeId(u32);

impl InvokeId {
    pub fn from_raw(raw: u32) -> Self {
        InvokeId(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InvokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// Concurrent interned-string arena mapping qualified method names to
/// [`MethodId`]s and back.
///
/// Interning is publish-once: the shard lock taken by the entry API makes
/// exactly one writer's id visible for a given name; a losing racer observes
/// the winner's id instead of allocating a second one.
#[derive(Debug, Default)]
pub struct MethodInterner {
    ids: DashMap<Arc<str>, MethodId>,
    names: DashMap<MethodId, Arc<str>>,
    next: AtomicU32,
}

impl MethodInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, name: &str) -> MethodId {
        if let Some(id) = self.ids.get(name) {
            return *id.value();
        }
        let key: Arc<str> = Arc::from(name);
        match self.ids.entry(key.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = MethodId(self.next.fetch_add(1, Ordering::Relaxed));
                self.names.insert(id, key);
                entry.insert(id);
                id
            }
        }
    }

    /// Look up a previously interned name without allocating an id.
    pub fn get(&self, name: &str) -> Option<MethodId> {
        self.ids.get(name).map(|entry| *entry.value())
    }

    pub fn name(&self, id: MethodId) -> Option<Arc<str>> {
        self.names.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
