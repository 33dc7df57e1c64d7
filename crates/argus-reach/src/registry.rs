use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use argus_analysis::MethodId;

use crate::store::{MemberRecord, ResolutionStrategy, TypeRecord};
use crate::{FieldId, TypeId};

/// Concurrent registry of the live methods, types, and fields of a host
/// environment, keyed by their structured records.
///
/// Registration is publish-once per record (the entry API's shard lock);
/// resolution never registers, so a record unknown to the registry stays
/// unresolvable — that is what the persisted-store loader relies on to
/// skip stale entries.
#[derive(Debug, Default)]
pub struct MemberRegistry {
    methods: DashMap<MemberRecord, MethodId>,
    method_records: DashMap<MethodId, MemberRecord>,
    next_method: AtomicU32,
    types: DashMap<TypeRecord, TypeId>,
    type_records: DashMap<TypeId, TypeRecord>,
    next_type: AtomicU32,
    fields: DashMap<MemberRecord, FieldId>,
    field_records: DashMap<FieldId, MemberRecord>,
    next_field: AtomicU32,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or look up) a method by declaring type, name, and
    /// descriptor.
    pub fn method(&self, declaring: &str, name: &str, descriptor: &str) -> MethodId {
        let record = MemberRecord {
            declaring: declaring.to_owned(),
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
        };
        match self.methods.entry(record.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = MethodId::from_raw(self.next_method.fetch_add(1, Ordering::Relaxed));
                self.method_records.insert(id, record);
                entry.insert(id);
                id
            }
        }
    }

    /// Register (or look up) a type by name.
    pub fn ty(&self, name: &str) -> TypeId {
        let record = TypeRecord {
            name: name.to_owned(),
        };
        match self.types.entry(record.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = TypeId::from_raw(self.next_type.fetch_add(1, Ordering::Relaxed));
                self.type_records.insert(id, record);
                entry.insert(id);
                id
            }
        }
    }

    /// Register (or look up) a field by declaring type, name, and
    /// descriptor.
    pub fn field(&self, declaring: &str, name: &str, descriptor: &str) -> FieldId {
        let record = MemberRecord {
            declaring: declaring.to_owned(),
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
        };
        match self.fields.entry(record.clone()) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = FieldId::from_raw(self.next_field.fetch_add(1, Ordering::Relaxed));
                self.field_records.insert(id, record);
                entry.insert(id);
                id
            }
        }
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

impl ResolutionStrategy for MemberRegistry {
    fn resolve_method(&self, record: &MemberRecord) -> Option<MethodId> {
        self.methods.get(record).map(|entry| *entry.value())
    }

    fn resolve_type(&self, record: &TypeRecord) -> Option<TypeId> {
        self.types.get(record).map(|entry| *entry.value())
    }

    fn resolve_field(&self, record: &MemberRecord) -> Option<FieldId> {
        self.fields.get(record).map(|entry| *entry.value())
    }

    fn method_record(&self, method: MethodId) -> Option<MemberRecord> {
        self.method_records
            .get(&method)
            .map(|entry| entry.value().clone())
    }

    fn type_record(&self, ty: TypeId) -> Option<TypeRecord> {
        self.type_records.get(&ty).map(|entry| entry.value().clone())
    }

    fn field_record(&self, field: FieldId) -> Option<MemberRecord> {
        self.field_records
            .get(&field)
            .map(|entry| entry.value().clone())
    }
}
