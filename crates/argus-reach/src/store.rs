use std::collections::BTreeMap;
use std::io;

use serde::{Deserialize, Serialize};

use argus_analysis::MethodId;

use crate::{FieldId, ReachSummary, TypeId};

/// Structured identity of a method or field, resolvable across processes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberRecord {
    pub declaring: String,
    pub name: String,
    pub descriptor: String,
}

/// Structured identity of a type.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeRecord {
    pub name: String,
}

/// One persisted method summary: the method's identity plus the records of
/// every entity its [`ReachSummary`] touches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub method: MemberRecord,
    pub invoked: Vec<MemberRecord>,
    pub implementation_invoked: Vec<MemberRecord>,
    pub accessed_types: Vec<TypeRecord>,
    pub instantiated_types: Vec<TypeRecord>,
    pub read_fields: Vec<MemberRecord>,
    pub written_fields: Vec<MemberRecord>,
}

/// Maps persisted records back to live ids and live ids to records.
///
/// Implemented per host environment; resolution failures are expected for
/// stale stores and must return `None` rather than fail.
pub trait ResolutionStrategy {
    fn resolve_method(&self, record: &MemberRecord) -> Option<MethodId>;
    fn resolve_type(&self, record: &TypeRecord) -> Option<TypeId>;
    fn resolve_field(&self, record: &MemberRecord) -> Option<FieldId>;

    fn method_record(&self, method: MethodId) -> Option<MemberRecord>;
    fn type_record(&self, ty: TypeId) -> Option<TypeRecord>;
    fn field_record(&self, field: FieldId) -> Option<MemberRecord>;
}

/// Error type for persisted-store failures.
///
/// Unresolvable records are *not* errors; they are skipped and reported in
/// the [`LoadOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("summary store I/O failure")]
    Io(#[from] io::Error),
    #[error("summary store encoding failure")]
    Encode(#[from] serde_json::Error),
}

/// Result of loading a persisted store: the summaries that resolved, plus
/// a description of every skipped record.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub summaries: BTreeMap<MethodId, ReachSummary>,
    pub skipped: Vec<String>,
}

/// Serialize summaries as a record stream.
///
/// Methods whose identity the strategy cannot render are skipped with a
/// logged error; individual unresolvable entity ids are dropped the same
/// way. Losing a record degrades a future load to re-analysis, never to a
/// wrong summary.
pub fn save_summaries<W: io::Write>(
    summaries: &BTreeMap<MethodId, ReachSummary>,
    strategy: &dyn ResolutionStrategy,
    writer: W,
) -> Result<(), StoreError> {
    let mut records = Vec::with_capacity(summaries.len());
    for (&method, summary) in summaries {
        let Some(method_record) = strategy.method_record(method) else {
            tracing::error!(%method, "no identity record for method; skipping persisted summary");
            continue;
        };
        records.push(SummaryRecord {
            method: method_record,
            invoked: collect_method_records(&summary.invoked, strategy),
            implementation_invoked: collect_method_records(
                &summary.implementation_invoked,
                strategy,
            ),
            accessed_types: collect_type_records(&summary.accessed_types, strategy),
            instantiated_types: collect_type_records(&summary.instantiated_types, strategy),
            read_fields: collect_field_records(&summary.read_fields, strategy),
            written_fields: collect_field_records(&summary.written_fields, strategy),
        });
    }
    serde_json::to_writer(writer, &records)?;
    Ok(())
}

/// Deserialize a record stream, resolving records back to live ids.
///
/// A record whose method identity does not resolve is skipped entirely;
/// an unresolvable entity id inside an otherwise-valid record is dropped
/// from that summary. Both are logged and reported, never fatal.
pub fn load_summaries<R: io::Read>(
    reader: R,
    strategy: &dyn ResolutionStrategy,
) -> Result<LoadOutcome, StoreError> {
    let records: Vec<SummaryRecord> = serde_json::from_reader(reader)?;
    let mut outcome = LoadOutcome::default();

    for record in records {
        let Some(method) = strategy.resolve_method(&record.method) else {
            tracing::error!(
                method = %record.method.name,
                declaring = %record.method.declaring,
                "unresolvable method in persisted summary store; skipping record"
            );
            outcome.skipped.push(format!(
                "method {}#{}{}",
                record.method.declaring, record.method.name, record.method.descriptor
            ));
            continue;
        };

        let mut summary = ReachSummary::new();
        resolve_methods(&record.invoked, strategy, &mut summary.invoked, &mut outcome.skipped);
        resolve_methods(
            &record.implementation_invoked,
            strategy,
            &mut summary.implementation_invoked,
            &mut outcome.skipped,
        );
        resolve_types(
            &record.accessed_types,
            strategy,
            &mut summary.accessed_types,
            &mut outcome.skipped,
        );
        resolve_types(
            &record.instantiated_types,
            strategy,
            &mut summary.instantiated_types,
            &mut outcome.skipped,
        );
        resolve_fields(
            &record.read_fields,
            strategy,
            &mut summary.read_fields,
            &mut outcome.skipped,
        );
        resolve_fields(
            &record.written_fields,
            strategy,
            &mut summary.written_fields,
            &mut outcome.skipped,
        );
        outcome.summaries.insert(method, summary);
    }
    Ok(outcome)
}

fn collect_method_records(
    ids: &std::collections::BTreeSet<MethodId>,
    strategy: &dyn ResolutionStrategy,
) -> Vec<MemberRecord> {
    ids.iter()
        .filter_map(|&id| {
            let record = strategy.method_record(id);
            if record.is_none() {
                tracing::error!(method = %id, "no identity record for referenced method");
            }
            record
        })
        .collect()
}

fn collect_type_records(
    ids: &std::collections::BTreeSet<TypeId>,
    strategy: &dyn ResolutionStrategy,
) -> Vec<TypeRecord> {
    ids.iter()
        .filter_map(|&id| {
            let record = strategy.type_record(id);
            if record.is_none() {
                tracing::error!(ty = %id, "no identity record for referenced type");
            }
            record
        })
        .collect()
}

fn collect_field_records(
    ids: &std::collections::BTreeSet<FieldId>,
    strategy: &dyn ResolutionStrategy,
) -> Vec<MemberRecord> {
    ids.iter()
        .filter_map(|&id| {
            let record = strategy.field_record(id);
            if record.is_none() {
                tracing::error!(field = %id, "no identity record for referenced field");
            }
            record
        })
        .collect()
}

fn resolve_methods(
    records: &[MemberRecord],
    strategy: &dyn ResolutionStrategy,
    into: &mut std::collections::BTreeSet<MethodId>,
    skipped: &mut Vec<String>,
) {
    for record in records {
        match strategy.resolve_method(record) {
            Some(id) => {
                into.insert(id);
            }
            None => {
                tracing::error!(
                    method = %record.name,
                    declaring = %record.declaring,
                    "unresolvable method id; dropped from reloaded summary"
                );
                skipped.push(format!("method {}#{}", record.declaring, record.name));
            }
        }
    }
}

fn resolve_types(
    records: &[TypeRecord],
    strategy: &dyn ResolutionStrategy,
    into: &mut std::collections::BTreeSet<TypeId>,
    skipped: &mut Vec<String>,
) {
    for record in records {
        match strategy.resolve_type(record) {
            Some(id) => {
                into.insert(id);
            }
            None => {
                tracing::error!(ty = %record.name, "unresolvable type id; dropped from reloaded summary");
                skipped.push(format!("type {}", record.name));
            }
        }
    }
}

fn resolve_fields(
    records: &[MemberRecord],
    strategy: &dyn ResolutionStrategy,
    into: &mut std::collections::BTreeSet<FieldId>,
    skipped: &mut Vec<String>,
) {
    for record in records {
        match strategy.resolve_field(record) {
            Some(id) => {
                into.insert(id);
            }
            None => {
                tracing::error!(
                    field = %record.name,
                    declaring = %record.declaring,
                    "unresolvable field id; dropped from reloaded summary"
                );
                skipped.push(format!("field {}#{}", record.declaring, record.name));
            }
        }
    }
}
