mod analysis;
mod domain;
mod ids;
mod registry;
mod store;

pub use analysis::{ReachInterpreter, ReachOp, ReachSiteSummary, ReachSummaryFactory};
pub use domain::ReachSummary;
pub use ids::{FieldId, TypeId};
pub use registry::MemberRegistry;
pub use store::{
    LoadOutcome, MemberRecord, ResolutionStrategy, StoreError, SummaryRecord, TypeRecord,
    load_summaries, save_summaries,
};
