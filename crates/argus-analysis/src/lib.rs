mod analyzer;
mod cache;
mod checker;
mod context;
mod ids;
mod model;
mod report;
mod stack;
mod summary;

pub use analyzer::{AnalysisError, InterproceduralAnalyzer};
pub use cache::MethodGraphCache;
pub use checker::{Checker, CheckerError, CheckerManager, Diagnostic};
pub use context::{AnalysisContext, AnalysisPolicy, AnalysisStats, MethodPhase};
pub use ids::{InvokeId, MethodId, MethodInterner};
pub use model::{AnalyzeAll, CallGraph, GraphSource, MethodFilter, NodeInterpreter};
pub use report::MethodReport;
pub use stack::{CallStack, ContextSignature};
pub use summary::{AbstractState, Summary, SummaryFactory, SummaryStore};
