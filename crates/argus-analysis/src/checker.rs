use std::panic::{AssertUnwindSafe, catch_unwind};

use argus_graph::NodeIndex;

use crate::{MethodId, MethodReport};

/// One checker finding, addressed to a reporting collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub method: MethodId,
    /// Program point the finding anchors to, when one exists.
    pub node: Option<NodeIndex>,
    pub message: String,
}

/// Error type for checker failures.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CheckerError(pub String);

/// Post-analysis observer over converged abstract states.
///
/// Checkers are side-effect-only: they emit diagnostics through the sink
/// and must not mutate domain values or summaries. Within one pass a
/// checker cannot see another checker's output.
pub trait Checker<D>: Send + Sync {
    fn name(&self) -> &str;

    fn check(
        &self,
        report: &MethodReport<D>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(), CheckerError>;
}

/// Runs registered checkers over finished analyses, isolating failures.
///
/// One checker's error or panic is logged and swallowed here; it never
/// aborts other checkers or the analysis of other methods.
pub struct CheckerManager<D> {
    checkers: Vec<Box<dyn Checker<D>>>,
}

impl<D> Default for CheckerManager<D> {
    fn default() -> Self {
        Self {
            checkers: Vec::new(),
        }
    }
}

impl<D> CheckerManager<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, checker: impl Checker<D> + 'static) {
        self.checkers.push(Box::new(checker));
    }

    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// Run every checker over `report`, each against a private sink.
    pub fn run(&self, report: &MethodReport<D>) -> Vec<Diagnostic> {
        let mut all = Vec::new();
        for checker in &self.checkers {
            let mut sink = Vec::new();
            let outcome = catch_unwind(AssertUnwindSafe(|| checker.check(report, &mut sink)));
            match outcome {
                Ok(Ok(())) => all.append(&mut sink),
                Ok(Err(error)) => {
                    tracing::error!(checker = checker.name(), %error, "checker failed");
                    // Findings emitted before the failure still count.
                    all.append(&mut sink);
                }
                Err(_) => {
                    tracing::error!(checker = checker.name(), "checker panicked");
                }
            }
        }
        all
    }
}
