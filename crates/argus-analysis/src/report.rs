use argus_graph::Fixpoint;

use crate::{ContextSignature, MethodId};

/// Converged result of analyzing one method under one call context.
///
/// Checkers receive this read-only after the method reaches
/// `MethodPhase::Converged`; they must not mutate domain values through it.
#[derive(Debug, Clone)]
pub struct MethodReport<D> {
    method: MethodId,
    context: ContextSignature,
    entry: D,
    fixpoint: Fixpoint<D>,
}

impl<D> MethodReport<D> {
    pub(crate) fn new(
        method: MethodId,
        context: ContextSignature,
        entry: D,
        fixpoint: Fixpoint<D>,
    ) -> Self {
        Self {
            method,
            context,
            entry,
            fixpoint,
        }
    }

    pub fn method(&self) -> MethodId {
        self.method
    }

    pub fn context(&self) -> &ContextSignature {
        &self.context
    }

    /// The precondition the method was analyzed from.
    pub fn entry(&self) -> &D {
        &self.entry
    }

    /// The converged method postcondition.
    pub fn post(&self) -> &D {
        self.fixpoint.post()
    }

    /// Per-node abstract states of the converged fixpoint.
    pub fn fixpoint(&self) -> &Fixpoint<D> {
        &self.fixpoint
    }
}
