use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::MethodId;

/// Call-history key for context-sensitive analysis: the last *k* frames of
/// the [`CallStack`] at the moment a callee is entered (k-CFA).
///
/// `k = 0` yields the empty signature for every call, degenerating to
/// context-insensitive analysis with one state per method.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct ContextSignature(SmallVec<[MethodId; 4]>);

impl ContextSignature {
    /// The empty, context-insensitive signature.
    pub fn insensitive() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[MethodId] {
        &self.0
    }

    pub fn is_insensitive(&self) -> bool {
        self.0.is_empty()
    }
}

/// The sequence of methods currently being analyzed by one in-flight
/// top-level analysis.
///
/// Owned by exactly one analysis run and never shared across threads; the
/// analyzer passes it explicitly through every recursion. `push`/`pop` are
/// balanced around each analyzed call. All queries are pure.
#[derive(Debug, Clone)]
pub struct CallStack {
    frames: VecDeque<MethodId>,
    max_depth: usize,
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: VecDeque::new(),
            max_depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether the depth bound has been reached; the analyzer must not
    /// recurse further once it has.
    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.max_depth
    }

    pub fn push(&mut self, method: MethodId) {
        self.frames.push_back(method);
    }

    pub fn pop(&mut self) -> Option<MethodId> {
        self.frames.pop_back()
    }

    pub fn frames(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.frames.iter().copied()
    }

    /// Number of frames on the stack bearing `method`'s identity, used to
    /// bound simple recursion: `[A, B, A]` counts 2 for `A`.
    pub fn count_consecutive_calls(&self, method: MethodId) -> usize {
        self.frames.iter().filter(|&&frame| frame == method).count()
    }

    /// Whether the stack witnesses a non-trivial call cycle through
    /// `method`.
    ///
    /// Consecutive duplicate frames are collapsed first, so plain
    /// self-recursion (`[A, A, A]`) is *not* a cycle; a repetition through
    /// at least one other method (`[A, B, C, A]`) is. The compacted-stack
    /// test is the authoritative definition; alternating patterns like
    /// `[A, B, A, B, A]` compact to themselves and count as cycles.
    pub fn has_method_call_cycle(&self, method: MethodId) -> bool {
        let mut occurrences = 0usize;
        let mut previous: Option<MethodId> = None;
        for &frame in &self.frames {
            if previous == Some(frame) {
                continue;
            }
            if frame == method {
                occurrences += 1;
                if occurrences > 1 {
                    return true;
                }
            }
            previous = Some(frame);
        }
        false
    }

    /// Render the current chain for cycle diagnostics, e.g.
    /// `"A -> B -> C -> A"`.
    pub fn format_cycle_with_method(
        &self,
        method: MethodId,
        name: impl Fn(MethodId) -> String,
    ) -> String {
        let mut parts: Vec<String> = self.frames.iter().map(|&frame| name(frame)).collect();
        parts.push(name(method));
        parts.join(" -> ")
    }

    /// The last `k` frames as a [`ContextSignature`].
    pub fn context_signature(&self, k: usize) -> ContextSignature {
        let skip = self.frames.len().saturating_sub(k);
        ContextSignature(self.frames.iter().skip(skip).copied().collect())
    }
}
