//! Property tests pinning the compacted-stack cycle semantics for
//! arbitrary (including deeply repeated) call patterns.

use proptest::prelude::*;

use argus_analysis::{CallStack, MethodId};

fn stack_of(frames: &[u8]) -> CallStack {
    let mut stack = CallStack::new(64);
    for &frame in frames {
        stack.push(MethodId::from_raw(frame as u32));
    }
    stack
}

/// Reference semantics: collapse consecutive duplicates, then count.
fn compacted(frames: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    for &frame in frames {
        if out.last() != Some(&frame) {
            out.push(frame);
        }
    }
    out
}

proptest! {
    #[test]
    fn cycle_test_matches_compacted_occurrence_count(
        frames in proptest::collection::vec(0u8..4, 0..12),
        probe in 0u8..4,
    ) {
        let stack = stack_of(&frames);
        let expected = compacted(&frames)
            .iter()
            .filter(|&&frame| frame == probe)
            .count()
            > 1;
        prop_assert_eq!(
            stack.has_method_call_cycle(MethodId::from_raw(probe as u32)),
            expected
        );
    }

    #[test]
    fn call_count_matches_plain_occurrences(
        frames in proptest::collection::vec(0u8..4, 0..12),
        probe in 0u8..4,
    ) {
        let stack = stack_of(&frames);
        let expected = frames.iter().filter(|&&frame| frame == probe).count();
        prop_assert_eq!(
            stack.count_consecutive_calls(MethodId::from_raw(probe as u32)),
            expected
        );
    }

    #[test]
    fn signature_length_is_bounded_by_k(
        frames in proptest::collection::vec(0u8..4, 0..12),
        k in 0usize..6,
    ) {
        let stack = stack_of(&frames);
        let signature = stack.context_signature(k);
        prop_assert!(signature.frames().len() <= k);
        prop_assert!(signature.frames().len() <= stack.depth());
    }
}
