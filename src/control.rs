//! SPMD control flow: `if`, `if/else` and a lane-strided `for`.
//!
//! Each combinator narrows the execution mask through a [`MaskScope`], calls
//! the body once as an ordinary closure, and lets the scope restore the mask.
//! Every lane conceptually runs the body; lanes outside the narrowed mask are
//! frozen because masked assignment and scatter skip them.
//!
//! A body is skipped when its narrowed mask is empty. This only saves time:
//! under an empty mask every masked write inside the body is a no-op anyway.

use crate::context::MaskScope;
use crate::vector::{program_index, VBool, VInt, PROGRAM_COUNT};
use log::trace;

/// Run `if_body` on the lanes where `cond` holds.
#[inline]
pub fn spmd_if<F>(cond: VBool, if_body: F)
where
    F: FnOnce(),
{
    let scope = MaskScope::narrow(cond.to_mask());
    if scope.any_active() {
        if_body();
    } else {
        trace!("spmd_if: no active lanes, body skipped");
    }
}

/// Run `if_body` on the lanes where `cond` holds and `else_body` on the
/// remaining lanes of the enclosing mask.
///
/// The two bodies' active sets are disjoint and together cover exactly the
/// mask in effect at entry.
#[inline]
pub fn spmd_if_else<F, G>(cond: VBool, if_body: F, else_body: G)
where
    F: FnOnce(),
    G: FnOnce(),
{
    let cond = cond.to_mask();
    let scope = MaskScope::narrow(cond);
    if scope.any_active() {
        if_body();
    } else {
        trace!("spmd_if_else: no active lanes, if-body skipped");
    }

    scope.retarget(!cond);
    if scope.any_active() {
        else_body();
    } else {
        trace!("spmd_if_else: no active lanes, else-body skipped");
    }
}

/// Distribute `first..last` across lanes, `PROGRAM_COUNT` indices per call.
///
/// Full batches run under the caller's mask unchanged. If the range length is
/// not a multiple of the lane count, one last call runs with only the first
/// `(last - first) % PROGRAM_COUNT` lanes additionally enabled.
///
/// # Panics
///
/// Panics if `first > last`.
pub fn spmd_foreach<F>(first: i32, last: i32, mut body: F)
where
    F: FnMut(VInt),
{
    assert!(
        first <= last,
        "spmd_foreach: first ({}) must not exceed last ({})",
        first,
        last
    );

    let count = i64::from(last) - i64::from(first);
    let lanes = i64::from(PROGRAM_COUNT);
    // number of indices that don't require extra masking
    let full = (count / lanes) * lanes;
    // number of lanes left for the masked tail
    let partial = (count % lanes) as i32;

    trace!(
        "spmd_foreach [{}, {}): {} full batches, {} tail lanes",
        first,
        last,
        full / lanes,
        partial
    );

    let mut index = program_index() + first;
    let mut done = 0i64;
    while done < full {
        body(index);
        index = index + PROGRAM_COUNT;
        done += lanes;
    }

    if partial > 0 {
        let _scope = MaskScope::narrow(program_index().lt(partial).to_mask());
        body(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{current_lanes, current_mask};
    use crate::mask::LaneBits;
    use crate::vector::VFloat;
    use test_log::test;

    #[test]
    fn if_runs_body_under_narrowed_mask() {
        let x = VFloat::from_array([-1.0, 2.0, -3.0, 4.0]);
        let mut seen = None;
        spmd_if(x.lt(0.0), || seen = Some(current_lanes()));
        assert_eq!(seen, Some(LaneBits::LANE_0 | LaneBits::LANE_2));
        assert!(current_mask().all());
    }

    #[test]
    fn if_skips_body_when_no_lane_passes() {
        let mut called = false;
        spmd_if(VBool::splat(false), || called = true);
        assert!(!called);
    }

    #[test]
    fn if_else_partitions_the_mask() {
        let cond = VBool::from_array([true, false, false, true]);
        let mut then_lanes = LaneBits::empty();
        let mut else_lanes = LaneBits::empty();
        spmd_if_else(
            cond,
            || then_lanes = current_lanes(),
            || else_lanes = current_lanes(),
        );
        assert_eq!(then_lanes, LaneBits::LANE_0 | LaneBits::LANE_3);
        assert_eq!(else_lanes, LaneBits::LANE_1 | LaneBits::LANE_2);
        assert!(current_mask().all());
    }

    #[test]
    fn if_else_skips_empty_else() {
        let mut else_called = false;
        spmd_if_else(VBool::splat(true), || {}, || else_called = true);
        assert!(!else_called);
    }

    #[test]
    fn foreach_empty_range_never_calls_body() {
        let mut calls = 0;
        spmd_foreach(5, 5, |_| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn foreach_tail_only() {
        let mut calls = Vec::new();
        spmd_foreach(3, 6, |i| calls.push((i.to_array(), current_lanes())));
        assert_eq!(
            calls,
            vec![([3, 4, 5, 6], LaneBits::LANE_0 | LaneBits::LANE_1 | LaneBits::LANE_2)]
        );
    }

    #[test]
    fn foreach_handles_extreme_bounds() {
        let mut calls = 0;
        spmd_foreach(i32::MAX - 5, i32::MAX, |_| calls += 1);
        assert_eq!(calls, 2);
    }

    #[test]
    #[should_panic(expected = "must not exceed")]
    fn foreach_rejects_reversed_range() {
        spmd_foreach(4, 3, |_| {});
    }
}
