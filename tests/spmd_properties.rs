//! Behavioural properties of the mask engine and the combinators.

use spmd_lanes::{
    current_lanes, current_mask, program_index, spmd_foreach, spmd_if, spmd_if_else, LaneBits,
    LaneMask, MaskScope, VBool, VFloat, VInt, Varying, LANES, PROGRAM_COUNT,
};
use test_log::test;

fn bits(b: u32) -> LaneBits {
    LaneBits::from_bits_retain(b)
}

fn cond(b: u32) -> VBool {
    VBool::from(LaneMask::from_bits(bits(b)))
}

const PATTERNS: u32 = 1 << LANES;

#[test]
fn nested_ifs_intersect_and_restore() {
    for outer in 0..PATTERNS {
        for c1 in 0..PATTERNS {
            for c2 in 0..PATTERNS {
                let _ambient = MaskScope::narrow(LaneMask::from_bits(bits(outer)));
                let mut inner_seen = None;
                spmd_if(cond(c1), || {
                    spmd_if(cond(c2), || inner_seen = Some(current_lanes()));
                });
                let expected = outer & c1 & c2;
                if expected == 0 {
                    assert_eq!(inner_seen, None);
                } else {
                    assert_eq!(inner_seen, Some(bits(expected)));
                }
                assert_eq!(current_lanes(), bits(outer));
            }
        }
    }
    assert!(current_mask().all());
}

#[test]
fn if_else_branches_partition_the_ambient_mask() {
    for ambient in 0..PATTERNS {
        for c in 0..PATTERNS {
            let _scope = MaskScope::narrow(LaneMask::from_bits(bits(ambient)));
            let mut then_lanes = LaneBits::empty();
            let mut else_lanes = LaneBits::empty();
            spmd_if_else(
                cond(c),
                || then_lanes = current_lanes(),
                || else_lanes = current_lanes(),
            );
            assert!((then_lanes & else_lanes).is_empty());
            assert_eq!(then_lanes | else_lanes, bits(ambient));
            assert_eq!(current_lanes(), bits(ambient));
        }
    }
}

#[test]
fn masked_write_identity_and_totality() {
    let before = VFloat::from_array([1.5, -2.5, 3.5, -4.5]);
    let value = VFloat::splat(100.0);

    let mut v = before;
    {
        let _off = MaskScope::narrow(LaneMask::all_off());
        v.assign(value);
    }
    assert_eq!(v.to_array(), before.to_array());

    for pattern in 0..PATTERNS {
        let mut buf = [7.0f32; 4];
        let _scope = MaskScope::narrow(LaneMask::from_bits(bits(pattern)));
        let _off = MaskScope::narrow(LaneMask::all_off());
        program_index().at(&mut buf).store(value);
        assert_eq!(buf, [7.0; 4], "pattern {:04b}", pattern);
    }

    let mut w = before;
    w.assign(value);
    assert_eq!(w.to_array(), value.to_array());
}

#[test]
fn foreach_covers_every_index_exactly_once() {
    for first in 0..6 {
        for last in first..(first + 3 * PROGRAM_COUNT + 2) {
            let mut seen = Vec::new();
            spmd_foreach(first, last, |i| {
                let idx = i.to_array();
                for lane in current_lanes().lanes() {
                    seen.push(idx[lane]);
                }
            });
            seen.sort_unstable();
            assert_eq!(seen, (first..last).collect::<Vec<_>>(), "[{}, {})", first, last);
            assert!(current_mask().all());
        }
    }
}

#[test]
fn foreach_inside_if_keeps_outer_lanes_off() {
    let outer = cond(0b1010);
    let mut seen = Vec::new();
    spmd_if(outer, || {
        spmd_foreach(0, 6, |i| {
            let idx = i.to_array();
            seen.extend(current_lanes().lanes().map(|lane| idx[lane]));
        });
    });
    assert_eq!(seen, vec![1, 3, 5]);
}

#[test]
fn scatter_then_gather_round_trips_on_active_lanes() {
    let offsets = VInt::from_array([6, 1, 3, 0]);
    let value = VFloat::from_array([10.0, 20.0, 30.0, 40.0]);
    for pattern in 0..PATTERNS {
        let mut buf = [-1.0f32; 8];
        let _scope = MaskScope::narrow(LaneMask::from_bits(bits(pattern)));
        offsets.at(&mut buf).store(value);
        let back = offsets.load_from(&buf).to_array();

        let offs = offsets.to_array();
        let vals = value.to_array();
        for lane in 0..LANES {
            if pattern & (1 << lane) != 0 {
                assert_eq!(back[lane], vals[lane]);
                assert_eq!(buf[offs[lane] as usize], vals[lane]);
            } else {
                assert_eq!(buf[offs[lane] as usize], -1.0);
            }
        }
        // Elements no lane addresses stay untouched.
        for ix in [2usize, 4, 5, 7] {
            assert_eq!(buf[ix], -1.0);
        }
    }
}

#[test]
fn scenario_a_ten_elements_four_lanes() {
    let mut calls = Vec::new();
    let mut out = [-1.0f32; 12];
    spmd_foreach(0, 10, |i| {
        calls.push((i.first(), current_lanes()));
        i.at(&mut out[..]).store(VFloat::splat(1.0));
    });
    assert_eq!(
        calls,
        vec![
            (0, LaneBits::full()),
            (4, LaneBits::full()),
            (8, LaneBits::LANE_0 | LaneBits::LANE_1),
        ]
    );
    assert_eq!(&out[..10], &[1.0; 10]);
    // lanes 2 and 3 of the last call would have written here
    assert_eq!(&out[10..], &[-1.0, -1.0]);
}

#[test]
fn scenario_b_if_writes_only_taken_lanes() {
    let x = VFloat::from_array([-1.0, 2.0, -3.0, 4.0]);
    let mut y = VFloat::splat(0.5);
    let mut buf = [9.0f32; 4];
    spmd_if(x.lt(0.0), || {
        assert_eq!(current_lanes(), LaneBits::LANE_0 | LaneBits::LANE_2);
        y.assign(x * x);
        program_index().at(&mut buf).store(x);
    });
    assert_eq!(y.to_array(), [1.0, 0.5, 9.0, 0.5]);
    assert_eq!(buf, [-1.0, 9.0, -3.0, 9.0]);
}

#[test]
fn if_else_bodies_share_a_varying() {
    let x = Varying::new(VFloat::from_array([-2.0, 3.0, -4.0, 5.0]));
    spmd_if_else(x.get().lt(0.0), || x.set(-x.get()), || x.set(x.get() * 10.0));
    assert_eq!(x.get().to_array(), [2.0, 30.0, 4.0, 50.0]);
}

#[test]
fn nested_if_else_three_way_classification() {
    let x = VFloat::from_array([-5.0, 0.5, 7.0, -0.25]);
    let class = Varying::new(VFloat::splat(0.0));
    spmd_if_else(
        x.lt(0.0),
        || class.set(VFloat::splat(-1.0)),
        || {
            spmd_if_else(
                x.lt(1.0),
                || class.set(VFloat::splat(0.0)),
                || class.set(VFloat::splat(1.0)),
            )
        },
    );
    assert_eq!(class.get().to_array(), [-1.0, 0.0, 1.0, -1.0]);
    assert!(current_mask().all());
}
