// src/vector/tests.rs

use super::*;
use crate::context::MaskScope;
use crate::mask::LaneBits;
use test_log::test;

fn mask(bits: u32) -> LaneMask {
    LaneMask::from_bits(LaneBits::from_bits_retain(bits))
}

#[test]
fn program_index_is_natural_order() {
    let idx = program_index().to_array();
    for (lane, &v) in idx.iter().enumerate() {
        assert_eq!(v, lane as i32);
    }
    assert_eq!(PROGRAM_COUNT as usize, LANES);
}

#[test]
fn arithmetic_ignores_the_mask() {
    let _scope = MaskScope::narrow(LaneMask::all_off());
    let a = VFloat::from_array([1.0, 4.0, 9.0, 16.0]);
    assert_eq!((a * a).to_array(), [1.0, 16.0, 81.0, 256.0]);
    assert_eq!(a.sqrt().to_array(), [1.0, 2.0, 3.0, 4.0]);
    assert_eq!(sqrt(a).to_array(), [1.0, 2.0, 3.0, 4.0]);
    assert_eq!((a + 1.0).to_array(), [2.0, 5.0, 10.0, 17.0]);
    assert_eq!((20.0 - a).to_array(), [19.0, 16.0, 11.0, 4.0]);
    assert_eq!((a / 2.0).to_array(), [0.5, 2.0, 4.5, 8.0]);
    assert_eq!((-a).to_array(), [-1.0, -4.0, -9.0, -16.0]);
}

#[test]
fn comparisons_against_scalar_and_vector() {
    let x = VFloat::from_array([-1.0, 2.0, -3.0, 4.0]);
    assert_eq!(x.lt(0.0).to_array(), [true, false, true, false]);
    assert_eq!(x.ge(0.0).to_array(), [false, true, false, true]);
    assert_eq!(x.le(2.0).to_array(), [true, true, true, false]);
    assert_eq!(x.gt(x).to_array(), [false; 4]);
    assert!(x.eq_lanes(x).all());
}

#[test]
fn abs_min_max_select() {
    let x = VFloat::from_array([-1.0, 2.0, -3.0, 4.0]);
    assert_eq!(x.abs().to_array(), [1.0, 2.0, 3.0, 4.0]);
    assert_eq!(x.min(0.0).to_array(), [-1.0, 0.0, -3.0, 0.0]);
    assert_eq!(x.max(0.0).to_array(), [0.0, 2.0, 0.0, 4.0]);
    let picked = VFloat::select(x.lt(0.0), VFloat::splat(7.0), x);
    assert_eq!(picked.to_array(), [7.0, 2.0, 7.0, 4.0]);
}

#[test]
fn bool_logic() {
    let a = VBool::from_array([true, true, false, false]);
    let b = VBool::from_array([true, false, true, false]);
    assert_eq!((a & b).to_array(), [true, false, false, false]);
    assert_eq!((a | b).to_array(), [true, true, true, false]);
    assert_eq!((!a).to_array(), [false, false, true, true]);
    assert!(VBool::splat(true).all());
    assert!(VBool::splat(false).none());
    assert!(a.any() && !a.all());
    assert_eq!(a.to_mask().bits().bits(), 0b0011);
}

#[test]
fn masked_assign_is_identity_under_every_inactive_lane() {
    let old = [10.0, 20.0, 30.0, 40.0];
    let new = VFloat::from_array([1.0, 2.0, 3.0, 4.0]);
    for pattern in 0..(1u32 << LANES) {
        let mut v = VFloat::from_array(old);
        {
            let _scope = MaskScope::narrow(mask(pattern));
            v.assign(new);
        }
        let got = v.to_array();
        for lane in 0..LANES {
            let expected = if pattern & (1 << lane) != 0 {
                new.lane(lane)
            } else {
                old[lane]
            };
            assert_eq!(got[lane], expected, "pattern {:04b} lane {}", pattern, lane);
        }
    }
}

#[test]
fn masked_assign_under_full_mask_overwrites() {
    let mut v = VFloat::splat(-1.0);
    v.assign(VFloat::from_array([5.0, 6.0, 7.0, 8.0]));
    assert_eq!(v.to_array(), [5.0, 6.0, 7.0, 8.0]);
}

#[test]
fn int_vector_arithmetic_and_assign() {
    let i = program_index() + 8;
    assert_eq!(i.to_array(), [8, 9, 10, 11]);
    assert_eq!((3 + program_index()).to_array(), [3, 4, 5, 6]);
    assert_eq!((i - 8).to_array(), [0, 1, 2, 3]);
    assert_eq!((i + i).to_array(), [16, 18, 20, 22]);
    assert_eq!(program_index().lt(2).to_array(), [true, true, false, false]);
    assert_eq!(i.first(), 8);
    assert_eq!(i.lane(3), 11);

    let mut j = VInt::splat(0);
    {
        let _scope = MaskScope::narrow(mask(0b1001));
        j.assign(i);
    }
    assert_eq!(j.to_array(), [8, 0, 0, 11]);
}

#[test]
fn contiguity_detection() {
    assert!(program_index().is_contiguous());
    assert!((program_index() + 37).is_contiguous());
    assert!(!VInt::splat(5).is_contiguous());
    assert!(!VInt::from_array([0, 2, 4, 6]).is_contiguous());
    assert!(!VInt::from_array([3, 2, 1, 0]).is_contiguous());
}

#[test]
fn varying_set_is_masked() {
    let x = Varying::new(VFloat::splat(1.0));
    x.set(VFloat::splat(2.0));
    assert_eq!(x.get().to_array(), [2.0; 4]);
    {
        let _scope = MaskScope::narrow(mask(0b1100));
        x.set(VFloat::splat(3.0));
    }
    assert_eq!(x.into_inner().to_array(), [2.0, 2.0, 3.0, 3.0]);

    let n = Varying::new(VInt::splat(0));
    {
        let _scope = MaskScope::narrow(mask(0b0001));
        n.set(VInt::splat(7));
    }
    assert_eq!(n.get().to_array(), [7, 0, 0, 0]);
}
