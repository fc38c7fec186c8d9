//! Portable fallback backend built on plain arrays.
//!
//! `Portable<N>` works for any lane count from 1 to 32 (the mask collapses to
//! a `u32`); other widths fail to compile once the backend is used. It is the native backend on targets without an intrinsic
//! backend, and lets the width-agnostic layers be tested at other widths.

use super::{Backend, MaskOps, SimdI32Ops, SimdOps};
use core::array;
use core::fmt::Debug;
use core::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Not, Sub};

/// Array backend with `N` lanes.
#[derive(Copy, Clone, Debug, Default)]
pub struct Portable<const N: usize>;

impl<const N: usize> Portable<N> {
    const WIDTH_OK: () = assert!(N >= 1 && N <= 32, "Portable<N> supports 1..=32 lanes");
}

impl<const N: usize> Backend for Portable<N> {
    const LANES: usize = {
        let () = Self::WIDTH_OK;
        N
    };
    type Mask = MaskN<N>;
    type F32 = F32xN<N>;
    type I32 = I32xN<N>;
}

// ============================================================================
// MaskN
// ============================================================================

/// `N`-lane mask, one `bool` per lane.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MaskN<const N: usize>([bool; N]);

impl<const N: usize> Default for MaskN<N> {
    fn default() -> Self {
        Self([false; N])
    }
}

impl<const N: usize> MaskOps for MaskN<N> {
    #[inline(always)]
    fn splat(val: bool) -> Self {
        let () = Portable::<N>::WIDTH_OK;
        Self([val; N])
    }

    #[inline(always)]
    fn from_bitmask(bits: u32) -> Self {
        let () = Portable::<N>::WIDTH_OK;
        Self(array::from_fn(|i| (bits >> i) & 1 != 0))
    }

    #[inline(always)]
    fn bitmask(self) -> u32 {
        let () = Portable::<N>::WIDTH_OK;
        self.0
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &on)| acc | ((on as u32) << i))
    }

    #[inline(always)]
    fn any(self) -> bool {
        self.0.iter().any(|&b| b)
    }

    #[inline(always)]
    fn all(self) -> bool {
        self.0.iter().all(|&b| b)
    }
}

impl<const N: usize> BitAnd for MaskN<N> {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self(array::from_fn(|i| self.0[i] & rhs.0[i]))
    }
}

impl<const N: usize> BitOr for MaskN<N> {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(array::from_fn(|i| self.0[i] | rhs.0[i]))
    }
}

impl<const N: usize> Not for MaskN<N> {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Self(self.0.map(|b| !b))
    }
}

// ============================================================================
// F32xN
// ============================================================================

/// `N`-lane f32 vector.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct F32xN<const N: usize>([f32; N]);

impl<const N: usize> Default for F32xN<N> {
    fn default() -> Self {
        Self([0.0; N])
    }
}

impl<const N: usize> F32xN<N> {
    #[inline(always)]
    fn zip(self, rhs: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self(array::from_fn(|i| f(self.0[i], rhs.0[i])))
    }

    #[inline(always)]
    fn test(self, rhs: Self, f: impl Fn(f32, f32) -> bool) -> MaskN<N> {
        MaskN(array::from_fn(|i| f(self.0[i], rhs.0[i])))
    }
}

impl<const N: usize> SimdOps for F32xN<N> {
    type Mask = MaskN<N>;
    const LANES: usize = N;

    #[inline(always)]
    fn splat(val: f32) -> Self {
        Self([val; N])
    }

    #[inline(always)]
    fn from_slice(slice: &[f32]) -> Self {
        assert!(slice.len() >= N);
        Self(array::from_fn(|i| slice[i]))
    }

    #[inline(always)]
    fn store(&self, out: &mut [f32]) {
        assert!(out.len() >= N);
        out[..N].copy_from_slice(&self.0);
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> MaskN<N> {
        self.test(rhs, |a, b| a < b)
    }

    #[inline(always)]
    fn cmp_le(self, rhs: Self) -> MaskN<N> {
        self.test(rhs, |a, b| a <= b)
    }

    #[inline(always)]
    fn cmp_gt(self, rhs: Self) -> MaskN<N> {
        self.test(rhs, |a, b| a > b)
    }

    #[inline(always)]
    fn cmp_ge(self, rhs: Self) -> MaskN<N> {
        self.test(rhs, |a, b| a >= b)
    }

    #[inline(always)]
    fn cmp_eq(self, rhs: Self) -> MaskN<N> {
        self.test(rhs, |a, b| a == b)
    }

    #[inline(always)]
    fn simd_sqrt(self) -> Self {
        Self(self.0.map(f32::sqrt))
    }

    #[inline(always)]
    fn simd_abs(self) -> Self {
        Self(self.0.map(f32::abs))
    }

    #[inline(always)]
    fn simd_min(self, rhs: Self) -> Self {
        // Matches minps: returns rhs when either side is NaN.
        self.zip(rhs, |a, b| if a < b { a } else { b })
    }

    #[inline(always)]
    fn simd_max(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| if a > b { a } else { b })
    }

    #[inline(always)]
    fn simd_select(mask: MaskN<N>, if_true: Self, if_false: Self) -> Self {
        Self(array::from_fn(|i| {
            if mask.0[i] {
                if_true.0[i]
            } else {
                if_false.0[i]
            }
        }))
    }
}

impl<const N: usize> Add for F32xN<N> {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a + b)
    }
}

impl<const N: usize> Sub for F32xN<N> {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a - b)
    }
}

impl<const N: usize> Mul for F32xN<N> {
    type Output = Self;
    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a * b)
    }
}

impl<const N: usize> Div for F32xN<N> {
    type Output = Self;
    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a / b)
    }
}

impl<const N: usize> Neg for F32xN<N> {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self(self.0.map(|a| -a))
    }
}

// ============================================================================
// I32xN
// ============================================================================

/// `N`-lane i32 vector. Arithmetic wraps, as the hardware does.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct I32xN<const N: usize>([i32; N]);

impl<const N: usize> Default for I32xN<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> SimdI32Ops for I32xN<N> {
    type Mask = MaskN<N>;
    const LANES: usize = N;

    #[inline(always)]
    fn splat(val: i32) -> Self {
        Self([val; N])
    }

    #[inline(always)]
    fn sequential(start: i32) -> Self {
        Self(array::from_fn(|i| start.wrapping_add(i as i32)))
    }

    #[inline(always)]
    fn from_slice(slice: &[i32]) -> Self {
        assert!(slice.len() >= N);
        Self(array::from_fn(|i| slice[i]))
    }

    #[inline(always)]
    fn store(&self, out: &mut [i32]) {
        assert!(out.len() >= N);
        out[..N].copy_from_slice(&self.0);
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> MaskN<N> {
        MaskN(array::from_fn(|i| self.0[i] < rhs.0[i]))
    }

    #[inline(always)]
    fn cmp_eq(self, rhs: Self) -> MaskN<N> {
        MaskN(array::from_fn(|i| self.0[i] == rhs.0[i]))
    }

    #[inline(always)]
    fn first(self) -> i32 {
        self.0[0]
    }

    #[inline(always)]
    fn simd_select(mask: MaskN<N>, if_true: Self, if_false: Self) -> Self {
        Self(array::from_fn(|i| {
            if mask.0[i] {
                if_true.0[i]
            } else {
                if_false.0[i]
            }
        }))
    }
}

impl<const N: usize> Add for I32xN<N> {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(array::from_fn(|i| self.0[i].wrapping_add(rhs.0[i])))
    }
}

impl<const N: usize> Sub for I32xN<N> {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self(array::from_fn(|i| self.0[i].wrapping_sub(rhs.0[i])))
    }
}
